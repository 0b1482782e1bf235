pub mod layout;
pub mod reconstruct;
pub mod triangulation;

pub use layout::{AnchorPosition, GridResolution, MAX_GRID_CELLS};
pub use reconstruct::{reconstruct, ExtrapolationPolicy, FieldReconstructor};
pub use triangulation::Triangulation;
