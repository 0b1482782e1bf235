pub mod geometry;
pub mod stats;

pub use geometry::Point2;
pub use stats::StatsHelper;
