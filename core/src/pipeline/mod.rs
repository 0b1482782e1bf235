pub mod config;
pub mod orchestrator;
pub mod snapshot;

pub use config::{default_labels, PipelineConfig};
pub use orchestrator::{IterationOutcome, IterationStage, Pipeline, PipelineState, StopHandle};
pub use snapshot::FieldSnapshot;
