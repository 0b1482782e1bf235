//! Signal-fusion and spatial-reconstruction core for the RSSI field monitor.
//!
//! Each raw record flows through a fixed chain of stages: the frame parser
//! validates it, one Kalman estimator per channel smooths it, the field
//! reconstructor interpolates the smoothed values over the unit square, and the
//! selector names the strongest source. [`pipeline::Pipeline`] owns that chain
//! and contains every per-record failure.

pub mod estimation;
pub mod field;
pub mod ingest;
pub mod math;
pub mod pipeline;
pub mod prelude;
pub mod selection;
pub mod telemetry;

pub use pipeline::{FieldSnapshot, Pipeline, PipelineConfig, StopHandle};
pub use prelude::{FieldError, FieldResult, ParseError, RecordSource, SnapshotSink};
