use crate::pipeline::FieldSnapshot;
use std::io;

/// Reasons a single input record is rejected by the frame parser.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} comma-separated values, found {found}")]
    TokenCount { expected: usize, found: usize },
    #[error("value {index} ({token:?}) is not an integer")]
    InvalidToken { index: usize, token: String },
}

/// Common error type for the field pipeline.
#[derive(thiserror::Error, Debug)]
pub enum FieldError {
    #[error("malformed record: {0}")]
    Parse(#[from] ParseError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("reconstruction failed: {0}")]
    Reconstruction(String),
    #[error("no channels to process")]
    EmptyInput,
    #[error("sink failure: {0}")]
    Sink(String),
    #[error("source failure: {0}")]
    Source(String),
    #[error("invalid pipeline state: {0}")]
    InvalidState(String),
}

pub type FieldResult<T> = Result<T, FieldError>;

/// Blocking supplier of raw text records.
///
/// `Ok(None)` marks the end of the stream. An `Err` is reserved for transport
/// failures; malformed content is returned as a record and rejected by the parser.
pub trait RecordSource {
    fn next_record(&mut self) -> io::Result<Option<String>>;

    /// Called once when the pipeline stops.
    fn release(&mut self) {}
}

/// Downstream consumer of field snapshots (rendering, persistence, forwarding).
pub trait SnapshotSink {
    fn emit(&mut self, snapshot: FieldSnapshot) -> FieldResult<()>;

    fn flush(&mut self) -> FieldResult<()> {
        Ok(())
    }
}

impl SnapshotSink for Vec<FieldSnapshot> {
    fn emit(&mut self, snapshot: FieldSnapshot) -> FieldResult<()> {
        self.push(snapshot);
        Ok(())
    }
}

impl<S: SnapshotSink + ?Sized> SnapshotSink for Box<S> {
    fn emit(&mut self, snapshot: FieldSnapshot) -> FieldResult<()> {
        (**self).emit(snapshot)
    }

    fn flush(&mut self) -> FieldResult<()> {
        (**self).flush()
    }
}
