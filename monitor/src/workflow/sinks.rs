use anyhow::Context;
use fieldcore::{FieldError, FieldResult, FieldSnapshot, SnapshotSink};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends one JSON object per snapshot to a log file.
pub struct JsonLinesSink {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn create<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating snapshot directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening snapshot log {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    fn io_error(&self, err: std::io::Error) -> FieldError {
        FieldError::Sink(format!("{}: {}", self.path.display(), err))
    }
}

impl SnapshotSink for JsonLinesSink {
    fn emit(&mut self, snapshot: FieldSnapshot) -> FieldResult<()> {
        let line = snapshot.to_json()?;
        // Flushed per entry so a crash loses at most the snapshot in flight.
        writeln!(self.writer, "{line}")
            .and_then(|_| self.writer.flush())
            .map_err(|err| self.io_error(err))
    }

    fn flush(&mut self) -> FieldResult<()> {
        self.writer.flush().map_err(|err| self.io_error(err))
    }
}

/// Delivers every snapshot to each registered sink.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn SnapshotSink + Send>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<S: SnapshotSink + Send + 'static>(&mut self, sink: S) {
        self.sinks.push(Box::new(sink));
    }
}

impl SnapshotSink for FanoutSink {
    /// Every sink sees the snapshot even when an earlier one fails; the first error is returned.
    fn emit(&mut self, snapshot: FieldSnapshot) -> FieldResult<()> {
        let mut first_error = None;
        if let Some((last, rest)) = self.sinks.split_last_mut() {
            for sink in rest {
                if let Err(err) = sink.emit(snapshot.clone()) {
                    first_error.get_or_insert(err);
                }
            }
            if let Err(err) = last.emit(snapshot) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn flush(&mut self) -> FieldResult<()> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(err) = sink.flush() {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
