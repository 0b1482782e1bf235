use crate::prelude::RecordSource;
use std::io::{self, BufRead};
use tokio::sync::mpsc;

/// Reads one record per line from any buffered reader (file, device node, stdin).
pub struct LineSource<R> {
    reader: R,
    buffer: Vec<u8>,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(64),
        }
    }
}

impl<R: BufRead> RecordSource for LineSource<R> {
    fn next_record(&mut self) -> io::Result<Option<String>> {
        self.buffer.clear();
        if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
            return Ok(None);
        }
        // Garbled bytes from the device become a malformed record, not a transport failure.
        let line = String::from_utf8_lossy(&self.buffer);
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Messages accepted by a [`ChannelSource`].
#[derive(Debug, Clone)]
pub enum SourceMessage {
    Record(String),
    Close,
    /// The producer's transport failed; surfaces as a read error.
    Failed(String),
}

/// Receives records from producer tasks over a bounded tokio channel.
pub struct ChannelSource {
    receiver: mpsc::Receiver<SourceMessage>,
}

impl ChannelSource {
    pub fn new(receiver: mpsc::Receiver<SourceMessage>) -> Self {
        Self { receiver }
    }

    /// Creates a connected sender/source pair.
    pub fn channel(capacity: usize) -> (mpsc::Sender<SourceMessage>, Self) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (sender, Self::new(receiver))
    }
}

impl RecordSource for ChannelSource {
    /// Must not be called from inside an async context.
    fn next_record(&mut self) -> io::Result<Option<String>> {
        match self.receiver.blocking_recv() {
            Some(SourceMessage::Record(record)) => Ok(Some(record)),
            Some(SourceMessage::Close) | None => Ok(None),
            Some(SourceMessage::Failed(reason)) => {
                Err(io::Error::new(io::ErrorKind::Other, reason))
            }
        }
    }

    fn release(&mut self) {
        self.receiver.close();
    }
}
