use crate::generator::profile::{GeneratorConfig, SignalGenerator};
use anyhow::Context;
use fieldcore::field::AnchorPosition;
use fieldcore::ingest::{LineSource, SourceMessage};
use fieldcore::RecordSource;
use log::{error, info};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc::Sender;

/// Where raw records come from.
#[derive(Debug, Clone)]
pub enum InputSpec {
    /// A capture file or a serial device node.
    Path(PathBuf),
    Stdin,
    Simulate {
        generator: GeneratorConfig,
        anchors: Vec<AnchorPosition>,
        interval: Duration,
        count: Option<u64>,
    },
}

/// Starts a thread that forwards records into the pipeline channel.
///
/// With `close_at_end` the thread sends [`SourceMessage::Close`] once its input
/// is exhausted so the pipeline stops; otherwise the pipeline keeps waiting for
/// other producers.
pub fn spawn_input(
    input: InputSpec,
    sender: Sender<SourceMessage>,
    close_at_end: bool,
) -> anyhow::Result<JoinHandle<()>> {
    let builder = thread::Builder::new().name("record-input".into());
    let handle = match input {
        InputSpec::Path(path) => {
            let file = File::open(&path)
                .with_context(|| format!("opening record input {}", path.display()))?;
            info!("reading records from {}", path.display());
            builder.spawn(move || {
                let forwarded = forward_lines(BufReader::new(file), &sender);
                finish(&sender, forwarded, close_at_end);
            })
        }
        InputSpec::Stdin => builder.spawn(move || {
            let forwarded = forward_lines(io::stdin().lock(), &sender);
            finish(&sender, forwarded, close_at_end);
        }),
        InputSpec::Simulate {
            generator,
            anchors,
            interval,
            count,
        } => {
            generator.validate()?;
            builder.spawn(move || {
                let records = SignalGenerator::new(generator, anchors);
                let limit = count.map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));
                for record in records.take(limit) {
                    if sender.blocking_send(SourceMessage::Record(record)).is_err() {
                        return;
                    }
                    if !interval.is_zero() {
                        thread::sleep(interval);
                    }
                }
                finish(&sender, Ok(()), close_at_end);
            })
        }
    };
    handle.context("spawning record input thread")
}

/// Forwards lines until end of input or until the pipeline stops listening.
fn forward_lines<R: BufRead>(reader: R, sender: &Sender<SourceMessage>) -> io::Result<()> {
    let mut source = LineSource::new(reader);
    while let Some(record) = source.next_record()? {
        if sender.blocking_send(SourceMessage::Record(record)).is_err() {
            break;
        }
    }
    Ok(())
}

/// A read failure always ends the run; a clean end only does with `close_at_end`.
fn finish(sender: &Sender<SourceMessage>, forwarded: io::Result<()>, close_at_end: bool) {
    // The receiver may already be gone during shutdown.
    match forwarded {
        Err(err) => {
            error!("record input failed: {}", err);
            let _ = sender.blocking_send(SourceMessage::Failed(err.to_string()));
        }
        Ok(()) if close_at_end => {
            let _ = sender.blocking_send(SourceMessage::Close);
        }
        Ok(()) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::sync::mpsc;

    fn drain(receiver: &mut mpsc::Receiver<SourceMessage>) -> Vec<SourceMessage> {
        let mut messages = Vec::new();
        while let Some(message) = receiver.blocking_recv() {
            let closing = matches!(message, SourceMessage::Close | SourceMessage::Failed(_));
            messages.push(message);
            if closing {
                break;
            }
        }
        messages
    }

    #[test]
    fn file_input_forwards_lines_then_closes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"-60,-61,-59,-62\nbad,data\n").unwrap();
        let (sender, mut receiver) = mpsc::channel(8);

        let handle =
            spawn_input(InputSpec::Path(file.path().to_path_buf()), sender, true).unwrap();
        let messages = drain(&mut receiver);
        handle.join().unwrap();

        assert_eq!(messages.len(), 3);
        assert!(matches!(&messages[1], SourceMessage::Record(r) if r == "bad,data"));
        assert!(matches!(messages[2], SourceMessage::Close));
    }

    #[test]
    fn missing_file_is_reported_before_spawning() {
        let (sender, _receiver) = mpsc::channel(1);
        let input = InputSpec::Path(PathBuf::from("/nonexistent/records.txt"));
        assert!(spawn_input(input, sender, true).is_err());
    }

    #[test]
    fn read_failure_is_forwarded_instead_of_close() {
        let dir = tempfile::tempdir().unwrap();
        let (sender, mut receiver) = mpsc::channel(8);

        // Opening a directory succeeds on Linux; reading it does not.
        let handle = spawn_input(InputSpec::Path(dir.path().to_path_buf()), sender, true).unwrap();
        let messages = drain(&mut receiver);
        handle.join().unwrap();

        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0], SourceMessage::Failed(_)));
    }

    #[test]
    fn invalid_generator_is_rejected_before_spawning() {
        let (sender, _receiver) = mpsc::channel(1);
        let mut generator = GeneratorConfig::default();
        generator.noise_dbm = f64::INFINITY;
        let input = InputSpec::Simulate {
            generator,
            anchors: AnchorPosition::unit_square_corners(),
            interval: Duration::ZERO,
            count: Some(1),
        };
        assert!(spawn_input(input, sender, true).is_err());
    }

    #[test]
    fn simulated_input_honours_count() {
        let (sender, mut receiver) = mpsc::channel(8);
        let input = InputSpec::Simulate {
            generator: GeneratorConfig::default(),
            anchors: AnchorPosition::unit_square_corners(),
            interval: Duration::ZERO,
            count: Some(5),
        };
        let handle = spawn_input(input, sender, true).unwrap();
        let messages = drain(&mut receiver);
        handle.join().unwrap();
        assert_eq!(messages.len(), 6);
    }
}
