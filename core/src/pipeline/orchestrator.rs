use crate::estimation::EstimatorBank;
use crate::field::FieldReconstructor;
use crate::ingest::{FrameParser, RawReading};
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::snapshot::{now_seconds, FieldSnapshot};
use crate::prelude::{FieldError, FieldResult, ParseError, RecordSource, SnapshotSink};
use crate::selection::select;
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running,
    Stopped,
}

/// Stage of an iteration, reported alongside failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IterationStage {
    Estimating,
    Reconstructing,
    Selecting,
    Emitting,
}

#[derive(Debug)]
pub enum IterationOutcome {
    Emitted {
        iteration: u64,
        dominant: usize,
    },
    /// The record was malformed; no estimator was touched.
    Skipped {
        iteration: u64,
        error: ParseError,
    },
    Failed {
        iteration: u64,
        stage: IterationStage,
        error: FieldError,
    },
    EndOfStream,
}

/// Cloneable request to stop at the next iteration boundary.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives parse, estimate, reconstruct, select and emit for each arriving record.
pub struct Pipeline {
    parser: FrameParser,
    estimators: EstimatorBank,
    reconstructor: FieldReconstructor,
    labels: Vec<String>,
    state: PipelineState,
    iteration: u64,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

type StageFault = (IterationStage, FieldError);

impl Pipeline {
    pub fn new(config: PipelineConfig) -> FieldResult<Self> {
        let reconstructor = config.build_reconstructor()?;
        let estimators = EstimatorBank::new(&config.estimators)?;
        Ok(Self {
            parser: FrameParser::new(config.channels()),
            estimators,
            reconstructor,
            labels: config.labels,
            state: PipelineState::Idle,
            iteration: 0,
            metrics: Arc::new(MetricsRecorder::new()),
            logger: LogManager::new(),
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Number of records acquired so far.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn channels(&self) -> usize {
        self.parser.channels()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn estimators(&self) -> &EstimatorBank {
        &self.estimators
    }

    pub fn reconstructor(&self) -> &FieldReconstructor {
        &self.reconstructor
    }

    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        Arc::clone(&self.metrics)
    }

    pub fn start(&mut self) -> FieldResult<()> {
        match self.state {
            PipelineState::Idle => {
                self.state = PipelineState::Running;
                self.logger.record(&format!(
                    "pipeline running: {} channels, {}x{} grid, {:?} extrapolation",
                    self.channels(),
                    self.reconstructor.resolution().rows,
                    self.reconstructor.resolution().cols,
                    self.reconstructor.policy()
                ));
                Ok(())
            }
            PipelineState::Running => Ok(()),
            PipelineState::Stopped => Err(FieldError::InvalidState(
                "a stopped pipeline cannot be restarted".into(),
            )),
        }
    }

    /// Acquires one record (blocking) and runs a full iteration on it.
    ///
    /// Only a transport failure of the source is returned as an error; every
    /// per-record problem is contained in the outcome.
    pub fn step<S, K>(&mut self, source: &mut S, sink: &mut K) -> FieldResult<IterationOutcome>
    where
        S: RecordSource + ?Sized,
        K: SnapshotSink + ?Sized,
    {
        self.ensure_running()?;
        match source.next_record() {
            Ok(Some(record)) => self.process_record(&record, sink),
            Ok(None) => Ok(IterationOutcome::EndOfStream),
            Err(err) => Err(FieldError::Source(err.to_string())),
        }
    }

    /// Runs one iteration on a record that was acquired elsewhere.
    pub fn process_record<K>(&mut self, record: &str, sink: &mut K) -> FieldResult<IterationOutcome>
    where
        K: SnapshotSink + ?Sized,
    {
        self.ensure_running()?;
        self.iteration += 1;
        let iteration = self.iteration;
        self.metrics.record_received();

        let reading = match self.parser.parse(record) {
            Ok(reading) => reading,
            Err(error) => {
                self.logger.record_skip(iteration, record, &error);
                self.metrics.record_skipped();
                return Ok(IterationOutcome::Skipped { iteration, error });
            }
        };

        let emitted = self.assemble(iteration, reading).and_then(|snapshot| {
            let dominant = snapshot.dominant;
            self.logger.record_snapshot(&snapshot);
            sink.emit(snapshot)
                .map(|_| dominant)
                .map_err(|err| (IterationStage::Emitting, err))
        });

        Ok(match emitted {
            Ok(dominant) => {
                self.metrics.record_emitted();
                IterationOutcome::Emitted {
                    iteration,
                    dominant,
                }
            }
            Err((stage, error)) => {
                self.logger.record_failure(iteration, stage, &error);
                self.metrics.record_failed();
                IterationOutcome::Failed {
                    iteration,
                    stage,
                    error,
                }
            }
        })
    }

    fn assemble(&mut self, iteration: u64, reading: RawReading) -> Result<FieldSnapshot, StageFault> {
        let smoothed = self
            .estimators
            .update(&reading)
            .map_err(|err| (IterationStage::Estimating, err))?;
        self.logger
            .record_reading(iteration, &self.labels, &reading, &smoothed);

        let field = self
            .reconstructor
            .reconstruct(&smoothed)
            .map_err(|err| (IterationStage::Reconstructing, err))?;
        let dominant = select(&smoothed).map_err(|err| (IterationStage::Selecting, err))?;
        let dominant_label = self
            .labels
            .get(dominant)
            .cloned()
            .ok_or_else(|| {
                (
                    IterationStage::Selecting,
                    FieldError::InvalidState(format!("no label for channel {dominant}")),
                )
            })?;

        Ok(FieldSnapshot {
            iteration,
            timestamp: now_seconds(),
            raw: reading.into_inner(),
            smoothed,
            field,
            dominant,
            dominant_label,
        })
    }

    /// Loops until end-of-stream or `stop` is raised, then stops the pipeline.
    ///
    /// The stop signal is honoured between iterations; a pending blocking read
    /// is not interrupted.
    pub fn run<S, K>(
        &mut self,
        source: &mut S,
        sink: &mut K,
        stop: &StopHandle,
    ) -> FieldResult<MetricsSnapshot>
    where
        S: RecordSource + ?Sized,
        K: SnapshotSink + ?Sized,
    {
        self.start()?;
        let outcome = loop {
            if stop.is_stopped() {
                self.logger.record("stop requested");
                break Ok(());
            }
            match self.step(source, sink) {
                Ok(IterationOutcome::EndOfStream) => {
                    self.logger.record("input stream ended");
                    break Ok(());
                }
                Ok(_) => {}
                Err(err) => break Err(err),
            }
        };
        let stopped = self.stop(source, sink);
        outcome?;
        stopped?;
        Ok(self.metrics.snapshot())
    }

    /// Releases the source and flushes the sink. Stopping twice is a no-op.
    pub fn stop<S, K>(&mut self, source: &mut S, sink: &mut K) -> FieldResult<()>
    where
        S: RecordSource + ?Sized,
        K: SnapshotSink + ?Sized,
    {
        if self.state == PipelineState::Stopped {
            return Ok(());
        }
        self.state = PipelineState::Stopped;
        source.release();
        let flushed = sink.flush();
        let metrics = self.metrics.snapshot();
        self.logger.record(&format!(
            "pipeline stopped after {} records: {} emitted, {} skipped, {} failed",
            metrics.records, metrics.emitted, metrics.skipped, metrics.failed
        ));
        flushed
    }

    fn ensure_running(&self) -> FieldResult<()> {
        if self.state == PipelineState::Running {
            Ok(())
        } else {
            Err(FieldError::InvalidState(format!(
                "pipeline is {:?}, not running",
                self.state
            )))
        }
    }
}
