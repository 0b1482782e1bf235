use crate::gui_bridge::bridge::GuiBridge;
use crate::workflow::config::MonitorConfig;
use crate::workflow::input::{spawn_input, InputSpec};
use crate::workflow::sinks::{FanoutSink, JsonLinesSink};
use anyhow::{bail, Context};
use fieldcore::ingest::{ChannelSource, SourceMessage};
use fieldcore::telemetry::MetricsSnapshot;
use fieldcore::{Pipeline, StopHandle};
use log::{error, info};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use tokio::sync::mpsc::Sender;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub input: Option<InputSpec>,
    /// JSON-lines snapshot log.
    pub output: Option<PathBuf>,
    /// Address for the HTTP bridge; while serving, the run only ends on Ctrl+C.
    pub serve: Option<SocketAddr>,
    pub handle_ctrl_c: bool,
}

pub struct Runner {
    config: MonitorConfig,
    pipeline: Pipeline,
}

impl Runner {
    pub fn new(config: MonitorConfig) -> anyhow::Result<Self> {
        let pipeline_config = config.to_pipeline_config()?;
        let pipeline = Pipeline::new(pipeline_config).context("configuring field pipeline")?;
        Ok(Self { config, pipeline })
    }

    /// Synthetic input using the configured generator and anchor layout.
    pub fn simulated_input(&self, interval: Duration, count: Option<u64>) -> InputSpec {
        InputSpec::Simulate {
            generator: self.config.generator.clone(),
            anchors: self.config.anchors.clone(),
            interval,
            count,
        }
    }

    /// Runs the pipeline on the calling thread until the input ends or Ctrl+C.
    pub fn run(mut self, options: RunOptions) -> anyhow::Result<MetricsSnapshot> {
        if options.input.is_none() && options.serve.is_none() {
            bail!("no record input: give an input path, stdin, simulation or a bridge address");
        }

        let (sender, mut source) = ChannelSource::channel(self.config.queue_capacity);
        let mut sink = FanoutSink::new();
        if let Some(path) = &options.output {
            sink.push(JsonLinesSink::create(path)?);
            info!("appending snapshots to {}", path.display());
        }

        let bridge = match options.serve {
            Some(address) => {
                let bridge = GuiBridge::new(address, self.pipeline.metrics(), sender.clone())?;
                sink.push(bridge.sink());
                Some(bridge)
            }
            None => None,
        };

        if let Some(input) = options.input {
            // Detached: a reader blocked on stdin must not hold up shutdown.
            spawn_input(input, sender.clone(), bridge.is_none())?;
        }

        let stop = StopHandle::new();
        if options.handle_ctrl_c {
            spawn_ctrl_c_watcher(stop.clone(), sender.clone())?;
        }
        drop(sender);

        if let Some(bridge) = &bridge {
            bridge.publish_status("bridge running (Ctrl+C to stop)");
        }

        let metrics = self
            .pipeline
            .run(&mut source, &mut sink, &stop)
            .context("running field pipeline")?;
        if let Some(bridge) = &bridge {
            bridge.publish_status("pipeline stopped");
        }
        Ok(metrics)
    }
}

fn spawn_ctrl_c_watcher(stop: StopHandle, sender: Sender<SourceMessage>) -> anyhow::Result<()> {
    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime for signal handling")?;
    thread::Builder::new()
        .name("ctrl-c-watcher".into())
        .spawn(move || {
            runtime.block_on(async move {
                if let Err(err) = signal::ctrl_c().await {
                    error!("awaiting Ctrl+C failed: {}", err);
                    return;
                }
                info!("Ctrl+C received, stopping");
                stop.stop();
                // Wakes a pipeline blocked waiting for the next record.
                let _ = sender.send(SourceMessage::Close).await;
            });
        })
        .context("spawning Ctrl+C watcher")?;
    Ok(())
}
