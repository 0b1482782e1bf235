use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use workflow::config::MonitorConfig;
use workflow::input::InputSpec;
use workflow::runner::{RunOptions, Runner};

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Live RSSI field monitor")]
struct Args {
    /// Read records from a capture file or serial device; `-` reads stdin
    #[arg(long, conflicts_with = "simulate")]
    input: Option<PathBuf>,
    /// Feed the pipeline from the synthetic signal generator
    #[arg(long, default_value_t = false)]
    simulate: bool,
    /// Number of synthetic records (unbounded when omitted)
    #[arg(long, requires = "simulate")]
    count: Option<u64>,
    #[arg(long, default_value_t = 100)]
    interval_ms: u64,
    /// Load a monitor config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    rows: Option<usize>,
    #[arg(long)]
    cols: Option<usize>,
    /// Append snapshots as JSON lines to this file
    #[arg(long)]
    output: Option<PathBuf>,
    /// Keep the HTTP bridge alive for display clients and posted records
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value = "127.0.0.1:9000")]
    bind: SocketAddr,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => MonitorConfig::load(path)?,
        None => MonitorConfig::default(),
    }
    .with_grid_overrides(args.rows, args.cols);

    let runner = Runner::new(config)?;
    let input = if args.simulate {
        Some(runner.simulated_input(Duration::from_millis(args.interval_ms), args.count))
    } else {
        args.input.map(|path| {
            if path.as_os_str() == "-" {
                InputSpec::Stdin
            } else {
                InputSpec::Path(path)
            }
        })
    };

    let metrics = runner.run(RunOptions {
        input,
        output: args.output,
        serve: args.serve.then_some(args.bind),
        handle_ctrl_c: true,
    })?;

    println!(
        "Run complete -> records {}, snapshots {}, skipped {}, failed {}",
        metrics.records, metrics.emitted, metrics.skipped, metrics.failed
    );
    Ok(())
}
