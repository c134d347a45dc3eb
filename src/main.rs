//! perfc host harness.
//!
//! Plays the host for local runs of the publisher plugin.
//!
//! ```text
//! batch file (TOML)
//!     → config::loader (parse, validate against the plugin policy)
//!     → health::CounterProbe (optional, in-memory counter source)
//!     → PerfcPublisher::publish (recording counter writer)
//!     → JSON summary on stdout
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use perfc::config::loader::load_batch;
use perfc::config::schema::ProbeConfig;
use perfc::counters::{MemoryCounters, RecordingCounterWriter};
use perfc::health::{CounterProbe, ProbeReport};
use perfc::observability::{logging, metrics};
use perfc::plugin::{Publisher, META};
use perfc::PerfcPublisher;

#[derive(Parser)]
#[command(name = "perfc")]
#[command(about = "Local host harness for the perfc publisher plugin", long_about = None)]
struct Cli {
    /// Tracing filter used when RUST_LOG is not set.
    #[arg(long, default_value = "perfc=trace,warn")]
    log_filter: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the plugin identity and config policy
    Policy,
    /// Run the counter probe described by a batch file
    Probe {
        /// Batch file (TOML)
        batch: PathBuf,
    },
    /// Publish the metrics in a batch file
    Publish {
        /// Batch file (TOML)
        batch: PathBuf,

        /// Skip the probe even if the batch enables it
        #[arg(long)]
        skip_probe: bool,

        /// Print internal metrics in Prometheus text format afterwards
        #[arg(long)]
        print_metrics: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_subscriber(&cli.log_filter);

    let publisher = PerfcPublisher::new();

    match cli.command {
        Commands::Policy => {
            let out = json!({
                "plugin": META,
                "policy": publisher.config_policy(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Probe { batch } => {
            let batch = load_batch(&batch, &publisher.config_policy())?;
            let report = run_probe(&batch.probe);
            println!("{}", serde_json::to_string_pretty(&report.summary())?);
        }
        Commands::Publish {
            batch,
            skip_probe,
            print_metrics,
        } => {
            let recorder = if print_metrics {
                Some(metrics::init_recorder()?)
            } else {
                None
            };

            let batch = load_batch(&batch, &publisher.config_policy())?;

            let probe = if batch.probe.enabled && !skip_probe {
                Some(run_probe(&batch.probe).summary())
            } else {
                None
            };

            let writer = Arc::new(RecordingCounterWriter::new());
            let publisher = publisher.with_counter_writer(writer.clone());
            publisher.publish(&batch.metrics, &batch.config)?;

            let out = json!({
                "metrics": batch.metrics.len(),
                "wait_samples": writer.len(),
                "verbosity": publisher.verbosity().as_str(),
                "probe": probe,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);

            if let Some(handle) = recorder {
                print!("{}", handle.render());
            }
        }
    }

    Ok(())
}

fn run_probe(config: &ProbeConfig) -> ProbeReport {
    let source = MemoryCounters::new(config.samples.clone());
    let report = CounterProbe::new(&source)
        .with_counters(config.counters.iter().cloned())
        .with_format(config.format)
        .run();

    if !report.is_available() {
        tracing::warn!(opened = report.opened, "Counter subsystem unavailable");
    }
    report
}
