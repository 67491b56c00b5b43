use std::path::PathBuf;

use anyhow::{Context, Result};
use bstpipe::config::HarnessConfig;
use bstpipe::harness::{self, PhaseReport, RunReport};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Builds, serializes and verifies minimum-height BSTs, sequentially and
/// through a producer/consumer pipeline.
#[derive(Parser, Debug)]
#[command(name = "bst_harness")]
struct Cli {
    /// JSON config file; flags given on the command line override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// CD records file (`artist|title|year|rating` per line).
    #[arg(long)]
    records: Option<PathBuf>,
    /// Slots in the producer/consumer buffer.
    #[arg(long)]
    buffer_size: Option<usize>,
    /// Trees produced and consumed per phase.
    #[arg(long)]
    num_trees: Option<usize>,
    /// Draws below this value (out of num_trees) serialize the wrong way.
    #[arg(long)]
    error_rate: Option<usize>,
    /// Seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,
    /// Print the run report as JSON.
    #[arg(long)]
    json: bool,
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn resolve(&self) -> Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => HarnessConfig::default(),
        };
        if let Some(records) = &self.records {
            config.records_path = records.clone();
        }
        if let Some(buffer_size) = self.buffer_size {
            config.buffer_size = buffer_size;
        }
        if let Some(num_trees) = self.num_trees {
            config.num_trees = num_trees;
        }
        if let Some(error_rate) = self.error_rate {
            config.error_rate = error_rate;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .init();
}

fn print_phase(label: &str, phase: &PhaseReport) {
    println!(
        "{label}: {:.2}s ({:.0} trees/s, {} invalid)",
        phase.seconds(),
        phase.throughput(),
        phase.invalid
    );
}

fn print_report(report: &RunReport) {
    println!("{}", report.records);
    println!("based on the number of items, the min height should be:");
    println!("{}", report.expected_height);
    println!();
    print_phase("sequential", &report.sequential);
    print_phase("parallel", &report.parallel);
    println!("speedup: {:.2}x", report.speedup());
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = cli.resolve()?;
    let report = harness::run(&config).with_context(|| {
        format!("harness run over {} failed", config.records_path.display())
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}
