use clap::Parser;
use concurrent_queue_mini::{Harness, HarnessConfig, HarnessError, HarnessMode, append_report};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Hammer a shared FIFO queue from many threads and check nothing is lost,
/// duplicated or reordered.
#[derive(Parser, Debug)]
#[command(name = "concurrent_queue_mini")]
#[command(version)]
struct Cli {
    /// Number of enqueuing threads
    #[arg(long, default_value_t = 4)]
    producers: usize,

    /// Number of dequeuing threads
    #[arg(long, default_value_t = 4)]
    consumers: usize,

    /// Items each producer enqueues
    #[arg(long, default_value_t = 2_500)]
    items_per_producer: u64,

    /// Run producers before consumers (phased) or alongside them (mixed)
    #[arg(long, value_enum, default_value_t = HarnessMode::Mixed)]
    mode: HarnessMode,

    /// Append the run report to this file as NDJSON
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

impl From<&Cli> for HarnessConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            producers: cli.producers,
            consumers: cli.consumers,
            items_per_producer: cli.items_per_producer,
            mode: cli.mode,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn run(cli: &Cli) -> Result<bool, HarnessError> {
    let harness = Harness::new(HarnessConfig::from(cli))?;
    let report = harness.run()?;
    info!("{}", report);

    if let Some(path) = &cli.output {
        append_report(&report, path)?;
        info!(path = %path.display(), "report appended");
    }
    Ok(report.passed())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("queue lost, duplicated or reordered items");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
