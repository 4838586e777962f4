//! taxlin - convert an NCBI taxonomy dump into lineages

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use taxlin_common::logging::{init_logging, LogConfig, LogLevel, WorkerGuard};
use taxlin_common::TaxlinError;
use taxlin_ingest::config::RunConfig;
use taxlin_ingest::pipeline::LineagePipeline;
use tracing::{error, info};

/// Converts NCBI taxonomy dump into lineages.
///
/// The taxonomy dump can be downloaded from
/// ftp://ftp.ncbi.nlm.nih.gov/pub/taxonomy/taxdump.tar.gz
#[derive(Parser, Debug)]
#[command(name = "taxlin")]
#[command(author, version, about, long_about)]
struct Cli {
    /// path/to/taxdump/nodes.dmp (plain or .gz)
    #[arg(long, env = "TAXLIN_NODES_FILE")]
    nodes_file: PathBuf,

    /// path/to/taxdump/names.dmp (plain or .gz)
    #[arg(long, env = "TAXLIN_NAMES_FILE")]
    names_file: PathBuf,

    /// Output path [default: ncbi_lineages_<date>.csv.gz]
    #[arg(short, long, env = "TAXLIN_OUTPUT")]
    output: Option<PathBuf>,

    /// Number of lineage workers [default: min(cores, 6)]
    #[arg(short, long, env = "TAXLIN_WORKERS")]
    workers: Option<usize>,

    /// Do not draw a progress bar
    #[arg(long)]
    no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        let mut config = RunConfig::new(&self.nodes_file, &self.names_file)
            .with_progress(!self.no_progress);
        config.output = self.output.clone();
        config.workers = self.workers;
        config
    }
}

fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let (log_guard, console_logs) = match setup_logging(cli.verbose) {
        Ok(logging) => logging,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {:#}", e);
            process::exit(1);
        },
    };

    if let Err(e) = run(&cli) {
        let tax_id = e.downcast_ref::<TaxlinError>().and_then(TaxlinError::tax_id);
        error!(error = %format!("{:#}", e), tax_id, "Lineage generation failed");
        // the console layer already wrote it to stderr
        if !console_logs {
            eprintln!("Error: {:#}", e);
        }
        // flush file logs before exiting
        drop(log_guard);
        process::exit(1);
    }
}

/// Install logging; the flag tells whether records reach stderr
fn setup_logging(verbose: bool) -> Result<(Option<WorkerGuard>, bool)> {
    let level = if verbose { LogLevel::Debug } else { LogLevel::Info };
    let config = LogConfig::builder()
        .level(level)
        .log_file_prefix("taxlin")
        .include_thread_names(verbose)
        .build()
        // environment variables take precedence
        .merge_env()?;

    let guard = init_logging(&config)?;
    Ok((guard, config.output.includes_console()))
}

fn run(cli: &Cli) -> Result<()> {
    let pipeline = LineagePipeline::new(cli.run_config());
    let result = pipeline.run().context("Failed to generate lineages")?;

    if let Some(backup) = &result.backup {
        info!(backup = %backup.display(), "Previous output kept");
    }
    info!(
        taxa = result.taxa,
        workers = result.workers,
        output = %result.output.display(),
        elapsed = ?result.elapsed,
        "Lineage generation complete"
    );
    Ok(())
}
