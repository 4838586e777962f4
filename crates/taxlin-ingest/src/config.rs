//! Run configuration for lineage generation

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taxlin_common::{Result, TaxlinError};

/// Prefix of the default output file name
pub const DEFAULT_OUTPUT_PREFIX: &str = "ncbi_lineages";

/// Default output name for a given date: `ncbi_lineages_2026-10-16.csv.gz`
pub fn default_output_path(date: NaiveDate) -> PathBuf {
    PathBuf::from(format!("{}_{}.csv.gz", DEFAULT_OUTPUT_PREFIX, date.format("%Y-%m-%d")))
}

/// Configuration of one lineage generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// path/to/taxdump/nodes.dmp (optionally gzip-compressed)
    pub nodes_file: PathBuf,

    /// path/to/taxdump/names.dmp (optionally gzip-compressed)
    pub names_file: PathBuf,

    /// Output path; defaults to a dated name in the working directory
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Number of lineage workers; defaults to min(cores, 6)
    #[serde(default)]
    pub workers: Option<usize>,

    /// Draw a progress bar while resolving
    #[serde(default)]
    pub show_progress: bool,
}

impl RunConfig {
    pub fn new(nodes_file: impl Into<PathBuf>, names_file: impl Into<PathBuf>) -> Self {
        Self {
            nodes_file: nodes_file.into(),
            names_file: names_file.into(),
            output: None,
            workers: None,
            show_progress: false,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Output path, falling back to today's (UTC) default name
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(Utc::now().date_naive()))
    }

    /// Check the configuration before any work starts
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(TaxlinError::config("workers must be at least 1"));
        }
        require_file(&self.nodes_file, "nodes file")?;
        require_file(&self.names_file, "names file")?;
        Ok(())
    }
}

fn require_file(path: &Path, what: &str) -> Result<()> {
    if !path.is_file() {
        return Err(TaxlinError::config(format!(
            "{} not found: '{}'",
            what,
            path.display()
        )));
    }
    Ok(())
}
