//! Lineage generation pipeline
//!
//! Orchestrates a full run from taxdump files to the lineage table:
//! 1. Parse nodes.dmp and names.dmp into taxon records
//! 2. Build the taxonomy index
//! 3. Resolve every tax_id's lineage in parallel
//! 4. Sort rows by tax_id
//! 5. Back up any existing output and write the gzip CSV

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;
use taxlin_common::Result;
use tracing::{info, info_span};

use crate::backup::maybe_backup_file;
use crate::config::RunConfig;
use crate::output::write_lineages;
use crate::progress::create_progress_bar;
use crate::taxonomy::{ParallelResolver, TaxdumpParser, TaxonIndex};

/// Summary of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Number of taxa in the index (and rows in the table)
    pub taxa: usize,
    /// Workers used for resolution
    pub workers: usize,
    /// Where the table was written
    pub output: PathBuf,
    /// Where a previous file at `output` was moved, if any
    pub backup: Option<PathBuf>,
    /// Wall time of the whole run
    pub elapsed: Duration,
}

/// Taxdump -> lineage table pipeline
pub struct LineagePipeline {
    config: RunConfig,
}

impl LineagePipeline {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run all phases; nothing is written unless every tax_id resolves
    pub fn run(&self) -> Result<PipelineResult> {
        let start = Instant::now();
        self.config.validate()?;

        let records = {
            let _span = info_span!("parse_taxdump").entered();
            let phase = Instant::now();
            let records = TaxdumpParser::new()
                .parse_files(&self.config.nodes_file, &self.config.names_file)?;
            info!(records = records.len(), elapsed = ?phase.elapsed(), "Parsed taxdump");
            records
        };

        let index = {
            let _span = info_span!("build_index").entered();
            let phase = Instant::now();
            let index = TaxonIndex::build(records)?;
            info!(taxa = index.len(), elapsed = ?phase.elapsed(), "Built taxonomy index");
            index
        };

        let tax_ids = index.tax_ids();
        let mut resolver = ParallelResolver::new(&index);
        if let Some(workers) = self.config.workers {
            resolver = resolver.with_worker_count(workers)?;
        }
        let workers = resolver.worker_count();

        let mut lineages = {
            let _span = info_span!("resolve_lineages", workers).entered();
            let phase = Instant::now();
            let progress = create_progress_bar(
                tax_ids.len() as u64,
                "Resolving lineages",
                self.config.show_progress,
            );
            let lineages = resolver.with_progress(progress.clone()).resolve_all(&tax_ids)?;
            progress.finish_and_clear();
            info!(lineages = lineages.len(), elapsed = ?phase.elapsed(), "Resolved lineages");
            lineages
        };

        lineages.sort_unstable_by_key(|record| record.tax_id);

        let output = self.config.output_path();
        let backup = {
            let _span = info_span!("write_lineages").entered();
            let phase = Instant::now();
            let backup = maybe_backup_file(&output)?;
            info!(path = %output.display(), "Writing lineages");
            write_lineages(&lineages, &output)?;
            info!(elapsed = ?phase.elapsed(), "Wrote lineages");
            backup
        };

        Ok(PipelineResult {
            taxa: lineages.len(),
            workers,
            output,
            backup,
            elapsed: start.elapsed(),
        })
    }
}
