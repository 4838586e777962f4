//! taxlin ingest library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Converts an NCBI taxonomy dump (nodes.dmp + names.dmp) into a flat,
//! gzip-compressed CSV with one lineage row per taxon.
//!
//! # Example
//!
//! ```no_run
//! use taxlin_ingest::{config::RunConfig, pipeline::LineagePipeline};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = RunConfig::new("taxdump/nodes.dmp", "taxdump/names.dmp")
//!         .with_output("lineages.csv.gz")
//!         .with_workers(4);
//!     let result = LineagePipeline::new(config).run()?;
//!     println!("wrote {} lineages to {}", result.taxa, result.output.display());
//!     Ok(())
//! }
//! ```

pub mod backup;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod taxonomy;
