//! NCBI taxonomy lineage resolution
//!
//! Turns the taxdump forest into one flat lineage per taxon.
//!
//! # Components
//! - [`TaxdumpParser`]: nodes.dmp + names.dmp -> [`TaxonRecord`]s
//! - [`TaxonIndex`]: immutable tax_id -> record map shared by all workers
//! - [`walker::walk`]: ancestor chain of one taxon, root first
//! - [`formatter::format`]: chain -> [`LineageRecord`], numbering repeated ranks
//! - [`ParallelResolver`]: walk + format for every tax_id on scoped threads
//!
//! # Example
//! ```
//! use taxlin_ingest::taxonomy::{formatter, walker, TaxonIndex, TaxonRecord};
//!
//! # fn main() -> taxlin_common::Result<()> {
//! let index = TaxonIndex::build(vec![
//!     TaxonRecord::new(1, 1, "no rank", "root"),
//!     TaxonRecord::new(131567, 1, "no rank", "cellular organisms"),
//!     TaxonRecord::new(2, 131567, "superkingdom", "Bacteria"),
//! ])?;
//!
//! let record = formatter::format(&walker::walk(2, &index)?)?;
//! assert_eq!(record.get("no rank1"), Some("cellular organisms"));
//! assert_eq!(record.get("superkingdom"), Some("Bacteria"));
//! # Ok(())
//! # }
//! ```

pub mod formatter;
pub mod index;
pub mod models;
pub mod parser;
pub mod resolver;
pub mod walker;

// Re-export commonly used types
pub use index::TaxonIndex;
pub use models::{Lineage, LineageEntry, LineageRecord, TaxonRecord};
pub use parser::TaxdumpParser;
pub use resolver::{resolve_all, ParallelResolver};
