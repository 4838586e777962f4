//! Ancestor walk from a taxon up to the root

use taxlin_common::{Result, TaxId, TaxlinError, ROOT_TAX_ID};

use super::index::TaxonIndex;
use super::models::{Lineage, LineageEntry};

/// Upper bound on lineage length regardless of index size
pub const MAX_LINEAGE_DEPTH: usize = 1_000_000;

/// Walk parent pointers from `tax_id` to the root
///
/// The root itself is included. The result is reversed so that index 0 is
/// the root and the last entry is `tax_id`'s own record.
///
/// A walk can visit at most `index.len()` distinct records, so collecting
/// more entries than that means the parent chain loops without reaching the
/// root.
pub fn walk(tax_id: TaxId, index: &TaxonIndex) -> Result<Lineage> {
    let max_depth = index.len().min(MAX_LINEAGE_DEPTH);
    let mut lineage = Vec::new();
    let mut current = tax_id;

    loop {
        if lineage.len() > max_depth {
            return Err(TaxlinError::CycleDetected {
                tax_id,
                depth: lineage.len(),
            });
        }

        let record = index.get(current)?;
        lineage.push(LineageEntry::from(record));

        // every taxon traces back to tax_id == 1
        if record.tax_id == ROOT_TAX_ID {
            break;
        }
        current = record.parent_tax_id;
    }

    lineage.reverse();
    Ok(lineage)
}
