//! In-memory taxonomy index
//!
//! Built once from the parsed records and then only read. Lineage workers
//! borrow it, so the full taxdump is held in memory exactly once no matter
//! how many workers run.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use taxlin_common::{Result, TaxId, TaxlinError};
use tracing::debug;

use super::models::TaxonRecord;

/// Immutable tax_id -> record mapping
#[derive(Debug, Default)]
pub struct TaxonIndex {
    records: HashMap<TaxId, TaxonRecord>,
}

impl TaxonIndex {
    /// Build the index, rejecting duplicate tax_ids
    pub fn build(records: impl IntoIterator<Item = TaxonRecord>) -> Result<Self> {
        let records = records.into_iter();
        let mut map = HashMap::with_capacity(records.size_hint().0);

        for record in records {
            match map.entry(record.tax_id) {
                Entry::Occupied(_) => {
                    return Err(TaxlinError::DuplicateKey {
                        tax_id: record.tax_id,
                    })
                },
                Entry::Vacant(slot) => {
                    slot.insert(record);
                },
            }
        }

        debug!(records = map.len(), "Built taxonomy index");
        Ok(Self { records: map })
    }

    /// Look up a record; a miss means a dangling parent or unknown start id
    pub fn get(&self, tax_id: TaxId) -> Result<&TaxonRecord> {
        self.records
            .get(&tax_id)
            .ok_or(TaxlinError::NotFound { tax_id })
    }

    pub fn contains(&self, tax_id: TaxId) -> bool {
        self.records.contains_key(&tax_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All tax_ids in ascending order
    pub fn tax_ids(&self) -> Vec<TaxId> {
        let mut ids: Vec<TaxId> = self.records.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
