//! Taxonomy data models

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use taxlin_common::TaxId;

/// One taxon from the joined nodes.dmp / names.dmp tables
///
/// e.g. (phylum, Proteobacteria): `rank` is "phylum" and `rank_name` is
/// "Proteobacteria".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonRecord {
    /// NCBI Taxonomy ID
    pub tax_id: TaxId,
    /// tax_id of the parent taxon; the root points at itself
    pub parent_tax_id: TaxId,
    /// Taxonomic rank ("species", "genus", "no rank", ...)
    pub rank: String,
    /// Scientific name of this taxon
    pub rank_name: String,
}

impl TaxonRecord {
    pub fn new(
        tax_id: TaxId,
        parent_tax_id: TaxId,
        rank: impl Into<String>,
        rank_name: impl Into<String>,
    ) -> Self {
        Self {
            tax_id,
            parent_tax_id,
            rank: rank.into(),
            rank_name: rank_name.into(),
        }
    }
}

/// One step of a lineage: (tax_id, rank, rank_name)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageEntry {
    pub tax_id: TaxId,
    pub rank: String,
    pub rank_name: String,
}

impl LineageEntry {
    pub fn new(tax_id: TaxId, rank: impl Into<String>, rank_name: impl Into<String>) -> Self {
        Self {
            tax_id,
            rank: rank.into(),
            rank_name: rank_name.into(),
        }
    }
}

impl From<&TaxonRecord> for LineageEntry {
    fn from(record: &TaxonRecord) -> Self {
        Self::new(record.tax_id, record.rank.clone(), record.rank_name.clone())
    }
}

/// Ancestor chain of a taxon, root first and the taxon itself last
pub type Lineage = Vec<LineageEntry>;

/// Flat form of a lineage: one output row
///
/// `ranks` keeps insertion order (root-most rank first), which is also the
/// order duplicate rank labels were numbered in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineageRecord {
    pub tax_id: TaxId,
    pub ranks: IndexMap<String, String>,
}

impl LineageRecord {
    /// Name recorded under a rank key (e.g. "superkingdom", "no rank1")
    pub fn get(&self, rank_key: &str) -> Option<&str> {
        self.ranks.get(rank_key).map(String::as_str)
    }

    /// Rank keys in the order they were assigned
    pub fn rank_keys(&self) -> impl Iterator<Item = &str> {
        self.ranks.keys().map(String::as_str)
    }
}
