//! Common types used across taxlin

/// NCBI taxonomy identifier (e.g. 9606 for Homo sapiens)
pub type TaxId = u32;

/// tax_id of the first line in names.dmp, the `root` node.
///
/// It is its own parent and terminates every ancestor walk.
pub const ROOT_TAX_ID: TaxId = 1;
