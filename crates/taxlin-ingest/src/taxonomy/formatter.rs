//! Collapse a lineage into one flat output record

use indexmap::IndexMap;
use taxlin_common::{Result, TaxlinError};

use super::models::{LineageEntry, LineageRecord};

/// Column holding the taxon's own id; never usable as a rank key
pub const TAX_ID_KEY: &str = "tax_id";

/// Key under which `rank` is stored given the keys already taken
///
/// Defaults to the rank itself. When a rank repeats within one lineage
/// (common for "no rank") later occurrences are numbered: "no rank1",
/// "no rank2", and so on, using the smallest free suffix.
pub fn calc_rank_key<'a, I>(rank: &str, existing_keys: I) -> String
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let taken = |key: &str| existing_keys.clone().into_iter().any(|k| k == key);

    if !taken(rank) {
        return rank.to_string();
    }

    let mut count = 1usize;
    loop {
        let numbered = format!("{}{}", rank, count);
        if !taken(&numbered) {
            return numbered;
        }
        count += 1;
    }
}

/// Convert a root-first lineage into a [`LineageRecord`]
///
/// ```text
/// [(1, "no rank", "root"), (131567, "no rank", "cellular organisms"), (2, "superkingdom", "Bacteria")]
/// ```
/// becomes
/// ```text
/// {"no rank": "root", "no rank1": "cellular organisms", "superkingdom": "Bacteria", tax_id: 2}
/// ```
///
/// The last entry supplies the record's tax_id.
pub fn format(lineage: &[LineageEntry]) -> Result<LineageRecord> {
    let last = lineage.last().ok_or(TaxlinError::EmptyLineage)?;

    let mut ranks: IndexMap<String, String> = IndexMap::with_capacity(lineage.len());
    for entry in lineage {
        let taken = ranks
            .keys()
            .map(String::as_str)
            .chain(std::iter::once(TAX_ID_KEY));
        let rank_key = calc_rank_key(&entry.rank, taken);
        ranks.insert(rank_key, entry.rank_name.clone());
    }

    Ok(LineageRecord {
        tax_id: last.tax_id,
        ranks,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_rank_key() {
        let cases: &[(&str, &[&str], &str)] = &[
            ("no rank", &[], "no rank"),
            ("no rank", &["some other rank"], "no rank"),
            ("no rank", &["no rank"], "no rank1"),
            ("rankx", &["rankx"], "rankx1"),
            ("rankx", &["rankx", "rankx1"], "rankx2"),
            ("rankx", &["rankx", "rankx2"], "rankx1"),
        ];

        for (rank, existing, expected) in cases {
            assert_eq!(
                calc_rank_key(rank, existing.iter().copied()),
                *expected,
                "rank {:?} with existing {:?}",
                rank,
                existing
            );
        }
    }

    #[test]
    fn test_format_numbers_duplicate_ranks_root_first() {
        let lineage = vec![
            LineageEntry::new(1, "no rank", "root"),
            LineageEntry::new(131567, "no rank", "cellular organisms"),
            LineageEntry::new(2, "superkingdom", "Bacteria"),
        ];

        let record = format(&lineage).unwrap();

        assert_eq!(record.tax_id, 2);
        assert_eq!(
            record.ranks.into_iter().collect::<Vec<_>>(),
            vec![
                ("no rank".to_string(), "root".to_string()),
                ("no rank1".to_string(), "cellular organisms".to_string()),
                ("superkingdom".to_string(), "Bacteria".to_string()),
            ]
        );
    }

    #[test]
    fn test_format_is_deterministic() {
        let lineage = vec![
            LineageEntry::new(1, "no rank", "root"),
            LineageEntry::new(10239, "superkingdom", "Viruses"),
            LineageEntry::new(12333, "no rank", "unclassified bacterial viruses"),
            LineageEntry::new(12340, "no rank", "Enterobacteria phage 933J"),
        ];

        assert_eq!(format(&lineage).unwrap(), format(&lineage).unwrap());
        assert_eq!(format(&lineage).unwrap().get("no rank2"), Some("Enterobacteria phage 933J"));
    }

    #[test]
    fn test_format_single_entry() {
        let record = format(&[LineageEntry::new(1, "no rank", "root")]).unwrap();
        assert_eq!(record.tax_id, 1);
        assert_eq!(record.get("no rank"), Some("root"));
        assert_eq!(record.ranks.len(), 1);
    }

    #[test]
    fn test_format_empty_lineage_rejected() {
        assert!(matches!(format(&[]).unwrap_err(), TaxlinError::EmptyLineage));
    }

    #[test]
    fn test_format_rank_named_tax_id_does_not_clobber_id() {
        let lineage = vec![
            LineageEntry::new(1, "no rank", "root"),
            LineageEntry::new(5, "tax_id", "odd"),
        ];

        let record = format(&lineage).unwrap();
        assert_eq!(record.tax_id, 5);
        assert_eq!(record.get("tax_id"), None);
        assert_eq!(record.get("tax_id1"), Some("odd"));
    }
}
