//! Lineage table writer
//!
//! Writes lineage records as a gzip-compressed CSV. The table is first
//! written to a temporary file next to the destination and only renamed into
//! place once it is complete, so a failed run never leaves a truncated table
//! under the output name.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use taxlin_common::{Result, TaxlinError};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::taxonomy::formatter::TAX_ID_KEY;
use crate::taxonomy::LineageRecord;

/// Leading columns, always present and always in this order
pub const LEADING_COLUMNS: [&str; 8] = [
    TAX_ID_KEY,
    "superkingdom",
    "phylum",
    "class",
    "order",
    "family",
    "genus",
    "species",
];

/// Output column order: the leading columns, then every other rank key seen
/// in `records`, sorted lexicographically
pub fn output_columns(records: &[LineageRecord]) -> Vec<String> {
    let other: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.rank_keys())
        .filter(|key| !LEADING_COLUMNS.contains(key))
        .collect();

    LEADING_COLUMNS
        .iter()
        .copied()
        .chain(other)
        .map(str::to_string)
        .collect()
}

/// Write `records` as CSV rows to `writer`, in the given order
///
/// Ranks a taxon has no ancestor at are written as empty cells.
pub fn write_csv<W: Write>(records: &[LineageRecord], writer: W) -> Result<W> {
    let columns = output_columns(records);
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(&columns).map_err(csv_error)?;
    for record in records {
        let tax_id = record.tax_id.to_string();
        let row = columns.iter().map(|column| {
            if column == TAX_ID_KEY {
                tax_id.as_str()
            } else {
                record.get(column).unwrap_or("")
            }
        });
        csv.write_record(row).map_err(csv_error)?;
    }

    csv.into_inner()
        .map_err(|e| TaxlinError::Csv(e.error().to_string()))
}

/// Write the gzip-compressed lineage table to `output_path`
///
/// Any existing file at `output_path` is replaced; call
/// [`crate::backup::maybe_backup_file`] first to keep it.
pub fn write_lineages(records: &[LineageRecord], output_path: &Path) -> Result<()> {
    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(dir)?;
    debug!(tmp = %tmp.path().display(), "Writing lineages to temporary file");

    let file: &File = tmp.as_file();
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let encoder = write_csv(records, encoder)?;
    let mut buffered = encoder.finish()?;
    buffered.flush()?;
    drop(buffered);
    tmp.as_file().sync_all()?;

    tmp.persist(output_path).map_err(|e| TaxlinError::Io(e.error))?;
    info!(path = %output_path.display(), rows = records.len(), "Wrote lineage table");
    Ok(())
}

fn csv_error(e: csv::Error) -> TaxlinError {
    TaxlinError::Csv(e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use indexmap::IndexMap;
    use std::io::Read;

    fn record(tax_id: u32, ranks: &[(&str, &str)]) -> LineageRecord {
        LineageRecord {
            tax_id,
            ranks: ranks
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<IndexMap<_, _>>(),
        }
    }

    fn sample_records() -> Vec<LineageRecord> {
        vec![
            record(1, &[("no rank", "root")]),
            record(
                2,
                &[
                    ("no rank", "root"),
                    ("no rank1", "cellular organisms"),
                    ("superkingdom", "Bacteria"),
                ],
            ),
            record(10239, &[("no rank", "root"), ("superkingdom", "Viruses"), ("clade", "Riboviria")]),
        ]
    }

    #[test]
    fn test_output_columns_order() {
        let columns = output_columns(&sample_records());
        assert_eq!(
            columns,
            vec![
                "tax_id",
                "superkingdom",
                "phylum",
                "class",
                "order",
                "family",
                "genus",
                "species",
                "clade",
                "no rank",
                "no rank1",
            ]
        );
    }

    #[test]
    fn test_output_columns_without_records() {
        assert_eq!(output_columns(&[]), LEADING_COLUMNS.to_vec());
    }

    #[test]
    fn test_write_csv_fills_missing_with_empty() {
        let out = write_csv(&sample_records(), Vec::new()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "tax_id,superkingdom,phylum,class,order,family,genus,species,clade,no rank,no rank1"
        );
        assert_eq!(lines[1], "1,,,,,,,,,root,");
        assert_eq!(lines[2], "2,Bacteria,,,,,,,,root,cellular organisms");
        assert_eq!(lines[3], "10239,Viruses,,,,,,,Riboviria,root,");
    }

    #[test]
    fn test_write_lineages_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineages.csv.gz");

        write_lineages(&sample_records(), &path).unwrap();

        let mut text = String::new();
        GzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with("tax_id,superkingdom"));

        // no temporary files left behind
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
