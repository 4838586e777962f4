//! NCBI taxdump parser
//!
//! Reads the two taxdump tables that lineages are built from:
//! - nodes.dmp: tax_id, parent tax_id and rank of every node
//! - names.dmp: names of every node; only "scientific name" rows are kept
//!
//! # File Format
//! Fields are separated by `|` and padded with tabs, lines end with `\t|`:
//! ```text
//! 2	|	131567	|	superkingdom	|		|	0	|	0	|	11	|	0	|	0	|	0	|	0	|	0	|		|
//! ```
//! Every field is trimmed. Files ending in `.gz` are decompressed on the fly.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use taxlin_common::{Result, TaxId, TaxlinError};
use tracing::{debug, warn};

use super::models::TaxonRecord;

/// name_class of the names.dmp rows used as rank names
pub const SCIENTIFIC_NAME: &str = "scientific name";

/// A parsed nodes.dmp row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRow {
    pub tax_id: TaxId,
    pub parent_tax_id: TaxId,
    pub rank: String,
}

/// A parsed names.dmp row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRow {
    pub tax_id: TaxId,
    pub name_txt: String,
    pub unique_name: String,
    pub name_class: String,
}

/// Parser for nodes.dmp and names.dmp
#[derive(Debug, Default)]
pub struct TaxdumpParser;

impl TaxdumpParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse both files and join them into taxon records
    pub fn parse_files(&self, nodes_file: &Path, names_file: &Path) -> Result<Vec<TaxonRecord>> {
        let nodes = self.parse_nodes(open_reader(nodes_file)?, nodes_file)?;
        debug!(path = %nodes_file.display(), nodes = nodes.len(), "Parsed nodes");

        let names = self.parse_names(open_reader(names_file)?, names_file)?;
        debug!(path = %names_file.display(), names = names.len(), "Parsed scientific names");

        Ok(join_nodes_and_names(nodes, names))
    }

    /// Parse nodes.dmp content; `source` is only used in error messages
    pub fn parse_nodes<R: BufRead>(&self, reader: R, source: &Path) -> Result<Vec<NodeRow>> {
        let mut nodes = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            nodes.push(self.parse_nodes_line(&line, idx + 1, source)?);
        }

        Ok(nodes)
    }

    /// Parse a single line from nodes.dmp
    pub fn parse_nodes_line(&self, line: &str, line_num: usize, source: &Path) -> Result<NodeRow> {
        let fields = split_fields(line);
        if fields.len() < 3 {
            return Err(TaxlinError::parse(
                source,
                line_num,
                format!("expected at least 3 fields, got {}", fields.len()),
            ));
        }

        Ok(NodeRow {
            tax_id: parse_tax_id(fields[0], "tax_id", line_num, source)?,
            parent_tax_id: parse_tax_id(fields[1], "parent_tax_id", line_num, source)?,
            rank: fields[2].to_string(),
        })
    }

    /// Parse names.dmp content, keeping scientific names only
    pub fn parse_names<R: BufRead>(&self, reader: R, source: &Path) -> Result<Vec<NameRow>> {
        let mut names = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let row = self.parse_names_line(&line, idx + 1, source)?;
            if row.name_class == SCIENTIFIC_NAME {
                names.push(row);
            }
        }

        Ok(names)
    }

    /// Parse a single line from names.dmp
    pub fn parse_names_line(&self, line: &str, line_num: usize, source: &Path) -> Result<NameRow> {
        let fields = split_fields(line);
        if fields.len() < 4 {
            return Err(TaxlinError::parse(
                source,
                line_num,
                format!("expected at least 4 fields, got {}", fields.len()),
            ));
        }

        Ok(NameRow {
            tax_id: parse_tax_id(fields[0], "tax_id", line_num, source)?,
            name_txt: fields[1].to_string(),
            unique_name: fields[2].to_string(),
            name_class: fields[3].to_string(),
        })
    }
}

/// Inner join of nodes and scientific names on tax_id, in nodes order
///
/// A node with two scientific names yields two records, which the index
/// then rejects as a duplicate tax_id.
pub fn join_nodes_and_names(nodes: Vec<NodeRow>, names: Vec<NameRow>) -> Vec<TaxonRecord> {
    let mut names_by_id: HashMap<TaxId, Vec<String>> = HashMap::with_capacity(names.len());
    for name in names {
        names_by_id.entry(name.tax_id).or_default().push(name.name_txt);
    }

    let mut records = Vec::with_capacity(nodes.len());
    let mut unnamed = 0usize;
    for node in nodes {
        match names_by_id.get(&node.tax_id) {
            Some(names) => {
                for name in names {
                    records.push(TaxonRecord::new(
                        node.tax_id,
                        node.parent_tax_id,
                        node.rank.clone(),
                        name.clone(),
                    ));
                }
            },
            None => unnamed += 1,
        }
    }

    if unnamed > 0 {
        warn!(unnamed, "Dropped nodes without a scientific name");
    }

    records
}

/// Open a taxdump file, decompressing `.gz` files
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("Failed to open {}: {}", path.display(), e))
    })?;

    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    // only the row terminator; empty trailing fields are still fields
    let line = line.trim_end();
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(str::trim).collect()
}

/// Ids are positive integers
fn parse_tax_id(field: &str, name: &str, line_num: usize, source: &Path) -> Result<TaxId> {
    match field.parse::<TaxId>() {
        Ok(tax_id) if tax_id > 0 => Ok(tax_id),
        _ => Err(TaxlinError::parse(
            PathBuf::from(source),
            line_num,
            format!("invalid {}: {:?}", name, field),
        )),
    }
}
