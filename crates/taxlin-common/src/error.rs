//! Error types for taxlin
//!
//! Every data error names the offending tax_id so a failed run can be traced
//! back to the input row that caused it.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::TaxId;

/// Result type alias for taxlin operations
pub type Result<T> = std::result::Result<T, TaxlinError>;

/// Main error type for taxlin
#[derive(Error, Debug)]
pub enum TaxlinError {
    /// Two input records share a tax_id
    #[error("Duplicate tax_id {tax_id}: taxonomy records must be unique")]
    DuplicateKey { tax_id: TaxId },

    /// A tax_id (starting id or parent pointer) has no record
    #[error("tax_id {tax_id} not found in taxonomy index")]
    NotFound { tax_id: TaxId },

    /// An ancestor walk did not reach the root within the depth bound
    #[error("Cycle detected while walking lineage of tax_id {tax_id}: root not reached after {depth} steps")]
    CycleDetected { tax_id: TaxId, depth: usize },

    /// A lineage with no entries cannot be formatted
    #[error("Cannot format an empty lineage")]
    EmptyLineage,

    /// A resolution worker failed; wraps the original error
    #[error("Lineage worker {worker} failed")]
    WorkerFailure {
        worker: usize,
        #[source]
        source: Box<TaxlinError>,
    },

    /// A resolution worker panicked
    #[error("Lineage worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    /// Gathered results do not match the number of requested tax_ids
    #[error("Resolved {actual} lineages for {expected} tax_ids, the two numbers should be equal")]
    ResultCountMismatch { expected: usize, actual: usize },

    #[error("Parse error in {path} at line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TaxlinError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a parse error for a line of an input file
    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// The error a worker originally hit, looking through `WorkerFailure`
    pub fn root_cause(&self) -> &TaxlinError {
        match self {
            Self::WorkerFailure { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The tax_id this error is about, if any
    pub fn tax_id(&self) -> Option<TaxId> {
        match self.root_cause() {
            Self::DuplicateKey { tax_id }
            | Self::NotFound { tax_id }
            | Self::CycleDetected { tax_id, .. } => Some(*tax_id),
            _ => None,
        }
    }
}
