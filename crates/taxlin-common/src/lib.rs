//! taxlin common library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, error handling and logging setup for the taxlin workspace.
//!
//! - **Error Handling**: [`TaxlinError`] and the [`Result`] alias
//! - **Logging**: `tracing` subscriber configuration
//! - **Types**: taxon identifiers shared by every crate
//!
//! # Example
//!
//! ```no_run
//! use taxlin_common::{Result, TaxlinError};
//!
//! fn check_workers(workers: usize) -> Result<()> {
//!     if workers == 0 {
//!         return Err(TaxlinError::config("worker count must be at least 1"));
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{Result, TaxlinError};
pub use types::{TaxId, ROOT_TAX_ID};
