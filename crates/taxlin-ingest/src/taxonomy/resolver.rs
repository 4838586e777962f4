//! Parallel lineage resolution
//!
//! The tax_id list is cut into contiguous chunks, one per worker. Workers are
//! scoped threads that borrow the [`TaxonIndex`], so the index is never copied
//! and cannot outlive the run. Results are gathered by joining the workers in
//! dispatch order, which makes the concatenated output independent of thread
//! scheduling.
//!
//! The first failing or unwinding worker raises a shared cancellation flag;
//! its siblings stop at their next tax_id and the original error is returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use indicatif::ProgressBar;
use taxlin_common::{Result, TaxId, TaxlinError};
use tracing::{debug, info};

use super::formatter;
use super::index::TaxonIndex;
use super::models::LineageRecord;
use super::walker;

/// Upper bound on the default worker count
pub const MAX_DEFAULT_WORKERS: usize = 6;

/// Log a progress line every this many tax_ids
const LOG_EVERY: TaxId = 50_000;

/// Progress bar updates are batched to keep the hot loop cheap
const PROGRESS_BATCH: u64 = 1_000;

/// Number of workers to use when none is configured
pub fn calc_num_workers(max_num: usize) -> usize {
    let cores = thread::available_parallelism().map_or(1, |n| n.get());
    cores.min(max_num).max(1)
}

/// Chunk size that splits `num_vals` into at most `num_chunks` chunks
pub fn calc_chunk_size(num_vals: usize, num_chunks: usize) -> usize {
    num_vals.div_ceil(num_chunks.max(1))
}

/// Split a slice into consecutive chunks of `size` (the last may be shorter)
pub fn partition<T>(vals: &[T], size: usize) -> Vec<&[T]> {
    vals.chunks(size.max(1)).collect()
}

/// Raises the cancellation flag if the owning worker unwinds
///
/// Only meaningful with `panic = "unwind"`; release builds abort on panic.
struct CancelOnPanic<'a>(&'a AtomicBool);

impl Drop for CancelOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::Relaxed);
        }
    }
}

/// Resolves lineages for many tax_ids against one shared index
pub struct ParallelResolver<'a> {
    index: &'a TaxonIndex,
    worker_count: usize,
    progress: ProgressBar,
}

impl<'a> ParallelResolver<'a> {
    /// Resolver with the default worker count and no progress bar
    pub fn new(index: &'a TaxonIndex) -> Self {
        Self {
            index,
            worker_count: calc_num_workers(MAX_DEFAULT_WORKERS),
            progress: ProgressBar::hidden(),
        }
    }

    /// Use exactly `workers` workers; zero is a configuration error
    pub fn with_worker_count(mut self, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(TaxlinError::config("worker count must be at least 1"));
        }
        self.worker_count = workers;
        Ok(self)
    }

    /// Report per-tax_id progress on `progress`
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Walk and format every tax_id
    ///
    /// The output holds exactly one record per input tax_id, grouped by
    /// chunk in dispatch order; callers sort by tax_id before writing.
    pub fn resolve_all(&self, tax_ids: &[TaxId]) -> Result<Vec<LineageRecord>> {
        if tax_ids.is_empty() {
            return Ok(Vec::new());
        }

        let chunk_size = calc_chunk_size(tax_ids.len(), self.worker_count);
        let chunks = partition(tax_ids, chunk_size);
        info!(
            tax_ids = tax_ids.len(),
            workers = chunks.len(),
            chunk_size,
            "Resolving lineages"
        );
        debug!(chunk_sizes = ?chunks.iter().map(|c| c.len()).collect::<Vec<_>>(), "Chunked tax_ids");

        self.progress.set_length(tax_ids.len() as u64);
        let cancelled = AtomicBool::new(false);

        let gathered = thread::scope(|scope| -> Result<Vec<LineageRecord>> {
            let mut handles = Vec::with_capacity(chunks.len());
            for (worker, chunk) in chunks.iter().enumerate() {
                let cancelled = &cancelled;
                let handle = thread::Builder::new()
                    .name(format!("lineage-worker-{}", worker))
                    .spawn_scoped(scope, move || self.resolve_chunk(chunk, cancelled));
                match handle {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        // Already running workers are joined when the scope ends
                        cancelled.store(true, Ordering::Relaxed);
                        return Err(e.into());
                    },
                }
            }

            debug!(workers = handles.len(), "Joining lineage workers");
            let mut all = Vec::with_capacity(tax_ids.len());
            let mut failure: Option<TaxlinError> = None;

            for (worker, handle) in handles.into_iter().enumerate() {
                match handle.join() {
                    Ok(Ok(Some(records))) => all.extend(records),
                    // Cancelled because a sibling failed; that failure is reported
                    Ok(Ok(None)) => {},
                    Ok(Err(source)) if failure.is_none() => {
                        failure = Some(TaxlinError::WorkerFailure {
                            worker,
                            source: Box::new(source),
                        });
                    },
                    Err(_) if failure.is_none() => {
                        failure = Some(TaxlinError::WorkerPanicked { worker });
                    },
                    Ok(Err(_)) | Err(_) => {},
                }
            }

            match failure {
                Some(err) => Err(err),
                None => Ok(all),
            }
        })?;

        if gathered.len() != tax_ids.len() {
            return Err(TaxlinError::ResultCountMismatch {
                expected: tax_ids.len(),
                actual: gathered.len(),
            });
        }

        Ok(gathered)
    }

    /// Resolve one chunk; `Ok(None)` means the chunk was abandoned after
    /// another worker failed
    fn resolve_chunk(
        &self,
        chunk: &[TaxId],
        cancelled: &AtomicBool,
    ) -> Result<Option<Vec<LineageRecord>>> {
        let _guard = CancelOnPanic(cancelled);
        let mut records = Vec::with_capacity(chunk.len());
        let mut pending: u64 = 0;

        for &tax_id in chunk {
            if cancelled.load(Ordering::Relaxed) {
                return Ok(None);
            }
            if tax_id % LOG_EVERY == 0 {
                debug!(tax_id, "Working on tax_id");
            }

            let record =
                walker::walk(tax_id, self.index).and_then(|lineage| formatter::format(&lineage));
            match record {
                Ok(record) => records.push(record),
                Err(e) => {
                    cancelled.store(true, Ordering::Relaxed);
                    return Err(e);
                },
            }

            pending += 1;
            if pending == PROGRESS_BATCH {
                self.progress.inc(pending);
                pending = 0;
            }
        }

        self.progress.inc(pending);
        Ok(Some(records))
    }
}

/// Resolve all `tax_ids`, optionally with an explicit worker count
pub fn resolve_all(
    tax_ids: &[TaxId],
    index: &TaxonIndex,
    worker_count: Option<usize>,
) -> Result<Vec<LineageRecord>> {
    let resolver = ParallelResolver::new(index);
    let resolver = match worker_count {
        Some(workers) => resolver.with_worker_count(workers)?,
        None => resolver,
    };
    resolver.resolve_all(tax_ids)
}
