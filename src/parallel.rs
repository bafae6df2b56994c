//! Parallel batch processing of trace files
//!
//! Parsing one file shares nothing with parsing another, so a batch of files can
//! be split across threads. Each thread receives a contiguous chunk of the input
//! paths and its own clone of the processor.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::{ReadError, Result};
use crate::output::ParsedAb1;
use crate::reader::MmapReader;

/// Trait for types that can process parsed trace files in parallel.
pub trait ParallelProcessor: Send + Clone {
    /// Process a single parsed file
    fn process_trace(&mut self, path: &Path, parsed: ParsedAb1) -> Result<()>;

    /// Called when a thread finishes processing its batch
    /// Default implementation does nothing
    fn on_batch_complete(&mut self) -> Result<()> {
        Ok(())
    }

    /// Set the thread ID for this processor
    ///
    /// Each thread should call this method with its own unique ID.
    fn set_tid(&mut self, _tid: usize) {
        // Default implementation does nothing
    }

    /// Get the thread ID for this processor
    fn get_tid(&self) -> Option<usize> {
        None
    }
}

/// Resolves the requested thread count: 0 means all cores, and the count never
/// exceeds the number of cores or the number of inputs
fn resolve_threads(num_threads: usize, num_inputs: usize) -> usize {
    let cores = num_cpus::get();
    let num_threads = if num_threads == 0 {
        cores
    } else {
        num_threads.min(cores)
    };
    num_threads.min(num_inputs).max(1)
}

/// Parses every file in `paths` and hands the result to `processor`
///
/// Files are memory-mapped and parsed independently. The first error from any
/// thread is returned once all threads have finished.
pub fn process_parallel<P: ParallelProcessor + 'static>(
    paths: Vec<PathBuf>,
    processor: P,
    num_threads: usize,
) -> Result<()> {
    if paths.is_empty() {
        return Ok(());
    }
    let num_threads = resolve_threads(num_threads, paths.len());
    let paths_per_thread = paths.len().div_ceil(num_threads);
    let paths = Arc::new(paths);

    // Build thread handles
    let mut handles = Vec::with_capacity(num_threads);
    for tid in 0..num_threads {
        let mut processor = processor.clone();
        let paths = paths.clone();
        processor.set_tid(tid);

        let handle = std::thread::spawn(move || -> Result<()> {
            let start_idx = tid * paths_per_thread;
            let end_idx = (start_idx + paths_per_thread).min(paths.len());
            if start_idx >= end_idx {
                return Ok(()); // No files for this thread
            }

            for path in &paths[start_idx..end_idx] {
                let parsed = MmapReader::new(path)?.parse()?;
                debug!(tid, path = %path.display(), bases = parsed.summary.base_count, "processed trace");
                processor.process_trace(path, parsed)?;
            }
            processor.on_batch_complete()
        });

        handles.push(handle);
    }

    let mut outcome = Ok(());
    for (tid, handle) in handles.into_iter().enumerate() {
        let result = handle
            .join()
            .unwrap_or_else(|_| Err(ReadError::WorkerPanicked(tid).into()));
        if outcome.is_ok() {
            outcome = result;
        }
    }
    outcome
}
