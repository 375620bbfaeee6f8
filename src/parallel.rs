//! Batch-parallel processing of candidate units.
//!
//! Segments are read in order; candidates are collected into fixed-size
//! batches and each batch is split into one chunk per thread. Results are
//! merged back in input order, so the entries and the report match the
//! sequential strategy.

use crate::dialect::{parse_unit, Segment, Unit};
use crate::error::Rejection;
use crate::model::Entry;
use crate::pipeline::{Report, ScanOptions};
use crate::schema::Profile;
use std::thread;

/// Configuration for parallel processing
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of threads to use
    pub num_threads: usize,
    /// Candidate units per batch
    pub batch_size: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        let cpus = thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(4);
        Self {
            num_threads: cpus,
            batch_size: 1000,
        }
    }
}

/// Batch-parallel strategy. Stops recording once `options.limit` entries
/// have been produced.
pub fn process_batch_parallel(
    profile: &Profile,
    segments: impl Iterator<Item = Segment>,
    options: &ScanOptions,
    progress: &mut dyn FnMut(&Report),
) -> (Vec<Entry>, Report) {
    let config = &options.parallel;
    let batch_size = config.batch_size.max(1);

    let mut report = Report::default();
    let mut entries = Vec::new();
    let mut batch: Vec<Unit> = Vec::with_capacity(batch_size);

    for segment in segments {
        report.record_segment(&segment);
        if let Segment::Candidate(unit) = segment {
            batch.push(unit);
            if batch.len() >= batch_size {
                let done = flush_batch(profile, &mut batch, options, &mut report, &mut entries);
                progress(&report);
                if done {
                    return (entries, report);
                }
            }
        }
    }

    // Process remaining batch
    if !batch.is_empty() {
        flush_batch(profile, &mut batch, options, &mut report, &mut entries);
    }

    (entries, report)
}

/// Parses and records one batch, emptying it. Returns true once the entry
/// limit is reached.
fn flush_batch(
    profile: &Profile,
    batch: &mut Vec<Unit>,
    options: &ScanOptions,
    report: &mut Report,
    entries: &mut Vec<Entry>,
) -> bool {
    let results = process_batch_threaded(profile, batch, options.parallel.num_threads);

    for (unit, outcome) in batch.drain(..).zip(results) {
        if options.limit.is_some_and(|limit| entries.len() >= limit) {
            return true;
        }
        report.record_outcome(&unit, outcome, entries, options.example_limit);
    }

    options.limit.is_some_and(|limit| entries.len() >= limit)
}

/// Parses a batch of units on scoped threads, preserving order.
fn process_batch_threaded(
    profile: &Profile,
    batch: &[Unit],
    num_threads: usize,
) -> Vec<Result<Entry, Rejection>> {
    if batch.is_empty() {
        return vec![];
    }

    let num_threads = num_threads.min(batch.len()).max(1);
    let chunk_size = (batch.len() + num_threads - 1) / num_threads;

    thread::scope(|scope| {
        let handles: Vec<_> = batch
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|unit| parse_unit(profile, unit))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut results = Vec::with_capacity(batch.len());
        for handle in handles {
            match handle.join() {
                Ok(chunk_results) => results.extend(chunk_results),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        results
    })
}
