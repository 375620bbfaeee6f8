//! Pipeline driver: splits sources, parses units, and keeps the run report.

use crate::dialect::{parse_unit, split, Segment, Unit};
use crate::error::{Rejection, Result, ScanError};
use crate::model::{Entry, Location};
use crate::parallel::{process_batch_parallel, ParallelConfig};
use crate::schema::Profile;
use crate::source::read_source;
use clap::ValueEnum;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How often the progress callback fires, in candidate units.
const PROGRESS_EVERY: usize = 1000;

/// Processing strategy for parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// One unit after another
    #[default]
    Sequential,
    /// Fixed-size batches of units spread over worker threads
    BatchParallel,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub strategy: Strategy,
    pub parallel: ParallelConfig,
    /// Stop after this many entries.
    pub limit: Option<usize>,
    /// How many rejected units to remember per rejection kind.
    pub example_limit: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Sequential,
            parallel: ParallelConfig::default(),
            limit: None,
            example_limit: 10,
        }
    }
}

/// A rejected unit kept for the end-of-run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub location: Location,
    pub preview: String,
}

#[derive(Debug, Default, Clone)]
pub struct Report {
    pub sources_scanned: usize,
    /// Sources skipped because they could not be read or parsed, with the reason.
    pub failed_sources: Vec<(String, String)>,
    pub candidates: usize,
    pub entries: usize,
    pub senses: usize,
    pub boundaries: usize,
    pub furniture: usize,
    pub front_matter: usize,
    pub not_entries: usize,
    pub empty_entries: usize,
    pub not_entry_examples: Vec<Skipped>,
    pub empty_entry_examples: Vec<Skipped>,
    /// Raw grammar markers missing from the table, with occurrence counts.
    pub unmapped_grammar: BTreeMap<String, usize>,
    pub unmapped_etymology: BTreeMap<String, usize>,
    pub elapsed: Duration,
}

impl Report {
    pub fn record_segment(&mut self, segment: &Segment) {
        match segment {
            Segment::Candidate(_) => self.candidates += 1,
            Segment::Boundary => self.boundaries += 1,
            Segment::Furniture => self.furniture += 1,
            Segment::FrontMatter => self.front_matter += 1,
        }
    }

    /// Counts one parsed unit and hands its entry, if any, to `entries`.
    pub fn record_outcome(
        &mut self,
        unit: &Unit,
        outcome: std::result::Result<Entry, Rejection>,
        entries: &mut Vec<Entry>,
        example_limit: usize,
    ) {
        match outcome {
            Ok(entry) => {
                self.entries += 1;
                self.senses += entry.senses.len();
                if let Some(marker) = entry.grammar.as_ref().filter(|m| !m.mapped) {
                    *self.unmapped_grammar.entry(marker.raw.clone()).or_insert(0) += 1;
                }
                if let Some(marker) = entry.etymology.as_ref().filter(|m| !m.mapped) {
                    *self.unmapped_etymology.entry(marker.raw.clone()).or_insert(0) += 1;
                }
                entries.push(entry);
            }
            Err(rejection) => {
                let preview = unit.preview();
                debug!("{} at {}: {}", rejection, unit.location, preview);
                let (count, examples) = match rejection {
                    Rejection::NotAnEntry => (&mut self.not_entries, &mut self.not_entry_examples),
                    Rejection::EmptyEntry => {
                        (&mut self.empty_entries, &mut self.empty_entry_examples)
                    }
                };
                *count += 1;
                if examples.len() < example_limit {
                    examples.push(Skipped {
                        location: unit.location.clone(),
                        preview,
                    });
                }
            }
        }
    }

    /// Folds another source's report into this one.
    pub fn merge(&mut self, other: Report, example_limit: usize) {
        self.sources_scanned += other.sources_scanned;
        self.failed_sources.extend(other.failed_sources);
        self.candidates += other.candidates;
        self.entries += other.entries;
        self.senses += other.senses;
        self.boundaries += other.boundaries;
        self.furniture += other.furniture;
        self.front_matter += other.front_matter;
        self.not_entries += other.not_entries;
        self.empty_entries += other.empty_entries;
        for (mine, theirs) in [
            (&mut self.not_entry_examples, other.not_entry_examples),
            (&mut self.empty_entry_examples, other.empty_entry_examples),
        ] {
            let room = example_limit.saturating_sub(mine.len());
            mine.extend(theirs.into_iter().take(room));
        }
        for (mine, theirs) in [
            (&mut self.unmapped_grammar, other.unmapped_grammar),
            (&mut self.unmapped_etymology, other.unmapped_etymology),
        ] {
            for (marker, count) in theirs {
                *mine.entry(marker).or_insert(0) += count;
            }
        }
        self.elapsed += other.elapsed;
    }

    /// Entries whose grammar marker was not in the table.
    pub fn unmapped_grammar_entries(&self) -> usize {
        self.unmapped_grammar.values().sum()
    }

    pub fn unmapped_etymology_entries(&self) -> usize {
        self.unmapped_etymology.values().sum()
    }
}

/// Runs the whole pipeline over one decoded source.
///
/// `origin` names the source in diagnostics. `progress` is called every
/// thousand candidates with the report so far.
pub fn scan_source(
    profile: &Profile,
    source: &str,
    origin: &str,
    options: &ScanOptions,
    progress: &mut dyn FnMut(&Report),
) -> Result<(Vec<Entry>, Report)> {
    let start_time = Instant::now();
    let segments = split(profile, source, origin)?;

    let (entries, mut report) = match options.strategy {
        Strategy::Sequential => run_sequential(profile, segments, options, progress),
        Strategy::BatchParallel => process_batch_parallel(profile, segments, options, progress),
    };

    report.sources_scanned = 1;
    report.elapsed = start_time.elapsed();
    info!(
        "{}: {} entries from {} candidates ({} not entries, {} empty)",
        origin, report.entries, report.candidates, report.not_entries, report.empty_entries
    );
    Ok((entries, report))
}

fn run_sequential(
    profile: &Profile,
    segments: impl Iterator<Item = Segment>,
    options: &ScanOptions,
    progress: &mut dyn FnMut(&Report),
) -> (Vec<Entry>, Report) {
    let mut report = Report::default();
    let mut entries = Vec::new();

    for segment in segments {
        if options.limit.is_some_and(|limit| entries.len() >= limit) {
            break;
        }
        report.record_segment(&segment);
        if let Segment::Candidate(unit) = segment {
            let outcome = parse_unit(profile, &unit);
            report.record_outcome(&unit, outcome, &mut entries, options.example_limit);

            if report.candidates % PROGRESS_EVERY == 0 {
                progress(&report);
            }
        }
    }

    (entries, report)
}

/// Reads and scans every path in order.
///
/// With several inputs, a file that cannot be read or parsed is logged,
/// listed in the report and skipped. A sole input that fails, or a run in
/// which every input fails, is an error. Schema and output problems are
/// always errors.
pub fn scan_paths(
    profile: &Profile,
    paths: &[PathBuf],
    options: &ScanOptions,
    progress: &mut dyn FnMut(&Report),
) -> Result<(Vec<Entry>, Report)> {
    let mut entries = Vec::new();
    let mut total = Report::default();
    let mut last_failure: Option<ScanError> = None;

    for path in paths {
        let remaining = options.limit.map(|limit| limit.saturating_sub(entries.len()));
        if remaining == Some(0) {
            break;
        }
        let file_options = ScanOptions {
            limit: remaining,
            ..options.clone()
        };

        let origin = path.display().to_string();
        let scanned = match read_source(path) {
            Ok(text) => scan_source(profile, &text, &origin, &file_options, progress),
            Err(err) => Err(err),
        };

        match scanned {
            Ok((mut found, report)) => {
                entries.append(&mut found);
                total.merge(report, options.example_limit);
            }
            Err(err) if err.is_source_failure() && paths.len() > 1 => {
                warn!("skipping {}: {}", origin, err);
                total.failed_sources.push((origin, err.to_string()));
                last_failure = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    if total.sources_scanned == 0 {
        if let Some(err) = last_failure {
            return Err(err);
        }
    }

    Ok((entries, total))
}
