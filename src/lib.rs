//! Converts legacy Malayalam dictionaries into dictpress import records.
//!
//! Three source dialects share one parser core: plain text with one entry
//! per line, TEI page transcriptions, and XDXF lexicons. Each unit goes
//! through the same stages:
//!
//! normalize -> split into units -> read the head -> segment senses ->
//! classify sense content -> assemble an [`Entry`].
//!
//! A unit that fails any stage is counted and skipped; only unreadable
//! sources and schema problems are errors.

pub mod assemble;
pub mod classify;
pub mod dialect;
pub mod error;
pub mod export;
pub mod model;
pub mod normalize;
pub mod parallel;
pub mod pipeline;
pub mod schema;
pub mod script;
pub mod senses;
pub mod source;

pub use dialect::Dialect;
pub use error::{Rejection, Result, ScanError};
pub use export::{export_to_path, write_entries, ExportStats, Format};
pub use model::{
    CrossRef, Entry, Example, ExampleKind, Location, Marker, Provenance, Relation, Sense,
};
pub use parallel::ParallelConfig;
pub use pipeline::{scan_paths, scan_source, Report, ScanOptions, Skipped, Strategy};
pub use schema::{CitationMatch, Profile, Schema};
