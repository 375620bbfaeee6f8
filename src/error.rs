//! Error types for dictpress-scanner.
//!
//! Two families live here. [`ScanError`] is fatal to a source file (or to the
//! whole run when it happens while loading the schema). [`Rejection`] is the
//! per-unit outcome the pipeline recovers from locally: the unit is skipped,
//! counted, and the batch carries on.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop processing of a source file or of the run.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The source file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source bytes are not valid UTF-8.
    #[error("{path} is not valid UTF-8 (first bad byte at offset {offset})")]
    Undecodable { path: PathBuf, offset: usize },

    /// The markup cannot be parsed into a node tree at all.
    #[error("malformed markup in {origin}: {message}")]
    MalformedMarkup { origin: String, message: String },

    /// The dictionary schema could not be loaded or is inconsistent.
    #[error("schema error: {0}")]
    Schema(String),

    /// Writing an export failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// The CSV writer reported an error.
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Serializing a record to JSON failed.
    #[error("failed to serialize record: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScanError {
    /// True for failures that concern one source file only, as opposed to
    /// the schema or the output sink.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            ScanError::SourceRead { .. }
                | ScanError::Undecodable { .. }
                | ScanError::MalformedMarkup { .. }
        )
    }
}

/// A convenience `Result` alias using [`ScanError`].
pub type Result<T> = std::result::Result<T, ScanError>;

/// Why a candidate unit did not become an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The unit matches none of the dialect's head syntaxes.
    #[error("not an entry")]
    NotAnEntry,

    /// The head was recognized but nothing attachable was found.
    #[error("entry has no attachable content")]
    EmptyEntry,
}
