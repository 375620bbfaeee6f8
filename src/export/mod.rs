//! Exporters for assembled entries.

pub mod dictpress;
pub mod jsonl;
pub mod sfm;

use crate::error::Result;
use crate::model::Entry;
use crate::schema::Profile;
use clap::ValueEnum;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// dictpress import CSV
    Csv,
    /// Standard Format Markup for Toolbox/FLEx
    Sfm,
    /// One JSON record per line
    Jsonl,
}

impl Format {
    /// Guesses the format from an output file name; anything unknown is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("sfm") => Format::Sfm,
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") => Format::Jsonl,
            _ => Format::Csv,
        }
    }
}

/// Counts reported after an export.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportStats {
    pub entries: usize,
    /// CSV sub-rows, SFM sense blocks, or zero for JSONL.
    pub rows: usize,
}

pub fn write_entries<W: Write>(
    format: Format,
    profile: &Profile,
    entries: &[Entry],
    writer: W,
) -> Result<ExportStats> {
    match format {
        Format::Csv => dictpress::write_csv(profile, entries, writer),
        Format::Sfm => sfm::write_sfm(entries, writer),
        Format::Jsonl => jsonl::write_jsonl(entries, writer),
    }
}

/// Creates (or truncates) `path` and writes all entries to it.
pub fn export_to_path(
    format: Format,
    profile: &Profile,
    entries: &[Entry],
    path: &Path,
) -> Result<ExportStats> {
    let file = File::create(path)?;
    let mut writer = BufWriter::with_capacity(256 * 1024, file);
    let stats = write_entries(format, profile, entries, &mut writer)?;
    writer.flush()?;
    Ok(stats)
}
