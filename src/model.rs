//! Normalized dictionary records.
//!
//! Records are built once by the assembler and never mutated afterwards;
//! exporters only read them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A grammar or etymology marker as printed, together with its canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub raw: String,
    pub canonical: String,
    /// Whether `raw` was found in the marker table. A raw marker that already
    /// equals its canonical form still reports `true`.
    pub mapped: bool,
}

/// Where a unit came from inside its source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Location {
    /// Scan page number of a TEI transcription.
    Page(String),
    /// 1-based physical line of a plain-text source.
    Line(usize),
    /// 1-based article index of an XDXF lexicon.
    Record(usize),
}

impl Location {
    /// The bare page, line or record number.
    pub fn value(&self) -> String {
        match self {
            Location::Page(page) => page.clone(),
            Location::Line(line) => line.to_string(),
            Location::Record(index) => index.to_string(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Page(page) => write!(f, "p.{}", page),
            Location::Line(line) => write!(f, "l.{}", line),
            Location::Record(index) => write!(f, "#{}", index),
        }
    }
}

/// Immutable source identifier attached at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub source: String,
    pub title: String,
    pub short_name: String,
    pub year: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Synonym,
    Antonym,
    SeeAlso,
    Related,
    Hypernym,
    Hyponym,
}

impl Relation {
    /// Maps an XDXF `kref/@type` code; unknown codes are `Related`.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "syn" => Relation::Synonym,
            "ant" => Relation::Antonym,
            "hpr" => Relation::Hypernym,
            "hpn" => Relation::Hyponym,
            _ => Relation::Related,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossRef {
    pub target_word: String,
    pub relation: Relation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExampleKind {
    Usage,
    Poem,
    Proverb,
    Phrase,
}

impl ExampleKind {
    /// Maps an XDXF `ex/@type` code; unknown codes are plain usage examples.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "poem" => ExampleKind::Poem,
            "prv" => ExampleKind::Proverb,
            "phr" => ExampleKind::Phrase,
            _ => ExampleKind::Usage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub text: String,
    pub kind: ExampleKind,
}

/// One numbered or unnumbered meaning unit of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sense {
    /// 0 for an unnumbered lead-in sense; otherwise the number as printed.
    pub number: u32,
    pub target_text: String,
    pub source_text: String,
    #[serde(skip_serializing_if = "BTreeSet::is_empty", default)]
    pub citations: BTreeSet<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub cross_references: Vec<CrossRef>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub examples: Vec<Example>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub explanations: Vec<String>,
    pub raw_text: String,
}

impl Sense {
    /// A sense with none of these is dropped rather than attached.
    pub fn has_content(&self) -> bool {
        !self.target_text.is_empty()
            || !self.source_text.is_empty()
            || !self.citations.is_empty()
            || !self.cross_references.is_empty()
            || !self.examples.is_empty()
            || !self.explanations.is_empty()
    }
}

/// One headword and everything attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub headword: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub alternate_forms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub romanization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etymology: Option<Marker>,
    pub senses: Vec<Sense>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub cross_references: Vec<CrossRef>,
    pub provenance: Provenance,
}

impl Entry {
    /// Canonical part of speech, if a grammar marker was printed.
    pub fn part_of_speech(&self) -> Option<&str> {
        self.grammar
            .as_ref()
            .map(|m| m.canonical.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Canonical etymology language; empty markers and unmapped ones yield `None`.
    pub fn etymology_language(&self) -> Option<&str> {
        self.etymology
            .as_ref()
            .filter(|m| m.mapped)
            .map(|m| m.canonical.as_str())
    }
}
