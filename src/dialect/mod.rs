//! Source dialects: how units are found in a file and how a head is read.
//!
//! All three dialects share the sense segmenter, classifier and assembler;
//! only the boundary splitter and the head syntax differ.

pub mod plain;
pub mod tei;
pub mod xdxf;

use crate::assemble::{assemble, senses_from_body};
use crate::error::{Rejection, Result};
use crate::model::{Entry, Location};
use crate::schema::Profile;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// One entry per line: `Headword, pos. gloss.`
    Plain,
    /// TEI page transcriptions with one `<p>` per entry.
    Tei,
    /// XDXF lexicon with one `<ar>` per entry.
    Xdxf,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Plain => "plain",
            Dialect::Tei => "tei",
            Dialect::Xdxf => "xdxf",
        }
    }
}

#[derive(Debug, Clone)]
pub enum UnitBody {
    /// Normalized text of a line or paragraph.
    Text(String),
    /// One parsed `<ar>` element.
    Article(xdxf::Element),
}

/// A candidate entry together with where it was found.
#[derive(Debug, Clone)]
pub struct Unit {
    pub location: Location,
    pub body: UnitBody,
}

impl Unit {
    /// Short text for diagnostics.
    pub fn preview(&self) -> String {
        let text = match &self.body {
            UnitBody::Text(text) => text.clone(),
            UnitBody::Article(article) => article.text(),
        };
        let mut preview: String = text.chars().take(70).collect();
        if text.chars().count() > 70 {
            preview.push_str("...");
        }
        preview
    }
}

/// One item of the boundary splitter's output.
#[derive(Debug, Clone)]
pub enum Segment {
    Candidate(Unit),
    /// Blank line or section header; not a skipped entry.
    Boundary,
    /// Markup paragraph that does not look like an entry.
    Furniture,
    /// Unit before the configured start of the dictionary body.
    FrontMatter,
}

/// Splits a decoded source into segments, lazily where the dialect allows.
///
/// XDXF sources are parsed into a tree up front, so malformed markup fails
/// the whole source here rather than surfacing unit by unit.
pub fn split<'a>(
    profile: &'a Profile,
    source: &'a str,
    origin: &str,
) -> Result<Box<dyn Iterator<Item = Segment> + 'a>> {
    Ok(match profile.dialect {
        Dialect::Plain => Box::new(plain::split(profile, source)),
        Dialect::Tei => Box::new(tei::split(profile, source)),
        Dialect::Xdxf => Box::new(xdxf::split(profile, source, origin)?),
    })
}

/// Turns one candidate unit into an entry.
pub fn parse_unit(profile: &Profile, unit: &Unit) -> std::result::Result<Entry, Rejection> {
    match &unit.body {
        UnitBody::Text(text) => {
            let head = match profile.dialect {
                Dialect::Plain => plain::extract_head(profile, text)?,
                Dialect::Tei => tei::extract_head(text)?,
                Dialect::Xdxf => return Err(Rejection::NotAnEntry),
            };
            let senses = senses_from_body(profile, &head.remainder);
            assemble(profile, head, senses, Vec::new(), unit.location.clone())
        }
        UnitBody::Article(article) => {
            xdxf::parse_article(profile, article, unit.location.clone())
        }
    }
}
