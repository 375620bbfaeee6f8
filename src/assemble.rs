//! Record assembler: head + senses + provenance -> one immutable `Entry`.

use crate::classify::classify;
use crate::error::Rejection;
use crate::model::{CrossRef, Entry, Location, Provenance, Sense};
use crate::schema::Profile;
use crate::senses::segment;

/// What a head extractor recognized at the start of a unit.
///
/// Markers are kept raw here; the assembler canonicalizes them against the
/// profile's tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Head {
    pub headword: String,
    pub alternate_forms: Vec<String>,
    pub romanization: Option<String>,
    pub grammar_marker: Option<String>,
    pub etymology_marker: Option<String>,
    /// Text after the head, to be segmented into senses.
    pub remainder: String,
}

/// Segments a body and classifies every sense, dropping the empty ones.
pub fn senses_from_body(profile: &Profile, body: &str) -> Vec<Sense> {
    segment(body)
        .iter()
        .filter_map(|sense| classify(profile, sense))
        .collect()
}

pub fn provenance(profile: &Profile, location: Location) -> Provenance {
    Provenance {
        source: profile.slug.clone(),
        title: profile.title.clone(),
        short_name: profile.short_name.clone(),
        year: profile.year,
        author: profile.author.clone(),
        location,
    }
}

/// Builds the entry, or rejects it as `EmptyEntry` when the headword is
/// empty or nothing at all is attached to it.
pub fn assemble(
    profile: &Profile,
    head: Head,
    senses: Vec<Sense>,
    cross_references: Vec<CrossRef>,
    location: Location,
) -> Result<Entry, Rejection> {
    let headword = head.headword.trim();
    if headword.is_empty() {
        return Err(Rejection::EmptyEntry);
    }
    if senses.is_empty() && cross_references.is_empty() {
        return Err(Rejection::EmptyEntry);
    }

    let grammar = head
        .grammar_marker
        .as_deref()
        .and_then(|raw| profile.grammar.resolve(raw));
    let etymology = head
        .etymology_marker
        .as_deref()
        .and_then(|raw| profile.etymology.resolve(raw));

    Ok(Entry {
        headword: headword.to_string(),
        alternate_forms: head.alternate_forms,
        romanization: head.romanization.filter(|r| !r.is_empty()),
        grammar,
        etymology,
        senses,
        cross_references,
        provenance: provenance(profile, location),
    })
}
