//! Sense content classifier.
//!
//! Sorts the sentence-like fragments of one sense body into gloss-script
//! text and headword-script text, and picks out citations and
//! cross-references. The language split is a character-class heuristic,
//! not language detection.
//!
//! Plain-text dictionaries print one gloss per line with ordinary sentence
//! punctuation inside it, so their sense bodies are routed whole instead of
//! fragment by fragment.

use crate::dialect::Dialect;
use crate::model::{CrossRef, Relation, Sense};
use crate::schema::{CitationMatch, Profile};
use crate::senses::SenseText;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

/// Gloss fragments must be longer than this many characters to be kept.
const MIN_FRAGMENT_CHARS: usize = 2;

lazy_static! {
    static ref SENTENCE_END: Regex = Regex::new(r"[.!?]+(?:\s+|$)").unwrap();

    // Cross-reference patterns; the target is a Malayalam or ASCII word
    static ref EQUALS_REF: Regex = Regex::new(r"\(=\s*([\x{0D00}-\x{0D7F}a-zA-Z]+)\)").unwrap();
    static ref SEE_REF: Regex = Regex::new(r"(?i)\bsee\s+([\x{0D00}-\x{0D7F}a-zA-Z]+)").unwrap();
    static ref OPP_REF: Regex = Regex::new(r"opp\.\s+([\x{0D00}-\x{0D7F}a-zA-Z]+)").unwrap();
}

/// Classifies one segmented sense. Returns `None` when nothing attachable
/// was found, in which case the sense is dropped.
pub fn classify(profile: &Profile, sense: &SenseText) -> Option<Sense> {
    let (target_text, source_text) = match profile.dialect {
        Dialect::Plain => route_whole(profile, sense.text),
        Dialect::Tei | Dialect::Xdxf => route_fragments(profile, sense.text),
    };

    let classified = Sense {
        number: sense.number,
        target_text,
        source_text,
        citations: extract_citations(sense.text, &profile.citations, profile.citation_match),
        cross_references: extract_cross_refs(sense.text),
        examples: Vec::new(),
        explanations: Vec::new(),
        raw_text: sense.text.to_string(),
    };

    classified.has_content().then_some(classified)
}

/// Returns `(target_text, source_text)` built fragment by fragment.
fn route_fragments(profile: &Profile, text: &str) -> (String, String) {
    let mut source_parts = Vec::new();
    let mut target_parts = Vec::new();

    for fragment in fragments(text) {
        if !profile.is_monolingual() && profile.headword_script.occurs_in(fragment) {
            source_parts.push(fragment);
        } else if fragment.chars().count() > MIN_FRAGMENT_CHARS {
            target_parts.push(fragment);
        }
    }

    (target_parts.join(" "), source_parts.join(" "))
}

/// Returns `(target_text, source_text)` for a body kept in one piece. Any
/// gloss-script character makes the whole body a gloss; inner punctuation
/// and embedded headword-script words stay as printed.
fn route_whole(profile: &Profile, text: &str) -> (String, String) {
    let text = text.trim();
    let text = text.strip_suffix('.').unwrap_or(text).trim_end();

    if !text.chars().any(char::is_alphanumeric) {
        (String::new(), String::new())
    } else if profile.gloss_script.occurs_in(text) {
        (text.to_string(), String::new())
    } else if !profile.is_monolingual() && profile.headword_script.occurs_in(text) {
        (String::new(), text.to_string())
    } else if text.chars().count() > MIN_FRAGMENT_CHARS {
        (text.to_string(), String::new())
    } else {
        (String::new(), String::new())
    }
}

/// Splits text on runs of `.`, `!` or `?` followed by whitespace or the end
/// of text. The punctuation is dropped, and fragments without a letter or
/// digit are skipped.
pub fn fragments(text: &str) -> Vec<&str> {
    SENTENCE_END
        .split(text)
        .map(str::trim)
        .filter(|f| f.chars().any(char::is_alphanumeric))
        .collect()
}

/// Finds the citation markers that occur in `text`, stored without periods.
pub fn extract_citations(text: &str, markers: &[String], mode: CitationMatch) -> BTreeSet<String> {
    markers
        .iter()
        .filter(|marker| match mode {
            CitationMatch::Substring => text.contains(marker.as_str()),
            CitationMatch::WordBoundary => occurs_as_word(text, marker),
        })
        .map(|marker| marker.replace('.', ""))
        .collect()
}

fn occurs_as_word(text: &str, marker: &str) -> bool {
    if marker.is_empty() {
        return false;
    }
    let ends_in_word_char = marker.chars().next_back().is_some_and(char::is_alphanumeric);

    text.match_indices(marker).any(|(start, _)| {
        let before_ok = text[..start]
            .chars()
            .next_back()
            .map_or(true, |ch| !ch.is_alphanumeric());
        let after_ok = !ends_in_word_char
            || text[start + marker.len()..]
                .chars()
                .next()
                .map_or(true, |ch| !ch.is_alphanumeric());
        before_ok && after_ok
    })
}

/// Finds `(= word)` synonyms, `see word` references and `opp. word`
/// antonyms, in that order, keeping every match.
pub fn extract_cross_refs(text: &str) -> Vec<CrossRef> {
    let patterns: [(&Regex, Relation); 3] = [
        (&*EQUALS_REF, Relation::Synonym),
        (&*SEE_REF, Relation::SeeAlso),
        (&*OPP_REF, Relation::Antonym),
    ];

    patterns
        .iter()
        .flat_map(|(pattern, relation)| {
            pattern.captures_iter(text).map(move |cap| CrossRef {
                target_word: cap[1].to_string(),
                relation: *relation,
            })
        })
        .collect()
}
