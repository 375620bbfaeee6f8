//! TEI page transcriptions.
//!
//! The files are tag soup rather than well-formed XML, so surfaces and
//! paragraphs are located with patterns and their contents normalized as
//! text. An entry paragraph reads
//! `അക്ഷം akšam S. (oc-ulus) 1. Eye. 2. wheel.`

use super::{Segment, Unit, UnitBody};
use crate::assemble::Head;
use crate::error::Rejection;
use crate::model::Location;
use crate::normalize::normalize;
use crate::schema::Profile;
use crate::script::is_romanization;
use lazy_static::lazy_static;
use regex::Regex;

/// Bodies shorter than this are OCR debris, not definitions.
const MIN_BODY_CHARS: usize = 3;

lazy_static! {
    static ref SURFACE: Regex = Regex::new(r"(?is)<surface\b([^>]*)>(.*?)</surface\s*>").unwrap();
    static ref SCAN_TYPE: Regex = Regex::new(r#"\btype\s*=\s*["']scan["']"#).unwrap();
    static ref PAGE_NUMBER: Regex = Regex::new(r#"\bn\s*=\s*["']([^"']*)["']"#).unwrap();
    static ref PARAGRAPH: Regex = Regex::new(r"(?is)<p\b[^>]*>(.*?)</p\s*>").unwrap();

    // Malayalam headword, whitespace, romanization
    static ref ENTRY_START: Regex = Regex::new(
        r"^[\x{0D00}-\x{0D7F}]+\s+[A-Za-z\x{00C0}-\x{024F}\x{1E00}-\x{1EFF}\x{0300}-\x{036F}]"
    ).unwrap();

    static ref HEAD: Regex = Regex::new(
        r"(?s)^([\x{0D00}-\x{0D7F}]+)\s+([A-Za-z\x{00C0}-\x{024F}\x{1E00}-\x{1EFF}\x{0300}-\x{036F}]+)(?:\s+(S\.|T\.|M\.|C\.|Te\.|Tu\.|So\.|No\.|V\d\.|TR\.|P\.|Ar\.|Port\.|E\.|H\.|Tdbh\.))?(.*)$"
    ).unwrap();
}

/// Yields one segment per `<p>` inside each `<surface type="scan">`.
///
/// Surfaces whose `n` is not a page number, or that come before the
/// profile's first page, yield front matter for each of their paragraphs.
pub fn split<'a>(profile: &'a Profile, source: &'a str) -> impl Iterator<Item = Segment> + 'a {
    SURFACE
        .captures_iter(source)
        .filter(|cap| SCAN_TYPE.is_match(&cap[1]))
        .flat_map(move |cap| {
            let page = PAGE_NUMBER
                .captures(cap.get(1).map_or("", |m| m.as_str()))
                .map(|n| n[1].trim().to_string())
                .unwrap_or_default();
            let in_body = match page.parse::<usize>() {
                Ok(number) => profile.start_at.map_or(true, |start| number >= start),
                Err(_) => false,
            };
            let body = cap.get(2).map_or("", |m| m.as_str());

            PARAGRAPH.captures_iter(body).map(move |p| {
                if !in_body {
                    return Segment::FrontMatter;
                }
                let text = normalize(&p[1]);
                if !looks_like_entry(&text) {
                    return Segment::Furniture;
                }
                Segment::Candidate(Unit {
                    location: Location::Page(page.clone()),
                    body: UnitBody::Text(text),
                })
            })
        })
}

/// Malayalam run, whitespace, then the start of a romanization.
pub fn looks_like_entry(text: &str) -> bool {
    ENTRY_START.is_match(text)
}

/// Reads `headword romanization [etymology] body`.
pub fn extract_head(text: &str) -> Result<Head, Rejection> {
    let cap = HEAD.captures(text).ok_or(Rejection::NotAnEntry)?;
    if !is_romanization(&cap[2]) {
        return Err(Rejection::NotAnEntry);
    }

    let body = cap.get(4).map_or("", |m| m.as_str()).trim();
    if body.chars().count() < MIN_BODY_CHARS {
        return Err(Rejection::NotAnEntry);
    }

    Ok(Head {
        headword: cap[1].to_string(),
        romanization: Some(cap[2].to_string()),
        etymology_marker: cap.get(3).map(|m| m.as_str().to_string()),
        remainder: body.to_string(),
        ..Head::default()
    })
}
