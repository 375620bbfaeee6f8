//! Sense segmenter: splits an entry body at printed sense numbers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "1. ", " 12. " ... the whitespace before the number is consumed with it
    static ref SENSE_MARKER: Regex = Regex::new(r"(?:^|\s)([0-9]{1,4})\.\s+").unwrap();
}

/// One sense body as found in the text, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenseText<'a> {
    /// 0 for the unnumbered lead-in sense.
    pub number: u32,
    pub text: &'a str,
}

/// Splits `body` into senses in order of appearance.
///
/// Numbers are taken as printed: gaps, duplicates and a first number above 1
/// are all preserved. Text before the first number becomes sense 0 unless it
/// is empty or opens with a parenthesis (an editorial note, not a meaning).
/// A body without any number is one sense 0 in its entirety.
pub fn segment(body: &str) -> Vec<SenseText<'_>> {
    let markers: Vec<(usize, usize, u32)> = SENSE_MARKER
        .captures_iter(body)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let number = cap[1].parse::<u32>().ok()?;
            Some((whole.start(), whole.end(), number))
        })
        .collect();

    if markers.is_empty() {
        let text = body.trim();
        if text.is_empty() {
            return Vec::new();
        }
        return vec![SenseText { number: 0, text }];
    }

    let mut senses = Vec::with_capacity(markers.len() + 1);

    let lead = body[..markers[0].0].trim();
    if !lead.is_empty() && !lead.starts_with('(') {
        senses.push(SenseText { number: 0, text: lead });
    }

    for (i, &(_, body_start, number)) in markers.iter().enumerate() {
        let body_end = markers.get(i + 1).map(|m| m.0).unwrap_or(body.len());
        senses.push(SenseText {
            number,
            text: body[body_start..body_end].trim(),
        });
    }

    senses
}
