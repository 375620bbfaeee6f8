//! Text normalizer: markup fragment in, clean single-spaced text out.
//!
//! Line-break tags are removed without leaving whitespace behind, because
//! the transcriptions break lines in the middle of words
//! (`അക<lb/>ഷങ്ങൾ` is one word). Every other tag is stripped, entities are
//! decoded, and whitespace runs collapse to one space.
//!
//! Stripping and decoding repeat until the text stops changing, so a decoded
//! `&lt;b&gt;` is itself stripped and the result is a fixpoint:
//! normalizing twice gives the same string as normalizing once.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref LINE_BREAK: Regex = Regex::new(r"(?i)<\s*/?\s*lb\b[^>]*>").unwrap();
    static ref TAG: Regex = Regex::new(r"<[^<>]*>").unwrap();
    static ref ENTITY: Regex = Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").unwrap();
}

/// Normalizes a raw markup fragment. Total: worst case returns "".
pub fn normalize(fragment: &str) -> String {
    let mut text = fragment.to_string();

    // Each pass that changes anything makes the text strictly shorter.
    loop {
        let next = decode_entities(&strip_tags(&text));
        if next == text {
            break;
        }
        text = next;
    }

    collapse_whitespace(&text)
}

/// Removes line-break tags (without a gap) and every other tag.
pub fn strip_tags(text: &str) -> String {
    let joined = LINE_BREAK.replace_all(text, "");
    TAG.replace_all(&joined, "").into_owned()
}

/// Decodes the XML entities, `&nbsp;` and numeric references. Unknown
/// names and invalid code points are left untouched.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            let hex = body
                .strip_prefix("#x")
                .or_else(|| body.strip_prefix("#X"));
            let decoded = if let Some(hex) = hex {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match body {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{00A0}'),
                    _ => None,
                }
            };
            match decoded {
                Some(ch) => ch.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Collapses whitespace runs (newlines included) to one space and trims.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
