//! Script predicates for headword and gloss text.

use serde::Deserialize;
use unicode_normalization::UnicodeNormalization;

/// Writing system of a headword or gloss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Latin,
    Malayalam,
}

impl Script {
    /// True if `ch` belongs to this script (letters and signs, not punctuation).
    pub fn owns(self, ch: char) -> bool {
        match self {
            Script::Latin => is_latin_letter(ch),
            Script::Malayalam => is_malayalam(ch),
        }
    }

    /// True if any character of `text` belongs to this script.
    pub fn occurs_in(self, text: &str) -> bool {
        text.chars().any(|ch| self.owns(ch))
    }

    /// True if `text` starts with a character of this script.
    pub fn starts(self, text: &str) -> bool {
        text.chars().next().is_some_and(|ch| self.owns(ch))
    }
}

/// Malayalam block, U+0D00..U+0D7F.
pub fn is_malayalam(ch: char) -> bool {
    ('\u{0D00}'..='\u{0D7F}').contains(&ch)
}

/// ASCII letters plus the Latin diacritic blocks (À-ɏ and Latin Extended Additional).
pub fn is_latin_letter(ch: char) -> bool {
    if ch.is_ascii() {
        return ch.is_ascii_alphabetic();
    }
    let cp = ch as u32;
    ch.is_alphabetic() && ((0x00C0..=0x024F).contains(&cp) || (0x1E00..=0x1EFF).contains(&cp))
}

/// True if `token` reads as a romanization: Latin letters with optional
/// diacritics (precomposed or combining), apostrophes and hyphens, and
/// nothing from another script.
pub fn is_romanization(token: &str) -> bool {
    let normalized: String = token.nfc().collect();

    if normalized.trim().is_empty() {
        return false;
    }

    let allowed_punct = ['\u{2019}', '\'', '-'];
    let mut saw_latin_letter = false;

    for ch in normalized.chars() {
        if is_latin_letter(ch) {
            saw_latin_letter = true;
        } else if ('\u{0300}'..='\u{036F}').contains(&ch) || allowed_punct.contains(&ch) {
            // Combining marks and word-internal punctuation
        } else {
            return false;
        }
    }

    saw_latin_letter
}

/// Python-style `isupper`: at least one cased letter and no lowercase ones.
pub fn is_all_upper(text: &str) -> bool {
    let mut saw_upper = false;
    for ch in text.chars() {
        if ch.is_lowercase() {
            return false;
        }
        if ch.is_uppercase() {
            saw_upper = true;
        }
    }
    saw_upper
}
