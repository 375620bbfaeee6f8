//! Line-per-entry plain text, e.g.
//! `Abandon, v. a. വിട്ടൊഴിയുന്നു, ത്യജിക്കുന്നു.`

use super::{Segment, Unit, UnitBody};
use crate::assemble::Head;
use crate::error::Rejection;
use crate::model::Location;
use crate::schema::Profile;
use crate::script::is_all_upper;

/// One segment per physical line. Blank and all-upper-case lines are
/// boundaries (section headers such as `ABD`).
pub fn split<'a>(profile: &'a Profile, source: &'a str) -> impl Iterator<Item = Segment> + 'a {
    source.lines().enumerate().map(move |(index, line)| {
        let line_no = index + 1;
        if profile.start_at.is_some_and(|start| line_no < start) {
            return Segment::FrontMatter;
        }
        let text = line.trim();
        if text.is_empty() || is_all_upper(text) {
            return Segment::Boundary;
        }
        Segment::Candidate(Unit {
            location: Location::Line(line_no),
            body: UnitBody::Text(text.to_string()),
        })
    })
}

/// Reads `Headword<SEP>marker. <gloss>`.
///
/// The grammar marker ends at the first period followed by whitespace and a
/// gloss-script character. The separator is the first comma before that
/// point; OCR damage sometimes turns it into a semicolon or a period, which
/// are tried next.
pub fn extract_head(profile: &Profile, line: &str) -> Result<Head, Rejection> {
    let boundary = find_gloss_boundary(profile, line).ok_or(Rejection::NotAnEntry)?;
    let head = &line[..boundary];

    let separator = head
        .find(',')
        .or_else(|| head.find(';'))
        .or_else(|| head.find('.'))
        .ok_or(Rejection::NotAnEntry)?;

    let headword = line[..separator].trim();
    if headword.is_empty() {
        return Err(Rejection::NotAnEntry);
    }

    let marker = line[separator + 1..boundary].trim();

    let remainder = line[boundary + 1..].trim();
    let remainder = remainder.strip_suffix('.').unwrap_or(remainder).trim_end();

    Ok(Head {
        headword: headword.to_string(),
        grammar_marker: (!marker.is_empty()).then(|| marker.to_string()),
        remainder: remainder.to_string(),
        ..Head::default()
    })
}

/// Byte offset of the period that closes the head.
fn find_gloss_boundary(profile: &Profile, line: &str) -> Option<usize> {
    line.match_indices('.').map(|(i, _)| i).find(|&i| {
        let after = &line[i + 1..];
        let gloss = after.trim_start();
        gloss.len() < after.len() && profile.gloss_script.starts(gloss)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::parse_unit;
    use crate::schema::Schema;
    use proptest::prelude::*;

    fn bailey() -> &'static Profile {
        Schema::builtin().unwrap().profile("bailey").unwrap()
    }

    fn segments(source: &str) -> Vec<Segment> {
        split(bailey(), source).collect()
    }

    #[test]
    fn abandon_head() {
        let head = extract_head(bailey(), "Abandon, v. a. വിട്ടൊഴിയുന്നു, ത്യജിക്കുന്നു.").unwrap();
        assert_eq!(head.headword, "Abandon");
        assert_eq!(head.grammar_marker.as_deref(), Some("v. a"));
        assert_eq!(head.remainder, "വിട്ടൊഴിയുന്നു, ത്യജിക്കുന്നു");
    }

    #[test]
    fn marker_may_contain_periods_and_ampersands() {
        let head = extract_head(bailey(), "Abide, v. a. & n. പാൎക്കുന്നു.").unwrap();
        assert_eq!(head.grammar_marker.as_deref(), Some("v. a. & n"));
    }

    #[test]
    fn semicolon_separator_fallback() {
        let head = extract_head(bailey(), "Abase; v. a. താഴ്ത്തുന്നു.").unwrap();
        assert_eq!(head.headword, "Abase");
        assert_eq!(head.grammar_marker.as_deref(), Some("v. a"));
    }

    #[test]
    fn period_separator_fallback() {
        let head = extract_head(bailey(), "Abash. v. a. നാണിപ്പിക്കുന്നു.").unwrap();
        assert_eq!(head.headword, "Abash");
        assert_eq!(head.grammar_marker.as_deref(), Some("v. a"));
    }

    #[test]
    fn comma_after_boundary_is_not_a_separator() {
        // the only comma sits inside the gloss
        let head = extract_head(bailey(), "Abb. s. ഊടു, പാവു.").unwrap();
        assert_eq!(head.headword, "Abb");
        assert_eq!(head.grammar_marker.as_deref(), Some("s"));
        assert_eq!(head.remainder, "ഊടു, പാവു");
    }

    #[test]
    fn no_gloss_boundary_is_not_an_entry() {
        assert_eq!(
            extract_head(bailey(), "Abbreviation, s. see Abridgment."),
            Err(Rejection::NotAnEntry)
        );
    }

    #[test]
    fn empty_headword_is_not_an_entry() {
        assert_eq!(
            extract_head(bailey(), ", s. ഊടു."),
            Err(Rejection::NotAnEntry)
        );
    }

    #[test]
    fn blank_and_upper_lines_are_boundaries() {
        let segs = segments("ABD\n\n  \nAbandon, v. a. വിട്ടൊഴിയുന്നു.");
        assert!(matches!(segs[0], Segment::Boundary));
        assert!(matches!(segs[1], Segment::Boundary));
        assert!(matches!(segs[2], Segment::Boundary));
        match &segs[3] {
            Segment::Candidate(unit) => assert_eq!(unit.location, Location::Line(4)),
            other => panic!("expected candidate, got {:?}", other),
        }
    }

    #[test]
    fn lines_before_start_are_front_matter() {
        let profile = bailey().clone().with_start_at(Some(3));
        let segs: Vec<Segment> = split(&profile, "Preface\nby the author\nAbandon, v. a. വിട്ടൊഴിയുന്നു.")
            .collect();
        assert!(matches!(segs[0], Segment::FrontMatter));
        assert!(matches!(segs[1], Segment::FrontMatter));
        assert!(matches!(segs[2], Segment::Candidate(_)));
    }

    #[test]
    fn gloss_sentences_and_english_words_reach_the_target_text() {
        let cases = [
            (
                "Abandon, v. a. വിട്ടൊഴിയുന്നു. ത്യജിക്കുന്നു.",
                "വിട്ടൊഴിയുന്നു. ത്യജിക്കുന്നു",
            ),
            ("Abide, v. n. പാൎക്കുന്നു, to dwell.", "പാൎക്കുന്നു, to dwell"),
        ];
        for (line, gloss) in cases {
            let unit = Unit {
                location: Location::Line(1),
                body: UnitBody::Text(line.to_string()),
            };
            let entry = parse_unit(bailey(), &unit).unwrap();
            assert_eq!(entry.senses.len(), 1);
            assert_eq!(entry.senses[0].target_text, gloss);
            assert_eq!(entry.senses[0].source_text, "");
        }
    }

    proptest! {
        #[test]
        fn generated_lines_round_trip_through_the_head(
            headword in "[A-Z][a-z]{1,10}",
            pos in "[a-z]{1,4}",
            gloss in "[\u{0D15}-\u{0D39}]{3,8}",
        ) {
            let line = format!("{}, {}. {}.", headword, pos, gloss);
            let head = extract_head(bailey(), &line).unwrap();
            prop_assert_eq!(head.headword, headword);
            prop_assert_eq!(head.grammar_marker, Some(pos));
            prop_assert_eq!(head.remainder, gloss);
        }

        #[test]
        fn multi_sentence_and_mixed_glosses_are_kept_whole(
            headword in "[A-Z][a-z]{1,10}",
            gloss in "[\u{0D15}-\u{0D39}]{3,8}((\\. |, to |, )[\u{0D15}-\u{0D39}a-z]{2,8}){0,3}",
        ) {
            let unit = Unit {
                location: Location::Line(1),
                body: UnitBody::Text(format!("{}, v. a. {}.", headword, gloss)),
            };
            let entry = parse_unit(bailey(), &unit).unwrap();
            prop_assert_eq!(entry.senses.len(), 1);
            prop_assert_eq!(entry.senses[0].number, 0);
            prop_assert_eq!(&entry.senses[0].target_text, &gloss);
            prop_assert_eq!(entry.senses[0].source_text.as_str(), "");
        }
    }
}
