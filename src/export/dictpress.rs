//! dictpress import CSV.
//!
//! One `-` row per entry followed by `^` rows for its definitions, examples,
//! explanations and cross-references. Every row has the same eleven columns.

use crate::error::Result;
use crate::export::ExportStats;
use crate::model::{CrossRef, Entry, ExampleKind, Location, Relation, Sense};
use crate::schema::{Language, Profile};
use serde::Serialize;
use std::io::Write;

const HEADER: [&str; 11] = [
    "type",
    "initial",
    "content",
    "language",
    "notes",
    "tsvector_language",
    "tsvector_tokens",
    "tags",
    "phones",
    "definition_types",
    "meta",
];

/// Definition rows shorter than this are OCR fragments.
const MIN_DEFINITION_CHARS: usize = 4;

#[derive(Debug, Default, Serialize)]
struct Row<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    initial: String,
    content: String,
    language: &'a str,
    notes: String,
    tsvector_language: &'a str,
    tsvector_tokens: &'a str,
    tags: String,
    phones: &'a str,
    definition_types: &'a str,
    meta: String,
}

#[derive(Debug, Serialize)]
struct Meta<'a> {
    source: &'a str,
    year: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    etymology: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    etymology_marker: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    grammar: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
}

pub fn write_csv<W: Write>(profile: &Profile, entries: &[Entry], writer: W) -> Result<ExportStats> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(HEADER)?;

    let mut stats = ExportStats::default();
    for entry in entries {
        csv_writer.serialize(entry_row(profile, entry)?)?;
        stats.entries += 1;

        let pos = entry.part_of_speech().unwrap_or("");
        for sense in &entry.senses {
            for row in sense_rows(profile, sense, pos) {
                csv_writer.serialize(row)?;
                stats.rows += 1;
            }
        }
        for cross_ref in &entry.cross_references {
            csv_writer.serialize(cross_ref_row(profile, cross_ref))?;
            stats.rows += 1;
        }
    }

    csv_writer.flush()?;
    Ok(stats)
}

fn entry_row<'a>(profile: &'a Profile, entry: &'a Entry) -> Result<Row<'a>> {
    let provenance = &entry.provenance;
    let (page, line, record) = match &provenance.location {
        Location::Page(page) => (Some(page.as_str()), None, None),
        Location::Line(line) => (None, Some(*line), None),
        Location::Record(record) => (None, None, Some(*record)),
    };
    let meta = Meta {
        source: &provenance.source,
        year: provenance.year,
        page,
        line,
        record,
        etymology: entry.etymology_language(),
        etymology_marker: entry.etymology.as_ref().map(|m| m.raw.as_str()),
        grammar: entry.grammar.as_ref().map(|m| m.raw.as_str()),
        author: provenance.author.as_deref(),
    };

    Ok(Row {
        kind: "-",
        initial: entry.headword.chars().next().map(String::from).unwrap_or_default(),
        content: entry.headword.clone(),
        language: profile.headword_language.name(),
        notes: format!(
            "{} ({}) {}",
            provenance.short_name, provenance.year, provenance.location
        ),
        tsvector_language: profile.headword_language.tokenizer().unwrap_or(""),
        tags: entry_tags(profile, entry).join("|"),
        phones: entry.romanization.as_deref().unwrap_or(""),
        meta: serde_json::to_string(&meta)?,
        ..Row::default()
    })
}

/// Dictionary tags, then the etymology language and part of speech.
fn entry_tags<'a>(profile: &'a Profile, entry: &'a Entry) -> Vec<&'a str> {
    let mut tags: Vec<&str> = profile.tags.iter().map(String::as_str).collect();
    for tag in [entry.etymology_language(), entry.part_of_speech()]
        .into_iter()
        .flatten()
    {
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

fn sense_rows<'a>(profile: &'a Profile, sense: &'a Sense, pos: &'a str) -> Vec<Row<'a>> {
    let mut rows = Vec::new();
    let citations = sense.citations.iter().map(String::as_str).collect::<Vec<_>>().join(", ");

    for (text, language) in [
        (&sense.target_text, profile.gloss_language),
        (&sense.source_text, profile.headword_language),
    ] {
        if text.chars().count() < MIN_DEFINITION_CHARS {
            continue;
        }
        rows.push(Row {
            content: text.clone(),
            notes: citations.clone(),
            definition_types: pos,
            ..sub_row(language)
        });
    }

    for example in &sense.examples {
        rows.push(Row {
            content: format!("[{}] {}", example_label(example.kind), example.text),
            definition_types: pos,
            ..sub_row(profile.headword_language)
        });
    }

    for explanation in &sense.explanations {
        rows.push(Row {
            content: format!("[വിശദീകരണം] {}", explanation),
            definition_types: pos,
            ..sub_row(profile.gloss_language)
        });
    }

    for cross_ref in &sense.cross_references {
        rows.push(cross_ref_row(profile, cross_ref));
    }

    rows
}

fn cross_ref_row<'a>(profile: &'a Profile, cross_ref: &'a CrossRef) -> Row<'a> {
    Row {
        content: format!("[{}] {}", relation_label(cross_ref.relation), cross_ref.target_word),
        ..sub_row(profile.headword_language)
    }
}

fn sub_row<'a>(language: Language) -> Row<'a> {
    Row {
        kind: "^",
        language: language.name(),
        tsvector_language: language.tokenizer().unwrap_or(""),
        ..Row::default()
    }
}

fn example_label(kind: ExampleKind) -> &'static str {
    match kind {
        ExampleKind::Usage => "ഉദാഹരണം",
        ExampleKind::Poem => "കവിത",
        ExampleKind::Proverb => "പഴഞ്ചൊൽ",
        ExampleKind::Phrase => "പദപ്രയോഗം",
    }
}

fn relation_label(relation: Relation) -> &'static str {
    match relation {
        Relation::Synonym => "പര്യായം",
        Relation::Antonym => "വിപരീതം",
        Relation::Related => "ബന്ധപ്പെട്ടത്",
        Relation::Hypernym => "ഉപരിവർഗ്ഗം",
        Relation::Hyponym => "അധോവർഗ്ഗം",
        Relation::SeeAlso => "കാണുക",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{scan_source, ScanOptions};
    use crate::schema::Schema;

    fn export(slug: &str, source: &str) -> Vec<csv::StringRecord> {
        let profile = Schema::builtin().unwrap().profile(slug).unwrap();
        let (entries, _) =
            scan_source(profile, source, "test", &ScanOptions::default(), &mut |_| {}).unwrap();
        let mut out = Vec::new();
        write_csv(profile, &entries, &mut out).unwrap();
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(out.as_slice())
            .records()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn header_only_for_no_entries() {
        let rows = export("bailey", "ABD\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].iter().collect::<Vec<_>>(), HEADER.to_vec());
    }

    #[test]
    fn bailey_entry_and_definition_rows() {
        let rows = export("bailey", "Abandon, v. a. വിട്ടൊഴിയുന്നു, ത്യജിക്കുന്നു.\n");
        assert_eq!(rows.len(), 3);

        let entry = &rows[1];
        assert_eq!(&entry[0], "-");
        assert_eq!(&entry[1], "A");
        assert_eq!(&entry[2], "Abandon");
        assert_eq!(&entry[3], "english");
        assert_eq!(&entry[4], "Bailey (1849) l.1");
        assert_eq!(&entry[5], "english");
        assert_eq!(&entry[7], "bailey|verb-transitive");

        let meta: serde_json::Value = serde_json::from_str(&entry[10]).unwrap();
        assert_eq!(meta["source"], "bailey");
        assert_eq!(meta["line"], 1);
        assert_eq!(meta["grammar"], "v. a");
        assert!(meta.get("page").is_none());

        let definition = &rows[2];
        assert_eq!(&definition[0], "^");
        assert_eq!(&definition[2], "വിട്ടൊഴിയുന്നു, ത്യജിക്കുന്നു");
        assert_eq!(&definition[3], "malayalam");
        assert_eq!(&definition[5], "");
        assert_eq!(&definition[9], "verb-transitive");
        assert_eq!(&definition[10], "");
    }

    #[test]
    fn gundert_rows_carry_romanization_etymology_and_citations() {
        let source = "<surface type=\"scan\" n=\"105\"><p>ആപ്പു āppu̥ T. M. 1. Wedge, plug TP. 2. (= കിണറു)</p></surface>";
        let rows = export("gundert", source);

        let entry = &rows[1];
        assert_eq!(&entry[4], "Gundert (1872) p.105");
        assert_eq!(&entry[7], "gundert|tamil");
        assert_eq!(&entry[8], "āppu̥");
        // native characters stay unescaped in the JSON
        assert!(entry[10].contains("\"page\":\"105\""));
        assert!(entry[10].contains("\"etymology\":\"tamil\""));

        let gloss = &rows[2];
        assert_eq!(&gloss[2], "Wedge, plug TP");
        assert_eq!(&gloss[3], "english");
        assert_eq!(&gloss[4], "TP");
        assert_eq!(&gloss[5], "english");

        let cross_ref = rows.last().unwrap();
        assert_eq!(&cross_ref[2], "[പര്യായം] കിണറു");
    }

    #[test]
    fn mixed_script_bailey_gloss_is_one_malayalam_row() {
        let rows = export("bailey", "Abide, v. n. പാൎക്കുന്നു, to dwell.\n");
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[2][2], "പാൎക്കുന്നു, to dwell");
        assert_eq!(&rows[2][3], "malayalam");
        assert_eq!(&rows[2][5], "");
    }

    #[test]
    fn short_definitions_are_not_rows() {
        let rows = export("bailey", "Ab, s. അതു.\n");
        // "അതു" is three characters: entry row only
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn labels() {
        assert_eq!(example_label(ExampleKind::Proverb), "പഴഞ്ചൊൽ");
        assert_eq!(relation_label(Relation::SeeAlso), "കാണുക");
        assert_eq!(relation_label(Relation::Hyponym), "അധോവർഗ്ഗം");
    }
}
