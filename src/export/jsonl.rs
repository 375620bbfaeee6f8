//! One serialized `Entry` per line.

use crate::error::Result;
use crate::export::ExportStats;
use crate::model::Entry;
use std::io::Write;

pub fn write_jsonl<W: Write>(entries: &[Entry], mut writer: W) -> Result<ExportStats> {
    for entry in entries {
        serde_json::to_writer(&mut writer, entry)?;
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(ExportStats {
        entries: entries.len(),
        rows: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Location, Marker, Provenance, Sense};

    #[test]
    fn lines_parse_back() {
        let entry = Entry {
            headword: "Abaft".to_string(),
            alternate_forms: Vec::new(),
            romanization: None,
            grammar: Some(Marker {
                raw: "ad".to_string(),
                canonical: "adverb".to_string(),
                mapped: true,
            }),
            etymology: None,
            senses: vec![Sense {
                target_text: "അമരത്ത്".to_string(),
                raw_text: "അമരത്ത്".to_string(),
                ..Sense::default()
            }],
            cross_references: Vec::new(),
            provenance: Provenance {
                source: "bailey".to_string(),
                title: "Bailey's English-Malayalam Dictionary".to_string(),
                short_name: "Bailey".to_string(),
                year: 1849,
                author: None,
                location: Location::Line(3),
            },
        };

        let mut out = Vec::new();
        write_jsonl(&[entry.clone(), entry.clone()], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["provenance"]["location"]["kind"], "line");
        assert_eq!(value["provenance"]["location"]["value"], 3);
        assert!(value.get("etymology").is_none());
        assert!(lines[0].contains("അമരത്ത്"));

        let back: Entry = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(back, entry);
    }
}
