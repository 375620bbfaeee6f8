//! Standard Format Markup, as read by Toolbox and FLEx.
//!
//! ```text
//! \lx അക്ഷം
//! \ph akšam
//! \et sanskrit
//! \sn 1
//! \ge Eye
//! \dt 23/1872
//! \rf Gundert p.23
//! ```

use crate::error::Result;
use crate::export::ExportStats;
use crate::model::{CrossRef, Entry};
use std::io::Write;

pub fn write_sfm<W: Write>(entries: &[Entry], mut writer: W) -> Result<ExportStats> {
    let mut stats = ExportStats::default();

    for entry in entries {
        writeln!(writer)?;
        writeln!(writer, "\\lx {}", entry.headword)?;
        if let Some(romanization) = &entry.romanization {
            writeln!(writer, "\\ph {}", romanization)?;
        }
        if let Some(pos) = entry.part_of_speech() {
            writeln!(writer, "\\ps {}", pos)?;
        }
        if let Some(etymology) = &entry.etymology {
            let shown = if etymology.mapped { &etymology.canonical } else { &etymology.raw };
            writeln!(writer, "\\et {}", shown)?;
        }

        for sense in &entry.senses {
            if sense.number > 0 {
                writeln!(writer, "\\sn {}", sense.number)?;
            }
            if !sense.target_text.is_empty() {
                writeln!(writer, "\\ge {}", sense.target_text)?;
            }
            if !sense.source_text.is_empty() {
                writeln!(writer, "\\dn {}", sense.source_text)?;
            }
            write_cross_refs(&mut writer, &sense.cross_references)?;
            if !sense.citations.is_empty() {
                let citations: Vec<&str> = sense.citations.iter().map(String::as_str).collect();
                writeln!(writer, "\\so {}", citations.join("; "))?;
            }
            stats.rows += 1;
        }
        write_cross_refs(&mut writer, &entry.cross_references)?;

        let provenance = &entry.provenance;
        writeln!(writer, "\\dt {}/{}", provenance.location.value(), provenance.year)?;
        writeln!(writer, "\\rf {} {}", provenance.short_name, provenance.location)?;
        stats.entries += 1;
    }

    writeln!(writer)?;
    writer.flush()?;
    Ok(stats)
}

fn write_cross_refs<W: Write>(writer: &mut W, refs: &[CrossRef]) -> Result<()> {
    for cross_ref in refs {
        writeln!(writer, "\\cf {}", cross_ref.target_word)?;
    }
    Ok(())
}
