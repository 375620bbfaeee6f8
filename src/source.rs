//! Source reader: whole file in, decoded text out.

use crate::error::{Result, ScanError};
use bzip2::read::BzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Reads a source file completely, decompressing `.bz2` files on the way,
/// and decodes it as strict UTF-8. A leading byte-order mark is dropped.
pub fn read_source(path: &Path) -> Result<String> {
    let read_error = |source: std::io::Error| ScanError::SourceRead {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_error)?;
    let mut bytes = Vec::new();
    if is_bzip2(path) {
        BzDecoder::new(file).read_to_end(&mut bytes).map_err(read_error)?;
    } else {
        BufReader::with_capacity(256 * 1024, file)
            .read_to_end(&mut bytes)
            .map_err(read_error)?;
    }

    decode(path, bytes)
}

/// Decodes raw bytes, reporting the offset of the first invalid sequence.
pub fn decode(path: &Path, bytes: Vec<u8>) -> Result<String> {
    let text = String::from_utf8(bytes).map_err(|e| ScanError::Undecodable {
        path: path.to_path_buf(),
        offset: e.utf8_error().valid_up_to(),
    })?;
    Ok(match text.strip_prefix('\u{FEFF}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

fn is_bzip2(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".bz2")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzip2::write::BzEncoder;
    use bzip2::Compression;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn reads_plain_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bailey.txt");
        std::fs::write(&path, "\u{FEFF}Abandon, v. a. വിട്ടൊഴിയുന്നു.\n").unwrap();
        let text = read_source(&path).unwrap();
        assert!(text.starts_with("Abandon"));
    }

    #[test]
    fn reads_bzip2_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bailey.txt.bz2");
        let mut encoder = BzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all("അക്ഷം akšam".as_bytes()).unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();
        assert_eq!(read_source(&path).unwrap(), "അക്ഷം akšam");
    }

    #[test]
    fn invalid_utf8_reports_offset() {
        let err = decode(Path::new("x.txt"), vec![b'a', b'b', 0xFF, b'c']).unwrap_err();
        match err {
            ScanError::Undecodable { offset, .. } => assert_eq!(offset, 2),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_a_read_failure() {
        let err = read_source(Path::new("/nonexistent/gundert.xml")).unwrap_err();
        assert!(matches!(err, ScanError::SourceRead { .. }));
        assert!(err.is_source_failure());
    }
}
