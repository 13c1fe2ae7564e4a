//! Ground Truth manifest serialization.
//!
//! A manifest is JSON Lines: one compact [`AnnotationRecord`] object per
//! line. Records are joined by a single `\n` and the file does NOT end with a
//! newline; existing manifest consumers expect exactly that.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::ser::Error as _;

use super::record::AnnotationRecord;
use crate::error::Yolo2GtError;

/// Writes records to `path`, replacing any existing file.
pub fn write_manifest(path: &Path, records: &[AnnotationRecord]) -> Result<(), Yolo2GtError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| Yolo2GtError::FileWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let file = File::create(path).map_err(|source| write_error(path, source))?;
    let mut writer = BufWriter::new(file);

    write_records(&mut writer, records).map_err(|source| Yolo2GtError::ManifestWrite {
        path: path.to_path_buf(),
        source,
    })?;

    writer.flush().map_err(|source| write_error(path, source))
}

fn write_error(path: &Path, source: std::io::Error) -> Yolo2GtError {
    Yolo2GtError::FileWrite {
        path: path.to_path_buf(),
        source,
    }
}

fn read_error(path: &Path, source: std::io::Error) -> Yolo2GtError {
    Yolo2GtError::FileRead {
        path: path.to_path_buf(),
        source,
    }
}

/// Serializes records into a manifest string.
///
/// Useful for testing without file I/O.
pub fn to_manifest_string(records: &[AnnotationRecord]) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    write_records(&mut buf, records)?;
    String::from_utf8(buf).map_err(serde_json::Error::custom)
}

fn write_records<W: Write>(
    writer: &mut W,
    records: &[AnnotationRecord],
) -> Result<(), serde_json::Error> {
    for (index, record) in records.iter().enumerate() {
        if index > 0 {
            writer.write_all(b"\n").map_err(serde_json::Error::io)?;
        }
        serde_json::to_writer(&mut *writer, record)?;
    }
    Ok(())
}

/// Reads a manifest back into records. Blank lines are ignored.
pub fn read_manifest(path: &Path) -> Result<Vec<AnnotationRecord>, Yolo2GtError> {
    let file = File::open(path).map_err(|source| read_error(path, source))?;
    let mut records = Vec::new();

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| read_error(path, source))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| Yolo2GtError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}
