//! Fuzz target for label file parsing.
//!
//! Every line must end up either as a detection or as a malformed entry,
//! whatever bytes the file holds.

#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use yolo2gt::ir::io_yolo::{parse_label_file, parse_label_line};

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };

    let parsed = parse_label_file(content, Path::new("<fuzz>"));
    assert_eq!(
        parsed.detections.len() + parsed.malformed.len(),
        content.lines().count()
    );

    for line in content.lines() {
        if parse_label_line(line).is_ok() {
            assert_eq!(line.split_whitespace().count(), 5);
        }
    }
});
