#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Minimal 24-bit BMP; `imagesize` only needs the header.
pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

/// Writes `<root>/<split>/images/<stem>.bmp` and `<root>/<split>/labels/<stem>.txt`.
pub fn add_image(root: &Path, split: &str, stem: &str, size: (u32, u32), labels: &str) {
    write_bmp(
        &root.join(split).join("images").join(format!("{stem}.bmp")),
        size.0,
        size.1,
    );
    let label_path = root.join(split).join("labels").join(format!("{stem}.txt"));
    fs::create_dir_all(label_path.parent().expect("label parent")).expect("create labels dir");
    fs::write(label_path, labels).expect("write label file");
}

/// Creates empty `images/` and `labels/` dirs for each split.
pub fn create_splits(root: &Path, splits: &[&str]) {
    for split in splits {
        fs::create_dir_all(root.join(split).join("images")).expect("create images dir");
        fs::create_dir_all(root.join(split).join("labels")).expect("create labels dir");
    }
}

/// A small shark dataset with train, valid, and test splits.
///
/// - train/frame_b: one box, 720x720
/// - train/frame_a: two boxes (one malformed line in between), 720x720
/// - train/frame_c: empty label file
/// - valid/frame_v: one box with an unknown class id, 640x360
/// - test/frame_t: one box (never converted by default)
pub fn create_shark_dataset(root: &Path) {
    create_splits(root, &["train", "valid", "test"]);
    fs::write(root.join("data.yaml"), "nc: 1\nnames: ['shark']\n").expect("write data yaml");

    add_image(root, "train", "frame_b", (720, 720), "0 0.5 0.5 0.2 0.4\n");
    add_image(
        root,
        "train",
        "frame_a",
        (720, 720),
        "0 0.5 0.5 1.0 1.0\n0 0.5 0.5 0.2\n0 0.25 0.25 0.1 0.1\n",
    );
    add_image(root, "train", "frame_c", (720, 720), "");
    add_image(root, "valid", "frame_v", (640, 360), "3 0.5 0.5 0.5 0.5\n");
    add_image(root, "test", "frame_t", (100, 100), "0 0.5 0.5 0.5 0.5\n");
}
