//! YOLO dataset reader.
//!
//! A dataset root holds one directory per split (`train/`, `valid/`,
//! `test/`), each with parallel `images/` and `labels/` trees, plus a class
//! definition (`data.yaml` or `classes.txt`) at the root. Every label file is
//! plain text, one `class_id cx cy w h` line per object in normalized
//! coordinates.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Deserialize;
use thiserror::Error;
use walkdir::WalkDir;

use super::model::{ClassMap, ImageDimensions, NormalizedDetection};
use super::record::AnnotationRecord;
use crate::error::Yolo2GtError;

/// Probe order when pairing a label with its image. `jpg` comes first.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];
pub const LABEL_EXTENSION: &str = "txt";

pub const DATA_YAML: &str = "data.yaml";
pub const CLASSES_TXT: &str = "classes.txt";

/// Where the class names come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassMapSource {
    DataYaml(PathBuf),
    ClassesTxt(PathBuf),
}

impl ClassMapSource {
    /// Picks the class definition for a run.
    ///
    /// An explicit path is classified by extension. Without one, the dataset
    /// root is searched for `data.yaml`, then `classes.txt`.
    pub fn resolve(explicit: Option<&Path>, dataset_root: &Path) -> Result<Self, Yolo2GtError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(Yolo2GtError::ClassMapMissing {
                    path: path.to_path_buf(),
                });
            }
            return Ok(if has_extension(path, &["yaml", "yml"]) {
                ClassMapSource::DataYaml(path.to_path_buf())
            } else {
                ClassMapSource::ClassesTxt(path.to_path_buf())
            });
        }

        let data_yaml = dataset_root.join(DATA_YAML);
        let classes_txt = dataset_root.join(CLASSES_TXT);
        if data_yaml.is_file() {
            Ok(ClassMapSource::DataYaml(data_yaml))
        } else if classes_txt.is_file() {
            Ok(ClassMapSource::ClassesTxt(classes_txt))
        } else {
            Err(Yolo2GtError::ClassMapMissing {
                path: dataset_root.to_path_buf(),
            })
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ClassMapSource::DataYaml(path) | ClassMapSource::ClassesTxt(path) => path,
        }
    }
}

/// Loads the class map. Any failure here is fatal for the run.
pub fn read_class_map(source: &ClassMapSource) -> Result<ClassMap, Yolo2GtError> {
    match source {
        ClassMapSource::DataYaml(path) => read_data_yaml_names(path),
        ClassMapSource::ClassesTxt(path) => read_classes_txt(path),
    }
}

#[derive(Debug, Deserialize)]
struct DataYaml {
    names: DataYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<u32, String>),
}

fn read_data_yaml_names(path: &Path) -> Result<ClassMap, Yolo2GtError> {
    let data = read_text(path)?;
    from_data_yaml_str(&data).map_err(|source| Yolo2GtError::ClassMapParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses the `names` entry of a `data.yaml` document.
///
/// Both the list form and the `id: name` mapping form are accepted. Gaps in a
/// mapping are filled with `class_<id>` so ids stay contiguous.
pub fn from_data_yaml_str(data: &str) -> Result<ClassMap, serde_yaml::Error> {
    let parsed: DataYaml = serde_yaml::from_str(data)?;

    let class_map = match parsed.names {
        DataYamlNames::Sequence(names) => ClassMap::from_names(names),
        DataYamlNames::Mapping(mapping) => {
            let mut class_map = ClassMap::new();
            if let Some(max_id) = mapping.keys().max().copied() {
                for id in 0..=max_id {
                    let name = match mapping.get(&id) {
                        Some(name) if !name.trim().is_empty() => name.clone(),
                        _ => format!("class_{id}"),
                    };
                    class_map.insert(id, name);
                }
            }
            class_map
        }
    };

    Ok(class_map)
}

fn read_text(path: &Path) -> Result<String, Yolo2GtError> {
    fs::read_to_string(path).map_err(|source| Yolo2GtError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

fn read_classes_txt(path: &Path) -> Result<ClassMap, Yolo2GtError> {
    let data = read_text(path)?;
    let mut names = Vec::new();

    for (line_idx, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(Yolo2GtError::ClassesTxtInvalid {
                path: path.to_path_buf(),
                message: format!("line {} is empty", line_idx + 1),
            });
        }
        names.push(trimmed.to_string());
    }

    Ok(ClassMap::from_names(names))
}

/// Why a label line was skipped.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LabelLineError {
    #[error("expected 5 fields, found {found}")]
    FieldCount { found: usize },

    #[error("invalid class_id '{raw}'; expected non-negative integer")]
    InvalidClassId { raw: String },

    #[error("invalid {field} '{raw}'; expected floating-point number")]
    InvalidNumber { field: &'static str, raw: String },

    #[error("non-finite {field} '{raw}'")]
    NonFinite { field: &'static str, raw: String },
}

/// Parses one `class_id cx cy w h` line.
pub fn parse_label_line(line: &str) -> Result<NormalizedDetection, LabelLineError> {
    let trimmed = line.trim();
    let found = trimmed.split_whitespace().count();
    if found != 5 {
        return Err(LabelLineError::FieldCount { found });
    }

    let mut tokens = trimmed.split_whitespace();
    let mut next = || tokens.next().unwrap_or_default();

    let raw_class = next();
    let class_id = raw_class
        .parse::<u32>()
        .map_err(|_| LabelLineError::InvalidClassId {
            raw: raw_class.to_string(),
        })?;

    let center_x = parse_f64_token(next(), "x_center")?;
    let center_y = parse_f64_token(next(), "y_center")?;
    let width = parse_f64_token(next(), "width")?;
    let height = parse_f64_token(next(), "height")?;

    Ok(NormalizedDetection {
        class_id,
        center_x,
        center_y,
        width,
        height,
    })
}

/// `nan` and `inf` parse as `f64` but have no JSON representation.
fn parse_f64_token(raw: &str, field: &'static str) -> Result<f64, LabelLineError> {
    let value = raw
        .parse::<f64>()
        .map_err(|_| LabelLineError::InvalidNumber {
            field,
            raw: raw.to_string(),
        })?;
    if !value.is_finite() {
        return Err(LabelLineError::NonFinite {
            field,
            raw: raw.to_string(),
        });
    }
    Ok(value)
}

/// A detection together with its 1-based line number.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParsedLine {
    pub line: usize,
    pub detection: NormalizedDetection,
}

/// A line that was skipped, with its 1-based line number.
#[derive(Clone, Debug, PartialEq)]
pub struct MalformedLine {
    pub line: usize,
    pub error: LabelLineError,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedLabelFile {
    pub detections: Vec<ParsedLine>,
    pub malformed: Vec<MalformedLine>,
}

/// Parses every line of a label file, skipping (and logging) bad ones.
///
/// `path` is only used for diagnostics.
pub fn parse_label_file(content: &str, path: &Path) -> ParsedLabelFile {
    let mut parsed = ParsedLabelFile::default();

    for (line_idx, line) in content.lines().enumerate() {
        let line_num = line_idx + 1;
        match parse_label_line(line) {
            Ok(detection) => parsed.detections.push(ParsedLine {
                line: line_num,
                detection,
            }),
            Err(error) => {
                log::warn!(
                    "skipping malformed label line {}:{}: {}",
                    path.display(),
                    line_num,
                    error
                );
                parsed.malformed.push(MalformedLine {
                    line: line_num,
                    error,
                });
            }
        }
    }

    parsed
}

/// Settings shared by every image of every split in a run.
#[derive(Clone, Copy, Debug)]
pub struct SplitOptions<'a> {
    pub class_map: &'a ClassMap,
    /// Root that source references are made relative to.
    pub dataset_root: &'a Path,
    pub source_ref_prefix: Option<&'a str>,
}

/// What happened to one label file.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageOutcome {
    Converted(ConvertedImage),
    /// The label file had no lines at all; no record is produced.
    SkippedEmpty { label_path: PathBuf },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConvertedImage {
    pub label_path: PathBuf,
    pub image_path: PathBuf,
    pub record: AnnotationRecord,
    pub malformed: Vec<MalformedLine>,
    /// Line numbers whose box falls outside the unit square.
    pub out_of_range_lines: Vec<usize>,
}

/// Converts every label file of one split.
///
/// Label files are visited in lexicographic order of their path relative to
/// `labels/`, and the outcomes come back in that same order regardless of how
/// many workers the current rayon pool has. The first missing or unreadable
/// image aborts the split.
pub fn process_split(
    split_dir: &Path,
    opts: &SplitOptions<'_>,
) -> Result<Vec<ImageOutcome>, Yolo2GtError> {
    let (images_dir, labels_dir) = split_layout(split_dir)?;

    let mut label_files = collect_files_with_extensions(&labels_dir, &[LABEL_EXTENSION])?;
    label_files.sort_by_cached_key(|label_path| rel_string(&labels_dir, label_path));

    log::info!(
        "processing split {} ({} label file(s))",
        split_dir.display(),
        label_files.len()
    );

    label_files
        .par_iter()
        .map(|label_path| process_label_file(label_path, &labels_dir, &images_dir, opts))
        .collect()
}

fn process_label_file(
    label_path: &Path,
    labels_dir: &Path,
    images_dir: &Path,
    opts: &SplitOptions<'_>,
) -> Result<ImageOutcome, Yolo2GtError> {
    let content = read_text(label_path)?;
    if content.is_empty() {
        log::warn!("skipping empty label file {}", label_path.display());
        return Ok(ImageOutcome::SkippedEmpty {
            label_path: label_path.to_path_buf(),
        });
    }

    let label_rel = label_path
        .strip_prefix(labels_dir)
        .map_err(|_| Yolo2GtError::LayoutInvalid {
            path: label_path.to_path_buf(),
            message: format!(
                "label path is outside labels dir '{}'",
                labels_dir.display()
            ),
        })?;

    let image_path =
        find_image_for_label(images_dir, label_rel).ok_or_else(|| Yolo2GtError::ImageNotFound {
            label_path: label_path.to_path_buf(),
            expected_stem: images_dir.join(label_rel.with_extension("")),
        })?;
    let dimensions = read_image_dimensions(&image_path)?;
    log::debug!(
        "{} is {}x{}",
        image_path.display(),
        dimensions.width,
        dimensions.height
    );

    let parsed = parse_label_file(&content, label_path);
    let out_of_range_lines = parsed
        .detections
        .iter()
        .filter(|p| !p.detection.bbox().is_within_unit_range())
        .map(|p| p.line)
        .collect();
    let annotations = parsed
        .detections
        .iter()
        .map(|p| p.detection.to_absolute(dimensions))
        .collect();

    let record = AnnotationRecord::build(
        source_ref(&image_path, opts.dataset_root, opts.source_ref_prefix),
        dimensions,
        annotations,
        opts.class_map,
    );

    Ok(ImageOutcome::Converted(ConvertedImage {
        label_path: label_path.to_path_buf(),
        image_path,
        record,
        malformed: parsed.malformed,
        out_of_range_lines,
    }))
}

fn split_layout(split_dir: &Path) -> Result<(PathBuf, PathBuf), Yolo2GtError> {
    if !split_dir.is_dir() {
        return Err(Yolo2GtError::LayoutInvalid {
            path: split_dir.to_path_buf(),
            message: "split directory does not exist".to_string(),
        });
    }

    let images_dir = split_dir.join("images");
    let labels_dir = split_dir.join("labels");

    if !labels_dir.is_dir() {
        return Err(Yolo2GtError::LayoutInvalid {
            path: labels_dir,
            message: "missing labels/ directory".to_string(),
        });
    }
    if !images_dir.is_dir() {
        return Err(Yolo2GtError::LayoutInvalid {
            path: images_dir,
            message: "missing images/ directory".to_string(),
        });
    }

    Ok((images_dir, labels_dir))
}

/// Builds the `source-ref` for an image.
///
/// With a prefix (for example `s3://bucket/datasets/sharks`) the image path
/// relative to the dataset root is appended with `/` separators. Without one
/// the local path is used as-is.
pub fn source_ref(image_path: &Path, dataset_root: &Path, prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) => {
            let rel = rel_string(dataset_root, image_path);
            format!(
                "{}/{}",
                prefix.trim_end_matches('/'),
                rel.trim_start_matches('/')
            )
        }
        None => image_path.to_string_lossy().into_owned(),
    }
}

fn collect_files_with_extensions(
    root: &Path,
    extensions: &[&str],
) -> Result<Vec<PathBuf>, Yolo2GtError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| Yolo2GtError::LayoutInvalid {
            path: root.to_path_buf(),
            message: format!("failed while traversing directory: {source}"),
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.path().to_path_buf());
        }
    }

    Ok(files)
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}

/// Reads width and height from the image header without decoding pixels.
pub fn read_image_dimensions(path: &Path) -> Result<ImageDimensions, Yolo2GtError> {
    let size = imagesize::size(path).map_err(|source| Yolo2GtError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let width: u32 = size
        .width
        .try_into()
        .map_err(|_| Yolo2GtError::LayoutInvalid {
            path: path.to_path_buf(),
            message: format!("image width {} does not fit in u32", size.width),
        })?;

    let height: u32 = size
        .height
        .try_into()
        .map_err(|_| Yolo2GtError::LayoutInvalid {
            path: path.to_path_buf(),
            message: format!("image height {} does not fit in u32", size.height),
        })?;

    Ok(ImageDimensions::new(width, height))
}

/// Swaps only the label's `.txt` for each image extension, so dotted stems
/// like `frame_jpg.rf.3f2a` stay intact.
fn find_image_for_label(images_dir: &Path, label_rel_path: &Path) -> Option<PathBuf> {
    let stem_path = images_dir.join(label_rel_path.with_extension(""));
    let stem = stem_path.file_name()?.to_os_string();
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| {
            let mut file_name = stem.clone();
            file_name.push(format!(".{ext}"));
            stem_path.with_file_name(file_name)
        })
        .find(|candidate| candidate.is_file())
}

fn rel_string(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}
