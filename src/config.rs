//! Run configuration.
//!
//! Settings come from two layers: an optional YAML file and the command
//! line. Both are parsed into a [`ConfigLayer`] of optional values; the CLI
//! layer wins field by field and [`ConversionConfig::resolve`] fills in the
//! defaults.
//!
//! ```yaml
//! datasetRoot: /data/sharks
//! classDefinitionPath: /data/sharks/data.yaml
//! outputPath: /data/sharks.manifest
//! sourceRefPrefix: s3://my-bucket/datasets/sharks
//! splits: [train, valid]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Yolo2GtError;

/// Splits converted when none are configured. `test` is left out on purpose.
pub const DEFAULT_SPLITS: [&str; 2] = ["train", "valid"];

/// Appended to the dataset directory name to form the default output file.
pub const MANIFEST_SUFFIX: &str = "-output--yolo--to--gt.output.manifest";

/// One layer of partially-specified settings.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigLayer {
    pub class_definition_path: Option<PathBuf>,
    pub dataset_root: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub source_ref_prefix: Option<String>,
    pub splits: Option<Vec<String>>,
    pub jobs: Option<usize>,
    pub strict: Option<bool>,
}

impl ConfigLayer {
    /// Loads a layer from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, Yolo2GtError> {
        let data = fs::read_to_string(path).map_err(|source| Yolo2GtError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&data).map_err(|source| Yolo2GtError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns `self` with every unset field taken from `base`.
    pub fn over(self, base: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            class_definition_path: self.class_definition_path.or(base.class_definition_path),
            dataset_root: self.dataset_root.or(base.dataset_root),
            output_path: self.output_path.or(base.output_path),
            source_ref_prefix: self.source_ref_prefix.or(base.source_ref_prefix),
            splits: self.splits.or(base.splits),
            jobs: self.jobs.or(base.jobs),
            strict: self.strict.or(base.strict),
        }
    }
}

/// Fully resolved settings for one conversion run.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionConfig {
    /// Directory holding the split directories and, usually, `data.yaml`.
    pub dataset_root: PathBuf,
    /// Explicit class definition; searched for under `dataset_root` if unset.
    pub class_definition_path: Option<PathBuf>,
    pub output_path: PathBuf,
    /// Prepended to each image's dataset-relative path to form `source-ref`.
    pub source_ref_prefix: Option<String>,
    /// Split directory names, converted and written in this order.
    pub splits: Vec<String>,
    /// Worker threads; `None` lets rayon decide.
    pub jobs: Option<usize>,
    /// Fail the run if the report has any warning.
    pub strict: bool,
}

impl ConversionConfig {
    /// Creates a config with default settings for `dataset_root`.
    pub fn new(dataset_root: impl Into<PathBuf>) -> Self {
        let dataset_root = dataset_root.into();
        Self {
            output_path: default_output_path(&dataset_root),
            dataset_root,
            class_definition_path: None,
            source_ref_prefix: None,
            splits: DEFAULT_SPLITS.iter().map(|s| s.to_string()).collect(),
            jobs: None,
            strict: false,
        }
    }

    /// Turns a merged layer into a config, applying defaults.
    pub fn resolve(layer: ConfigLayer) -> Result<Self, Yolo2GtError> {
        let dataset_root = layer.dataset_root.ok_or_else(|| {
            Yolo2GtError::ConfigInvalid("datasetRoot is required".to_string())
        })?;

        if layer.jobs == Some(0) {
            return Err(Yolo2GtError::ConfigInvalid(
                "jobs must be at least 1".to_string(),
            ));
        }

        let mut config = Self::new(dataset_root);

        if let Some(splits) = layer.splits {
            if splits.is_empty() {
                return Err(Yolo2GtError::ConfigInvalid(
                    "at least one split is required".to_string(),
                ));
            }
            if let Some(bad) = splits
                .iter()
                .find(|s| s.is_empty() || s.contains(|c| c == '/' || c == '\\'))
            {
                return Err(Yolo2GtError::ConfigInvalid(format!(
                    "split '{bad}' must be a plain directory name"
                )));
            }
            config.splits = splits;
        }

        if let Some(output_path) = layer.output_path {
            config.output_path = output_path;
        }
        config.class_definition_path = layer.class_definition_path;
        config.source_ref_prefix = layer.source_ref_prefix.filter(|p| !p.is_empty());
        config.jobs = layer.jobs;
        config.strict = layer.strict.unwrap_or(false);

        Ok(config)
    }
}

/// `<parent>/<dataset name><MANIFEST_SUFFIX>`, a sibling of the dataset dir.
pub fn default_output_path(dataset_root: &Path) -> PathBuf {
    let name = dataset_root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    let file_name = format!("{name}{MANIFEST_SUFFIX}");

    match dataset_root.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}
