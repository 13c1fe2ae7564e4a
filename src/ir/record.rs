//! Ground Truth manifest records.
//!
//! One [`AnnotationRecord`] describes one image: where it lives, its pixel
//! size, the boxes on it, and the fixed metadata block that marks the record
//! as an automated object-detection conversion. The serde layout below is the
//! exact JSON shape a labeling job reads, field names included.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{AbsoluteAnnotation, ClassMap, ImageDimensions};

/// Channel count written into every `image_size` entry.
pub const IMAGE_DEPTH: u32 = 3;

/// Confidence written for every object; label files carry no score.
pub const FULL_CONFIDENCE: f64 = 1.0;

pub const RECORD_TYPE: &str = "groundtruth/object-detection";
pub const HUMAN_ANNOTATED: &str = "yes";
pub const JOB_NAME: &str = "automated_conversion";

/// `strftime` pattern for `creation-date`.
pub const CREATION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A single manifest line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(rename = "source-ref")]
    pub source_ref: String,

    pub detections: Detections,

    #[serde(rename = "detections-metadata")]
    pub metadata: DetectionsMetadata,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detections {
    /// Always exactly one entry.
    pub image_size: Vec<ImageSize>,
    pub annotations: Vec<AbsoluteAnnotation>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl From<ImageDimensions> for ImageSize {
    fn from(dimensions: ImageDimensions) -> Self {
        Self {
            width: dimensions.width,
            height: dimensions.height,
            depth: IMAGE_DEPTH,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionsMetadata {
    /// Parallel to `Detections::annotations`.
    pub objects: Vec<ObjectMetadata>,

    #[serde(rename = "class-map")]
    pub class_map: ClassMap,

    #[serde(rename = "type")]
    pub record_type: String,

    #[serde(rename = "human-annotated")]
    pub human_annotated: String,

    #[serde(rename = "creation-date")]
    pub creation_date: String,

    #[serde(rename = "job-name")]
    pub job_name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub confidence: f64,
}

impl AnnotationRecord {
    /// Assembles a record stamped with the current UTC time.
    pub fn build(
        source_ref: impl Into<String>,
        dimensions: ImageDimensions,
        annotations: Vec<AbsoluteAnnotation>,
        class_map: &ClassMap,
    ) -> Self {
        Self::build_at(source_ref, dimensions, annotations, class_map, Utc::now())
    }

    /// Assembles a record stamped with `created`.
    pub fn build_at(
        source_ref: impl Into<String>,
        dimensions: ImageDimensions,
        annotations: Vec<AbsoluteAnnotation>,
        class_map: &ClassMap,
        created: DateTime<Utc>,
    ) -> Self {
        let objects = vec![
            ObjectMetadata {
                confidence: FULL_CONFIDENCE,
            };
            annotations.len()
        ];

        let record = Self {
            source_ref: source_ref.into(),
            detections: Detections {
                image_size: vec![ImageSize::from(dimensions)],
                annotations,
            },
            metadata: DetectionsMetadata {
                objects,
                class_map: class_map.clone(),
                record_type: RECORD_TYPE.to_string(),
                human_annotated: HUMAN_ANNOTATED.to_string(),
                creation_date: created.format(CREATION_DATE_FORMAT).to_string(),
                job_name: JOB_NAME.to_string(),
            },
        };

        if log::log_enabled!(log::Level::Debug) {
            match serde_json::to_string_pretty(&record) {
                Ok(pretty) => log::debug!("assembled record:\n{pretty}"),
                Err(err) => log::debug!("assembled record for {}: {err}", record.source_ref),
            }
        }

        record
    }

    pub fn annotations(&self) -> &[AbsoluteAnnotation] {
        &self.detections.annotations
    }

    /// The record's image size without the constant depth.
    pub fn dimensions(&self) -> Option<ImageDimensions> {
        self.detections
            .image_size
            .first()
            .map(|size| ImageDimensions::new(size.width, size.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 7, 24, 6, 36, 34).unwrap()
    }

    fn shark_record() -> AnnotationRecord {
        AnnotationRecord::build_at(
            "s3://bucket/train/images/frame26.jpg",
            ImageDimensions::new(720, 720),
            vec![AbsoluteAnnotation {
                class_id: 0,
                top: 216.0,
                left: 288.0,
                height: 288.0,
                width: 144.0,
            }],
            &ClassMap::from_names(["shark"]),
            fixed_time(),
        )
    }

    #[test]
    fn objects_parallel_annotations() {
        let record = shark_record();
        assert_eq!(record.metadata.objects.len(), record.annotations().len());
        assert!(record
            .metadata
            .objects
            .iter()
            .all(|o| o.confidence == FULL_CONFIDENCE));
    }

    #[test]
    fn empty_annotation_list_yields_empty_objects() {
        let record = AnnotationRecord::build_at(
            "img.jpg",
            ImageDimensions::new(10, 10),
            vec![],
            &ClassMap::new(),
            fixed_time(),
        );
        assert!(record.metadata.objects.is_empty());
        assert!(record.annotations().is_empty());
    }

    #[test]
    fn creation_date_has_second_precision() {
        assert_eq!(shark_record().metadata.creation_date, "2022-07-24T06:36:34");
    }

    #[test]
    fn serializes_to_ground_truth_shape() {
        let json = serde_json::to_string(&shark_record()).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"source-ref":"s3://bucket/train/images/frame26.jpg","#,
                r#""detections":{"image_size":[{"width":720,"height":720,"depth":3}],"#,
                r#""annotations":[{"class_id":0,"top":216.0,"left":288.0,"height":288.0,"width":144.0}]},"#,
                r#""detections-metadata":{"objects":[{"confidence":1.0}],"class-map":{"0":"shark"},"#,
                r#""type":"groundtruth/object-detection","human-annotated":"yes","#,
                r#""creation-date":"2022-07-24T06:36:34","job-name":"automated_conversion"}}"#
            )
        );
    }

    #[test]
    fn deserializes_back() {
        let record = shark_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: AnnotationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.dimensions(), Some(ImageDimensions::new(720, 720)));
    }
}
