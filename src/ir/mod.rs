//! Typed data model for the YOLO → Ground Truth conversion.
//!
//! Label files are read into [`NormalizedDetection`]s, converted to
//! pixel-space [`AbsoluteAnnotation`]s, and assembled into one
//! [`AnnotationRecord`] per image. Coordinate spaces are tracked with the
//! [`Pixel`] and [`Normalized`] marker types on [`BBox`], so a normalized box
//! cannot end up in the manifest without going through
//! [`BBox::to_pixel`].
//!
//! # Example
//!
//! ```
//! use yolo2gt::ir::{ClassMap, ImageDimensions, NormalizedDetection, AnnotationRecord};
//!
//! let detection = NormalizedDetection {
//!     class_id: 0,
//!     center_x: 0.5,
//!     center_y: 0.5,
//!     width: 0.2,
//!     height: 0.4,
//! };
//! let dims = ImageDimensions::new(720, 720);
//! let ann = detection.to_absolute(dims);
//! assert!((ann.left - 288.0).abs() < 1e-9);
//!
//! let record = AnnotationRecord::build(
//!     "s3://bucket/train/images/frame.jpg",
//!     dims,
//!     vec![ann],
//!     &ClassMap::from_names(["shark"]),
//! );
//! assert_eq!(record.metadata.objects.len(), 1);
//! ```

mod bbox;
pub mod io_manifest;
pub mod io_yolo;
mod model;
mod record;
mod space;

pub use bbox::{BBox, UNIT_RANGE_TOLERANCE};
pub use model::{AbsoluteAnnotation, ClassMap, ImageDimensions, NormalizedDetection};
pub use record::{
    AnnotationRecord, Detections, DetectionsMetadata, ImageSize, ObjectMetadata,
    CREATION_DATE_FORMAT, FULL_CONFIDENCE, HUMAN_ANNOTATED, IMAGE_DEPTH, JOB_NAME, RECORD_TYPE,
};
pub use space::{Normalized, Pixel};
