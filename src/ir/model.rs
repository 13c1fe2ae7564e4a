//! Core types shared by the label reader and the manifest writer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::bbox::BBox;
use super::space::{Normalized, Pixel};

/// Mapping from integer class id to human-readable class name.
///
/// Serializes as a JSON object keyed by the stringified id, in ascending id
/// order, which is the `class-map` shape the labeling pipeline expects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassMap(BTreeMap<u32, String>);

impl ClassMap {
    /// Creates an empty class map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a class map where the i-th name gets id `i`.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            names
                .into_iter()
                .enumerate()
                .map(|(index, name)| (index as u32, name.into()))
                .collect(),
        )
    }

    /// Inserts a name for `id`, returning the previous name if any.
    pub fn insert(&mut self, id: u32, name: impl Into<String>) -> Option<String> {
        self.0.insert(id, name.into())
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.0.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.0.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(id, name)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.0.iter().map(|(id, name)| (*id, name.as_str()))
    }
}

/// Pixel dimensions of an image, read from its header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// One well-formed label line: class id plus a center/size box in `[0, 1]`.
///
/// The range is conventional, not enforced; see
/// [`BBox::is_within_unit_range`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedDetection {
    pub class_id: u32,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedDetection {
    /// The detection's box anchored at its top-left corner.
    #[inline]
    pub fn bbox(&self) -> BBox<Normalized> {
        BBox::from_cxcywh(self.center_x, self.center_y, self.width, self.height)
    }

    /// Converts to pixel space for an image of the given size.
    ///
    /// ```text
    /// top    = (center_y - height / 2) * image_height
    /// left   = (center_x - width / 2)  * image_width
    /// width  = width  * image_width
    /// height = height * image_height
    /// ```
    pub fn to_absolute(&self, dimensions: ImageDimensions) -> AbsoluteAnnotation {
        let px = self
            .bbox()
            .to_pixel(dimensions.width as f64, dimensions.height as f64);
        AbsoluteAnnotation::from_bbox(self.class_id, &px)
    }
}

/// A pixel-space box as written into the manifest's `annotations` array.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbsoluteAnnotation {
    pub class_id: u32,
    pub top: f64,
    pub left: f64,
    pub height: f64,
    pub width: f64,
}

impl AbsoluteAnnotation {
    pub fn from_bbox(class_id: u32, bbox: &BBox<Pixel>) -> Self {
        Self {
            class_id,
            top: bbox.top,
            left: bbox.left,
            height: bbox.height,
            width: bbox.width,
        }
    }

    pub fn bbox(&self) -> BBox<Pixel> {
        BBox::new(self.top, self.left, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(cx: f64, cy: f64, w: f64, h: f64) -> NormalizedDetection {
        NormalizedDetection {
            class_id: 0,
            center_x: cx,
            center_y: cy,
            width: w,
            height: h,
        }
    }

    #[test]
    fn full_frame_box_covers_image() {
        let ann = detection(0.5, 0.5, 1.0, 1.0).to_absolute(ImageDimensions::new(640, 480));
        assert_eq!(ann.top, 0.0);
        assert_eq!(ann.left, 0.0);
        assert_eq!(ann.width, 640.0);
        assert_eq!(ann.height, 480.0);
    }

    #[test]
    fn shark_example_converts_to_expected_pixels() {
        let ann = detection(0.5, 0.5, 0.2, 0.4).to_absolute(ImageDimensions::new(720, 720));
        assert_eq!(ann.class_id, 0);
        assert!((ann.top - 216.0).abs() < 1e-9);
        assert!((ann.left - 288.0).abs() < 1e-9);
        assert!((ann.width - 144.0).abs() < 1e-9);
        assert!((ann.height - 288.0).abs() < 1e-9);
    }

    #[test]
    fn class_id_passes_through() {
        let mut det = detection(0.1, 0.1, 0.1, 0.1);
        det.class_id = 17;
        assert_eq!(det.to_absolute(ImageDimensions::new(10, 10)).class_id, 17);
    }

    #[test]
    fn annotation_serializes_in_manifest_field_order() {
        let ann = AbsoluteAnnotation {
            class_id: 0,
            top: 216.0,
            left: 288.0,
            height: 288.0,
            width: 144.0,
        };
        let json = serde_json::to_string(&ann).unwrap();
        assert_eq!(
            json,
            r#"{"class_id":0,"top":216.0,"left":288.0,"height":288.0,"width":144.0}"#
        );
    }

    #[test]
    fn class_map_serializes_with_string_keys() {
        let map = ClassMap::from_names(["shark", "dolphin"]);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"0":"shark","1":"dolphin"}"#);

        let back: ClassMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn class_map_lookup() {
        let map = ClassMap::from_names(["a", "b"]);
        assert_eq!(map.get(1), Some("b"));
        assert!(!map.contains(2));
        assert_eq!(map.len(), 2);
    }
}
