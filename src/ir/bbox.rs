//! Bounding boxes in top/left/width/height form.

use std::fmt;
use std::marker::PhantomData;

use super::{Normalized, Pixel};

/// Slack allowed when checking that a normalized box stays on the image.
///
/// Exporters commonly round to six decimals, so `1.0000001` is not an error.
pub const UNIT_RANGE_TOLERANCE: f64 = 1e-6;

/// An axis-aligned box anchored at its top-left corner.
///
/// The `TSpace` parameter is either [`Pixel`] or [`Normalized`]. Construction
/// never rejects values: negative or oversized boxes are representable so that
/// the conversion report can flag them instead of the parser aborting.
#[derive(Clone, Copy, PartialEq)]
pub struct BBox<TSpace> {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBox<TSpace> {
    #[inline]
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
            _space: PhantomData,
        }
    }

    /// Bottom edge (`top + height`).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Right edge (`left + width`).
    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Returns true if every component is finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.top.is_finite()
            && self.left.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

impl BBox<Normalized> {
    /// Builds a box from the center/size form used by YOLO label lines.
    #[inline]
    pub fn from_cxcywh(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self::new(cy - h / 2.0, cx - w / 2.0, w, h)
    }

    /// Returns true if the box lies inside the unit square with non-negative size.
    pub fn is_within_unit_range(&self) -> bool {
        let lo = -UNIT_RANGE_TOLERANCE;
        let hi = 1.0 + UNIT_RANGE_TOLERANCE;
        self.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
            && self.top >= lo
            && self.left >= lo
            && self.bottom() <= hi
            && self.right() <= hi
    }

    /// Scales into pixel space.
    ///
    /// No clamping or rounding happens here: a box hanging off the image in
    /// normalized space hangs off it by the same fraction in pixels.
    pub fn to_pixel(&self, image_width: f64, image_height: f64) -> BBox<Pixel> {
        BBox::new(
            self.top * image_height,
            self.left * image_width,
            self.width * image_width,
            self.height * image_height,
        )
    }
}

impl<TSpace> fmt::Debug for BBox<TSpace> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BBox")
            .field("top", &self.top)
            .field("left", &self.left)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
