//! Coordinate space markers.
//!
//! Label files describe boxes as fractions of the image, while the manifest
//! wants pixels. These zero-sized types tag a [`BBox`](super::BBox) with the
//! space it lives in so the two can never be mixed up.

use std::fmt;

/// Absolute pixel space, origin at the top-left corner of the image.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Resolution-independent space where `1.0` spans the full image side.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
