// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer pixel rectangles.

use core::fmt;

/// An axis-aligned rectangle in pixel coordinates, half-open: `[min, max)`.
///
/// Rectangles are totally ordered (lexicographically by `min_x`, `min_y`,
/// `max_x`, `max_y`) so they can key ordered maps.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PixelRect {
    /// Left edge (inclusive).
    pub min_x: i32,
    /// Top edge (inclusive).
    pub min_y: i32,
    /// Right edge (exclusive).
    pub max_x: i32,
    /// Bottom edge (exclusive).
    pub max_y: i32,
}

impl PixelRect {
    /// Creates a rectangle from its origin and size.
    ///
    /// # Panics
    ///
    /// Panics if the far edge does not fit in an `i32`.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        let Some(max_x) = x.checked_add(width) else {
            panic!("rectangle right edge overflows i32");
        };
        let Some(max_y) = y.checked_add(height) else {
            panic!("rectangle bottom edge overflows i32");
        };
        Self {
            min_x: x,
            min_y: y,
            max_x,
            max_y,
        }
    }

    /// Creates a rectangle from its corners.
    #[inline]
    #[must_use]
    pub const fn from_min_max(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates a rectangle at the origin with the given size.
    ///
    /// # Panics
    ///
    /// Panics if either dimension does not fit in an `i32`.
    #[must_use]
    pub fn from_size(width: u32, height: u32) -> Self {
        let width = i32::try_from(width).expect("rectangle width overflows i32");
        let height = i32::try_from(height).expect("rectangle height overflows i32");
        Self::new(0, 0, width, height)
    }

    /// Width in pixels; zero for inverted rectangles.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        u32::try_from(self.max_x - self.min_x).unwrap_or(0)
    }

    /// Height in pixels; zero for inverted rectangles.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        u32::try_from(self.max_y - self.min_y).unwrap_or(0)
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    /// Returns `true` if the pixel at (`x`, `y`) lies inside the rectangle.
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        self.min_x <= x && x < self.max_x && self.min_y <= y && y < self.max_y
    }

    /// Returns `true` if both rectangles are non-empty and share at least one
    /// pixel.
    #[inline]
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }
}

impl fmt::Debug for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelRect({},{}-{},{})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}
