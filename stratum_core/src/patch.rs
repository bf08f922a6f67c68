// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sparse storage for rectangular pixel writes.
//!
//! An image whose GPU content may be lost (e.g. on context loss) needs to be
//! able to replay the pixel writes it received. [`PixelPatchStore`] keeps
//! those writes as non-overlapping rectangles of RGBA bytes and can
//! [`apply`](PixelPatchStore::apply) them to a fresh image.
//!
//! Patches never overlap unless they cover exactly the same rectangle, in
//! which case the newer bytes replace the older ones. Any other overlap is a
//! bug in the caller and panics.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::backend::{GraphicsBackend, ImageKey};
use crate::rect::PixelRect;

/// Non-overlapping RGBA patches keyed by their rectangle.
#[derive(Clone, Debug, Default)]
pub struct PixelPatchStore {
    patches: BTreeMap<PixelRect, Vec<u8>>,
    last: Option<PixelRect>,
}

impl PixelPatchStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            patches: BTreeMap::new(),
            last: None,
        }
    }

    /// Records `pixels` as the content of the rectangle at (`x`, `y`) with the
    /// given size.
    ///
    /// The bytes are copied, so the caller may reuse its buffer. A patch for
    /// an identical rectangle is replaced.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is negative, if
    /// `pixels.len() != 4 * width * height`, if the rectangle's far edge
    /// overflows `i32`, or if the rectangle overlaps a stored rectangle
    /// without being identical to it. Nothing is stored in any of these
    /// cases.
    pub fn add_or_replace(&mut self, pixels: &[u8], x: i32, y: i32, width: i32, height: i32) {
        assert!(
            width >= 0 && height >= 0,
            "pixel patch size must be non-negative but was {width}x{height}"
        );
        let expected = patch_len(width, height);
        assert!(
            pixels.len() == expected,
            "pixel patch length must be {expected} but was {}",
            pixels.len()
        );

        let rect = PixelRect::new(x, y, width, height);
        if let Some(existing) = self.patches.get_mut(&rect) {
            existing.clear();
            existing.extend_from_slice(pixels);
            return;
        }
        if let Some(conflict) = self.patches.keys().find(|r| r.overlaps(&rect)) {
            panic!("pixel patch {rect:?} overlaps existing patch {conflict:?}");
        }
        self.patches.insert(rect, pixels.to_vec());
    }

    /// Removes the patch whose rectangle is exactly the given one, if any.
    ///
    /// # Panics
    ///
    /// Panics if the rectangle's far edge overflows `i32`.
    pub fn remove(&mut self, x: i32, y: i32, width: i32, height: i32) {
        let rect = PixelRect::new(x, y, width, height);
        if self.patches.remove(&rect).is_some() && self.last == Some(rect) {
            self.last = None;
        }
    }

    /// Returns the recorded RGBA bytes of the pixel at (`x`, `y`), or `None`
    /// if no patch covers it.
    ///
    /// The most recently hit rectangle is checked first, which makes scans
    /// over one region cheap.
    pub fn at(&mut self, x: i32, y: i32) -> Option<[u8; 4]> {
        let rect = match self.last {
            Some(last) if last.contains(x, y) => last,
            _ => {
                let hit = *self.patches.keys().find(|r| r.contains(x, y))?;
                self.last = Some(hit);
                hit
            }
        };

        let pixels = &self.patches[&rect];
        let row = usize::try_from(y - rect.min_y).ok()?;
        let col = usize::try_from(x - rect.min_x).ok()?;
        let idx = 4 * (row * rect.width() as usize + col);
        let px = pixels.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Replays every patch onto `image` via
    /// [`GraphicsBackend::replace_pixels`].
    ///
    /// Patches are disjoint, so their order does not matter.
    pub fn apply(&self, backend: &mut dyn GraphicsBackend, image: ImageKey) {
        for (rect, pixels) in &self.patches {
            backend.replace_pixels(image, pixels, *rect);
        }
    }

    /// Iterates over the stored patches in rectangle order.
    pub fn iter(&self) -> impl Iterator<Item = (PixelRect, &[u8])> + '_ {
        self.patches.iter().map(|(r, p)| (*r, p.as_slice()))
    }

    /// Number of stored patches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Returns `true` if no patches are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Drops every patch.
    pub fn clear(&mut self) {
        self.patches.clear();
        self.last = None;
    }
}

fn patch_len(width: i32, height: i32) -> usize {
    let w = usize::try_from(width).unwrap_or(0);
    let h = usize::try_from(height).unwrap_or(0);
    4 * w * h
}
