// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Memo table of derived mipmap levels.

use alloc::collections::BTreeMap;

use crate::backend::ImageKey;
use crate::rect::PixelRect;

/// A cached result for one (source rectangle, level) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DerivedLevel {
    /// The level was rendered into this image, owned by the pyramid.
    Image(ImageKey),
    /// The level collapses to zero pixels and is never derived.
    Unrepresentable,
}

impl DerivedLevel {
    /// Returns the image, if the level is representable.
    #[must_use]
    pub const fn image(self) -> Option<ImageKey> {
        match self {
            Self::Image(key) => Some(key),
            Self::Unrepresentable => None,
        }
    }
}

/// Derived levels keyed by (source rectangle, level).
///
/// Level 0 is the base image and is never stored here.
#[derive(Clone, Debug, Default)]
pub(crate) struct LevelCache {
    entries: BTreeMap<(PixelRect, i32), DerivedLevel>,
}

impl LevelCache {
    pub(crate) const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub(crate) fn get(&self, rect: PixelRect, level: i32) -> Option<DerivedLevel> {
        self.entries.get(&(rect, level)).copied()
    }

    pub(crate) fn insert(&mut self, rect: PixelRect, level: i32, entry: DerivedLevel) {
        debug_assert!(level != 0, "level 0 is the base image");
        self.entries.insert((rect, level), entry);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Empties the cache, handing every owned image to `release`.
    ///
    /// Returns the number of images released.
    pub(crate) fn drain_images(&mut self, mut release: impl FnMut(ImageKey)) -> usize {
        let mut count = 0;
        for entry in core::mem::take(&mut self.entries).into_values() {
            if let DerivedLevel::Image(key) = entry {
                release(key);
                count += 1;
            }
        }
        count
    }
}
