// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CPU reference backend for `stratum_core`.
//!
//! [`SoftBackend`] implements [`GraphicsBackend`] over in-memory premultiplied
//! RGBA8 images. It rasterizes textured triangles with the same sampling,
//! address and blending rules a GPU backend is expected to follow, which
//! makes it useful for tests, headless rendering and checking what a
//! pyramid actually produces.
//!
//! Bytes passed to `replace_pixels` and returned from `pixel_at` are stored
//! and returned unchanged; callers supply premultiplied data.
//!
//! # Example
//!
//! ```
//! use kurbo::Affine;
//! use stratum_backend_soft::SoftBackend;
//! use stratum_core::backend::{CompositeMode, Filter};
//! use stratum_core::color::ColorMatrix;
//! use stratum_core::context::DrawContext;
//! use stratum_core::mipmap::Pyramid;
//! use stratum_core::rect::PixelRect;
//! use stratum_core::vertex::VertexArena;
//!
//! let mut backend = SoftBackend::new();
//! let mut arena = VertexArena::new();
//! let mut src = Pyramid::new(&mut backend, 2, 2, false);
//! let mut dst = Pyramid::new(&mut backend, 4, 4, false);
//!
//! let mut ctx = DrawContext::new(&mut backend, &mut arena);
//! src.fill(&mut ctx, [255, 0, 0, 255]);
//! dst.draw_image(
//!     &mut ctx,
//!     &mut src,
//!     PixelRect::from_size(2, 2),
//!     &Affine::translate((1.0, 1.0)),
//!     &ColorMatrix::IDENTITY,
//!     CompositeMode::SourceOver,
//!     Filter::Nearest,
//! );
//! assert_eq!(dst.at(&mut ctx, 0, 0), [0, 0, 0, 0]);
//! assert_eq!(dst.at(&mut ctx, 2, 2), [255, 0, 0, 255]);
//! ```

mod image;
mod raster;

use std::collections::HashMap;

use stratum_core::backend::{GraphicsBackend, ImageKey, TriangleBatch};
use stratum_core::rect::PixelRect;

use crate::image::SoftImage;

/// A [`GraphicsBackend`] that renders into CPU memory.
///
/// Every method that takes an [`ImageKey`] panics if the key was not issued
/// by this backend or has been disposed.
#[derive(Debug, Default)]
pub struct SoftBackend {
    images: HashMap<ImageKey, SoftImage>,
    next_key: u64,
}

impl SoftBackend {
    /// Creates a backend with no images.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, image: SoftImage) -> ImageKey {
        self.next_key += 1;
        let key = ImageKey(self.next_key);
        self.images.insert(key, image);
        key
    }

    fn image(&self, key: ImageKey) -> &SoftImage {
        match self.images.get(&key) {
            Some(image) => image,
            None => panic!("unknown image {key:?}"),
        }
    }

    fn image_mut(&mut self, key: ImageKey) -> &mut SoftImage {
        match self.images.get_mut(&key) {
            Some(image) => image,
            None => panic!("unknown image {key:?}"),
        }
    }

    /// Returns the image's pixels as premultiplied RGBA bytes, row by row.
    #[must_use]
    pub fn pixels(&self, key: ImageKey) -> &[u8] {
        self.image(key).bytes()
    }

    /// Returns the image's `(width, height)`.
    #[must_use]
    pub fn size(&self, key: ImageKey) -> (u32, u32) {
        let image = self.image(key);
        (image.width, image.height)
    }

    /// Number of live images.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Whether the image was created as volatile.
    #[must_use]
    pub fn is_volatile(&self, key: ImageKey) -> bool {
        self.image(key).volatile
    }

    /// Whether the image stands in for the screen framebuffer.
    #[must_use]
    pub fn is_screen(&self, key: ImageKey) -> bool {
        self.image(key).screen
    }
}

impl GraphicsBackend for SoftBackend {
    fn new_image(&mut self, width: u32, height: u32, volatile: bool) -> ImageKey {
        self.insert(SoftImage::new(width, height, volatile, false))
    }

    fn new_screen_framebuffer_image(&mut self, width: u32, height: u32) -> ImageKey {
        self.insert(SoftImage::new(width, height, false, true))
    }

    fn draw_triangles(&mut self, dst: ImageKey, src: ImageKey, batch: &TriangleBatch<'_>) {
        if dst == src {
            let snapshot = self.image(src).clone();
            raster::draw_batch(self.image_mut(dst), &snapshot, batch);
            return;
        }
        let Some(mut target) = self.images.remove(&dst) else {
            panic!("unknown image {dst:?}");
        };
        raster::draw_batch(&mut target, self.image(src), batch);
        self.images.insert(dst, target);
    }

    fn replace_pixels(&mut self, image: ImageKey, pixels: &[u8], region: PixelRect) {
        self.image_mut(image).replace(pixels, region);
    }

    fn fill(&mut self, image: ImageKey, rgba: [u8; 4]) {
        self.image_mut(image).fill(rgba);
    }

    fn pixel_at(&mut self, image: ImageKey, x: u32, y: u32) -> [u8; 4] {
        self.image(image).get(x, y)
    }

    fn clear_framebuffer(&mut self, image: ImageKey) {
        self.image_mut(image).fill([0; 4]);
    }

    fn dispose(&mut self, image: ImageKey) {
        if self.images.remove(&image).is_none() {
            panic!("unknown image {image:?}");
        }
    }
}
