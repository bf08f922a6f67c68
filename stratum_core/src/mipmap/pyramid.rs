// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The mipmap pyramid: a base image plus lazily derived levels.

use kurbo::Affine;

use super::cache::{DerivedLevel, LevelCache};
use super::level::{MipmapConfig, pow2, size_for_level};
use crate::backend::{Address, CompositeMode, Filter, GraphicsBackend, ImageKey};
use crate::color::ColorMatrix;
use crate::context::{DrawContext, DrawTarget};
use crate::rect::PixelRect;
use crate::trace::{
    DrawKind, DrawSkippedEvent, LevelDerivedEvent, LevelUnrepresentableEvent,
    MipmapsReleasedEvent, SkipReason,
};
use crate::vertex::MeshVertex;

/// How a pyramid's base image was created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Origin {
    Image { volatile: bool },
    Screen,
}

/// A base image and a cache of its derived mipmap levels.
///
/// Every operation that changes the base content releases the derived
/// images, so a cached level always reflects the current base.
///
/// A pyramid owns backend images but does not hold the backend; every
/// operation borrows it through a [`DrawContext`]. Call
/// [`dispose`](Self::dispose) to release the images. Any use after that
/// panics.
#[derive(Debug)]
pub struct Pyramid {
    width: u32,
    height: u32,
    origin: Origin,
    base: Option<ImageKey>,
    levels: LevelCache,
    config: MipmapConfig,
}

impl Pyramid {
    /// Creates a pyramid over a fresh transparent image.
    ///
    /// Volatile pyramids never derive mipmaps.
    #[must_use]
    pub fn new(backend: &mut dyn GraphicsBackend, width: u32, height: u32, volatile: bool) -> Self {
        let base = backend.new_image(width, height, volatile);
        Self::from_base(base, width, height, Origin::Image { volatile })
    }

    /// Creates a pyramid over the backend's screen framebuffer.
    ///
    /// Screen pyramids are drawn into, not sampled at reduced scale, and are
    /// treated as volatile by level selection.
    #[must_use]
    pub fn new_screen_target(backend: &mut dyn GraphicsBackend, width: u32, height: u32) -> Self {
        let base = backend.new_screen_framebuffer_image(width, height);
        Self::from_base(base, width, height, Origin::Screen)
    }

    fn from_base(base: ImageKey, width: u32, height: u32, origin: Origin) -> Self {
        Self {
            width,
            height,
            origin,
            base: Some(base),
            levels: LevelCache::new(),
            config: MipmapConfig::DEFAULT,
        }
    }

    /// Replaces the level-selection configuration.
    ///
    /// # Panics
    ///
    /// Panics if `config.max_level` is negative.
    #[must_use]
    pub fn with_config(mut self, config: MipmapConfig) -> Self {
        assert!(
            config.max_level >= 0,
            "max_level must be non-negative but was {}",
            config.max_level
        );
        self.config = config;
        self
    }

    /// The level-selection configuration.
    #[must_use]
    pub const fn config(&self) -> &MipmapConfig {
        &self.config
    }

    /// Logical size of the base image.
    #[must_use]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns `true` if the base image was created volatile.
    #[must_use]
    pub const fn is_volatile(&self) -> bool {
        matches!(self.origin, Origin::Image { volatile: true })
    }

    /// Returns `true` if the base image is the screen framebuffer.
    #[must_use]
    pub const fn is_screen(&self) -> bool {
        matches!(self.origin, Origin::Screen)
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.base.is_none()
    }

    /// The base image.
    ///
    /// # Panics
    ///
    /// Panics if the pyramid has been disposed.
    #[must_use]
    pub fn base_image(&self) -> ImageKey {
        match self.base {
            Some(base) => base,
            None => panic!("pyramid used after dispose"),
        }
    }

    /// Number of cached (rectangle, level) entries, including unrepresentable
    /// ones.
    #[must_use]
    pub fn cached_level_count(&self) -> usize {
        self.levels.len()
    }

    /// The cached entry for `rect` at `level`, without deriving it.
    #[must_use]
    pub fn cached_level(&self, rect: PixelRect, level: i32) -> Option<DerivedLevel> {
        self.levels.get(rect, level)
    }

    const fn supports_mipmaps(&self) -> bool {
        matches!(self.origin, Origin::Image { volatile: false })
    }

    /// Fills the base image with one RGBA color.
    ///
    /// # Panics
    ///
    /// Panics if the pyramid has been disposed.
    pub fn fill(&mut self, ctx: &mut DrawContext<'_>, rgba: [u8; 4]) {
        let base = self.base_image();
        ctx.backend.fill(base, rgba);
        self.dispose_mipmaps(ctx);
    }

    /// Overwrites the whole base image with RGBA bytes.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len() != 4 * width * height` or the pyramid has been
    /// disposed.
    pub fn replace_pixels(&mut self, ctx: &mut DrawContext<'_>, pixels: &[u8]) {
        let base = self.base_image();
        let expected = 4 * self.width as usize * self.height as usize;
        assert!(
            pixels.len() == expected,
            "replace_pixels expects {expected} bytes but got {}",
            pixels.len()
        );
        let region = PixelRect::from_size(self.width, self.height);
        ctx.backend.replace_pixels(base, pixels, region);
        self.dispose_mipmaps(ctx);
    }

    /// Reads one RGBA pixel of the base image.
    ///
    /// # Panics
    ///
    /// Panics if (`x`, `y`) lies outside the image or the pyramid has been
    /// disposed.
    pub fn at(&self, ctx: &mut DrawContext<'_>, x: u32, y: u32) -> [u8; 4] {
        let base = self.base_image();
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) is outside the {}x{} image",
            self.width,
            self.height
        );
        ctx.backend.pixel_at(base, x, y)
    }

    /// Draws `bounds` of `src`, transformed by `geom`, into this pyramid.
    ///
    /// The source is sampled from whichever mipmap level suits the transform
    /// and filter. A degenerate transform (zero or NaN determinant) draws
    /// nothing and leaves this pyramid's cache intact. A scale-only
    /// `color_matrix` is folded into the vertex colors.
    ///
    /// # Panics
    ///
    /// Panics if either pyramid has been disposed.
    pub fn draw_image(
        &mut self,
        ctx: &mut DrawContext<'_>,
        src: &mut Self,
        bounds: PixelRect,
        geom: &Affine,
        color_matrix: &ColorMatrix,
        mode: CompositeMode,
        filter: Filter,
    ) {
        let dst = self.base_image();
        let src_base = src.base_image();

        let det = geom.determinant();
        if det == 0.0 || det.is_nan() {
            ctx.tracer.draw_skipped(&DrawSkippedEvent {
                dst,
                reason: SkipReason::DegenerateTransform,
            });
            return;
        }

        let (width, height) = (bounds.width(), bounds.height());
        let mut level = src.mipmap_level(geom, width, height, filter);
        if level > 0 {
            while level >= 0 && (shr(width, level) == 0 || shr(height, level) == 0) {
                level -= 1;
            }
            if level < 0 {
                ctx.tracer.draw_skipped(&DrawSkippedEvent {
                    dst,
                    reason: SkipReason::SourceTooSmall,
                });
                return;
            }
        }
        let max_level = src.config.max_level;
        level = level.clamp(-max_level, max_level);

        let (color, color_matrix) = if color_matrix.is_scale_only() {
            (color_matrix.scale_factors(), None)
        } else {
            ([1.0; 4], Some(color_matrix))
        };
        let target = move |src, level| DrawTarget {
            dst,
            src,
            kind: DrawKind::Image,
            level,
            color_matrix,
            mode,
            filter,
            address: Address::ClampToZero,
        };

        if level == 0 {
            ctx.draw_quad(&target(src_base, 0), bounds, geom, color);
        } else if let Some(image) = src.level(ctx, bounds, level) {
            let (w, h) = size_for_level(width, height, level);
            let s = pow2(level);
            let [a, c, b, d, tx, ty] = geom.as_coeffs();
            let scaled = Affine::new([a * s, c * s, b * s, d * s, tx, ty]);
            ctx.draw_quad(&target(image, level), PixelRect::from_size(w, h), &scaled, color);
        } else {
            ctx.tracer.draw_skipped(&DrawSkippedEvent {
                dst,
                reason: SkipReason::LevelUnrepresentable,
            });
        }
        self.dispose_mipmaps(ctx);
    }

    /// Draws an indexed mesh sampled from the base image of `src`.
    ///
    /// Every vertex clamps its samples to `bounds`. Mesh draws never use
    /// mipmaps. An identity `color_matrix` is dropped from the batch.
    ///
    /// # Panics
    ///
    /// Panics if either pyramid has been disposed.
    pub fn draw_triangles(
        &mut self,
        ctx: &mut DrawContext<'_>,
        src: &Self,
        bounds: PixelRect,
        vertices: &[MeshVertex],
        indices: &[u16],
        color_matrix: &ColorMatrix,
        mode: CompositeMode,
        filter: Filter,
        address: Address,
    ) {
        let target = DrawTarget {
            dst: self.base_image(),
            src: src.base_image(),
            kind: DrawKind::Triangles,
            level: 0,
            color_matrix: (*color_matrix != ColorMatrix::IDENTITY).then_some(color_matrix),
            mode,
            filter,
            address,
        };
        ctx.draw_mesh(&target, bounds, vertices, indices);
        self.dispose_mipmaps(ctx);
    }

    /// Returns the image holding `rect` of the base at `level`, deriving it
    /// (and any intermediate levels) on first use.
    ///
    /// Level `L > 0` is drawn from level `L - 1` at half size with linear
    /// filtering; level `L < 0` from level `L + 1` at double size with
    /// nearest filtering. Returns `None` if the level, or a level it depends
    /// on, has zero width or height. That outcome is cached too.
    ///
    /// # Panics
    ///
    /// Panics if `level` is zero, if the pyramid is volatile or a screen
    /// target, or if it has been disposed.
    pub fn level(
        &mut self,
        ctx: &mut DrawContext<'_>,
        rect: PixelRect,
        level: i32,
    ) -> Option<ImageKey> {
        assert!(level != 0, "mipmap level must be non-zero");
        assert!(
            self.supports_mipmaps(),
            "mipmaps are not supported on volatile or screen pyramids"
        );
        let base = self.base_image();

        if let Some(cached) = self.levels.get(rect, level) {
            return cached.image();
        }

        let prev = level - level.signum();
        let (src, src_rect) = if prev == 0 {
            (base, rect)
        } else {
            let Some(src) = self.level(ctx, rect, prev) else {
                self.mark_unrepresentable(ctx, rect, level);
                return None;
            };
            let (w, h) = size_for_level(rect.width(), rect.height(), prev);
            (src, PixelRect::from_size(w, h))
        };
        let (scale, filter) = if level > 0 {
            (0.5, Filter::Linear)
        } else {
            (2.0, Filter::Nearest)
        };

        let (width, height) = size_for_level(rect.width(), rect.height(), level);
        if width == 0 || height == 0 {
            self.mark_unrepresentable(ctx, rect, level);
            return None;
        }

        let image = ctx.backend.new_image(width, height, false);
        let target = DrawTarget {
            dst: image,
            src,
            kind: DrawKind::Derive,
            level: prev,
            color_matrix: None,
            mode: CompositeMode::Copy,
            filter,
            address: Address::ClampToZero,
        };
        ctx.draw_quad(&target, src_rect, &Affine::scale(scale), [1.0; 4]);
        self.levels.insert(rect, level, DerivedLevel::Image(image));
        ctx.tracer.level_derived(&LevelDerivedEvent {
            rect,
            level,
            width,
            height,
            image,
        });
        Some(image)
    }

    fn mark_unrepresentable(&mut self, ctx: &mut DrawContext<'_>, rect: PixelRect, level: i32) {
        self.levels.insert(rect, level, DerivedLevel::Unrepresentable);
        ctx.tracer
            .level_unrepresentable(&LevelUnrepresentableEvent { rect, level });
    }

    /// The level [`draw_image`](Self::draw_image) would start from when this
    /// pyramid is the source, before size adjustment and clamping.
    ///
    /// # Panics
    ///
    /// Panics if the determinant of `geom` is zero or NaN.
    #[must_use]
    pub fn mipmap_level(&self, geom: &Affine, width: u32, height: u32, filter: Filter) -> i32 {
        self.config
            .select_level(geom, width, height, filter, !self.supports_mipmaps())
    }

    /// Clears the base image's framebuffer.
    ///
    /// # Panics
    ///
    /// Panics if the pyramid has been disposed.
    pub fn clear_framebuffer(&mut self, ctx: &mut DrawContext<'_>) {
        let base = self.base_image();
        ctx.backend.clear_framebuffer(base);
    }

    /// Releases every derived image and empties the cache.
    ///
    /// # Panics
    ///
    /// Panics if the pyramid has been disposed.
    pub fn dispose_mipmaps(&mut self, ctx: &mut DrawContext<'_>) {
        let base = self.base_image();
        if self.levels.len() == 0 {
            return;
        }
        let backend = &mut *ctx.backend;
        let count = self.levels.drain_images(|image| backend.dispose(image));
        ctx.tracer
            .mipmaps_released(&MipmapsReleasedEvent { base, count });
    }

    /// Releases the base image and every derived image.
    ///
    /// # Panics
    ///
    /// Panics if the pyramid has already been disposed.
    pub fn dispose(&mut self, ctx: &mut DrawContext<'_>) {
        assert!(!self.is_disposed(), "pyramid disposed twice");
        self.dispose_mipmaps(ctx);
        ctx.backend.dispose(self.base_image());
        self.base = None;
    }
}

/// `value >> shift`, or zero once the shift reaches the bit width.
fn shr(value: u32, shift: i32) -> u32 {
    u32::try_from(shift)
        .ok()
        .and_then(|s| value.checked_shr(s))
        .unwrap_or(0)
}
