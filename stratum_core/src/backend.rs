// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for graphics integrations.
//!
//! The core never touches GPU objects. Everything it needs from the outside
//! world goes through [`GraphicsBackend`]:
//!
//! - **Image lifetime** — `new_image`, `new_screen_framebuffer_image`,
//!   `dispose`. Images are named by opaque [`ImageKey`]s the backend assigns.
//!
//! - **Drawing** — `draw_triangles` renders a [`TriangleBatch`] sampled from
//!   one image into another. Backends must preserve submission order for
//!   draws into the same destination.
//!
//! - **Pixel access** — `replace_pixels`, `fill`, `pixel_at`,
//!   `clear_framebuffer`.
//!
//! Pixel bytes are RGBA, one byte per channel, in the premultiplied-alpha
//! convention used by the backend's sampler.
//!
//! # Crate boundaries
//!
//! `stratum_core` owns the caching, geometry and bookkeeping. Backend crates
//! depend on `stratum_core` and implement this trait; tests implement it
//! with recording doubles.

use core::fmt;

use crate::color::ColorMatrix;
use crate::rect::PixelRect;
use crate::vertex::Vertex;

/// Indices that triangulate the four vertices of
/// [`quad_vertices`](crate::geometry::quad_vertices) into two triangles.
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 1, 2, 3];

/// An opaque handle to a backend-managed image.
///
/// Keys are assigned by backends and passed through the core without
/// interpretation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageKey(pub u64);

impl fmt::Debug for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageKey({})", self.0)
    }
}

/// Blend factor applied to one side of a [`CompositeMode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// `0`.
    Zero,
    /// `1`.
    One,
    /// Source alpha.
    SrcAlpha,
    /// Destination alpha.
    DstAlpha,
    /// `1 - source alpha`.
    OneMinusSrcAlpha,
    /// `1 - destination alpha`.
    OneMinusDstAlpha,
}

impl BlendFactor {
    /// Evaluates the factor for the given source and destination alphas.
    #[inline]
    #[must_use]
    pub fn eval(self, src_alpha: f32, dst_alpha: f32) -> f32 {
        match self {
            Self::Zero => 0.0,
            Self::One => 1.0,
            Self::SrcAlpha => src_alpha,
            Self::DstAlpha => dst_alpha,
            Self::OneMinusSrcAlpha => 1.0 - src_alpha,
            Self::OneMinusDstAlpha => 1.0 - dst_alpha,
        }
    }
}

/// How source and destination colors combine.
///
/// All modes operate on premultiplied colors as
/// `out = src * src_factor + dst * dst_factor`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CompositeMode {
    /// Standard source-over alpha compositing.
    #[default]
    SourceOver,
    /// Clears the destination.
    Clear,
    /// Replaces the destination with the source.
    Copy,
    /// Keeps the destination.
    Destination,
    /// Destination over source.
    DestinationOver,
    /// Source where the destination is opaque.
    SourceIn,
    /// Destination where the source is opaque.
    DestinationIn,
    /// Source where the destination is transparent.
    SourceOut,
    /// Destination where the source is transparent.
    DestinationOut,
    /// Source atop destination.
    SourceAtop,
    /// Destination atop source.
    DestinationAtop,
    /// Source or destination, but not both.
    Xor,
    /// Sum of source and destination.
    Lighter,
}

impl CompositeMode {
    /// Returns `(src_factor, dst_factor)` for this mode.
    #[must_use]
    pub const fn blend_factors(self) -> (BlendFactor, BlendFactor) {
        use BlendFactor::{DstAlpha, One, OneMinusDstAlpha, OneMinusSrcAlpha, SrcAlpha, Zero};
        match self {
            Self::SourceOver => (One, OneMinusSrcAlpha),
            Self::Clear => (Zero, Zero),
            Self::Copy => (One, Zero),
            Self::Destination => (Zero, One),
            Self::DestinationOver => (OneMinusDstAlpha, One),
            Self::SourceIn => (DstAlpha, Zero),
            Self::DestinationIn => (Zero, SrcAlpha),
            Self::SourceOut => (OneMinusDstAlpha, Zero),
            Self::DestinationOut => (Zero, OneMinusSrcAlpha),
            Self::SourceAtop => (DstAlpha, OneMinusSrcAlpha),
            Self::DestinationAtop => (OneMinusDstAlpha, SrcAlpha),
            Self::Xor => (OneMinusDstAlpha, OneMinusSrcAlpha),
            Self::Lighter => (One, One),
        }
    }
}

/// Texture sampling filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Nearest-neighbor sampling.
    #[default]
    Nearest,
    /// Bilinear sampling.
    Linear,
}

/// How samples outside a vertex's source bounds are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Address {
    /// Texels outside the source bounds read as transparent black.
    #[default]
    ClampToZero,
    /// Texel coordinates wrap around the source bounds.
    Repeat,
}

/// One indexed triangle batch submitted to [`GraphicsBackend::draw_triangles`].
#[derive(Clone, Copy, Debug)]
pub struct TriangleBatch<'a> {
    /// Vertices referenced by `indices`.
    pub vertices: &'a [Vertex],
    /// Triangle list indices, three per triangle.
    pub indices: &'a [u16],
    /// Optional color transform applied to sampled colors before the
    /// per-vertex color scale.
    pub color_matrix: Option<&'a ColorMatrix>,
    /// Blend mode.
    pub mode: CompositeMode,
    /// Sampling filter.
    pub filter: Filter,
    /// Address mode.
    pub address: Address,
}

/// The primitives the compositing core consumes from a graphics backend.
pub trait GraphicsBackend {
    /// Allocates a transparent image of the given size.
    ///
    /// Volatile images may lose their content between frames; backends may
    /// skip restoration bookkeeping for them.
    fn new_image(&mut self, width: u32, height: u32, volatile: bool) -> ImageKey;

    /// Returns an image backed by the screen framebuffer.
    fn new_screen_framebuffer_image(&mut self, width: u32, height: u32) -> ImageKey;

    /// Draws `batch`, sampling from `src`, into `dst`.
    fn draw_triangles(&mut self, dst: ImageKey, src: ImageKey, batch: &TriangleBatch<'_>);

    /// Overwrites `region` of `image` with RGBA bytes.
    ///
    /// `pixels.len()` is `4 * region.width() * region.height()`.
    fn replace_pixels(&mut self, image: ImageKey, pixels: &[u8], region: PixelRect);

    /// Fills the entire image with one RGBA color.
    fn fill(&mut self, image: ImageKey, rgba: [u8; 4]);

    /// Reads one RGBA pixel.
    fn pixel_at(&mut self, image: ImageKey, x: u32, y: u32) -> [u8; 4];

    /// Clears the image's framebuffer to transparent black.
    fn clear_framebuffer(&mut self, image: ImageKey);

    /// Releases the image. The key must not be used afterwards.
    fn dispose(&mut self, image: ImageKey);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_over_factors() {
        let (s, d) = CompositeMode::SourceOver.blend_factors();
        assert_eq!(s.eval(0.25, 1.0), 1.0);
        assert_eq!(d.eval(0.25, 1.0), 0.75);
    }

    #[test]
    fn copy_ignores_destination() {
        let (s, d) = CompositeMode::Copy.blend_factors();
        assert_eq!(s, BlendFactor::One);
        assert_eq!(d, BlendFactor::Zero);
    }

    #[test]
    fn quad_indices_cover_two_triangles() {
        assert_eq!(QUAD_INDICES.len(), 6);
        assert!(QUAD_INDICES.iter().all(|&i| i < 4));
    }
}
