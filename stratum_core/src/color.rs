// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color transforms applied while drawing.
//!
//! Only the small surface the compositing core needs lives here: detecting a
//! pure per-channel scale (which the core folds into per-vertex colors) and
//! applying a matrix to a single color for backends that run on the CPU.

/// A 4×5 affine color transform over straight-alpha RGBA in `0.0..=1.0`.
///
/// The body is row-major: output channel `i` is
/// `sum(body[i * 4 + j] * input[j]) + translation[i]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMatrix {
    body: [f32; 16],
    translation: [f32; 4],
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ColorMatrix {
    /// The identity transform.
    pub const IDENTITY: Self = Self::from_scale(1.0, 1.0, 1.0, 1.0);

    /// Creates a transform from a row-major body and a translation column.
    #[inline]
    #[must_use]
    pub const fn new(body: [f32; 16], translation: [f32; 4]) -> Self {
        Self { body, translation }
    }

    /// Creates a transform that scales each channel independently.
    #[inline]
    #[must_use]
    pub const fn from_scale(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            body: [
                r, 0.0, 0.0, 0.0, //
                0.0, g, 0.0, 0.0, //
                0.0, 0.0, b, 0.0, //
                0.0, 0.0, 0.0, a,
            ],
            translation: [0.0; 4],
        }
    }

    /// Returns the row-major body.
    #[inline]
    #[must_use]
    pub const fn body(&self) -> &[f32; 16] {
        &self.body
    }

    /// Returns the translation column.
    #[inline]
    #[must_use]
    pub const fn translation(&self) -> &[f32; 4] {
        &self.translation
    }

    /// Returns `true` if the transform only scales channels: no translation
    /// and no mixing between channels.
    #[must_use]
    pub fn is_scale_only(&self) -> bool {
        if self.translation.iter().any(|&t| t != 0.0) {
            return false;
        }
        self.body
            .iter()
            .enumerate()
            .all(|(i, &v)| i / 4 == i % 4 || v == 0.0)
    }

    /// Returns the diagonal of the body as `[r, g, b, a]`.
    ///
    /// Meaningful as a complete description of the transform only when
    /// [`is_scale_only`](Self::is_scale_only) holds.
    #[inline]
    #[must_use]
    pub const fn scale_factors(&self) -> [f32; 4] {
        [self.body[0], self.body[5], self.body[10], self.body[15]]
    }

    /// Applies the transform to a straight-alpha color, clamping each output
    /// channel to `0.0..=1.0`.
    #[must_use]
    pub fn apply(&self, color: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (i, channel) in out.iter_mut().enumerate() {
            let row = &self.body[i * 4..i * 4 + 4];
            let v = row[0] * color[0]
                + row[1] * color[1]
                + row[2] * color[2]
                + row[3] * color[3]
                + self.translation[i];
            *channel = v.clamp(0.0, 1.0);
        }
        out
    }
}
