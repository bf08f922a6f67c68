// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mipmap level selection.
//!
//! Positive levels are minified copies (each halves both dimensions),
//! negative levels are magnified copies (each doubles them), and level 0 is
//! the base image.

use kurbo::Affine;

use crate::backend::Filter;

/// Tunables for mipmap level selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MipmapConfig {
    /// Scale extent at or above which a draw counts as extreme magnification.
    pub too_big_scale: f64,
    /// Destination size at which magnified levels stop doubling.
    pub max_magnified_size: u32,
    /// Largest level magnitude a draw may use. Must not be negative.
    pub max_level: i32,
}

impl MipmapConfig {
    /// The stock configuration: magnify past a scale of 128, stop at 1024
    /// pixels, clamp to ±6 levels.
    pub const DEFAULT: Self = Self {
        too_big_scale: 128.0,
        max_magnified_size: 1024,
        max_level: 6,
    };

    /// Selects the level to sample when drawing a `width` × `height` source
    /// through `geom` with `filter`.
    ///
    /// Extreme magnification with nearest filtering walks into negative
    /// levels so edges stay crisp. Linear minification uses
    /// [`mipmap_level_for_downscale`]. Everything else, and any source that
    /// cannot hold mipmaps, uses level 0.
    ///
    /// # Panics
    ///
    /// Panics if the determinant of `geom` is zero or NaN.
    #[must_use]
    pub fn select_level(
        &self,
        geom: &Affine,
        width: u32,
        height: u32,
        filter: Filter,
        no_mipmaps: bool,
    ) -> i32 {
        let det = geom.determinant();
        assert!(!det.is_nan(), "determinant must not be NaN at mipmap level selection");
        assert!(det != 0.0, "determinant must be non-zero at mipmap level selection");

        let (mut sx, mut sy) = geom_scale_size(geom);
        if sx >= self.too_big_scale || sy >= self.too_big_scale {
            if filter != Filter::Nearest || no_mipmaps {
                return 0;
            }
            let (mut w, mut h) = (width, height);
            if w >= self.max_magnified_size || h >= self.max_magnified_size {
                return 0;
            }
            let mut level = 0;
            while (sx >= self.too_big_scale || sy >= self.too_big_scale) && level > -self.max_level {
                level -= 1;
                sx /= 2.0;
                sy /= 2.0;
                w = w.saturating_mul(2);
                h = h.saturating_mul(2);
                if w >= self.max_magnified_size || h >= self.max_magnified_size {
                    break;
                }
            }
            return level;
        }

        if filter != Filter::Linear || no_mipmaps {
            return 0;
        }
        mipmap_level_for_downscale(det)
    }
}

impl Default for MipmapConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Returns the minification level for a transform with determinant `det`:
/// one level per 4× reduction in area.
///
/// # Panics
///
/// Panics if `det` is zero or NaN.
#[must_use]
pub fn mipmap_level_for_downscale(det: f64) -> i32 {
    assert!(!det.is_nan(), "determinant must not be NaN at mipmap_level_for_downscale");
    assert!(det != 0.0, "determinant must be non-zero at mipmap_level_for_downscale");

    let mut d = det.abs();
    let mut level = 0;
    while d < 0.25 {
        level += 1;
        d *= 4.0;
    }
    level
}

/// Returns the size of `level` for a base of `width` × `height`.
///
/// Minified sizes collapse to `(0, 0)` as soon as either dimension reaches
/// zero. Magnified sizes saturate at `u32::MAX`.
#[must_use]
pub fn size_for_level(width: u32, height: u32, level: i32) -> (u32, u32) {
    let (mut w, mut h) = (width, height);
    if level > 0 {
        for _ in 0..level {
            w /= 2;
            h /= 2;
            if w == 0 || h == 0 {
                return (0, 0);
            }
        }
    } else {
        for _ in 0..level.unsigned_abs() {
            w = w.saturating_mul(2);
            h = h.saturating_mul(2);
        }
    }
    (w, h)
}

/// Returns `2^level` for positive and negative levels.
#[must_use]
pub fn pow2(level: i32) -> f64 {
    let factor = if level >= 0 { 2.0 } else { 0.5 };
    let mut x = 1.0;
    for _ in 0..level.unsigned_abs() {
        x *= factor;
    }
    x
}

/// Returns the per-axis extent of the unit square mapped through the linear
/// part of `geom`.
///
/// This approximates how far the source is stretched along each destination
/// axis, independent of rotation.
#[must_use]
pub fn geom_scale_size(geom: &Affine) -> (f64, f64) {
    let [a, c, b, d, _, _] = geom.as_coeffs();
    // Images of (0, 1), (1, 0) and (1, 1); the origin maps to itself.
    let xs = [0.0, b, a, a + b];
    let ys = [0.0, d, c, c + d];
    (extent(&xs), extent(&ys))
}

fn extent(values: &[f64; 4]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    max - min
}

#[cfg(test)]
mod tests {
    use kurbo::Vec2;

    use super::*;

    const CONFIG: MipmapConfig = MipmapConfig::DEFAULT;

    #[test]
    fn downscale_levels() {
        assert_eq!(mipmap_level_for_downscale(1.0), 0);
        assert_eq!(mipmap_level_for_downscale(0.25), 0);
        assert_eq!(mipmap_level_for_downscale(0.2), 1);
        assert_eq!(mipmap_level_for_downscale(0.05), 2);
        // 0.003 * 4^3 = 0.192, still below a quarter.
        assert_eq!(mipmap_level_for_downscale(0.003), 4);
        assert_eq!(mipmap_level_for_downscale(-0.2), 1, "sign is ignored");
    }

    #[test]
    fn downscale_is_monotonic() {
        let mut det = 4.0;
        let mut prev = mipmap_level_for_downscale(det);
        while det > 1e-9 {
            det *= 0.9;
            let level = mipmap_level_for_downscale(det);
            assert!(level >= prev, "level dropped from {prev} to {level} at det {det}");
            prev = level;
        }
    }

    #[test]
    #[should_panic(expected = "determinant must be non-zero")]
    fn downscale_rejects_zero() {
        let _ = mipmap_level_for_downscale(0.0);
    }

    #[test]
    #[should_panic(expected = "determinant must not be NaN")]
    fn downscale_rejects_nan() {
        let _ = mipmap_level_for_downscale(f64::NAN);
    }

    #[test]
    fn sizes_for_levels() {
        assert_eq!(size_for_level(100, 50, 0), (100, 50));
        assert_eq!(size_for_level(100, 50, 2), (25, 12));
        assert_eq!(size_for_level(100, 50, -1), (200, 100));
        assert_eq!(size_for_level(3, 3, 2), (0, 0));
        assert_eq!(size_for_level(8, 1, 1), (0, 0), "one axis collapsing collapses both");
        assert_eq!(size_for_level(u32::MAX, 1, -1), (u32::MAX, 2));
    }

    #[test]
    fn powers_of_two() {
        assert_eq!(pow2(0), 1.0);
        assert_eq!(pow2(3), 8.0);
        assert_eq!(pow2(-2), 0.25);
    }

    #[test]
    fn scale_size_ignores_rotation_and_translation() {
        let geom = Affine::rotate(core::f64::consts::FRAC_PI_2)
            .then_scale(2.0)
            .then_translate(Vec2::new(100.0, -50.0));
        let (sx, sy) = geom_scale_size(&geom);
        assert!((sx - 2.0).abs() < 1e-9, "sx = {sx}");
        assert!((sy - 2.0).abs() < 1e-9, "sy = {sy}");
    }

    #[test]
    fn scale_size_of_shear() {
        // x' = x + y, y' = y: the unit square becomes a parallelogram two wide.
        let geom = Affine::new([1.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
        assert_eq!(geom_scale_size(&geom), (2.0, 1.0));
    }

    #[test]
    fn linear_minification_uses_determinant() {
        let geom = Affine::scale(0.2);
        assert_eq!(CONFIG.select_level(&geom, 64, 64, Filter::Linear, false), 2);
        assert_eq!(CONFIG.select_level(&geom, 64, 64, Filter::Nearest, false), 0);
        assert_eq!(CONFIG.select_level(&geom, 64, 64, Filter::Linear, true), 0);
    }

    #[test]
    fn identity_is_level_zero() {
        assert_eq!(
            CONFIG.select_level(&Affine::IDENTITY, 64, 64, Filter::Linear, false),
            0
        );
    }

    #[test]
    fn extreme_magnification_with_nearest_goes_negative() {
        // 200 -> 100 after one halving, below the threshold.
        let geom = Affine::scale(200.0);
        assert_eq!(CONFIG.select_level(&geom, 4, 4, Filter::Nearest, false), -1);
        // 1000 -> 500 -> 250 -> 125.
        let geom = Affine::scale(1000.0);
        assert_eq!(CONFIG.select_level(&geom, 4, 4, Filter::Nearest, false), -3);
    }

    #[test]
    fn extreme_magnification_stops_at_size_ceiling() {
        let geom = Affine::scale(1000.0);
        // 300 -> 600 -> 1200: stops after two steps.
        assert_eq!(CONFIG.select_level(&geom, 300, 4, Filter::Nearest, false), -2);
        assert_eq!(CONFIG.select_level(&geom, 1024, 4, Filter::Nearest, false), 0);
    }

    #[test]
    fn extreme_magnification_without_nearest_is_level_zero() {
        let geom = Affine::scale(500.0);
        assert_eq!(CONFIG.select_level(&geom, 4, 4, Filter::Linear, false), 0);
        assert_eq!(CONFIG.select_level(&geom, 4, 4, Filter::Nearest, true), 0);
    }

    #[test]
    fn infinite_scale_is_bounded() {
        let geom = Affine::scale(f64::INFINITY);
        assert_eq!(CONFIG.select_level(&geom, 0, 0, Filter::Nearest, false), -6);
    }

    #[test]
    #[should_panic(expected = "determinant must be non-zero at mipmap level selection")]
    fn selection_rejects_degenerate_transform() {
        let _ = CONFIG.select_level(&Affine::scale(0.0), 4, 4, Filter::Linear, false);
    }
}
