// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mipmap pyramids.
//!
//! A [`Pyramid`] wraps one backend image and derives scaled copies of it on
//! demand. Level `L > 0` halves the base `L` times (linear filtering), level
//! `L < 0` doubles it `-L` times (nearest filtering). Each level is derived
//! from its neighbor toward zero, so requesting level 3 derives levels 1 and
//! 2 as well. Results, including levels that collapse to zero pixels, are
//! cached per (source rectangle, level) until the base changes.
//!
//! [`MipmapConfig::select_level`] picks the level for a draw from the
//! transform's determinant and scale extent.

mod cache;
mod level;
mod pyramid;

pub use cache::DerivedLevel;
pub use level::{MipmapConfig, geom_scale_size, mipmap_level_for_downscale, pow2, size_for_level};
pub use pyramid::Pyramid;
