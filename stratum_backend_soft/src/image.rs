// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CPU-side RGBA8 images.

use stratum_core::rect::PixelRect;

/// A premultiplied RGBA8 image.
#[derive(Clone, Debug)]
pub(crate) struct SoftImage {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) volatile: bool,
    pub(crate) screen: bool,
    texels: Vec<[u8; 4]>,
}

impl SoftImage {
    pub(crate) fn new(width: u32, height: u32, volatile: bool, screen: bool) -> Self {
        Self {
            width,
            height,
            volatile,
            screen,
            texels: vec![[0; 4]; width as usize * height as usize],
        }
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub(crate) fn get(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) is outside the {}x{} image",
            self.width,
            self.height
        );
        self.texels[self.index(x, y)]
    }

    /// Reads a texel as premultiplied floats; anything off the image is
    /// transparent black.
    pub(crate) fn fetch(&self, x: i32, y: i32) -> [f32; 4] {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return [0.0; 4];
        };
        if x >= self.width || y >= self.height {
            return [0.0; 4];
        }
        self.texels[self.index(x, y)].map(|c| f32::from(c) / 255.0)
    }

    /// Writes premultiplied floats, clamped and rounded to bytes.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "value is clamped to 0..=255 before the cast"
    )]
    pub(crate) fn store(&mut self, x: u32, y: u32, color: [f32; 4]) {
        let idx = self.index(x, y);
        self.texels[idx] = color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    }

    pub(crate) fn fill(&mut self, rgba: [u8; 4]) {
        self.texels.fill(rgba);
    }

    /// Copies `pixels` into `region`.
    pub(crate) fn replace(&mut self, pixels: &[u8], region: PixelRect) {
        let (w, h) = (region.width(), region.height());
        assert!(
            pixels.len() == 4 * w as usize * h as usize,
            "replace_pixels expects {} bytes for {region:?} but got {}",
            4 * w as usize * h as usize,
            pixels.len()
        );
        let (Ok(x0), Ok(y0)) = (u32::try_from(region.min_x), u32::try_from(region.min_y)) else {
            panic!("region {region:?} starts outside the image");
        };
        assert!(
            x0 + w <= self.width && y0 + h <= self.height,
            "region {region:?} exceeds the {}x{} image",
            self.width,
            self.height
        );
        let src: &[[u8; 4]] = bytemuck::cast_slice(pixels);
        for (y, line) in (y0..).zip(src.chunks_exact(w.max(1) as usize)) {
            let start = self.index(x0, y);
            self.texels[start..start + line.len()].copy_from_slice(line);
        }
    }
}
