// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A recording [`GraphicsBackend`] for unit tests.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::backend::{Address, CompositeMode, Filter, GraphicsBackend, ImageKey, TriangleBatch};
use crate::color::ColorMatrix;
use crate::rect::PixelRect;
use crate::vertex::Vertex;

/// One recorded `draw_triangles` call, with owned copies of its buffers.
#[derive(Clone, Debug)]
pub(crate) struct DrawCall {
    pub(crate) dst: ImageKey,
    pub(crate) src: ImageKey,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) indices: Vec<u16>,
    pub(crate) color_matrix: Option<ColorMatrix>,
    pub(crate) mode: CompositeMode,
    pub(crate) filter: Filter,
    pub(crate) address: Address,
}

#[derive(Clone, Debug)]
pub(crate) enum Call {
    NewImage {
        image: ImageKey,
        width: u32,
        height: u32,
        volatile: bool,
    },
    NewScreen {
        image: ImageKey,
    },
    Draw(DrawCall),
    ReplacePixels {
        image: ImageKey,
        region: PixelRect,
        len: usize,
    },
    Fill {
        image: ImageKey,
        rgba: [u8; 4],
    },
    PixelAt {
        image: ImageKey,
        x: u32,
        y: u32,
    },
    ClearFramebuffer {
        image: ImageKey,
    },
    Dispose {
        image: ImageKey,
    },
}

/// Records every call and hands out sequential keys starting at 1.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub(crate) calls: Vec<Call>,
    pub(crate) sizes: BTreeMap<ImageKey, (u32, u32)>,
    pub(crate) pixel: [u8; 4],
    next_key: u64,
}

impl RecordingBackend {
    fn alloc(&mut self, width: u32, height: u32) -> ImageKey {
        self.next_key += 1;
        let key = ImageKey(self.next_key);
        self.sizes.insert(key, (width, height));
        key
    }

    pub(crate) fn draws(&self) -> Vec<&DrawCall> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Draw(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    /// Images created with `new_image`, in creation order.
    pub(crate) fn created(&self) -> Vec<ImageKey> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::NewImage { image, .. } => Some(*image),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn disposed(&self) -> Vec<ImageKey> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Dispose { image } => Some(*image),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn size_of(&self, image: ImageKey) -> Option<(u32, u32)> {
        self.sizes.get(&image).copied()
    }

    pub(crate) fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl GraphicsBackend for RecordingBackend {
    fn new_image(&mut self, width: u32, height: u32, volatile: bool) -> ImageKey {
        let image = self.alloc(width, height);
        self.calls.push(Call::NewImage {
            image,
            width,
            height,
            volatile,
        });
        image
    }

    fn new_screen_framebuffer_image(&mut self, width: u32, height: u32) -> ImageKey {
        let image = self.alloc(width, height);
        self.calls.push(Call::NewScreen { image });
        image
    }

    fn draw_triangles(&mut self, dst: ImageKey, src: ImageKey, batch: &TriangleBatch<'_>) {
        self.calls.push(Call::Draw(DrawCall {
            dst,
            src,
            vertices: batch.vertices.to_vec(),
            indices: batch.indices.to_vec(),
            color_matrix: batch.color_matrix.copied(),
            mode: batch.mode,
            filter: batch.filter,
            address: batch.address,
        }));
    }

    fn replace_pixels(&mut self, image: ImageKey, pixels: &[u8], region: PixelRect) {
        self.calls.push(Call::ReplacePixels {
            image,
            region,
            len: pixels.len(),
        });
    }

    fn fill(&mut self, image: ImageKey, rgba: [u8; 4]) {
        self.calls.push(Call::Fill { image, rgba });
    }

    fn pixel_at(&mut self, image: ImageKey, x: u32, y: u32) -> [u8; 4] {
        self.calls.push(Call::PixelAt { image, x, y });
        self.pixel
    }

    fn clear_framebuffer(&mut self, image: ImageKey) {
        self.calls.push(Call::ClearFramebuffer { image });
    }

    fn dispose(&mut self, image: ImageKey) {
        self.sizes.remove(&image);
        self.calls.push(Call::Dispose { image });
    }
}
