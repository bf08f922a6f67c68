// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vertex layout and the per-frame vertex arena.
//!
//! Every draw the core issues is a batch of [`Vertex`] values. Rather than
//! allocating a fresh buffer per draw, callers carve slices out of a
//! [`VertexArena`]. The arena grows by replacement: when the remaining
//! capacity cannot satisfy a request, the whole backing buffer is discarded
//! and a new one of `max(min_capacity, n)` vertices takes its place.
//!
//! Slices are borrowed from the arena, so a slice can never outlive the next
//! reallocation or [`reset`](VertexArena::reset).

use alloc::vec;
use alloc::vec::Vec;

use bytemuck::{Pod, Zeroable};

/// Number of `f32` values in one [`Vertex`].
pub const VERTEX_FLOAT_COUNT: usize = 12;

/// Default reallocation floor of a [`VertexArena`], in vertices.
pub const DEFAULT_MIN_VERTICES: usize = 1024;

/// One vertex of a textured triangle batch.
///
/// The layout is fixed at twelve `f32` values so backends can upload
/// `bytemuck::cast_slice(&vertices)` directly.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Destination position in pixels.
    pub dst: [f32; 2],
    /// Source texel coordinate in pixels of the source image.
    pub src: [f32; 2],
    /// Source region `[u0, v0, u1, v1]` used for address clamping.
    pub src_bounds: [f32; 4],
    /// Color scale `[r, g, b, a]` multiplied into the sampled color.
    pub color: [f32; 4],
}

const _: () = assert!(
    size_of::<Vertex>() == VERTEX_FLOAT_COUNT * size_of::<f32>(),
    "Vertex must be exactly VERTEX_FLOAT_COUNT floats"
);

impl Vertex {
    /// Views a vertex slice as its flat `f32` representation.
    #[inline]
    #[must_use]
    pub fn as_floats(vertices: &[Self]) -> &[f32] {
        bytemuck::cast_slice(vertices)
    }
}

/// A caller-supplied mesh vertex for
/// [`Pyramid::draw_triangles`](crate::mipmap::Pyramid::draw_triangles).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    /// Destination position in pixels.
    pub dst: [f32; 2],
    /// Source texel coordinate in pixels of the source image.
    pub src: [f32; 2],
    /// Color scale `[r, g, b, a]`.
    pub color: [f32; 4],
}

/// A growable, resettable buffer that hands out vertex slices.
#[derive(Debug)]
pub struct VertexArena {
    buffer: Vec<Vertex>,
    head: usize,
    min_capacity: usize,
    reallocations: u64,
}

impl Default for VertexArena {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexArena {
    /// Creates an empty arena with the default reallocation floor.
    ///
    /// No memory is allocated until the first [`slice`](Self::slice).
    #[must_use]
    pub const fn new() -> Self {
        Self::with_min_capacity(DEFAULT_MIN_VERTICES)
    }

    /// Creates an empty arena whose reallocations are at least
    /// `min_capacity` vertices.
    #[must_use]
    pub const fn with_min_capacity(min_capacity: usize) -> Self {
        Self {
            buffer: Vec::new(),
            head: 0,
            min_capacity,
            reallocations: 0,
        }
    }

    /// Returns `n` vertices of contiguous storage.
    ///
    /// If fewer than `n` vertices remain, the backing buffer is replaced by a
    /// new one of `max(min_capacity, n)` vertices and the cursor restarts at
    /// zero. The contents of the returned slice are unspecified; callers
    /// overwrite every vertex.
    pub fn slice(&mut self, n: usize) -> &mut [Vertex] {
        if self.head + n > self.buffer.len() {
            self.buffer = vec![Vertex::default(); self.min_capacity.max(n)];
            self.head = 0;
            self.reallocations += 1;
        }
        let start = self.head;
        self.head += n;
        &mut self.buffer[start..self.head]
    }

    /// Rewinds the cursor so the next frame reuses the current buffer.
    pub fn reset(&mut self) {
        self.head = 0;
    }

    /// Number of vertices handed out since the last reallocation or reset.
    #[inline]
    #[must_use]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Size of the current backing buffer in vertices.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of times the backing buffer has been replaced.
    #[inline]
    #[must_use]
    pub const fn reallocations(&self) -> u64 {
        self.reallocations
    }
}

/// A [`VertexArena`] that may be used from more than one thread.
///
/// Only needed when geometry is prepared off the render thread. The lock is
/// held for slice selection and for the caller's fill of the slice.
#[cfg(feature = "std")]
#[derive(Debug, Default)]
pub struct SharedVertexArena {
    inner: std::sync::Mutex<VertexArena>,
}

#[cfg(feature = "std")]
impl SharedVertexArena {
    /// Creates a shared arena around a fresh [`VertexArena`].
    #[must_use]
    pub fn new() -> Self {
        Self::from_arena(VertexArena::new())
    }

    /// Wraps an existing arena.
    #[must_use]
    pub fn from_arena(arena: VertexArena) -> Self {
        Self {
            inner: std::sync::Mutex::new(arena),
        }
    }

    /// Locks the arena for exclusive use.
    ///
    /// A panic on another thread while holding the lock does not poison the
    /// arena: its state is a buffer and a cursor, both valid at every point.
    pub fn lock(&self) -> std::sync::MutexGuard<'_, VertexArena> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Carves `n` vertices and hands them to `fill` while the lock is held.
    pub fn with_slice<R>(&self, n: usize, fill: impl FnOnce(&mut [Vertex]) -> R) -> R {
        let mut arena = self.lock();
        fill(arena.slice(n))
    }
}
