// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Image compositing core: mipmap pyramids, pixel-patch tracking, and vertex
//! arenas for batched textured draws.
//!
//! `stratum_core` sits between a consumer-facing 2D drawing API and a
//! graphics backend that can only do two interesting things: draw a batch of
//! textured triangles from one image into another, and overwrite a
//! rectangle of pixels. It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   caller ──► Pyramid::draw_image(ctx, src, bounds, geom, ...)
//!                 │
//!                 ├─ select_level()        (determinant + scale extent)
//!                 ├─ src.level(rect, L)    (memoized, derives L from L∓1)
//!                 ├─ quad_vertices()       (VertexArena slice)
//!                 ▼
//!   DrawContext { backend, vertices, tracer }
//!                 │
//!                 ▼
//!   GraphicsBackend::draw_triangles(dst, src, &TriangleBatch)
//! ```
//!
//! **[`mipmap`]** — [`Pyramid`](mipmap::Pyramid) owns a base image plus a
//! cache of derived images keyed by (source rectangle, level). Positive
//! levels are minified, negative levels magnified. Any mutation of the base
//! releases every derived image.
//!
//! **[`patch`]** — [`PixelPatchStore`](patch::PixelPatchStore) records
//! non-overlapping rectangular pixel writes so an image can be restored
//! after its GPU content is lost.
//!
//! **[`vertex`]** — The 12-float [`Vertex`](vertex::Vertex) layout and the
//! [`VertexArena`](vertex::VertexArena) that hands out per-frame slices.
//!
//! **[`geometry`]** — [`quad_vertices`](geometry::quad_vertices) for an
//! affine-transformed rectangle.
//!
//! **[`backend`]** — The [`GraphicsBackend`](backend::GraphicsBackend)
//! contract and the draw-state enums it consumes.
//!
//! **[`context`]** — [`DrawContext`](context::DrawContext), the explicitly
//! passed bundle of backend, arena and tracer.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) hooks for cache and draw
//! events, with a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `vertex::SharedVertexArena` and
//!   `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod backend;
pub mod color;
pub mod context;
pub mod geometry;
pub mod mipmap;
pub mod patch;
pub mod rect;
pub mod trace;
pub mod vertex;

#[cfg(test)]
mod test_backend;
