// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quad geometry for affine-transformed image rectangles.

use kurbo::Affine;

use crate::rect::PixelRect;
use crate::vertex::{Vertex, VertexArena};

/// Returns the affine coefficients as `[a, b, c, d, tx, ty]` in `f32`, where
/// `x' = a*x + b*y + tx` and `y' = c*x + d*y + ty`.
///
/// Note the order differs from [`Affine::as_coeffs`], which is column-major.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "vertex attributes are f32 on every backend"
)]
pub fn affine_elements(geom: &Affine) -> [f32; 6] {
    let [a, c, b, d, tx, ty] = geom.as_coeffs();
    [a as f32, b as f32, c as f32, d as f32, tx as f32, ty as f32]
}

/// Writes the four corners of `src`, transformed by `geom`, into a slice of
/// `arena`.
///
/// Destination positions are `geom` applied to the rectangle's corners
/// relative to its own origin, so `geom` places the rectangle's top-left at
/// its translation. Source coordinates are the untransformed corners of
/// `src`, and every vertex carries `src` as its clamp bounds and `color` as
/// its color scale.
///
/// Corner order is top-left, top-right, bottom-left, bottom-right; triangulate
/// with [`QUAD_INDICES`](crate::backend::QUAD_INDICES).
pub fn quad_vertices<'a>(
    arena: &'a mut VertexArena,
    src: PixelRect,
    geom: &Affine,
    color: [f32; 4],
) -> &'a mut [Vertex] {
    let [a, b, c, d, tx, ty] = affine_elements(geom);
    let w = (src.max_x - src.min_x) as f32;
    let h = (src.max_y - src.min_y) as f32;
    let (ax, by, cx, dy) = (a * w, b * h, c * w, d * h);
    let (u0, v0, u1, v1) = (
        src.min_x as f32,
        src.min_y as f32,
        src.max_x as f32,
        src.max_y as f32,
    );
    let src_bounds = [u0, v0, u1, v1];

    let vs = arena.slice(4);
    vs[0] = Vertex {
        dst: [tx, ty],
        src: [u0, v0],
        src_bounds,
        color,
    };
    vs[1] = Vertex {
        dst: [ax + tx, cx + ty],
        src: [u1, v0],
        src_bounds,
        color,
    };
    vs[2] = Vertex {
        dst: [by + tx, dy + ty],
        src: [u0, v1],
        src_bounds,
        color,
    };
    vs[3] = Vertex {
        dst: [ax + by + tx, cx + dy + ty],
        src: [u1, v1],
        src_bounds,
        color,
    };
    vs
}
