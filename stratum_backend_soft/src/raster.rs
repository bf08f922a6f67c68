// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Triangle rasterization with texture sampling and blending.
//!
//! Pixels are sampled at their centers. A pixel center exactly on an edge
//! shared by two triangles belongs to exactly one of them, so a quad never
//! covers a pixel twice.

use stratum_core::backend::{Address, Filter, TriangleBatch};
use stratum_core::vertex::Vertex;

use crate::image::SoftImage;

type Point = [f32; 2];

/// Draws every triangle of `batch`, sampling `src`, into `dst`.
///
/// # Panics
///
/// Panics if an index refers past the end of the vertex slice.
pub(crate) fn draw_batch(dst: &mut SoftImage, src: &SoftImage, batch: &TriangleBatch<'_>) {
    let vertex = |i: u16| -> Vertex {
        match batch.vertices.get(usize::from(i)) {
            Some(v) => *v,
            None => panic!(
                "index {i} is out of range for {} vertices",
                batch.vertices.len()
            ),
        }
    };
    for tri in batch.indices.chunks_exact(3) {
        draw_triangle(dst, src, [vertex(tri[0]), vertex(tri[1]), vertex(tri[2])], batch);
    }
}

/// Twice the signed area of `(a, b, p)`.
fn orient(a: Point, b: Point, p: Point) -> f32 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

/// Tie-break for pixel centers on the edge `a -> b`.
///
/// A shared edge is walked in opposite directions by its two triangles, so
/// exactly one of them owns it.
fn owns_edge(a: Point, b: Point) -> bool {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    dy > 0.0 || (dy == 0.0 && dx > 0.0)
}

fn inside(w: f32, a: Point, b: Point) -> bool {
    w > 0.0 || (w == 0.0 && owns_edge(a, b))
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "bounding box is clamped to the destination before the cast"
)]
fn draw_triangle(dst: &mut SoftImage, src: &SoftImage, tri: [Vertex; 3], batch: &TriangleBatch<'_>) {
    let mut v = tri;
    if v.iter().flat_map(|v| v.dst).any(|c| !c.is_finite()) {
        return;
    }
    let mut area = orient(v[0].dst, v[1].dst, v[2].dst);
    if area == 0.0 {
        return;
    }
    if area < 0.0 {
        v.swap(1, 2);
        area = -area;
    }
    let [p0, p1, p2] = [v[0].dst, v[1].dst, v[2].dst];

    let min_x = p0[0].min(p1[0]).min(p2[0]).floor().max(0.0);
    let min_y = p0[1].min(p1[1]).min(p2[1]).floor().max(0.0);
    let max_x = p0[0].max(p1[0]).max(p2[0]).ceil().min(dst.width as f32);
    let max_y = p0[1].max(p1[1]).max(p2[1]).ceil().min(dst.height as f32);
    if min_x >= max_x || min_y >= max_y {
        return;
    }

    let bounds = v[0].src_bounds;
    for py in min_y as u32..max_y as u32 {
        for px in min_x as u32..max_x as u32 {
            let p = [px as f32 + 0.5, py as f32 + 0.5];
            let w0 = orient(p1, p2, p);
            let w1 = orient(p2, p0, p);
            let w2 = orient(p0, p1, p);
            if !(inside(w0, p1, p2) && inside(w1, p2, p0) && inside(w2, p0, p1)) {
                continue;
            }
            let b = [w0 / area, w1 / area, w2 / area];
            let uv = [
                b[0] * v[0].src[0] + b[1] * v[1].src[0] + b[2] * v[2].src[0],
                b[0] * v[0].src[1] + b[1] * v[1].src[1] + b[2] * v[2].src[1],
            ];
            let scale: [f32; 4] =
                core::array::from_fn(|i| b[0] * v[0].color[i] + b[1] * v[1].color[i] + b[2] * v[2].color[i]);

            let mut color = sample(src, uv, bounds, batch.filter, batch.address);
            if let Some(matrix) = batch.color_matrix {
                color = premultiply(matrix.apply(unpremultiply(color)));
            }
            color = apply_scale(color, scale);
            let out = blend(color, dst.fetch(px as i32, py as i32), batch);
            dst.store(px, py, out);
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "texel coordinates saturate; anything off the image reads as transparent"
)]
fn sample(src: &SoftImage, uv: Point, bounds: [f32; 4], filter: Filter, address: Address) -> [f32; 4] {
    let texel = |x: i32, y: i32| fetch(src, x, y, bounds, address);
    match filter {
        Filter::Nearest => texel(uv[0].floor() as i32, uv[1].floor() as i32),
        Filter::Linear => {
            let (x, y) = (uv[0] - 0.5, uv[1] - 0.5);
            let (x0, y0) = (x.floor(), y.floor());
            let (fx, fy) = (x - x0, y - y0);
            let (ix, iy) = (x0 as i32, y0 as i32);
            let c00 = texel(ix, iy);
            let c10 = texel(ix.saturating_add(1), iy);
            let c01 = texel(ix, iy.saturating_add(1));
            let c11 = texel(ix.saturating_add(1), iy.saturating_add(1));
            core::array::from_fn(|i| {
                let top = c00[i] + (c10[i] - c00[i]) * fx;
                let bottom = c01[i] + (c11[i] - c01[i]) * fx;
                top + (bottom - top) * fy
            })
        }
    }
}

/// Resolves one texel against the vertex's source bounds.
#[expect(
    clippy::cast_possible_truncation,
    reason = "bounds are integral pixel edges"
)]
fn fetch(src: &SoftImage, x: i32, y: i32, bounds: [f32; 4], address: Address) -> [f32; 4] {
    let [u0, v0, u1, v1] = bounds.map(|b| b.floor() as i32);
    let (x, y) = match address {
        Address::ClampToZero => {
            if x < u0 || x >= u1 || y < v0 || y >= v1 {
                return [0.0; 4];
            }
            (x, y)
        }
        Address::Repeat => (wrap(x, u0, u1), wrap(y, v0, v1)),
    };
    src.fetch(x, y)
}

fn wrap(value: i32, min: i32, max: i32) -> i32 {
    let span = max - min;
    if span <= 0 {
        return value;
    }
    min + (value - min).rem_euclid(span)
}

fn unpremultiply(c: [f32; 4]) -> [f32; 4] {
    let a = c[3];
    if a <= 0.0 {
        return [0.0; 4];
    }
    [c[0] / a, c[1] / a, c[2] / a, a]
}

fn premultiply(c: [f32; 4]) -> [f32; 4] {
    [c[0] * c[3], c[1] * c[3], c[2] * c[3], c[3]]
}

/// Scales a premultiplied color by a straight-alpha color scale.
fn apply_scale(c: [f32; 4], s: [f32; 4]) -> [f32; 4] {
    [
        c[0] * s[0] * s[3],
        c[1] * s[1] * s[3],
        c[2] * s[2] * s[3],
        c[3] * s[3],
    ]
}

fn blend(src: [f32; 4], dst: [f32; 4], batch: &TriangleBatch<'_>) -> [f32; 4] {
    let (sf, df) = batch.mode.blend_factors();
    let fs = sf.eval(src[3], dst[3]);
    let fd = df.eval(src[3], dst[3]);
    core::array::from_fn(|i| src[i] * fs + dst[i] * fd)
}
