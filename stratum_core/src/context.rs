// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The explicitly passed draw context.
//!
//! A [`DrawContext`] bundles everything a pyramid operation needs from its
//! surroundings: the backend that executes draws, the vertex arena that
//! stores their geometry, and a tracer. Nothing in the core reaches for
//! process-wide state; callers decide how long an arena lives and when it is
//! [`reset`](VertexArena::reset).

use kurbo::Affine;

use crate::backend::{
    Address, CompositeMode, Filter, GraphicsBackend, ImageKey, QUAD_INDICES, TriangleBatch,
};
use crate::color::ColorMatrix;
use crate::geometry::quad_vertices;
use crate::rect::PixelRect;
use crate::trace::{DrawKind, DrawSubmittedEvent, TraceSink, Tracer};
use crate::vertex::{MeshVertex, Vertex, VertexArena};

/// Backend, vertex arena and tracer for one stretch of drawing.
///
/// ```
/// # use stratum_core::context::DrawContext;
/// # use stratum_core::vertex::VertexArena;
/// # fn frame(backend: &mut dyn stratum_core::backend::GraphicsBackend) {
/// let mut arena = VertexArena::new();
/// let mut ctx = DrawContext::new(backend, &mut arena);
/// // ... pyramid operations taking `&mut ctx` ...
/// # let _ = &mut ctx;
/// drop(ctx);
/// arena.reset();
/// # }
/// ```
pub struct DrawContext<'a> {
    /// Executes draws and owns images.
    pub backend: &'a mut dyn GraphicsBackend,
    /// Storage for the vertices of every draw issued through this context.
    pub vertices: &'a mut VertexArena,
    /// Receives cache and draw events.
    pub tracer: Tracer<'a>,
}

impl core::fmt::Debug for DrawContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DrawContext")
            .field("vertices", &self.vertices)
            .field("tracer", &self.tracer)
            .finish_non_exhaustive()
    }
}

/// Where a batch goes and how it is blended.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DrawTarget<'m> {
    pub(crate) dst: ImageKey,
    pub(crate) src: ImageKey,
    pub(crate) kind: DrawKind,
    pub(crate) level: i32,
    pub(crate) color_matrix: Option<&'m ColorMatrix>,
    pub(crate) mode: CompositeMode,
    pub(crate) filter: Filter,
    pub(crate) address: Address,
}

impl<'a> DrawContext<'a> {
    /// Creates a context without tracing.
    #[must_use]
    pub fn new(backend: &'a mut dyn GraphicsBackend, vertices: &'a mut VertexArena) -> Self {
        Self {
            backend,
            vertices,
            tracer: Tracer::none(),
        }
    }

    /// Creates a context that reports events to `sink`.
    ///
    /// Events are only delivered when the `trace` feature is enabled.
    #[must_use]
    pub fn with_tracer(
        backend: &'a mut dyn GraphicsBackend,
        vertices: &'a mut VertexArena,
        sink: &'a mut dyn TraceSink,
    ) -> Self {
        Self {
            backend,
            vertices,
            tracer: Tracer::new(sink),
        }
    }

    /// Draws `rect` of the target's source, transformed by `geom`, as one
    /// quad.
    pub(crate) fn draw_quad(
        &mut self,
        target: &DrawTarget<'_>,
        rect: PixelRect,
        geom: &Affine,
        color: [f32; 4],
    ) {
        let vertices = quad_vertices(self.vertices, rect, geom, color);
        submit(self.backend, &mut self.tracer, target, vertices, &QUAD_INDICES);
    }

    /// Draws a caller mesh, clamping every vertex's samples to `bounds`.
    pub(crate) fn draw_mesh(
        &mut self,
        target: &DrawTarget<'_>,
        bounds: PixelRect,
        mesh: &[MeshVertex],
        indices: &[u16],
    ) {
        let src_bounds = [
            bounds.min_x as f32,
            bounds.min_y as f32,
            bounds.max_x as f32,
            bounds.max_y as f32,
        ];
        let vertices = self.vertices.slice(mesh.len());
        for (out, v) in vertices.iter_mut().zip(mesh) {
            *out = Vertex {
                dst: v.dst,
                src: v.src,
                src_bounds,
                color: v.color,
            };
        }
        submit(self.backend, &mut self.tracer, target, vertices, indices);
    }
}

fn submit(
    backend: &mut dyn GraphicsBackend,
    tracer: &mut Tracer<'_>,
    target: &DrawTarget<'_>,
    vertices: &[Vertex],
    indices: &[u16],
) {
    backend.draw_triangles(
        target.dst,
        target.src,
        &TriangleBatch {
            vertices,
            indices,
            color_matrix: target.color_matrix,
            mode: target.mode,
            filter: target.filter,
            address: target.address,
        },
    );
    tracer.draw_submitted(&DrawSubmittedEvent {
        dst: target.dst,
        src: target.src,
        kind: target.kind,
        level: target.level,
        vertex_count: vertices.len(),
        index_count: indices.len(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_backend::RecordingBackend;

    fn target() -> DrawTarget<'static> {
        DrawTarget {
            dst: ImageKey(1),
            src: ImageKey(2),
            kind: DrawKind::Image,
            level: 0,
            color_matrix: None,
            mode: CompositeMode::SourceOver,
            filter: Filter::Linear,
            address: Address::ClampToZero,
        }
    }

    #[test]
    fn quad_submits_one_batch() {
        let mut backend = RecordingBackend::default();
        let mut arena = VertexArena::new();
        let mut ctx = DrawContext::new(&mut backend, &mut arena);
        ctx.draw_quad(
            &target(),
            PixelRect::new(0, 0, 4, 4),
            &Affine::IDENTITY,
            [1.0; 4],
        );
        drop(ctx);

        let draws = backend.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].vertices.len(), 4);
        assert_eq!(draws[0].indices, QUAD_INDICES);
        assert_eq!(draws[0].filter, Filter::Linear);
        assert_eq!(arena.head(), 4);
    }

    #[test]
    fn mesh_vertices_carry_bounds() {
        let mut backend = RecordingBackend::default();
        let mut arena = VertexArena::new();
        let mesh = [
            MeshVertex {
                dst: [0.0, 0.0],
                src: [1.0, 1.0],
                color: [1.0, 0.5, 0.25, 1.0],
            },
            MeshVertex {
                dst: [10.0, 0.0],
                src: [3.0, 1.0],
                color: [1.0; 4],
            },
            MeshVertex {
                dst: [0.0, 10.0],
                src: [1.0, 3.0],
                color: [1.0; 4],
            },
        ];
        let mut ctx = DrawContext::new(&mut backend, &mut arena);
        ctx.draw_mesh(&target(), PixelRect::new(1, 1, 2, 2), &mesh, &[0, 1, 2]);
        drop(ctx);

        let draws = backend.draws();
        assert_eq!(draws.len(), 1);
        let vs = &draws[0].vertices;
        assert_eq!(vs.len(), 3);
        assert!(vs.iter().all(|v| v.src_bounds == [1.0, 1.0, 3.0, 3.0]));
        assert_eq!(vs[0].color, [1.0, 0.5, 0.25, 1.0]);
        assert_eq!(vs[1].src, [3.0, 1.0]);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn submissions_are_traced() {
        #[derive(Default)]
        struct Counts {
            submitted: usize,
            vertices: usize,
        }
        impl TraceSink for Counts {
            fn on_draw_submitted(&mut self, e: &DrawSubmittedEvent) {
                self.submitted += 1;
                self.vertices += e.vertex_count;
            }
        }

        let mut backend = RecordingBackend::default();
        let mut arena = VertexArena::new();
        let mut sink = Counts::default();
        let mut ctx = DrawContext::with_tracer(&mut backend, &mut arena, &mut sink);
        ctx.draw_quad(
            &target(),
            PixelRect::new(0, 0, 1, 1),
            &Affine::IDENTITY,
            [1.0; 4],
        );
        drop(ctx);
        assert_eq!(sink.submitted, 1);
        assert_eq!(sink.vertices, 4);
    }
}
