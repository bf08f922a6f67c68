// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for cache and draw activity.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! pyramid and draw context call as they work. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.

use crate::backend::ImageKey;
use crate::rect::PixelRect;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which operation produced a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawKind {
    /// A scaled/rotated image quad from `Pyramid::draw_image`.
    Image,
    /// A caller mesh from `Pyramid::draw_triangles`.
    Triangles,
    /// An internal draw that derives a mipmap level from its neighbor.
    Derive,
}

/// Why a draw was dropped without touching the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The transform's determinant is zero or NaN.
    DegenerateTransform,
    /// Every usable mipmap level collapses the source to zero pixels.
    SourceTooSmall,
    /// The selected level is cached as unrepresentable.
    LevelUnrepresentable,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a mipmap level is rendered into a new image.
#[derive(Clone, Copy, Debug)]
pub struct LevelDerivedEvent {
    /// Source rectangle in base-image pixels.
    pub rect: PixelRect,
    /// Derived level (never zero).
    pub level: i32,
    /// Width of the derived image.
    pub width: u32,
    /// Height of the derived image.
    pub height: u32,
    /// The new image.
    pub image: ImageKey,
}

/// Emitted when a level is recorded as unrepresentable (zero-sized).
#[derive(Clone, Copy, Debug)]
pub struct LevelUnrepresentableEvent {
    /// Source rectangle in base-image pixels.
    pub rect: PixelRect,
    /// Level that collapsed.
    pub level: i32,
}

/// Emitted when a pyramid releases its derived images.
#[derive(Clone, Copy, Debug)]
pub struct MipmapsReleasedEvent {
    /// Base image of the pyramid.
    pub base: ImageKey,
    /// Number of derived images disposed.
    pub count: usize,
}

/// Emitted when a draw is dropped.
#[derive(Clone, Copy, Debug)]
pub struct DrawSkippedEvent {
    /// Destination base image.
    pub dst: ImageKey,
    /// Why nothing was drawn.
    pub reason: SkipReason,
}

/// Emitted after a triangle batch is handed to the backend.
#[derive(Clone, Copy, Debug)]
pub struct DrawSubmittedEvent {
    /// Destination image.
    pub dst: ImageKey,
    /// Source image actually sampled (a derived level or a base image).
    pub src: ImageKey,
    /// Originating operation.
    pub kind: DrawKind,
    /// Mipmap level of `src` (zero for base images).
    pub level: i32,
    /// Vertices in the batch.
    pub vertex_count: usize,
    /// Indices in the batch.
    pub index_count: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from pyramids and draw contexts.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after a mipmap level is derived.
    fn on_level_derived(&mut self, e: &LevelDerivedEvent) {
        _ = e;
    }

    /// Called when a mipmap level is recorded as unrepresentable.
    fn on_level_unrepresentable(&mut self, e: &LevelUnrepresentableEvent) {
        _ = e;
    }

    /// Called when a pyramid disposes its derived images.
    fn on_mipmaps_released(&mut self, e: &MipmapsReleasedEvent) {
        _ = e;
    }

    /// Called when a draw is dropped.
    fn on_draw_skipped(&mut self, e: &DrawSkippedEvent) {
        _ = e;
    }

    /// Called after a batch is submitted to the backend.
    fn on_draw_submitted(&mut self, e: &DrawSubmittedEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`LevelDerivedEvent`].
    #[inline]
    pub fn level_derived(&mut self, e: &LevelDerivedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_level_derived(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LevelUnrepresentableEvent`].
    #[inline]
    pub fn level_unrepresentable(&mut self, e: &LevelUnrepresentableEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_level_unrepresentable(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`MipmapsReleasedEvent`].
    #[inline]
    pub fn mipmaps_released(&mut self, e: &MipmapsReleasedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_mipmaps_released(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DrawSkippedEvent`].
    #[inline]
    pub fn draw_skipped(&mut self, e: &DrawSkippedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_draw_skipped(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DrawSubmittedEvent`].
    #[inline]
    pub fn draw_submitted(&mut self, e: &DrawSubmittedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_draw_submitted(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
