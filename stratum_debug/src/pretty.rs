// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use stratum_core::trace::{
    DrawKind, DrawSkippedEvent, DrawSubmittedEvent, LevelDerivedEvent, LevelUnrepresentableEvent,
    MipmapsReleasedEvent, SkipReason, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    show_submits: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("show_submits", &self.show_submits)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            show_submits: true,
        }
    }

    /// Suppresses `[draw]` lines, which dominate output in busy frames.
    #[must_use]
    pub fn without_submits(mut self) -> Self {
        self.show_submits = false;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn kind_name(kind: DrawKind) -> &'static str {
    match kind {
        DrawKind::Image => "image",
        DrawKind::Triangles => "triangles",
        DrawKind::Derive => "derive",
    }
}

fn reason_name(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::DegenerateTransform => "degenerate-transform",
        SkipReason::SourceTooSmall => "source-too-small",
        SkipReason::LevelUnrepresentable => "level-unrepresentable",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_level_derived(&mut self, e: &LevelDerivedEvent) {
        let _ = writeln!(
            self.writer,
            "[level] {:?} L{} -> {}x{} image={}",
            e.rect, e.level, e.width, e.height, e.image.0,
        );
    }

    fn on_level_unrepresentable(&mut self, e: &LevelUnrepresentableEvent) {
        let _ = writeln!(
            self.writer,
            "[level] {:?} L{} unrepresentable",
            e.rect, e.level,
        );
    }

    fn on_mipmaps_released(&mut self, e: &MipmapsReleasedEvent) {
        let _ = writeln!(
            self.writer,
            "[release] base={} images={}",
            e.base.0, e.count,
        );
    }

    fn on_draw_skipped(&mut self, e: &DrawSkippedEvent) {
        let _ = writeln!(
            self.writer,
            "[skip] dst={} {}",
            e.dst.0,
            reason_name(e.reason),
        );
    }

    fn on_draw_submitted(&mut self, e: &DrawSubmittedEvent) {
        if !self.show_submits {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[draw] {} src={} L{} -> dst={} verts={} idx={}",
            kind_name(e.kind),
            e.src.0,
            e.level,
            e.dst.0,
            e.vertex_count,
            e.index_count,
        );
    }
}
