// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use stratum_core::backend::ImageKey;
use stratum_core::rect::PixelRect;
use stratum_core::trace::{
    DrawKind, DrawSkippedEvent, DrawSubmittedEvent, LevelDerivedEvent, LevelUnrepresentableEvent,
    MipmapsReleasedEvent, SkipReason, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_LEVEL_DERIVED: u8 = 1;
const TAG_LEVEL_UNREPRESENTABLE: u8 = 2;
const TAG_MIPMAPS_RELEASED: u8 = 3;
const TAG_DRAW_SKIPPED: u8 = 4;
const TAG_DRAW_SUBMITTED: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// Running totals kept alongside the recording.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventCounts {
    /// Levels rendered into new images.
    pub levels_derived: u64,
    /// Levels recorded as unrepresentable.
    pub levels_unrepresentable: u64,
    /// Derived images released, summed over all release events.
    pub images_released: u64,
    /// Draws dropped before reaching the backend.
    pub draws_skipped: u64,
    /// Batches submitted to the backend.
    pub draws_submitted: u64,
}

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
    counts: EventCounts,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Totals of every event recorded so far.
    #[must_use]
    pub fn counts(&self) -> EventCounts {
        self.counts
    }

    /// Drops the recording and resets the counters.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.counts = EventCounts::default();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "counts are capped at u32::MAX for recording"
    )]
    fn write_count(&mut self, v: usize) {
        self.write_u32(v.min(u32::MAX as usize) as u32);
    }

    fn write_rect(&mut self, r: PixelRect) {
        self.write_i32(r.min_x);
        self.write_i32(r.min_y);
        self.write_i32(r.max_x);
        self.write_i32(r.max_y);
    }

    fn write_kind(&mut self, k: DrawKind) {
        self.write_u8(match k {
            DrawKind::Image => 0,
            DrawKind::Triangles => 1,
            DrawKind::Derive => 2,
        });
    }

    fn write_reason(&mut self, r: SkipReason) {
        self.write_u8(match r {
            SkipReason::DegenerateTransform => 0,
            SkipReason::SourceTooSmall => 1,
            SkipReason::LevelUnrepresentable => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_level_derived(&mut self, e: &LevelDerivedEvent) {
        self.counts.levels_derived += 1;
        self.write_u8(TAG_LEVEL_DERIVED);
        self.write_rect(e.rect);
        self.write_i32(e.level);
        self.write_u32(e.width);
        self.write_u32(e.height);
        self.write_u64(e.image.0);
    }

    fn on_level_unrepresentable(&mut self, e: &LevelUnrepresentableEvent) {
        self.counts.levels_unrepresentable += 1;
        self.write_u8(TAG_LEVEL_UNREPRESENTABLE);
        self.write_rect(e.rect);
        self.write_i32(e.level);
    }

    fn on_mipmaps_released(&mut self, e: &MipmapsReleasedEvent) {
        self.counts.images_released += e.count as u64;
        self.write_u8(TAG_MIPMAPS_RELEASED);
        self.write_u64(e.base.0);
        self.write_count(e.count);
    }

    fn on_draw_skipped(&mut self, e: &DrawSkippedEvent) {
        self.counts.draws_skipped += 1;
        self.write_u8(TAG_DRAW_SKIPPED);
        self.write_u64(e.dst.0);
        self.write_reason(e.reason);
    }

    fn on_draw_submitted(&mut self, e: &DrawSubmittedEvent) {
        self.counts.draws_submitted += 1;
        self.write_u8(TAG_DRAW_SUBMITTED);
        self.write_u64(e.dst.0);
        self.write_u64(e.src.0);
        self.write_kind(e.kind);
        self.write_i32(e.level);
        self.write_count(e.vertex_count);
        self.write_count(e.index_count);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`LevelDerivedEvent`].
    LevelDerived(LevelDerivedEvent),
    /// A [`LevelUnrepresentableEvent`].
    LevelUnrepresentable(LevelUnrepresentableEvent),
    /// A [`MipmapsReleasedEvent`].
    MipmapsReleased(MipmapsReleasedEvent),
    /// A [`DrawSkippedEvent`].
    DrawSkipped(DrawSkippedEvent),
    /// A [`DrawSubmittedEvent`].
    DrawSubmitted(DrawSubmittedEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_count(&mut self) -> Option<usize> {
        self.read_u32().map(|v| v as usize)
    }

    fn read_rect(&mut self) -> Option<PixelRect> {
        Some(PixelRect::from_min_max(
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
        ))
    }

    fn read_kind(&mut self) -> Option<DrawKind> {
        Some(match self.read_u8()? {
            0 => DrawKind::Image,
            1 => DrawKind::Triangles,
            _ => DrawKind::Derive,
        })
    }

    fn read_reason(&mut self) -> Option<SkipReason> {
        Some(match self.read_u8()? {
            0 => SkipReason::DegenerateTransform,
            1 => SkipReason::SourceTooSmall,
            _ => SkipReason::LevelUnrepresentable,
        })
    }

    fn decode_level_derived(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::LevelDerived(LevelDerivedEvent {
            rect: self.read_rect()?,
            level: self.read_i32()?,
            width: self.read_u32()?,
            height: self.read_u32()?,
            image: ImageKey(self.read_u64()?),
        }))
    }

    fn decode_level_unrepresentable(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::LevelUnrepresentable(
            LevelUnrepresentableEvent {
                rect: self.read_rect()?,
                level: self.read_i32()?,
            },
        ))
    }

    fn decode_mipmaps_released(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::MipmapsReleased(MipmapsReleasedEvent {
            base: ImageKey(self.read_u64()?),
            count: self.read_count()?,
        }))
    }

    fn decode_draw_skipped(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::DrawSkipped(DrawSkippedEvent {
            dst: ImageKey(self.read_u64()?),
            reason: self.read_reason()?,
        }))
    }

    fn decode_draw_submitted(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::DrawSubmitted(DrawSubmittedEvent {
            dst: ImageKey(self.read_u64()?),
            src: ImageKey(self.read_u64()?),
            kind: self.read_kind()?,
            level: self.read_i32()?,
            vertex_count: self.read_count()?,
            index_count: self.read_count()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_LEVEL_DERIVED => self.decode_level_derived(),
            TAG_LEVEL_UNREPRESENTABLE => self.decode_level_unrepresentable(),
            TAG_MIPMAPS_RELEASED => self.decode_mipmaps_released(),
            TAG_DRAW_SKIPPED => self.decode_draw_skipped(),
            TAG_DRAW_SUBMITTED => self.decode_draw_submitted(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_derived() -> LevelDerivedEvent {
        LevelDerivedEvent {
            rect: PixelRect::new(-4, 8, 64, 32),
            level: 2,
            width: 16,
            height: 8,
            image: ImageKey(9),
        }
    }

    fn sample_submitted() -> DrawSubmittedEvent {
        DrawSubmittedEvent {
            dst: ImageKey(1),
            src: ImageKey(9),
            kind: DrawKind::Image,
            level: 2,
            vertex_count: 4,
            index_count: 6,
        }
    }

    #[test]
    fn round_trip_level_derived() {
        let mut rec = RecorderSink::new();
        let orig = sample_derived();
        rec.on_level_derived(&orig);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            RecordedEvent::LevelDerived(e) => {
                assert_eq!(e.rect, orig.rect);
                assert_eq!(e.level, orig.level);
                assert_eq!((e.width, e.height), (16, 8));
                assert_eq!(e.image, orig.image);
            }
            other => panic!("expected LevelDerived, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_draw_submitted() {
        let mut rec = RecorderSink::new();
        rec.on_draw_submitted(&sample_submitted());

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::DrawSubmitted(e)] => {
                assert_eq!((e.dst, e.src), (ImageKey(1), ImageKey(9)));
                assert_eq!(e.kind, DrawKind::Image);
                assert_eq!(e.level, 2);
                assert_eq!((e.vertex_count, e.index_count), (4, 6));
            }
            other => panic!("expected one DrawSubmitted, got {other:?}"),
        }
    }

    #[test]
    fn negative_levels_survive() {
        let mut rec = RecorderSink::new();
        rec.on_level_unrepresentable(&LevelUnrepresentableEvent {
            rect: PixelRect::new(0, 0, 3, 3),
            level: -5,
        });
        match decode(rec.as_bytes()).next() {
            Some(RecordedEvent::LevelUnrepresentable(e)) => assert_eq!(e.level, -5),
            other => panic!("expected LevelUnrepresentable, got {other:?}"),
        }
    }

    #[test]
    fn multiple_events_keep_order_and_counts() {
        let mut rec = RecorderSink::new();
        rec.on_level_derived(&sample_derived());
        rec.on_draw_submitted(&sample_submitted());
        rec.on_draw_skipped(&DrawSkippedEvent {
            dst: ImageKey(1),
            reason: SkipReason::SourceTooSmall,
        });
        rec.on_mipmaps_released(&MipmapsReleasedEvent {
            base: ImageKey(1),
            count: 3,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], RecordedEvent::LevelDerived(_)));
        assert!(matches!(events[1], RecordedEvent::DrawSubmitted(_)));
        assert!(matches!(
            events[2],
            RecordedEvent::DrawSkipped(DrawSkippedEvent {
                reason: SkipReason::SourceTooSmall,
                ..
            })
        ));
        assert!(matches!(
            events[3],
            RecordedEvent::MipmapsReleased(MipmapsReleasedEvent { count: 3, .. })
        ));

        let counts = rec.counts();
        assert_eq!(counts.levels_derived, 1);
        assert_eq!(counts.draws_submitted, 1);
        assert_eq!(counts.draws_skipped, 1);
        assert_eq!(counts.images_released, 3);

        rec.clear();
        assert!(rec.as_bytes().is_empty());
        assert_eq!(rec.counts(), EventCounts::default());
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_draw_submitted(&sample_submitted());
        rec.on_draw_submitted(&sample_submitted());
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }

    #[test]
    fn records_a_frame_on_the_soft_backend() {
        use kurbo::Affine;
        use stratum_backend_soft::SoftBackend;
        use stratum_core::backend::{CompositeMode, Filter};
        use stratum_core::color::ColorMatrix;
        use stratum_core::context::DrawContext;
        use stratum_core::mipmap::Pyramid;
        use stratum_core::rect::PixelRect;
        use stratum_core::vertex::VertexArena;

        let mut backend = SoftBackend::new();
        let mut arena = VertexArena::new();
        let mut rec = RecorderSink::new();
        let mut src = Pyramid::new(&mut backend, 8, 8, false);
        let mut dst = Pyramid::new(&mut backend, 2, 2, false);

        let mut ctx = DrawContext::with_tracer(&mut backend, &mut arena, &mut rec);
        src.fill(&mut ctx, [255; 4]);
        let draw = |ctx: &mut DrawContext<'_>, dst: &mut Pyramid, src: &mut Pyramid, scale| {
            dst.draw_image(
                ctx,
                src,
                PixelRect::from_size(8, 8),
                &Affine::scale(scale),
                &ColorMatrix::IDENTITY,
                CompositeMode::SourceOver,
                Filter::Linear,
            );
        };
        // det = 1/64 selects level 2, which derives levels 1 and 2.
        draw(&mut ctx, &mut dst, &mut src, 0.125);
        assert!(src.cached_level(PixelRect::from_size(8, 8), 2).is_some());
        assert!(src.cached_level(PixelRect::from_size(8, 8), 3).is_none());
        draw(&mut ctx, &mut dst, &mut src, 0.0);
        src.fill(&mut ctx, [0; 4]);
        drop(ctx);

        let counts = rec.counts();
        assert_eq!(counts.levels_derived, 2);
        assert_eq!(counts.draws_submitted, 3);
        assert_eq!(counts.draws_skipped, 1);
        assert_eq!(counts.images_released, 2);
        assert_eq!(decode(rec.as_bytes()).count(), 2 + 3 + 1 + 1);
    }
}
