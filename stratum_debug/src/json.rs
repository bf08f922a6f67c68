// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of recorded events.
//!
//! [`export`] reads recorded bytes from a
//! [`RecorderSink`](super::recorder::RecorderSink) and writes a JSON array
//! with one object per event, in recording order. Every object carries an
//! `"event"` name and the event's fields.

use std::io::{self, Write};

use serde_json::{Value, json};

use stratum_core::rect::PixelRect;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a pretty-printed JSON array.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes).map(event_json).collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn event_json(recorded: RecordedEvent) -> Value {
    match recorded {
        RecordedEvent::LevelDerived(e) => json!({
            "event": "LevelDerived",
            "rect": rect_json(e.rect),
            "level": e.level,
            "width": e.width,
            "height": e.height,
            "image": e.image.0,
        }),
        RecordedEvent::LevelUnrepresentable(e) => json!({
            "event": "LevelUnrepresentable",
            "rect": rect_json(e.rect),
            "level": e.level,
        }),
        RecordedEvent::MipmapsReleased(e) => json!({
            "event": "MipmapsReleased",
            "base": e.base.0,
            "count": e.count,
        }),
        RecordedEvent::DrawSkipped(e) => json!({
            "event": "DrawSkipped",
            "dst": e.dst.0,
            "reason": format!("{:?}", e.reason),
        }),
        RecordedEvent::DrawSubmitted(e) => json!({
            "event": "DrawSubmitted",
            "kind": format!("{:?}", e.kind),
            "dst": e.dst.0,
            "src": e.src.0,
            "level": e.level,
            "vertices": e.vertex_count,
            "indices": e.index_count,
        }),
    }
}

fn rect_json(r: PixelRect) -> Value {
    json!([r.min_x, r.min_y, r.max_x, r.max_y])
}
