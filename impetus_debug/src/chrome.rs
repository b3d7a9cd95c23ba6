// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Host phases are duration events on thread 0. Run-state changes and
//! animation events are instant events on a thread per player, so each
//! player gets its own track.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use impetus_core::time::HostTime;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Recorded times are engine nanoseconds; they are written as microseconds.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::PhaseBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": e.phase.name(),
                    "cat": "Host",
                    "ts": us(e.timestamp),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": e.phase.name(),
                    "cat": "Host",
                    "ts": us(e.timestamp),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::RunStateChange(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": e.to.name(),
                    "cat": "RunState",
                    "ts": us(e.at),
                    "pid": 0,
                    "tid": player_tid(e.player.0),
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "phase": e.phase.name(),
                        "animation": e.animation.0,
                        "group": e.group.0,
                        "property": e.property.name(),
                        "from": e.from.name(),
                    }
                }));
            }
            RecordedEvent::AnimationEvent(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": e.kind.name(),
                    "cat": "Event",
                    "ts": us(e.monotonic_time),
                    "pid": 0,
                    "tid": player_tid(e.player.0),
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "group": e.group.0,
                        "property": e.property.name(),
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameSummary",
                    "cat": "Summary",
                    "ts": us(s.now),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": s.frame_index,
                        "animated_players": s.animated_players,
                        "events": s.events,
                        "animate_changes": s.animate_changes,
                        "update_changes": s.update_changes,
                    }
                }));
            }
            RecordedEvent::ValueSamplesCount { frame_index, count } => {
                events.push(json!({
                    "ph": "i",
                    "name": "ValueSamples",
                    "cat": "Rich",
                    "ts": 0,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "frame_index": frame_index,
                        "count": count,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn us(t: HostTime) -> f64 {
    t.0 as f64 / 1000.0
}

/// Thread id for a player's track; 0 is reserved for host phases.
fn player_tid(player: u32) -> u64 {
    u64::from(player) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use impetus_core::animation::{AnimationId, GroupId, RunState, TargetProperty};
    use impetus_core::player::PlayerId;
    use impetus_core::trace::{
        PhaseBeginEvent, PhaseEndEvent, PhaseKind, RunStateChangeEvent, TraceSink,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::Animate,
            timestamp: HostTime(1_000_000),
        });
        rec.on_run_state_change(&RunStateChangeEvent {
            frame_index: 0,
            phase: PhaseKind::Animate,
            player: PlayerId(4),
            animation: AnimationId(1),
            group: GroupId(1),
            property: TargetProperty::Opacity,
            from: RunState::WaitingForTargetAvailability,
            to: RunState::Starting,
            at: HostTime(1_000_000),
        });
        rec.on_phase_end(&PhaseEndEvent {
            frame_index: 0,
            phase: PhaseKind::Animate,
            timestamp: HostTime(1_000_000),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "animate");
        assert_eq!(parsed[0]["ts"], 1000.0);

        assert_eq!(parsed[1]["ph"], "i");
        assert_eq!(parsed[1]["name"], "starting");
        assert_eq!(parsed[1]["tid"], 5, "one track per player");
        assert_eq!(parsed[1]["args"]["from"], "waiting_for_target_availability");
        assert_eq!(parsed[1]["args"]["property"], "opacity");

        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["name"], "animate");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
