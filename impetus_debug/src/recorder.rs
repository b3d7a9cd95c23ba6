// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Value samples ([`on_value_samples`](TraceSink::on_value_samples)) store
//! only the count.

use impetus_core::animation::{AnimationId, GroupId, RunState, TargetProperty};
use impetus_core::event::AnimationEventKind;
use impetus_core::player::PlayerId;
use impetus_core::time::HostTime;
use impetus_core::trace::{
    AnimationEventEmitted, FrameSummary, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    RunStateChangeEvent, TraceSink, ValueSample,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PHASE_BEGIN: u8 = 1;
const TAG_PHASE_END: u8 = 2;
const TAG_RUN_STATE_CHANGE: u8 = 3;
const TAG_ANIMATION_EVENT: u8 = 4;
const TAG_FRAME_SUMMARY: u8 = 5;
const TAG_VALUE_SAMPLES_COUNT: u8 = 6;

// ---------------------------------------------------------------------------
// Enum codes
// ---------------------------------------------------------------------------

fn phase_code(p: PhaseKind) -> u8 {
    match p {
        PhaseKind::Animate => 0,
        PhaseKind::UpdateState => 1,
        PhaseKind::Push => 2,
        PhaseKind::Activate => 3,
    }
}

fn phase_from_code(c: u8) -> Option<PhaseKind> {
    Some(match c {
        0 => PhaseKind::Animate,
        1 => PhaseKind::UpdateState,
        2 => PhaseKind::Push,
        3 => PhaseKind::Activate,
        _ => return None,
    })
}

fn event_kind_code(k: AnimationEventKind) -> u8 {
    match k {
        AnimationEventKind::Started => 0,
        AnimationEventKind::Finished => 1,
        AnimationEventKind::Aborted => 2,
        AnimationEventKind::PropertyUpdate => 3,
        AnimationEventKind::Takeover => 4,
    }
}

fn event_kind_from_code(c: u8) -> Option<AnimationEventKind> {
    Some(match c {
        0 => AnimationEventKind::Started,
        1 => AnimationEventKind::Finished,
        2 => AnimationEventKind::Aborted,
        3 => AnimationEventKind::PropertyUpdate,
        4 => AnimationEventKind::Takeover,
        _ => return None,
    })
}

/// Index of `value` in `all`, as a byte.
#[expect(
    clippy::cast_possible_truncation,
    reason = "enum tables have fewer than 256 entries"
)]
fn index_code<T: PartialEq>(all: &[T], value: &T) -> u8 {
    all.iter().position(|v| v == value).unwrap_or(0) as u8
}

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
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

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(phase_code(p));
    }

    fn write_run_state(&mut self, s: RunState) {
        self.write_u8(index_code(&RunState::ALL, &s));
    }

    fn write_property(&mut self, p: TargetProperty) {
        self.write_u8(index_code(&TargetProperty::ALL, &p));
    }
}

impl TraceSink for RecorderSink {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.0);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.0);
    }

    fn on_run_state_change(&mut self, e: &RunStateChangeEvent) {
        self.write_u8(TAG_RUN_STATE_CHANGE);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u32(e.player.0);
        self.write_u32(e.animation.0);
        self.write_u32(e.group.0);
        self.write_property(e.property);
        self.write_run_state(e.from);
        self.write_run_state(e.to);
        self.write_u64(e.at.0);
    }

    fn on_animation_event(&mut self, e: &AnimationEventEmitted) {
        self.write_u8(TAG_ANIMATION_EVENT);
        self.write_u64(e.frame_index);
        self.write_u32(e.player.0);
        self.write_u8(event_kind_code(e.kind));
        self.write_u32(e.group.0);
        self.write_property(e.property);
        self.write_u64(e.monotonic_time.0);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u64(s.now.0);
        self.write_u32(s.animated_players);
        self.write_u32(s.events);
        self.write_u32(s.animate_changes);
        self.write_u32(s.update_changes);
    }

    fn on_value_samples(&mut self, frame_index: u64, samples: &[ValueSample]) {
        self.write_u8(TAG_VALUE_SAMPLES_COUNT);
        self.write_u64(frame_index);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "sample count capped at u32::MAX for recording"
        )]
        self.write_u32(samples.len().min(u32::MAX as usize) as u32);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`RunStateChangeEvent`].
    RunStateChange(RunStateChangeEvent),
    /// An [`AnimationEventEmitted`].
    AnimationEvent(AnimationEventEmitted),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
    /// Value-sample count for a frame.
    ValueSamplesCount {
        /// Frame counter.
        frame_index: u64,
        /// Number of samples.
        count: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Decoding stops at the first unknown tag or truncated record.
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
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        phase_from_code(self.read_u8()?)
    }

    fn read_run_state(&mut self) -> Option<RunState> {
        RunState::ALL.get(usize::from(self.read_u8()?)).copied()
    }

    fn read_property(&mut self) -> Option<TargetProperty> {
        TargetProperty::ALL
            .get(usize::from(self.read_u8()?))
            .copied()
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_run_state_change(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::RunStateChange(RunStateChangeEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            player: PlayerId(self.read_u32()?),
            animation: AnimationId(self.read_u32()?),
            group: GroupId(self.read_u32()?),
            property: self.read_property()?,
            from: self.read_run_state()?,
            to: self.read_run_state()?,
            at: HostTime(self.read_u64()?),
        }))
    }

    fn decode_animation_event(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::AnimationEvent(AnimationEventEmitted {
            frame_index: self.read_u64()?,
            player: PlayerId(self.read_u32()?),
            kind: event_kind_from_code(self.read_u8()?)?,
            group: GroupId(self.read_u32()?),
            property: self.read_property()?,
            monotonic_time: HostTime(self.read_u64()?),
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index: self.read_u64()?,
            now: HostTime(self.read_u64()?),
            animated_players: self.read_u32()?,
            events: self.read_u32()?,
            animate_changes: self.read_u32()?,
            update_changes: self.read_u32()?,
        }))
    }

    fn decode_value_samples_count(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let count = self.read_u32()?;
        Some(RecordedEvent::ValueSamplesCount { frame_index, count })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_RUN_STATE_CHANGE => self.decode_run_state_change(),
            TAG_ANIMATION_EVENT => self.decode_animation_event(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            TAG_VALUE_SAMPLES_COUNT => self.decode_value_samples_count(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
