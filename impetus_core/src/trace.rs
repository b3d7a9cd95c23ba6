// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the animation host.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`AnimationHost`](crate::host::AnimationHost) calls from its `*_traced`
//! entry points. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! [`FrameSummaryBuilder`] counts what happened between an `animate` and the
//! matching `update_state` and produces a [`FrameSummary`] at the end.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) gates [`ValueSample`] events and the
//!   corresponding `TraceSink` method.

use crate::animation::{AnimationId, GroupId, RunState, TargetProperty};
use crate::event::{AnimationEvent, AnimationEventKind};
use crate::player::PlayerId;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which host operation is being traced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Starting animations and applying values.
    Animate,
    /// Committing run-state transitions and collecting events.
    UpdateState,
    /// Copying main-side changes to the impl host.
    Push,
    /// Making pushed animations affect the active tree.
    Activate,
}

impl PhaseKind {
    /// Short lowercase name, for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Animate => "animate",
            Self::UpdateState => "update_state",
            Self::Push => "push",
            Self::Activate => "activate",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Marks the beginning of a host phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Engine time the phase runs at.
    pub timestamp: HostTime,
}

/// Marks the end of a host phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Engine time the phase ran at.
    pub timestamp: HostTime,
}

/// Emitted when an animation changed run state during a phase.
#[derive(Clone, Copy, Debug)]
pub struct RunStateChangeEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// The phase in which the change was observed.
    pub phase: PhaseKind,
    /// Owning player.
    pub player: PlayerId,
    /// The animation.
    pub animation: AnimationId,
    /// Its group.
    pub group: GroupId,
    /// Its property.
    pub property: TargetProperty,
    /// State before the phase.
    pub from: RunState,
    /// State after the phase.
    pub to: RunState,
    /// Engine time of the phase.
    pub at: HostTime,
}

/// Emitted for every [`AnimationEvent`] an impl host produces.
#[derive(Clone, Copy, Debug)]
pub struct AnimationEventEmitted {
    /// Frame counter.
    pub frame_index: u64,
    /// Producing player.
    pub player: PlayerId,
    /// What the event reports.
    pub kind: AnimationEventKind,
    /// Animation group.
    pub group: GroupId,
    /// Animation property.
    pub property: TargetProperty,
    /// Event time.
    pub monotonic_time: HostTime,
}

impl AnimationEventEmitted {
    /// Describes `event`, produced during frame `frame_index`.
    #[must_use]
    pub fn new(frame_index: u64, event: &AnimationEvent) -> Self {
        Self {
            frame_index,
            player: event.player_id,
            kind: event.kind,
            group: event.group_id,
            property: event.target_property,
            monotonic_time: event.monotonic_time,
        }
    }
}

/// Per-frame counts produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Engine time of the frame.
    pub now: HostTime,
    /// Active players animated this frame.
    pub animated_players: u32,
    /// Events produced by `update_state`.
    pub events: u32,
    /// Run-state changes observed in the animate phase.
    pub animate_changes: u32,
    /// Run-state changes observed in the update phase.
    pub update_changes: u32,
}

impl FrameSummary {
    /// Total run-state changes in the frame.
    #[must_use]
    pub const fn run_state_changes(&self) -> u32 {
        self.animate_changes + self.update_changes
    }
}

/// The sampled curve time of one animation (requires `trace-rich`).
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct ValueSample {
    /// Owning player.
    pub player: PlayerId,
    /// The animation.
    pub animation: AnimationId,
    /// Its property.
    pub property: TargetProperty,
    /// Curve time in seconds the value was taken at.
    pub curve_time: f64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the animation host.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the beginning of a host phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a host phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called when an animation changed run state.
    fn on_run_state_change(&mut self, e: &RunStateChangeEvent) {
        _ = e;
    }

    /// Called for every event an impl host produces.
    fn on_animation_event(&mut self, e: &AnimationEventEmitted) {
        _ = e;
    }

    /// Called with a per-frame summary at the end of `update_state`.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }

    /// Called with the curve times sampled in an animate phase (requires
    /// `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_value_samples(&mut self, frame_index: u64, samples: &[ValueSample]) {
        _ = (frame_index, samples);
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
        f.debug_struct("Tracer")
            .field("active", &self.is_active())
            .finish_non_exhaustive()
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

    /// Returns `true` if events reach a sink. Always `false` without the
    /// `trace` feature.
    ///
    /// The host skips the bookkeeping behind run-state change events when
    /// this is `false`.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RunStateChangeEvent`].
    #[inline]
    pub fn run_state_change(&mut self, e: &RunStateChangeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_run_state_change(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`AnimationEventEmitted`].
    #[inline]
    pub fn animation_event(&mut self, e: &AnimationEventEmitted) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_animation_event(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits value samples (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn value_samples(&mut self, frame_index: u64, samples: &[ValueSample]) {
        if let Some(s) = &mut self.sink {
            s.on_value_samples(frame_index, samples);
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Counts what happens during a frame and produces a [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    frame_index: u64,
    now: HostTime,
    animated_players: u32,
    events: u32,
    changes: [u32; 4],
}

impl FrameSummaryBuilder {
    /// Starts a summary for frame `frame_index` at `now`.
    #[must_use]
    pub const fn new(frame_index: u64, now: HostTime) -> Self {
        Self {
            frame_index,
            now,
            animated_players: 0,
            events: 0,
            changes: [0; 4],
        }
    }

    /// Records how many players were animated.
    pub fn set_animated_players(&mut self, count: u32) {
        self.animated_players = count;
    }

    /// Records one emitted event.
    pub fn record_event(&mut self) {
        self.events += 1;
    }

    /// Records one run-state change observed in `phase`.
    pub fn record_change(&mut self, phase: PhaseKind) {
        self.changes[phase_index(phase)] += 1;
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        FrameSummary {
            frame_index: self.frame_index,
            now: self.now,
            animated_players: self.animated_players,
            events: self.events,
            animate_changes: self.changes[phase_index(PhaseKind::Animate)],
            update_changes: self.changes[phase_index(PhaseKind::UpdateState)],
        }
    }
}

/// Maps a [`PhaseKind`] to an array index.
const fn phase_index(phase: PhaseKind) -> usize {
    match phase {
        PhaseKind::Animate => 0,
        PhaseKind::UpdateState => 1,
        PhaseKind::Push => 2,
        PhaseKind::Activate => 3,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_change() -> RunStateChangeEvent {
        RunStateChangeEvent {
            frame_index: 42,
            phase: PhaseKind::UpdateState,
            player: PlayerId(3),
            animation: AnimationId(1),
            group: GroupId(1),
            property: TargetProperty::Opacity,
            from: RunState::Starting,
            to: RunState::Running,
            at: HostTime(1_000_000),
        }
    }

    #[test]
    fn animation_event_emitted_from_event() {
        let event = AnimationEvent {
            kind: AnimationEventKind::Started,
            player_id: PlayerId(9),
            element_id: None,
            group_id: GroupId(2),
            target_property: TargetProperty::Transform,
            monotonic_time: HostTime(100),
            is_impl_only: false,
            value: None,
            animation_start_time: None,
            curve: None,
        };
        let evt = AnimationEventEmitted::new(7, &event);
        assert_eq!(evt.frame_index, 7);
        assert_eq!(evt.player, PlayerId(9));
        assert_eq!(evt.kind, AnimationEventKind::Started);
        assert_eq!(evt.group, GroupId(2));
        assert_eq!(evt.monotonic_time, HostTime(100));
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_run_state_change(&sample_change());
        sink.on_frame_summary(&FrameSummaryBuilder::new(0, HostTime(0)).finish());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_active());
        tracer.run_state_change(&sample_change());
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::Animate,
            timestamp: HostTime(0),
        });
    }

    #[test]
    fn summary_builder_counts() {
        let mut builder = FrameSummaryBuilder::new(42, HostTime(1_000_000));
        builder.set_animated_players(3);
        builder.record_change(PhaseKind::Animate);
        builder.record_change(PhaseKind::UpdateState);
        builder.record_change(PhaseKind::UpdateState);
        builder.record_change(PhaseKind::Push);
        builder.record_event();
        builder.record_event();

        let summary = builder.finish();
        assert_eq!(summary.frame_index, 42);
        assert_eq!(summary.now, HostTime(1_000_000));
        assert_eq!(summary.animated_players, 3);
        assert_eq!(summary.events, 2);
        assert_eq!(summary.animate_changes, 1);
        assert_eq!(summary.update_changes, 2);
        assert_eq!(summary.run_state_changes(), 3, "push changes are not per-frame");
    }

    #[test]
    fn empty_summary_is_zero() {
        let summary = FrameSummaryBuilder::new(1, HostTime(0)).finish();
        assert_eq!(summary.animated_players, 0);
        assert_eq!(summary.events, 0);
        assert_eq!(summary.run_state_changes(), 0);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            changes: Vec<(RunState, RunState)>,
        }
        impl TraceSink for RecordingSink {
            fn on_run_state_change(&mut self, e: &RunStateChangeEvent) {
                self.changes.push((e.from, e.to));
            }
        }

        let mut sink = RecordingSink {
            changes: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        assert!(tracer.is_active());
        tracer.run_state_change(&sample_change());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.changes, &[(RunState::Starting, RunState::Running)]);
    }
}
