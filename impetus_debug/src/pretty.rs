// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Engine times
//! are printed in milliseconds.

use std::io::Write;

use impetus_core::time::HostTime;
use impetus_core::trace::{
    AnimationEventEmitted, FrameSummary, PhaseBeginEvent, PhaseEndEvent, RunStateChangeEvent,
    TraceSink, ValueSample,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn ms(t: HostTime) -> f64 {
    t.0 as f64 / 1_000_000.0
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {:.3}ms",
            e.frame_index,
            e.phase.name(),
            ms(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {:.3}ms",
            e.frame_index,
            e.phase.name(),
            ms(e.timestamp),
        );
    }

    fn on_run_state_change(&mut self, e: &RunStateChangeEvent) {
        let _ = writeln!(
            self.writer,
            "[state] frame={} player={} anim={} group={} {} {} -> {}",
            e.frame_index,
            e.player.0,
            e.animation.0,
            e.group.0,
            e.property.name(),
            e.from.name(),
            e.to.name(),
        );
    }

    fn on_animation_event(&mut self, e: &AnimationEventEmitted) {
        let _ = writeln!(
            self.writer,
            "[event] frame={} player={} {} group={} {} at {:.3}ms",
            e.frame_index,
            e.player.0,
            e.kind.name(),
            e.group.0,
            e.property.name(),
            ms(e.monotonic_time),
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} now={:.3}ms players={} events={} changes={}",
            s.frame_index,
            ms(s.now),
            s.animated_players,
            s.events,
            s.run_state_changes(),
        );
    }

    fn on_value_samples(&mut self, frame_index: u64, samples: &[ValueSample]) {
        let _ = writeln!(
            self.writer,
            "[samples] frame={frame_index} count={}",
            samples.len(),
        );
    }
}
