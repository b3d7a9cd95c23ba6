// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A deterministic two-timeline harness for impetus.
//!
//! [`SyncHarness`] owns a main [`AnimationHost`] and an impl
//! [`AnimationHost`], each with its own [`Elements`] tree, and runs the
//! commit loop between them one frame at a time:
//!
//! ```text
//!   frame(now):
//!     deliver queued impl events ──► main.set_animation_events
//!     activate impl (if due)
//!     main.animate / main.update_state
//!     commit (if due) ──► push_properties_to ──► schedule activation
//!     impl.animate / impl.update_state ──► queue events
//! ```
//!
//! Events travel through an in-order queue with a configurable delay, and a
//! commit is held back while the previous one still awaits activation.
//! [`CommitMetrics`] and a rolling [`LatencyTracker`] describe how the two
//! timelines kept up with each other.

#![no_std]

extern crate alloc;

use alloc::collections::{BTreeMap, VecDeque};
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Vec2;

use impetus_core::animation::{GroupId, TargetProperty};
use impetus_core::curve::ScrollOffsetCurve;
use impetus_core::element::{
    AnimationDelegate, ElementAnimations, ElementId, ObserverList, ValueObserver, ValueProvider,
};
use impetus_core::event::{AnimationEvent, AnimationEventKind};
use impetus_core::filter::FilterOperations;
use impetus_core::host::{AnimatedChanges, AnimationHost, HostConfig, MutatorClient};
use impetus_core::time::HostTime;
use impetus_core::transform::Transform3d;
use impetus_core::value::Color;

// ---------------------------------------------------------------------------
// Elements
// ---------------------------------------------------------------------------

/// Last animated values of one element in one tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementState {
    /// Last opacity.
    pub opacity: Option<f32>,
    /// Last transform.
    pub transform: Option<Transform3d>,
    /// Last filter list.
    pub filter: Option<FilterOperations>,
    /// Last scroll offset.
    pub scroll_offset: Option<Vec2>,
    /// Last background color.
    pub background_color: Option<Color>,
    /// Number of deletion notices.
    pub deletions: u32,
}

impl ValueObserver for ElementState {
    fn on_opacity_animated(&mut self, opacity: f32) {
        self.opacity = Some(opacity);
    }

    fn on_transform_animated(&mut self, transform: &Transform3d) {
        self.transform = Some(*transform);
    }

    fn on_filter_animated(&mut self, filters: &FilterOperations) {
        self.filter = Some(filters.clone());
    }

    fn on_scroll_offset_animated(&mut self, offset: Vec2) {
        self.scroll_offset = Some(offset);
    }

    fn on_background_color_animated(&mut self, color: Color) {
        self.background_color = Some(color);
    }

    fn on_animation_waiting_for_deletion(&mut self) {
        self.deletions += 1;
    }
}

/// A delegate callback, as recorded by [`Elements`].
#[derive(Clone, Debug, PartialEq)]
pub enum Lifecycle {
    /// A group started.
    Started {
        /// Callback time.
        time: HostTime,
        /// Animated property.
        property: TargetProperty,
        /// The group.
        group: GroupId,
    },
    /// A group finished.
    Finished {
        /// Callback time.
        time: HostTime,
        /// Animated property.
        property: TargetProperty,
        /// The group.
        group: GroupId,
    },
    /// A group was aborted.
    Aborted {
        /// Callback time.
        time: HostTime,
        /// Animated property.
        property: TargetProperty,
        /// The group.
        group: GroupId,
    },
    /// A scroll animation was handed over.
    Takeover {
        /// Callback time.
        time: HostTime,
        /// Start time of the handed-over animation.
        animation_start_time: Option<HostTime>,
        /// The curve to continue.
        curve: ScrollOffsetCurve,
    },
}

#[derive(Debug, Default)]
struct LifecycleLog(Vec<Lifecycle>);

impl AnimationDelegate for LifecycleLog {
    fn on_animation_started(&mut self, time: HostTime, property: TargetProperty, group: GroupId) {
        self.0.push(Lifecycle::Started {
            time,
            property,
            group,
        });
    }

    fn on_animation_finished(&mut self, time: HostTime, property: TargetProperty, group: GroupId) {
        self.0.push(Lifecycle::Finished {
            time,
            property,
            group,
        });
    }

    fn on_animation_aborted(&mut self, time: HostTime, property: TargetProperty, group: GroupId) {
        self.0.push(Lifecycle::Aborted {
            time,
            property,
            group,
        });
    }

    fn on_animation_takeover(
        &mut self,
        time: HostTime,
        _: TargetProperty,
        animation_start_time: Option<HostTime>,
        curve: &ScrollOffsetCurve,
    ) {
        self.0.push(Lifecycle::Takeover {
            time,
            animation_start_time,
            curve: curve.clone(),
        });
    }
}

#[derive(Clone, Copy, Debug)]
struct ScrollPosition(Vec2);

impl ValueProvider for ScrollPosition {
    fn current_scroll_offset(&self) -> Vec2 {
        self.0
    }
}

/// An element tree for one timeline: animated values per element, delegate
/// callbacks, and scroll positions for scroll animations to start from.
///
/// Elements come into existence the first time a host binds them.
#[derive(Debug, Default)]
pub struct Elements {
    active: BTreeMap<ElementId, ElementState>,
    pending: Option<BTreeMap<ElementId, ElementState>>,
    lifecycle: BTreeMap<ElementId, LifecycleLog>,
    scroll: BTreeMap<ElementId, ScrollPosition>,
}

impl Elements {
    /// An element tree with active observers only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An element tree that also observes the pending tree.
    #[must_use]
    pub fn with_pending_tree() -> Self {
        Self {
            pending: Some(BTreeMap::new()),
            ..Self::default()
        }
    }

    /// Values applied to `element` in `list`.
    #[must_use]
    pub fn state(&self, element: ElementId, list: ObserverList) -> Option<&ElementState> {
        match list {
            ObserverList::Active => self.active.get(&element),
            ObserverList::Pending => self.pending.as_ref()?.get(&element),
        }
    }

    /// Values applied to `element` in the active tree.
    #[must_use]
    pub fn active(&self, element: ElementId) -> Option<&ElementState> {
        self.state(element, ObserverList::Active)
    }

    /// Delegate callbacks received for `element`, oldest first.
    #[must_use]
    pub fn lifecycle(&self, element: ElementId) -> &[Lifecycle] {
        self.lifecycle.get(&element).map_or(&[], |log| log.0.as_slice())
    }

    /// Sets the scroll position that scroll animations on `element` start
    /// from.
    pub fn set_scroll_offset(&mut self, element: ElementId, offset: Vec2) {
        self.scroll.insert(element, ScrollPosition(offset));
    }
}

impl MutatorClient for Elements {
    fn bind(&mut self, element: ElementId) -> ElementAnimations<'_> {
        let mut binding = ElementAnimations::new(element)
            .with_observer(ObserverList::Active, self.active.entry(element).or_default())
            .with_delegate(self.lifecycle.entry(element).or_default());
        if let Some(pending) = &mut self.pending {
            binding = binding.with_observer(ObserverList::Pending, pending.entry(element).or_default());
        }
        if let Some(scroll) = self.scroll.get(&element) {
            binding = binding.with_value_provider(scroll);
        }
        binding
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Harness configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Commit every this many frames; 0 commits only on request.
    pub commit_interval: u32,
    /// Frames an impl event waits in the queue beyond the next frame.
    pub event_delay_frames: u32,
    /// Frames between a commit and its activation; 0 activates at once.
    pub activation_delay_frames: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            commit_interval: 1,
            event_delay_frames: 0,
            activation_delay_frames: 0,
        }
    }
}

/// Counters accumulated over the harness lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitMetrics {
    /// Frames run.
    pub frames: u64,
    /// Commits pushed to the impl host.
    pub commits: u64,
    /// Activations of pushed state.
    pub activations: u64,
    /// Commits held back by a pending activation.
    pub deferred_commits: u64,
    /// Events produced by the impl host.
    pub events_emitted: u64,
    /// Events delivered to the main host.
    pub events_delivered: u64,
    /// Largest number of events waiting in the queue after a frame.
    pub max_queue_depth: usize,
    by_kind: [u64; 5],
}

impl CommitMetrics {
    /// Events of `kind` produced by the impl host.
    #[must_use]
    pub const fn events_of(&self, kind: AnimationEventKind) -> u64 {
        self.by_kind[kind_index(kind)]
    }
}

const fn kind_index(kind: AnimationEventKind) -> usize {
    match kind {
        AnimationEventKind::Started => 0,
        AnimationEventKind::Finished => 1,
        AnimationEventKind::Aborted => 2,
        AnimationEventKind::PropertyUpdate => 3,
        AnimationEventKind::Takeover => 4,
    }
}

/// Rolling window of event delivery latencies, in milliseconds.
#[derive(Debug)]
pub struct LatencyTracker<const N: usize> {
    latencies_ms: [f64; N],
    cursor: usize,
    observed: u64,
    max_ms: f64,
}

impl<const N: usize> Default for LatencyTracker<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LatencyTracker<N> {
    /// Creates an empty tracker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latencies_ms: [0.0; N],
            cursor: 0,
            observed: 0,
            max_ms: 0.0,
        }
    }

    /// Records one latency.
    pub fn observe(&mut self, latency_ms: f64) {
        self.observed = self.observed.saturating_add(1);
        self.latencies_ms[self.cursor % N] = latency_ms;
        self.cursor = (self.cursor + 1) % N;
        self.max_ms = self.max_ms.max(latency_ms);
    }

    /// Number of latencies observed.
    #[must_use]
    pub const fn observed(&self) -> u64 {
        self.observed
    }

    /// Largest latency observed.
    #[must_use]
    pub const fn max_ms(&self) -> f64 {
        self.max_ms
    }

    /// Returns the window oldest→newest.
    #[must_use]
    pub fn latencies(&self) -> [f64; N] {
        let mut out = [0.0; N];
        let mut i = 0;
        while i < N {
            out[i] = self.latencies_ms[(self.cursor + i) % N];
            i += 1;
        }
        out
    }

    /// Returns an ASCII sparkline over `latencies()`.
    #[must_use]
    pub fn sparkline_ascii(&self, min_ms: f64, max_ms: f64) -> String {
        const LEVELS: &[u8] = b" .:-=+*#%@";
        let mut out = String::with_capacity(N);
        for v in self.latencies() {
            let t = (v.clamp(min_ms, max_ms) - min_ms) / (max_ms - min_ms);
            #[expect(
                clippy::cast_possible_truncation,
                reason = "index is clamped to ASCII level count"
            )]
            let level = (t * (LEVELS.len() as f64 - 1.0) + 0.5) as usize;
            out.push(LEVELS[level] as char);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Size of the harness latency window.
pub const LATENCY_WINDOW: usize = 32;

/// What one [`SyncHarness::frame`] did.
#[derive(Clone, Debug, Default)]
pub struct FrameReport {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// Whether main state was pushed this frame.
    pub committed: bool,
    /// Whether pushed state was activated this frame.
    pub activated: bool,
    /// Events the impl host produced.
    pub events_emitted: usize,
    /// Events delivered to the main host.
    pub events_delivered: usize,
    /// Elements the main host changed.
    pub main_changes: AnimatedChanges,
    /// Elements the impl host changed.
    pub impl_changes: AnimatedChanges,
}

#[derive(Debug)]
struct QueuedEvent {
    deliver_at: u64,
    event: AnimationEvent,
}

/// Runs a main and an impl host against each other, frame by frame.
#[derive(Debug)]
pub struct SyncHarness {
    config: HarnessConfig,
    main: AnimationHost,
    impl_host: AnimationHost,
    main_elements: Elements,
    impl_elements: Elements,
    queue: VecDeque<QueuedEvent>,
    frame: u64,
    commit_requested: bool,
    activation_due: Option<u64>,
    metrics: CommitMetrics,
    latency: LatencyTracker<LATENCY_WINDOW>,
}

impl Default for SyncHarness {
    fn default() -> Self {
        Self::new(HarnessConfig::default())
    }
}

impl SyncHarness {
    /// Creates a harness with empty hosts. The impl side observes both its
    /// active and pending trees.
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            main: AnimationHost::new(HostConfig::MAIN),
            impl_host: AnimationHost::new(HostConfig::IMPL),
            main_elements: Elements::new(),
            impl_elements: Elements::with_pending_tree(),
            queue: VecDeque::new(),
            frame: 0,
            commit_requested: false,
            activation_due: None,
            metrics: CommitMetrics::default(),
            latency: LatencyTracker::new(),
        }
    }

    /// The main host.
    #[must_use]
    pub fn main(&self) -> &AnimationHost {
        &self.main
    }

    /// The main host, for adding players and animations.
    pub fn main_mut(&mut self) -> &mut AnimationHost {
        &mut self.main
    }

    /// The impl host.
    #[must_use]
    pub fn impl_host(&self) -> &AnimationHost {
        &self.impl_host
    }

    /// The main element tree.
    #[must_use]
    pub fn main_elements(&self) -> &Elements {
        &self.main_elements
    }

    /// The impl element tree.
    #[must_use]
    pub fn impl_elements(&self) -> &Elements {
        &self.impl_elements
    }

    /// The impl element tree, for setting scroll positions.
    pub fn impl_elements_mut(&mut self) -> &mut Elements {
        &mut self.impl_elements
    }

    /// Counters so far.
    #[must_use]
    pub const fn metrics(&self) -> CommitMetrics {
        self.metrics
    }

    /// Delivery latencies so far.
    #[must_use]
    pub const fn latency(&self) -> &LatencyTracker<LATENCY_WINDOW> {
        &self.latency
    }

    /// Events waiting for delivery.
    #[must_use]
    pub fn queued_events(&self) -> usize {
        self.queue.len()
    }

    /// Asks for a commit on the next frame.
    pub fn request_commit(&mut self) {
        self.commit_requested = true;
    }

    /// Runs one frame at `now`.
    pub fn frame(&mut self, now: HostTime) -> FrameReport {
        self.frame += 1;
        self.metrics.frames += 1;
        let mut report = FrameReport {
            frame: self.frame,
            ..FrameReport::default()
        };

        let mut delivered = Vec::new();
        while self
            .queue
            .front()
            .is_some_and(|q| q.deliver_at <= self.frame)
        {
            if let Some(q) = self.queue.pop_front() {
                let latency = now.delta_since(q.event.monotonic_time);
                self.latency.observe(latency.nanos() as f64 / 1_000_000.0);
                delivered.push(q.event);
            }
        }
        if !delivered.is_empty() {
            self.main
                .set_animation_events(&delivered, &mut self.main_elements);
            report.events_delivered = delivered.len();
            self.metrics.events_delivered += delivered.len() as u64;
        }

        if self.activation_due.is_some_and(|due| due <= self.frame) {
            self.activate(&mut report);
        }

        self.main.animate(now, &mut self.main_elements);
        self.main.update_state(true, &mut self.main_elements);

        if self.commit_due() {
            if self.activation_due.is_some() {
                self.metrics.deferred_commits += 1;
            } else {
                self.commit(&mut report);
            }
        }

        self.impl_host.animate(now, &mut self.impl_elements);
        let events = self.impl_host.update_state(true, &mut self.impl_elements);
        report.events_emitted = events.len();
        self.metrics.events_emitted += events.len() as u64;
        let deliver_at = self.frame + 1 + u64::from(self.config.event_delay_frames);
        for event in events {
            self.metrics.by_kind[kind_index(event.kind)] += 1;
            self.queue.push_back(QueuedEvent { deliver_at, event });
        }
        self.metrics.max_queue_depth = self.metrics.max_queue_depth.max(self.queue.len());

        report.main_changes = self.main.take_changes();
        report.impl_changes = self.impl_host.take_changes();
        report
    }

    fn commit_due(&self) -> bool {
        let interval = u64::from(self.config.commit_interval);
        self.commit_requested || (interval != 0 && self.frame % interval == 0)
    }

    fn commit(&mut self, report: &mut FrameReport) {
        self.main
            .push_properties_to(&mut self.impl_host, &mut self.impl_elements);
        self.commit_requested = false;
        self.metrics.commits += 1;
        report.committed = true;
        if self.config.activation_delay_frames == 0 {
            self.activate(report);
        } else {
            self.activation_due = Some(self.frame + u64::from(self.config.activation_delay_frames));
        }
    }

    fn activate(&mut self, report: &mut FrameReport) {
        self.impl_host.activate_animations();
        self.activation_due = None;
        self.metrics.activations += 1;
        report.activated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impetus_core::animation::{Animation, AnimationId, RunState};
    use impetus_core::curve::{DurationBehavior, FloatCurve};
    use impetus_core::player::PlayerId;

    const E: ElementId = ElementId(1);
    const P: PlayerId = PlayerId(1);

    fn ms(v: u64) -> HostTime {
        HostTime::from_millis(v)
    }

    fn fade() -> Animation {
        Animation::new(
            FloatCurve::transition(1.0, 0.0, 1.0, None),
            AnimationId(1),
            GroupId(1),
            TargetProperty::Opacity,
        )
    }

    fn harness_with_fade(config: HarnessConfig) -> SyncHarness {
        let mut h = SyncHarness::new(config);
        h.main_mut().add_player(P).attach_element(E);
        assert!(h.main_mut().add_animation(P, fade()));
        h
    }

    /// Frame `n` (1-based) runs at `(n - 1) * 16` ms.
    fn run(h: &mut SyncHarness, frames: u64) {
        for _ in 0..frames {
            let now = ms(h.metrics().frames * 16);
            h.frame(now);
        }
    }

    #[test]
    fn animation_runs_to_completion_on_both_timelines() {
        let mut h = harness_with_fade(HarnessConfig::default());

        let first = h.frame(ms(0));
        assert!(first.committed && first.activated);
        assert_eq!(first.events_emitted, 1, "impl starts at once");
        assert_eq!(first.impl_changes.opacities, [1]);

        h.frame(ms(16));
        let a = h
            .main()
            .player(P)
            .and_then(|p| p.animation_by_id(AnimationId(1)))
            .expect("main copy");
        assert_eq!(a.start_time(), Some(ms(0)), "start time synchronized");

        run(&mut h, 68);
        let m = h.metrics();
        assert_eq!(m.events_of(AnimationEventKind::Started), 1);
        assert_eq!(m.events_of(AnimationEventKind::Finished), 1);
        assert_eq!(m.events_emitted, m.events_delivered);
        assert_eq!(h.queued_events(), 0);

        assert!(!h.main().player(P).expect("player").has_any_animation());
        assert!(!h.impl_host().player(P).expect("player").has_any_animation());
        assert_eq!(h.impl_elements().active(E).and_then(|s| s.opacity), Some(1.0));
        assert_eq!(h.main_elements().active(E).and_then(|s| s.opacity), Some(1.0));
        assert_eq!(
            h.main_elements().lifecycle(E),
            [
                Lifecycle::Started {
                    time: ms(0),
                    property: TargetProperty::Opacity,
                    group: GroupId(1),
                },
                Lifecycle::Finished {
                    time: ms(1008),
                    property: TargetProperty::Opacity,
                    group: GroupId(1),
                },
            ]
        );
    }

    #[test]
    fn commit_waits_for_activation() {
        let mut h = harness_with_fade(HarnessConfig {
            activation_delay_frames: 2,
            ..HarnessConfig::default()
        });

        let f1 = h.frame(ms(0));
        assert!(f1.committed && !f1.activated);
        assert_eq!(f1.events_emitted, 0, "pending-only copies do not start");
        let impl_tree = h.impl_elements();
        assert_eq!(
            impl_tree.state(E, ObserverList::Pending).and_then(|s| s.opacity),
            Some(0.0)
        );
        assert_eq!(impl_tree.active(E).and_then(|s| s.opacity), None);

        let f2 = h.frame(ms(16));
        assert!(!f2.committed);

        let f3 = h.frame(ms(32));
        assert!(f3.activated && f3.committed);
        assert_eq!(f3.events_emitted, 1);

        let m = h.metrics();
        assert_eq!(m.commits, 2);
        assert_eq!(m.activations, 1);
        assert_eq!(m.deferred_commits, 1);

        h.frame(ms(48));
        let a = h
            .main()
            .player(P)
            .and_then(|p| p.animation_by_id(AnimationId(1)))
            .expect("main copy");
        assert_eq!(a.start_time(), Some(ms(32)));
    }

    #[test]
    fn delayed_events_reach_main_late() {
        let mut h = harness_with_fade(HarnessConfig {
            event_delay_frames: 3,
            ..HarnessConfig::default()
        });
        run(&mut h, 4);
        assert_eq!(h.queued_events(), 1);
        let waiting = h
            .main()
            .player(P)
            .and_then(|p| p.animation_by_id(AnimationId(1)))
            .expect("main copy");
        assert!(waiting.needs_synchronized_start_time());

        let f5 = h.frame(ms(64));
        assert_eq!(f5.events_delivered, 1);
        assert_eq!(h.latency().observed(), 1);
        assert_eq!(h.latency().max_ms(), 64.0);
        assert_eq!(h.metrics().max_queue_depth, 1);
    }

    #[test]
    fn on_demand_commits() {
        let mut h = harness_with_fade(HarnessConfig {
            commit_interval: 0,
            ..HarnessConfig::default()
        });
        let f1 = h.frame(ms(0));
        assert!(!f1.committed);
        assert!(h.impl_host().player(P).is_none());

        h.request_commit();
        let f2 = h.frame(ms(16));
        assert!(f2.committed);
        assert!(h.impl_host().player(P).is_some());
        let f3 = h.frame(ms(32));
        assert!(!f3.committed, "a request covers one commit");
    }

    #[test]
    fn scroll_animation_starts_from_impl_position() {
        let mut h = SyncHarness::default();
        h.impl_elements_mut()
            .set_scroll_offset(E, Vec2::new(0.0, 100.0));
        h.main_mut().add_player(P).attach_element(E);
        h.main_mut().add_animation(
            P,
            Animation::new(
                ScrollOffsetCurve::new(Vec2::new(0.0, 400.0), DurationBehavior::DeltaBased),
                AnimationId(9),
                GroupId(9),
                TargetProperty::ScrollOffset,
            ),
        );

        let report = h.frame(ms(0));
        assert_eq!(report.impl_changes.scroll_offsets, [1]);
        assert_eq!(
            h.impl_elements().active(E).and_then(|s| s.scroll_offset),
            Some(Vec2::new(0.0, 100.0))
        );
        let main_curve = h
            .main()
            .player(P)
            .and_then(|p| p.animation_by_id(AnimationId(9)))
            .and_then(|a| a.curve().as_scroll_offset())
            .expect("scroll curve");
        assert!(main_curve.has_initial_value(), "initial value set at commit");
        let impl_state = h
            .impl_host()
            .player(P)
            .and_then(|p| p.animation_by_id(AnimationId(9)))
            .map(Animation::run_state);
        assert_eq!(impl_state, Some(RunState::Running));
    }

    #[test]
    fn latency_window_wraps() {
        let mut t = LatencyTracker::<4>::new();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            t.observe(v);
        }
        assert_eq!(t.latencies(), [2.0, 3.0, 4.0, 5.0]);
        assert_eq!(t.observed(), 5);
        assert_eq!(t.max_ms(), 5.0);
        assert_eq!(t.sparkline_ascii(2.0, 5.0), " -*@");
    }
}
