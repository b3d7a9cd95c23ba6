// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single animation: one curve plus its run state and timing bookkeeping.
//!
//! An [`Animation`] never advances itself. Its owning
//! [`Player`](crate::player::Player) drives run-state transitions and asks it
//! to map a monotonic time onto curve time with
//! [`trim_time_to_current_iteration`](Animation::trim_time_to_current_iteration).
//!
//! # Run states
//!
//! ```text
//!   WaitingForTargetAvailability ──► Starting ──► Running ⇄ Paused
//!                                                    │
//!                                                    ▼
//!            Aborted / AbortedButNeedsCompletion / Finished ──► WaitingForDeletion
//! ```
//!
//! `Starting` holds the animation at its first frame until it has a start
//! time. A suspended animation ignores every run-state change until resumed.

use crate::curve::{Curve, CurveType};
use crate::time::{HostTime, TimeDelta};
use crate::value::AnimatedValue;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identifies an animation within its player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnimationId(pub u32);

/// Identifies a group of animations that start and finish together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(pub u32);

/// Hands out fresh animation and group ids.
///
/// Ids start at 1. One provider is typically shared by everything that adds
/// animations to a given host.
#[derive(Clone, Debug)]
pub struct IdProvider {
    next_animation: u32,
    next_group: u32,
}

impl Default for IdProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdProvider {
    /// Creates a provider whose first ids are 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_animation: 1,
            next_group: 1,
        }
    }

    /// Returns a fresh animation id.
    pub fn next_animation_id(&mut self) -> AnimationId {
        let id = AnimationId(self.next_animation);
        self.next_animation = self.next_animation.wrapping_add(1);
        id
    }

    /// Returns a fresh group id.
    pub fn next_group_id(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group = self.next_group.wrapping_add(1);
        id
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The element property an animation drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetProperty {
    /// Element transform.
    Transform,
    /// Element opacity.
    Opacity,
    /// Element filter list.
    Filter,
    /// Scroll offset of a scroller.
    ScrollOffset,
    /// Background color.
    BackgroundColor,
}

impl TargetProperty {
    /// Every property, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Transform,
        Self::Opacity,
        Self::Filter,
        Self::ScrollOffset,
        Self::BackgroundColor,
    ];

    /// The curve kind that can drive this property.
    #[must_use]
    pub const fn curve_type(self) -> CurveType {
        match self {
            Self::Transform => CurveType::Transform,
            Self::Opacity => CurveType::Float,
            Self::Filter => CurveType::Filter,
            Self::ScrollOffset => CurveType::ScrollOffset,
            Self::BackgroundColor => CurveType::Color,
        }
    }

    /// Short lowercase name, for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::Opacity => "opacity",
            Self::Filter => "filter",
            Self::ScrollOffset => "scroll_offset",
            Self::BackgroundColor => "background_color",
        }
    }

    /// Bit for this property in a [`PropertySet`].
    const fn bit(self) -> u8 {
        match self {
            Self::Transform => 1,
            Self::Opacity => 2,
            Self::Filter => 4,
            Self::ScrollOffset => 8,
            Self::BackgroundColor => 16,
        }
    }
}

/// A small set of [`TargetProperty`] values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PropertySet(u8);

impl PropertySet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Adds `property`.
    #[inline]
    pub fn insert(&mut self, property: TargetProperty) {
        self.0 |= property.bit();
    }

    /// Returns `true` if `property` is in the set.
    #[inline]
    #[must_use]
    pub const fn contains(self, property: TargetProperty) -> bool {
        self.0 & property.bit() != 0
    }

    /// Returns `true` if the sets share a property.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns the union of both sets.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if the set is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the contained properties in declaration order.
    pub fn iter(self) -> impl Iterator<Item = TargetProperty> {
        TargetProperty::ALL
            .into_iter()
            .filter(move |p| self.contains(*p))
    }
}

impl FromIterator<TargetProperty> for PropertySet {
    fn from_iter<I: IntoIterator<Item = TargetProperty>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for p in iter {
            set.insert(p);
        }
        set
    }
}

/// Lifecycle state of an animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Wants to run, but its properties are still held by other animations.
    WaitingForTargetAvailability,
    /// Finished and reported; will be removed.
    WaitingForDeletion,
    /// Granted its properties but held at its first frame.
    Starting,
    /// Advancing with time.
    Running,
    /// Time frozen at the pause time.
    Paused,
    /// Completed all iterations.
    Finished,
    /// Cancelled.
    Aborted,
    /// Cancelled so that another timeline can continue it.
    AbortedButNeedsCompletion,
}

impl RunState {
    /// Every run state, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::WaitingForTargetAvailability,
        Self::WaitingForDeletion,
        Self::Starting,
        Self::Running,
        Self::Paused,
        Self::Finished,
        Self::Aborted,
        Self::AbortedButNeedsCompletion,
    ];

    /// Returns `true` for states from which the animation never runs again.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(
            self,
            Self::Finished
                | Self::Aborted
                | Self::AbortedButNeedsCompletion
                | Self::WaitingForDeletion
        )
    }

    /// Short lowercase name, for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WaitingForTargetAvailability => "waiting_for_target_availability",
            Self::WaitingForDeletion => "waiting_for_deletion",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Finished => "finished",
            Self::Aborted => "aborted",
            Self::AbortedButNeedsCompletion => "aborted_but_needs_completion",
        }
    }
}

/// Playback direction across iterations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Every iteration plays forwards.
    #[default]
    Normal,
    /// Every iteration plays backwards.
    Reverse,
    /// Even iterations play forwards, odd ones backwards.
    Alternate,
    /// Even iterations play backwards, odd ones forwards.
    AlternateReverse,
}

/// Whether an animation contributes a value outside its active interval.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillMode {
    /// Only while active.
    None,
    /// Holds the final value after the end.
    Forwards,
    /// Applies the first value during a start delay.
    Backwards,
    /// Both of the above.
    #[default]
    Both,
}

// ---------------------------------------------------------------------------
// Animation
// ---------------------------------------------------------------------------

/// One curve driving one property, with its run state and timing.
#[derive(Clone, Debug)]
pub struct Animation {
    id: AnimationId,
    group: GroupId,
    target_property: TargetProperty,
    curve: Curve,
    run_state: RunState,
    start_time: Option<HostTime>,
    pause_time: HostTime,
    total_paused_time: TimeDelta,
    time_offset: TimeDelta,
    iterations: i32,
    direction: Direction,
    fill_mode: FillMode,
    needs_synchronized_start_time: bool,
    received_finished_event: bool,
    suspended: bool,
    is_controlling_instance: bool,
    is_impl_only: bool,
    affects_active_observers: bool,
    affects_pending_observers: bool,
}

impl Animation {
    /// Creates an animation of `curve` on `target_property`, waiting for its
    /// target, playing once forwards.
    ///
    /// # Panics
    ///
    /// Panics if the curve kind cannot drive `target_property`, or if a
    /// keyframed curve has no keyframes.
    #[must_use]
    pub fn new(
        curve: impl Into<Curve>,
        id: AnimationId,
        group: GroupId,
        target_property: TargetProperty,
    ) -> Self {
        let curve = curve.into();
        assert!(
            curve.curve_type() == target_property.curve_type(),
            "curve kind {:?} cannot animate {target_property:?}",
            curve.curve_type()
        );
        assert!(!curve.is_empty(), "{target_property:?} curve has no keyframes");
        Self {
            id,
            group,
            target_property,
            curve,
            run_state: RunState::WaitingForTargetAvailability,
            start_time: None,
            pause_time: HostTime(0),
            total_paused_time: TimeDelta::ZERO,
            time_offset: TimeDelta::ZERO,
            iterations: 1,
            direction: Direction::Normal,
            fill_mode: FillMode::Both,
            needs_synchronized_start_time: false,
            received_finished_event: false,
            suspended: false,
            is_controlling_instance: false,
            is_impl_only: false,
            affects_active_observers: true,
            affects_pending_observers: true,
        }
    }

    /// Returns the id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> AnimationId {
        self.id
    }

    /// Returns the group.
    #[inline]
    #[must_use]
    pub const fn group(&self) -> GroupId {
        self.group
    }

    /// Returns the animated property.
    #[inline]
    #[must_use]
    pub const fn target_property(&self) -> TargetProperty {
        self.target_property
    }

    /// Returns the curve.
    #[inline]
    #[must_use]
    pub const fn curve(&self) -> &Curve {
        &self.curve
    }

    /// Returns the curve for in-place updates such as scroll retargeting.
    #[inline]
    #[must_use]
    pub const fn curve_mut(&mut self) -> &mut Curve {
        &mut self.curve
    }

    /// Returns the run state.
    #[inline]
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Moves to `run_state` at `now`, accounting pause time. Ignored while
    /// suspended.
    pub fn set_run_state(&mut self, run_state: RunState, now: HostTime) {
        if self.suspended {
            return;
        }
        if self.run_state == RunState::Paused && run_state == RunState::Running {
            self.total_paused_time += now - self.pause_time;
        } else if run_state == RunState::Paused {
            self.pause_time = now;
        }
        self.run_state = run_state;
    }

    /// Pauses at `now` and blocks every later run-state change until
    /// [`resume`](Self::resume).
    pub fn suspend(&mut self, now: HostTime) {
        self.set_run_state(RunState::Paused, now);
        self.suspended = true;
    }

    /// Lifts a suspension and resumes running at `now`.
    pub fn resume(&mut self, now: HostTime) {
        self.suspended = false;
        self.set_run_state(RunState::Running, now);
    }

    /// Returns `true` while suspended.
    #[inline]
    #[must_use]
    pub const fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Returns the start time, if the animation has started.
    #[inline]
    #[must_use]
    pub const fn start_time(&self) -> Option<HostTime> {
        self.start_time
    }

    /// Sets the start time.
    #[inline]
    pub fn set_start_time(&mut self, t: HostTime) {
        self.start_time = Some(t);
    }

    /// Time at which the animation was last paused.
    #[inline]
    #[must_use]
    pub const fn pause_time(&self) -> HostTime {
        self.pause_time
    }

    /// Sum of all completed pauses.
    #[inline]
    #[must_use]
    pub const fn total_paused_time(&self) -> TimeDelta {
        self.total_paused_time
    }

    /// Returns the time offset.
    #[inline]
    #[must_use]
    pub const fn time_offset(&self) -> TimeDelta {
        self.time_offset
    }

    /// Shifts the animation's clock. A negative offset delays it.
    #[inline]
    pub fn set_time_offset(&mut self, offset: TimeDelta) {
        self.time_offset = offset;
    }

    /// Returns the iteration count; `-1` is infinite.
    #[inline]
    #[must_use]
    pub const fn iterations(&self) -> i32 {
        self.iterations
    }

    /// Sets the iteration count; `-1` is infinite.
    #[inline]
    pub fn set_iterations(&mut self, iterations: i32) {
        self.iterations = iterations;
    }

    /// Returns the direction.
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Sets the direction.
    #[inline]
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Returns the fill mode.
    #[inline]
    #[must_use]
    pub const fn fill_mode(&self) -> FillMode {
        self.fill_mode
    }

    /// Sets the fill mode.
    #[inline]
    pub fn set_fill_mode(&mut self, fill_mode: FillMode) {
        self.fill_mode = fill_mode;
    }

    /// Returns `true` while the animation waits for an authoritative start
    /// time from the other timeline.
    #[inline]
    #[must_use]
    pub const fn needs_synchronized_start_time(&self) -> bool {
        self.needs_synchronized_start_time
    }

    /// Sets whether a start time must arrive from the other timeline.
    #[inline]
    pub fn set_needs_synchronized_start_time(&mut self, needs: bool) {
        self.needs_synchronized_start_time = needs;
    }

    /// Returns `true` once a `Finished` event for this animation arrived.
    #[inline]
    #[must_use]
    pub const fn received_finished_event(&self) -> bool {
        self.received_finished_event
    }

    /// Records that a `Finished` event arrived.
    #[inline]
    pub fn set_received_finished_event(&mut self, received: bool) {
        self.received_finished_event = received;
    }

    /// Returns `true` for the authoritative copy made by
    /// [`clone_and_initialize`](Self::clone_and_initialize).
    #[inline]
    #[must_use]
    pub const fn is_controlling_instance(&self) -> bool {
        self.is_controlling_instance
    }

    /// Returns `true` if the animation exists only on the impl timeline.
    #[inline]
    #[must_use]
    pub const fn is_impl_only(&self) -> bool {
        self.is_impl_only
    }

    /// Marks the animation as existing only on the impl timeline.
    #[inline]
    pub fn set_is_impl_only(&mut self, impl_only: bool) {
        self.is_impl_only = impl_only;
    }

    /// Returns `true` if values reach active observers.
    #[inline]
    #[must_use]
    pub const fn affects_active_observers(&self) -> bool {
        self.affects_active_observers
    }

    /// Sets whether values reach active observers.
    #[inline]
    pub fn set_affects_active_observers(&mut self, affects: bool) {
        self.affects_active_observers = affects;
    }

    /// Returns `true` if values reach pending observers.
    #[inline]
    #[must_use]
    pub const fn affects_pending_observers(&self) -> bool {
        self.affects_pending_observers
    }

    /// Sets whether values reach pending observers.
    #[inline]
    pub fn set_affects_pending_observers(&mut self, affects: bool) {
        self.affects_pending_observers = affects;
    }

    /// Returns `true` once the animation can no longer run.
    #[inline]
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.run_state.is_finished()
    }

    /// Returns `true` if the animation is finished, or is running and has
    /// played all its iterations by `now`.
    #[must_use]
    pub fn is_finished_at(&self, now: HostTime) -> bool {
        if self.is_finished() {
            return true;
        }
        if self.needs_synchronized_start_time
            || self.run_state != RunState::Running
            || self.iterations < 0
        {
            return false;
        }
        let total = self
            .duration_nanos()
            .saturating_mul(i64::from(self.iterations));
        total <= self.active_time(now).nanos()
    }

    /// Returns `true` if the animation contributes a value at `now`: after
    /// its start, or before it when filling backwards.
    #[must_use]
    pub fn in_effect(&self, now: HostTime) -> bool {
        !self.active_time(now).is_negative()
            || matches!(self.fill_mode, FillMode::Backwards | FillMode::Both)
    }

    /// Curve duration rounded to whole nanoseconds.
    fn duration_nanos(&self) -> i64 {
        TimeDelta::from_secs_f64(self.curve.duration()).nanos()
    }

    /// Time since the start, excluding pauses. Frozen at the time offset
    /// while the start time is unknown.
    fn active_time(&self, now: HostTime) -> TimeDelta {
        if (self.run_state == RunState::Starting && self.start_time.is_none())
            || self.needs_synchronized_start_time
        {
            return self.time_offset;
        }
        let origin = self.start_time.unwrap_or_default() + self.total_paused_time;
        if self.run_state == RunState::Paused {
            self.pause_time - origin
        } else {
            (now - origin) + self.time_offset
        }
    }

    /// Returns the iteration index and the curve-relative time within it,
    /// both before direction reversal.
    fn iteration_at(&self, now: HostTime) -> (i64, i64) {
        let elapsed = self.active_time(now).nanos();
        let duration = self.duration_nanos();
        if elapsed < 0 || self.iterations == 0 || duration <= 0 {
            return (0, 0);
        }
        if self.iterations > 0
            && elapsed >= duration.saturating_mul(i64::from(self.iterations))
        {
            return (i64::from(self.iterations) - 1, duration);
        }
        (elapsed / duration, elapsed % duration)
    }

    /// Maps `now` onto curve time, in seconds, for the current iteration.
    #[must_use]
    pub fn trim_time_to_current_iteration(&self, now: HostTime) -> f64 {
        let (iteration, t) = self.iteration_at(now);
        let reversed = match self.direction {
            Direction::Normal => false,
            Direction::Reverse => true,
            Direction::Alternate => iteration % 2 == 1,
            Direction::AlternateReverse => iteration % 2 == 0,
        };
        let t = if reversed { self.duration_nanos() - t } else { t };
        TimeDelta(t).as_secs_f64()
    }

    /// Evaluates the curve at the trimmed time for `now`.
    #[must_use]
    pub fn value_at(&self, now: HostTime) -> AnimatedValue {
        self.curve.value_at(self.trim_time_to_current_iteration(now))
    }

    /// Makes the authoritative copy for the other timeline, in
    /// `initial_run_state`.
    ///
    /// The curve is deep-copied; timing fields carry over, and the copy is
    /// the controlling instance.
    ///
    /// # Panics
    ///
    /// Panics if `self` already is a controlling instance.
    #[must_use]
    pub fn clone_and_initialize(&self, initial_run_state: RunState) -> Self {
        assert!(
            !self.is_controlling_instance,
            "cannot clone a controlling instance"
        );
        let mut copy = Self::new(
            self.curve.clone(),
            self.id,
            self.group,
            self.target_property,
        );
        copy.run_state = initial_run_state;
        copy.start_time = self.start_time;
        copy.pause_time = self.pause_time;
        copy.total_paused_time = self.total_paused_time;
        copy.time_offset = self.time_offset;
        copy.iterations = self.iterations;
        copy.direction = self.direction;
        copy.fill_mode = self.fill_mode;
        copy.is_controlling_instance = true;
        copy
    }

    /// Pushes pause state to the other timeline's copy. Nothing is pushed
    /// unless one side is paused.
    pub fn push_properties_to(&self, other: &mut Self) {
        if self.run_state == RunState::Paused || other.run_state == RunState::Paused {
            other.run_state = self.run_state;
            other.pause_time = self.pause_time;
            other.total_paused_time = self.total_paused_time;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{FloatCurve, TransformCurve};

    fn ms(v: u64) -> HostTime {
        HostTime::from_millis(v)
    }

    fn float_animation(duration: f64, iterations: i32) -> Animation {
        let mut a = Animation::new(
            FloatCurve::transition(duration, 0.0, 1.0, None),
            AnimationId(1),
            GroupId(1),
            TargetProperty::Opacity,
        );
        a.set_iterations(iterations);
        a
    }

    fn running(duration: f64, iterations: i32) -> Animation {
        let mut a = float_animation(duration, iterations);
        a.set_start_time(ms(0));
        a.set_run_state(RunState::Running, ms(0));
        a
    }

    fn close(a: f64, b: f64) -> bool {
        libm::fabs(a - b) < 1e-9
    }

    #[test]
    fn ids_start_at_one() {
        let mut ids = IdProvider::new();
        assert_eq!(ids.next_animation_id(), AnimationId(1));
        assert_eq!(ids.next_animation_id(), AnimationId(2));
        assert_eq!(ids.next_group_id(), GroupId(1));
    }

    #[test]
    #[should_panic(expected = "cannot animate")]
    fn mismatched_curve_panics() {
        let _ = Animation::new(
            TransformCurve::new(),
            AnimationId(1),
            GroupId(1),
            TargetProperty::Opacity,
        );
    }

    #[test]
    #[should_panic(expected = "curve has no keyframes")]
    fn empty_curve_is_rejected_up_front() {
        let _ = Animation::new(
            FloatCurve::new(),
            AnimationId(1),
            GroupId(1),
            TargetProperty::Opacity,
        );
    }

    #[test]
    fn trim_single_iteration() {
        let a = running(1.0, 1);
        assert_eq!(a.trim_time_to_current_iteration(ms(0)), 0.0);
        assert_eq!(a.trim_time_to_current_iteration(ms(500)), 0.5);
        assert_eq!(a.trim_time_to_current_iteration(ms(1000)), 1.0);
        assert_eq!(a.trim_time_to_current_iteration(ms(1500)), 1.0);
    }

    #[test]
    fn trim_before_start_is_zero() {
        let mut a = running(1.0, 1);
        a.set_start_time(ms(1000));
        assert_eq!(a.trim_time_to_current_iteration(ms(500)), 0.0);
    }

    #[test]
    fn trim_zero_iterations() {
        let a = running(1.0, 0);
        assert_eq!(a.trim_time_to_current_iteration(ms(700)), 0.0);
        assert!(a.is_finished_at(ms(0)), "zero iterations finish immediately");
    }

    #[test]
    fn trim_zero_duration() {
        let a = running(0.0, 1);
        assert_eq!(a.trim_time_to_current_iteration(ms(700)), 0.0);
    }

    #[test]
    fn trim_three_iterations() {
        let a = running(1.0, 3);
        assert_eq!(a.trim_time_to_current_iteration(ms(1250)), 0.25);
        assert_eq!(a.trim_time_to_current_iteration(ms(2250)), 0.25);
        assert_eq!(a.trim_time_to_current_iteration(ms(3000)), 1.0);
        assert_eq!(a.trim_time_to_current_iteration(ms(4000)), 1.0);
    }

    #[test]
    fn trim_infinite_iterations_stays_exact() {
        let a = running(1.0, -1);
        assert_eq!(
            a.trim_time_to_current_iteration(ms(1_073_741_824_250)),
            0.25
        );
        assert!(!a.is_finished_at(ms(1_073_741_824_250)));
    }

    #[test]
    fn trim_reverse() {
        let mut a = running(1.0, 1);
        a.set_direction(Direction::Reverse);
        assert_eq!(a.trim_time_to_current_iteration(ms(0)), 1.0);
        assert_eq!(a.trim_time_to_current_iteration(ms(250)), 0.75);
        assert_eq!(a.trim_time_to_current_iteration(ms(1000)), 0.0);
    }

    #[test]
    fn trim_alternate() {
        let mut a = running(1.0, 2);
        a.set_direction(Direction::Alternate);
        assert_eq!(a.trim_time_to_current_iteration(ms(250)), 0.25);
        assert_eq!(a.trim_time_to_current_iteration(ms(1250)), 0.75);
        assert_eq!(a.trim_time_to_current_iteration(ms(2000)), 0.0);
    }

    #[test]
    fn trim_alternate_reverse() {
        let mut a = running(1.0, 2);
        a.set_direction(Direction::AlternateReverse);
        assert_eq!(a.trim_time_to_current_iteration(ms(250)), 0.75);
        assert_eq!(a.trim_time_to_current_iteration(ms(1250)), 0.25);
        assert_eq!(a.trim_time_to_current_iteration(ms(2000)), 1.0);
    }

    #[test]
    fn trim_with_time_offset() {
        let mut a = running(1.0, 1);
        a.set_time_offset(TimeDelta::from_millis(500));
        assert_eq!(a.trim_time_to_current_iteration(ms(0)), 0.5);

        a.set_time_offset(TimeDelta::from_millis(-500));
        assert_eq!(a.trim_time_to_current_iteration(ms(250)), 0.0);
        assert_eq!(a.trim_time_to_current_iteration(ms(750)), 0.25);
    }

    #[test]
    fn starting_without_start_time_is_frozen() {
        let mut a = float_animation(1.0, 1);
        a.set_run_state(RunState::Starting, ms(0));
        assert_eq!(a.trim_time_to_current_iteration(ms(900)), 0.0);

        a.set_time_offset(TimeDelta::from_millis(250));
        assert_eq!(a.trim_time_to_current_iteration(ms(900)), 0.25);
    }

    #[test]
    fn synchronized_start_is_frozen() {
        let mut a = running(1.0, 1);
        a.set_needs_synchronized_start_time(true);
        assert_eq!(a.trim_time_to_current_iteration(ms(500)), 0.0);
        assert!(!a.is_finished_at(ms(5000)));
    }

    #[test]
    fn pause_freezes_and_resume_accumulates() {
        let mut a = running(1.0, 1);
        a.set_run_state(RunState::Paused, ms(500));
        assert_eq!(a.trim_time_to_current_iteration(ms(1024)), 0.5);

        a.set_run_state(RunState::Running, ms(1024));
        assert_eq!(a.total_paused_time(), TimeDelta::from_millis(524));
        assert!(close(a.trim_time_to_current_iteration(ms(1024)), 0.5));
        assert!(close(a.trim_time_to_current_iteration(ms(1524)), 1.0));
        assert!(!a.is_finished_at(ms(1523)));
        assert!(a.is_finished_at(ms(1524)));
    }

    #[test]
    fn is_finished_at_requires_running() {
        let mut a = float_animation(1.0, 1);
        a.set_start_time(ms(0));
        assert!(!a.is_finished_at(ms(5000)));
        a.set_run_state(RunState::Running, ms(0));
        assert!(!a.is_finished_at(ms(999)));
        assert!(a.is_finished_at(ms(1000)));
        assert!(a.is_finished_at(ms(9000)), "stays finished");
    }

    #[test]
    fn finished_states() {
        for state in RunState::ALL {
            let expected = matches!(
                state,
                RunState::Finished
                    | RunState::Aborted
                    | RunState::AbortedButNeedsCompletion
                    | RunState::WaitingForDeletion
            );
            assert_eq!(state.is_finished(), expected, "{state:?}");
        }
    }

    #[test]
    fn suspend_blocks_transitions() {
        let mut a = running(1.0, 1);
        a.suspend(ms(200));
        assert_eq!(a.run_state(), RunState::Paused);
        a.set_run_state(RunState::Aborted, ms(300));
        assert_eq!(a.run_state(), RunState::Paused, "suspended ignores abort");
        a.resume(ms(700));
        assert_eq!(a.run_state(), RunState::Running);
        assert!(close(a.trim_time_to_current_iteration(ms(700)), 0.2));
    }

    #[test]
    fn fill_mode_controls_effect_before_start() {
        let mut a = running(1.0, 1);
        a.set_time_offset(TimeDelta::from_millis(-500));
        assert!(a.in_effect(ms(0)));
        a.set_fill_mode(FillMode::Forwards);
        assert!(!a.in_effect(ms(0)));
        assert!(a.in_effect(ms(500)));
        a.set_fill_mode(FillMode::None);
        assert!(!a.in_effect(ms(499)));
    }

    #[test]
    fn clone_copies_timing_and_takes_control() {
        let mut a = running(2.0, 3);
        a.set_direction(Direction::Alternate);
        a.set_time_offset(TimeDelta::from_millis(100));
        a.set_needs_synchronized_start_time(true);

        let copy = a.clone_and_initialize(RunState::WaitingForTargetAvailability);
        assert!(copy.is_controlling_instance());
        assert!(!copy.needs_synchronized_start_time());
        assert_eq!(copy.run_state(), RunState::WaitingForTargetAvailability);
        assert_eq!(copy.start_time(), a.start_time());
        assert_eq!(copy.iterations(), 3);
        assert_eq!(copy.direction(), Direction::Alternate);
        assert_eq!(copy.time_offset(), a.time_offset());
        assert_eq!(copy.curve(), a.curve());
    }

    #[test]
    fn clone_evaluates_like_original() {
        let a = running(1.0, 2);
        let mut copy = a.clone_and_initialize(RunState::Running);
        copy.set_run_state(RunState::Running, ms(0));
        for t in [0, 130, 999, 1200, 1999, 2500] {
            assert_eq!(copy.value_at(ms(t)), a.value_at(ms(t)), "t = {t}");
        }
    }

    #[test]
    #[should_panic(expected = "cannot clone a controlling instance")]
    fn double_promotion_panics() {
        let a = float_animation(1.0, 1);
        let copy = a.clone_and_initialize(RunState::Running);
        let _ = copy.clone_and_initialize(RunState::Running);
    }

    #[test]
    fn only_pause_state_is_pushed() {
        let main = running(1.0, 1);
        let mut other = main.clone_and_initialize(RunState::Starting);
        main.push_properties_to(&mut other);
        assert_eq!(other.run_state(), RunState::Starting, "nothing to push");

        let mut main = main;
        main.set_run_state(RunState::Paused, ms(300));
        main.push_properties_to(&mut other);
        assert_eq!(other.run_state(), RunState::Paused);
        assert_eq!(other.pause_time(), ms(300));
    }

    #[test]
    fn property_sets() {
        let set: PropertySet = [TargetProperty::Opacity, TargetProperty::Filter]
            .into_iter()
            .collect();
        assert!(set.contains(TargetProperty::Opacity));
        assert!(!set.contains(TargetProperty::Transform));
        let mut other = PropertySet::EMPTY;
        other.insert(TargetProperty::Filter);
        assert!(set.intersects(other));
        assert_eq!(
            set.iter().collect::<alloc::vec::Vec<_>>(),
            [TargetProperty::Opacity, TargetProperty::Filter]
        );
    }
}
