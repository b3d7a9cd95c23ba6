// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Players: ordered collections of animations for one element.
//!
//! A [`Player`] owns its [`Animation`]s and advances them in two steps per
//! frame:
//!
//! 1. [`animate`](Player::animate) starts whatever can start and applies the
//!    current value of every running animation to the element's observers.
//! 2. [`update_state`](Player::update_state) commits run-state transitions
//!    (starting, finishing, deleting) and, on the impl timeline, returns the
//!    [`AnimationEvent`]s to deliver to the main timeline.
//!
//! # Two timelines
//!
//! The main player holds what the application asked for. At commit,
//! [`push_animation_updates_to`](Player::push_animation_updates_to) copies new
//! animations to the impl player, drops the ones the main side removed, and
//! forwards pause state. The impl player runs the copies, and reports back
//! through events that the main player consumes with the `notify_*` methods.
//! Nothing is shared between the two: every crossing is a value copy.
//!
//! # Starting
//!
//! Animations start in insertion order. A waiting animation starts together
//! with the rest of its group once none of the group's properties is held by
//! a starting or running animation, whether of this player or of another
//! player bound to the same element.

use alloc::vec::Vec;

use crate::animation::{
    Animation, AnimationId, Direction, GroupId, PropertySet, RunState, TargetProperty,
};
use crate::curve::CurveType;
use crate::element::{ElementAnimations, ElementId, ObserverList, ValueProvider};
use crate::event::{AnimationEvent, AnimationEventKind};
use crate::time::{HostTime, TimeDelta};
use crate::transform::Box3d;
use crate::value::AnimatedValue;

/// Identifies a player within a host, and its counterpart on the other
/// timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(pub u32);

/// Which timeline a player runs on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlayerRole {
    /// The authoritative timeline reflecting application intent. Produces no
    /// events.
    #[default]
    Main,
    /// The timeline that advances every frame and reports events.
    Impl,
}

/// Returns `true` if `animation` feeds the observers in `list`.
fn affects(animation: &Animation, list: ObserverList) -> bool {
    match list {
        ObserverList::Active => animation.affects_active_observers(),
        ObserverList::Pending => animation.affects_pending_observers(),
    }
}

/// An ordered collection of animations driving one element.
#[derive(Clone, Debug)]
pub struct Player {
    id: PlayerId,
    role: PlayerRole,
    element: Option<ElementId>,
    animations: Vec<Animation>,
    needs_to_start_animations: bool,
    last_tick_time: Option<HostTime>,
    scroll_offset_animation_was_interrupted: bool,
}

impl Player {
    /// Creates an empty player, not yet bound to an element.
    #[must_use]
    pub const fn new(id: PlayerId, role: PlayerRole) -> Self {
        Self {
            id,
            role,
            element: None,
            animations: Vec::new(),
            needs_to_start_animations: false,
            last_tick_time: None,
            scroll_offset_animation_was_interrupted: false,
        }
    }

    /// Returns the id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Returns the role.
    #[inline]
    #[must_use]
    pub const fn role(&self) -> PlayerRole {
        self.role
    }

    /// Returns the bound element.
    #[inline]
    #[must_use]
    pub const fn element(&self) -> Option<ElementId> {
        self.element
    }

    /// Binds the player to `element`.
    pub fn attach_element(&mut self, element: ElementId) {
        self.element = Some(element);
    }

    /// Unbinds the player from its element.
    pub fn detach_element(&mut self) {
        self.element = None;
    }

    /// Returns the animations in insertion order.
    #[inline]
    #[must_use]
    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    /// Time of the last [`animate`](Self::animate) that reached an observer.
    #[inline]
    #[must_use]
    pub const fn last_tick_time(&self) -> Option<HostTime> {
        self.last_tick_time
    }

    /// Returns `true` if a scroll offset animation was removed since the last
    /// commit (on the main side) or activation (on the impl side).
    #[inline]
    #[must_use]
    pub const fn scroll_offset_animation_was_interrupted(&self) -> bool {
        self.scroll_offset_animation_was_interrupted
    }

    // -----------------------------------------------------------------------
    // Adding and removing
    // -----------------------------------------------------------------------

    /// Appends `animation`; it starts on a later [`animate`](Self::animate).
    pub fn add_animation(&mut self, animation: Animation) {
        self.animations.push(animation);
        self.needs_to_start_animations = true;
    }

    /// Removes every animation with `id`.
    pub fn remove_animation(&mut self, id: AnimationId) {
        let mut removed_scroll = false;
        self.animations.retain(|a| {
            let keep = a.id() != id;
            removed_scroll |= !keep && a.target_property() == TargetProperty::ScrollOffset;
            keep
        });
        if removed_scroll {
            self.scroll_offset_animation_was_interrupted = true;
        }
    }

    /// Aborts the animation with `id` unless it has already finished.
    pub fn abort_animation(&mut self, id: AnimationId) {
        let now = self.last_tick_time.unwrap_or_default();
        if let Some(a) = self.animation_by_id_mut(id)
            && !a.is_finished()
        {
            a.set_run_state(RunState::Aborted, now);
        }
    }

    /// Aborts every unfinished animation of `property`.
    ///
    /// With `needs_completion`, impl-only animations are handed back to the
    /// main timeline through a [`Takeover`](AnimationEventKind::Takeover)
    /// event instead of simply stopping.
    ///
    /// # Panics
    ///
    /// Panics if `needs_completion` is set for a property other than
    /// [`ScrollOffset`](TargetProperty::ScrollOffset).
    pub fn abort_animations(&mut self, property: TargetProperty, needs_completion: bool) {
        assert!(
            !needs_completion || property == TargetProperty::ScrollOffset,
            "only scroll offset animations can be completed elsewhere, not {property:?}"
        );
        let now = self.last_tick_time.unwrap_or_default();
        for a in &mut self.animations {
            if a.target_property() != property || a.is_finished() {
                continue;
            }
            if needs_completion && a.is_impl_only() {
                a.set_run_state(RunState::AbortedButNeedsCompletion, now);
            } else {
                a.set_run_state(RunState::Aborted, now);
            }
        }
    }

    /// Pauses the animation with `id` at `time_offset` past its start.
    pub fn pause_animation(&mut self, id: AnimationId, time_offset: TimeDelta) {
        if let Some(a) = self.animation_by_id_mut(id) {
            let at = a.start_time().unwrap_or_default() + time_offset;
            a.set_run_state(RunState::Paused, at);
        }
    }

    /// Suspends every unfinished animation.
    pub fn suspend_animations(&mut self, now: HostTime) {
        for a in &mut self.animations {
            if !a.is_finished() {
                a.suspend(now);
            }
        }
    }

    /// Resumes every paused animation, suspended or not.
    pub fn resume_animations(&mut self, now: HostTime) {
        for a in &mut self.animations {
            if a.run_state() == RunState::Paused {
                a.resume(now);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Per-frame driving
    // -----------------------------------------------------------------------

    /// Properties held by this player's starting and running animations, on
    /// the active and pending trees.
    fn running_properties(&self) -> (PropertySet, PropertySet) {
        let mut active = PropertySet::EMPTY;
        let mut pending = PropertySet::EMPTY;
        for a in &self.animations {
            if matches!(a.run_state(), RunState::Starting | RunState::Running) {
                if a.affects_active_observers() {
                    active.insert(a.target_property());
                }
                if a.affects_pending_observers() {
                    pending.insert(a.target_property());
                }
            }
        }
        (active, pending)
    }

    /// Records the properties this player holds on `element`, so that other
    /// players bound to it do not start over them.
    pub(crate) fn claim_running_properties(&self, element: &mut ElementAnimations<'_>) {
        let (active, pending) = self.running_properties();
        element.set_claim(self.id, active, pending);
    }

    /// Starts what can start, then applies the value of every starting,
    /// running, or paused animation at `now`.
    ///
    /// Does nothing while the element has no observer at all.
    pub fn animate(&mut self, now: HostTime, element: &mut ElementAnimations<'_>) {
        if !element.has_any_observer() {
            return;
        }
        if self.needs_to_start_animations {
            self.start_animations(now, element);
        }
        self.tick_animations(now, element);
        self.last_tick_time = Some(now);
    }

    /// Commits run-state transitions for the time of the last
    /// [`animate`](Self::animate) and returns the events to report.
    ///
    /// `start_ready_animations` allows starting animations to become running.
    /// Returns nothing before the first tick, while the element has no active
    /// observer, and always for a [`Main`](PlayerRole::Main) player.
    pub fn update_state(
        &mut self,
        start_ready_animations: bool,
        element: &mut ElementAnimations<'_>,
    ) -> Vec<AnimationEvent> {
        let mut events = Vec::new();
        if !element.has_observer(ObserverList::Active) {
            return events;
        }
        let Some(now) = self.last_tick_time else {
            return events;
        };
        let emit = self.role == PlayerRole::Impl;

        if start_ready_animations {
            self.promote_started_animations(now, emit, &mut events, element);
        }
        self.mark_finished_animations(now);
        self.mark_animations_for_deletion(now, emit, &mut events, element);
        self.claim_running_properties(element);
        if self.needs_to_start_animations && start_ready_animations {
            self.start_animations(now, element);
            self.promote_started_animations(now, emit, &mut events, element);
        }
        if emit {
            self.accumulate_property_updates(now, &mut events);
        }
        events
    }

    fn start_animations(&mut self, now: HostTime, element: &mut ElementAnimations<'_>) {
        self.needs_to_start_animations = false;
        let (others_active, others_pending) = element.claimed_by_others(self.id);
        let (own_active, own_pending) = self.running_properties();
        let mut blocked_active = others_active.union(own_active);
        let mut blocked_pending = others_pending.union(own_pending);

        for i in 0..self.animations.len() {
            if self.animations[i].run_state() != RunState::WaitingForTargetAvailability {
                continue;
            }
            let group = self.animations[i].group();
            let mut enqueued = PropertySet::EMPTY;
            let mut group_affects_active = false;
            let mut group_affects_pending = false;
            for a in self.animations[i..].iter().filter(|a| a.group() == group) {
                enqueued.insert(a.target_property());
                group_affects_active |= a.affects_active_observers();
                group_affects_pending |= a.affects_pending_observers();
            }

            let mut free = true;
            if group_affects_active {
                free &= !blocked_active.intersects(enqueued);
                blocked_active = blocked_active.union(enqueued);
            }
            if group_affects_pending {
                free &= !blocked_pending.intersects(enqueued);
                blocked_pending = blocked_pending.union(enqueued);
            }

            if free {
                for a in &mut self.animations[i..] {
                    if a.group() == group
                        && a.run_state() == RunState::WaitingForTargetAvailability
                    {
                        a.set_run_state(RunState::Starting, now);
                    }
                }
            } else {
                self.needs_to_start_animations = true;
            }
        }
        self.claim_running_properties(element);
    }

    fn tick_animations(&mut self, now: HostTime, element: &mut ElementAnimations<'_>) {
        for a in &mut self.animations {
            if !matches!(
                a.run_state(),
                RunState::Starting | RunState::Running | RunState::Paused
            ) || !a.in_effect(now)
            {
                continue;
            }
            if let Some(curve) = a.curve_mut().as_scroll_offset_mut()
                && !curve.has_initial_value()
                && let Some(offset) = element.scroll_offset_for_animation()
            {
                curve.set_initial_value(offset);
            }
            let mut value = a.value_at(now);
            if let AnimatedValue::Opacity(o) = &mut value {
                *o = o.clamp(0.0, 1.0);
            }
            element.notify_value(
                &value,
                a.affects_active_observers(),
                a.affects_pending_observers(),
            );
        }
    }

    fn promote_started_animations(
        &mut self,
        now: HostTime,
        emit: bool,
        events: &mut Vec<AnimationEvent>,
        element: &mut ElementAnimations<'_>,
    ) {
        for a in &mut self.animations {
            if a.run_state() != RunState::Starting || !a.affects_active_observers() {
                continue;
            }
            a.set_run_state(RunState::Running, now);
            if a.start_time().is_none() && !a.needs_synchronized_start_time() {
                a.set_start_time(now);
            }
            if emit {
                if a.is_impl_only()
                    && let Some(delegate) = element.delegate()
                {
                    delegate.on_animation_started(now, a.target_property(), a.group());
                }
                events.push(AnimationEvent::for_animation(
                    AnimationEventKind::Started,
                    self.id,
                    self.element,
                    a,
                    now,
                ));
            }
        }
    }

    fn mark_finished_animations(&mut self, now: HostTime) {
        for a in &mut self.animations {
            if !a.is_finished() && a.is_finished_at(now) {
                a.set_run_state(RunState::Finished, now);
            }
        }
    }

    fn mark_animations_for_deletion(
        &mut self,
        now: HostTime,
        emit: bool,
        events: &mut Vec<AnimationEvent>,
        element: &mut ElementAnimations<'_>,
    ) {
        let mut marked = false;
        for i in 0..self.animations.len() {
            let a = &mut self.animations[i];
            let group = a.group();
            match a.run_state() {
                RunState::Aborted => {
                    if emit && !a.is_impl_only() {
                        events.push(AnimationEvent::for_animation(
                            AnimationEventKind::Aborted,
                            self.id,
                            self.element,
                            a,
                            now,
                        ));
                    }
                    a.set_run_state(RunState::WaitingForDeletion, now);
                    marked = true;
                    continue;
                }
                RunState::AbortedButNeedsCompletion => {
                    if emit {
                        let mut event = AnimationEvent::for_animation(
                            AnimationEventKind::Takeover,
                            self.id,
                            self.element,
                            a,
                            now,
                        );
                        event.animation_start_time = a.start_time();
                        event.curve = a.curve().as_scroll_offset().cloned();
                        events.push(event);
                    }
                    if let Some(delegate) = element.delegate() {
                        delegate.on_animation_finished(now, a.target_property(), group);
                    }
                    a.set_run_state(RunState::WaitingForDeletion, now);
                    marked = true;
                    continue;
                }
                _ => {}
            }

            if a.run_state() != RunState::Finished || !(emit || a.received_finished_event()) {
                continue;
            }
            // A group is deleted once every member has finished and, on the
            // main side, heard back about it.
            let group_done = self.animations.iter().filter(|b| b.group() == group).all(|b| {
                b.is_finished()
                    && (b.run_state() != RunState::Finished || emit || b.received_finished_event())
            });
            if !group_done {
                continue;
            }
            for b in &mut self.animations[i..] {
                if b.group() != group || b.run_state() == RunState::Aborted {
                    continue;
                }
                if emit {
                    events.push(AnimationEvent::for_animation(
                        AnimationEventKind::Finished,
                        self.id,
                        self.element,
                        b,
                        now,
                    ));
                    if b.is_impl_only()
                        && let Some(delegate) = element.delegate()
                    {
                        delegate.on_animation_finished(now, b.target_property(), group);
                    }
                }
                b.set_run_state(RunState::WaitingForDeletion, now);
            }
            marked = true;
        }
        if marked {
            element.notify_waiting_for_deletion();
        }
    }

    fn accumulate_property_updates(&self, now: HostTime, events: &mut Vec<AnimationEvent>) {
        for a in &self.animations {
            if !a.is_impl_only()
                || !a.in_effect(now)
                || matches!(
                    a.target_property(),
                    TargetProperty::ScrollOffset | TargetProperty::BackgroundColor
                )
            {
                continue;
            }
            let mut event = AnimationEvent::for_animation(
                AnimationEventKind::PropertyUpdate,
                self.id,
                self.element,
                a,
                now,
            );
            event.value = Some(a.value_at(now));
            events.push(event);
        }
    }

    // -----------------------------------------------------------------------
    // Commit
    // -----------------------------------------------------------------------

    /// Synchronizes `impl_player` with this main player.
    ///
    /// Deleted animations are purged here, new ones are copied over as
    /// pending-only, animations this side no longer has stop affecting the
    /// impl side's pending observers, and pause state is forwarded.
    ///
    /// `provider` supplies the current scroll position for new scroll offset
    /// animations that have no initial value yet.
    pub fn push_animation_updates_to(
        &mut self,
        impl_player: &mut Self,
        provider: Option<&dyn ValueProvider>,
    ) {
        if self.animations.is_empty() && impl_player.animations.is_empty() {
            return;
        }
        self.animations
            .retain(|a| a.run_state() != RunState::WaitingForDeletion);
        self.push_new_animations(impl_player, provider);
        self.remove_animations_completed_on_main(impl_player);

        for a in &self.animations {
            if let Some(b) = impl_player.animation_by_id_mut(a.id()) {
                a.push_properties_to(b);
            }
        }
        impl_player.scroll_offset_animation_was_interrupted =
            self.scroll_offset_animation_was_interrupted;
        self.scroll_offset_animation_was_interrupted = false;
    }

    fn push_new_animations(&mut self, impl_player: &mut Self, provider: Option<&dyn ValueProvider>) {
        for a in &mut self.animations {
            if impl_player
                .animation(a.group(), a.target_property())
                .is_some()
            {
                continue;
            }
            // Only animations the main side waits on are pushed; others were
            // created on the impl side.
            if !a.needs_synchronized_start_time() || a.run_state() == RunState::WaitingForDeletion {
                continue;
            }
            if let Some(curve) = a.curve_mut().as_scroll_offset_mut()
                && !curve.has_initial_value()
                && let Some(provider) = provider
            {
                curve.set_initial_value(provider.current_scroll_offset());
            }
            let mut copy = a.clone_and_initialize(RunState::WaitingForTargetAvailability);
            copy.set_affects_active_observers(false);
            impl_player.add_animation(copy);
        }
    }

    fn remove_animations_completed_on_main(&self, impl_player: &mut Self) {
        for b in &mut impl_player.animations {
            let completed = if b.is_impl_only() {
                b.run_state() == RunState::WaitingForDeletion
            } else {
                self.animation_by_id(b.id()).is_none()
            };
            if completed {
                b.set_affects_pending_observers(false);
            }
        }
        impl_player.animations.retain(|b| {
            b.run_state() != RunState::WaitingForDeletion || b.affects_pending_observers()
        });
    }

    /// Makes pushed animations affect active observers and drops the ones
    /// that no longer affect any.
    pub fn activate_animations(&mut self) {
        for a in &mut self.animations {
            a.set_affects_active_observers(a.affects_pending_observers());
        }
        self.animations
            .retain(|a| a.affects_active_observers() || a.affects_pending_observers());
        self.scroll_offset_animation_was_interrupted = false;
    }

    // -----------------------------------------------------------------------
    // Events from the other timeline
    // -----------------------------------------------------------------------

    /// Routes `event` to the matching `notify_*` method.
    pub fn dispatch_event(&mut self, event: &AnimationEvent, element: &mut ElementAnimations<'_>) {
        match event.kind {
            AnimationEventKind::Started => self.notify_animation_started(event, element),
            AnimationEventKind::Finished => self.notify_animation_finished(event, element),
            AnimationEventKind::Aborted => self.notify_animation_aborted(event, element),
            AnimationEventKind::PropertyUpdate => {
                self.notify_animation_property_update(event, element);
            }
            AnimationEventKind::Takeover => self.notify_animation_takeover(event, element),
        }
    }

    /// Adopts the start time reported by the impl timeline.
    pub fn notify_animation_started(
        &mut self,
        event: &AnimationEvent,
        element: &mut ElementAnimations<'_>,
    ) {
        if event.is_impl_only {
            if let Some(delegate) = element.delegate() {
                delegate.on_animation_started(
                    event.monotonic_time,
                    event.target_property,
                    event.group_id,
                );
            }
            return;
        }
        let found = self.animations.iter_mut().find(|a| {
            a.group() == event.group_id
                && a.target_property() == event.target_property
                && a.needs_synchronized_start_time()
        });
        if let Some(a) = found {
            a.set_needs_synchronized_start_time(false);
            if a.start_time().is_none() {
                a.set_start_time(event.monotonic_time);
            }
            if let Some(delegate) = element.delegate() {
                delegate.on_animation_started(
                    event.monotonic_time,
                    event.target_property,
                    event.group_id,
                );
            }
        }
    }

    /// Records that the impl timeline finished the animation, allowing it to
    /// be deleted here.
    pub fn notify_animation_finished(
        &mut self,
        event: &AnimationEvent,
        element: &mut ElementAnimations<'_>,
    ) {
        if !event.is_impl_only {
            let Some(a) = self.animation_mut(event.group_id, event.target_property) else {
                return;
            };
            a.set_received_finished_event(true);
        }
        if let Some(delegate) = element.delegate() {
            delegate.on_animation_finished(
                event.monotonic_time,
                event.target_property,
                event.group_id,
            );
        }
    }

    /// Aborts the matching animations.
    pub fn notify_animation_aborted(
        &mut self,
        event: &AnimationEvent,
        element: &mut ElementAnimations<'_>,
    ) {
        let mut found = false;
        for a in &mut self.animations {
            if a.group() == event.group_id && a.target_property() == event.target_property {
                a.set_run_state(RunState::Aborted, event.monotonic_time);
                found = true;
            }
        }
        if found && let Some(delegate) = element.delegate() {
            delegate.on_animation_aborted(
                event.monotonic_time,
                event.target_property,
                event.group_id,
            );
        }
    }

    /// Applies a value computed on the impl timeline to every observer.
    pub fn notify_animation_property_update(
        &mut self,
        event: &AnimationEvent,
        element: &mut ElementAnimations<'_>,
    ) {
        let Some(value) = &event.value else {
            return;
        };
        let mut value = value.clone();
        if let AnimatedValue::Opacity(o) = &mut value {
            *o = o.clamp(0.0, 1.0);
        }
        element.notify_value(&value, true, true);
    }

    /// Hands a scroll animation the impl timeline gave up to the delegate.
    pub fn notify_animation_takeover(
        &mut self,
        event: &AnimationEvent,
        element: &mut ElementAnimations<'_>,
    ) {
        if let Some(curve) = &event.curve
            && let Some(delegate) = element.delegate()
        {
            delegate.on_animation_takeover(
                event.monotonic_time,
                event.target_property,
                event.animation_start_time,
                curve,
            );
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Returns the first animation of `group` on `property`.
    #[must_use]
    pub fn animation(&self, group: GroupId, property: TargetProperty) -> Option<&Animation> {
        self.animations
            .iter()
            .find(|a| a.group() == group && a.target_property() == property)
    }

    /// Mutable form of [`animation`](Self::animation).
    pub fn animation_mut(
        &mut self,
        group: GroupId,
        property: TargetProperty,
    ) -> Option<&mut Animation> {
        self.animations
            .iter_mut()
            .find(|a| a.group() == group && a.target_property() == property)
    }

    /// Returns the most recently added animation on `property`.
    #[must_use]
    pub fn animation_for_property(&self, property: TargetProperty) -> Option<&Animation> {
        self.animations
            .iter()
            .rev()
            .find(|a| a.target_property() == property)
    }

    /// Mutable form of [`animation_for_property`](Self::animation_for_property).
    pub fn animation_for_property_mut(
        &mut self,
        property: TargetProperty,
    ) -> Option<&mut Animation> {
        self.animations
            .iter_mut()
            .rev()
            .find(|a| a.target_property() == property)
    }

    /// Returns the animation with `id`.
    #[must_use]
    pub fn animation_by_id(&self, id: AnimationId) -> Option<&Animation> {
        self.animations.iter().find(|a| a.id() == id)
    }

    /// Mutable form of [`animation_by_id`](Self::animation_by_id).
    pub fn animation_by_id_mut(&mut self, id: AnimationId) -> Option<&mut Animation> {
        self.animations.iter_mut().find(|a| a.id() == id)
    }

    /// Returns `true` if some animation has not finished.
    #[must_use]
    pub fn has_active_animation(&self) -> bool {
        self.animations.iter().any(|a| !a.is_finished())
    }

    /// Returns `true` if the player holds any animation at all.
    #[must_use]
    pub fn has_any_animation(&self) -> bool {
        !self.animations.is_empty()
    }

    /// Returns `true` if the host must keep ticking this player: some
    /// animation is not yet waiting for deletion.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.animations
            .iter()
            .any(|a| a.run_state() != RunState::WaitingForDeletion)
    }

    /// Returns `true` if waiting animations still have to be started.
    #[inline]
    #[must_use]
    pub const fn needs_to_start_animations(&self) -> bool {
        self.needs_to_start_animations
    }

    /// Returns `true` if an unfinished animation targets `property`.
    #[must_use]
    pub fn is_animating_property(&self, property: TargetProperty) -> bool {
        self.animations
            .iter()
            .any(|a| !a.is_finished() && a.target_property() == property)
    }

    /// Returns `true` if an unfinished animation feeding `list` contributes a
    /// value to `property` as of the last tick.
    #[must_use]
    pub fn is_currently_animating_property(
        &self,
        property: TargetProperty,
        list: ObserverList,
    ) -> bool {
        let now = self.last_tick_time.unwrap_or_default();
        self.animations.iter().any(|a| {
            !a.is_finished()
                && a.in_effect(now)
                && a.target_property() == property
                && affects(a, list)
        })
    }

    /// Returns `true` if an unfinished animation feeding `list` targets
    /// `property`, whether or not it is in effect yet.
    #[must_use]
    pub fn is_potentially_animating_property(
        &self,
        property: TargetProperty,
        list: ObserverList,
    ) -> bool {
        self.animations
            .iter()
            .any(|a| !a.is_finished() && a.target_property() == property && affects(a, list))
    }

    fn unfinished_transform_animations(&self) -> impl Iterator<Item = &Animation> {
        self.animations.iter().filter(|a| {
            !a.is_finished() && a.curve().curve_type() == CurveType::Transform
        })
    }

    /// Bounds of `bounds` under every transform the unfinished transform
    /// animations can produce; `None` if one of them cannot be bounded.
    ///
    /// Without transform animations the result is an empty box at the origin.
    #[must_use]
    pub fn transform_animation_bounds_for_box(&self, bounds: &Box3d) -> Option<Box3d> {
        let mut out: Option<Box3d> = None;
        for a in self.unfinished_transform_animations() {
            let curve = a.curve().as_transform()?;
            let animated = curve.animated_bounds_for_box(bounds)?;
            out = Some(out.map_or(animated, |acc| acc.union(&animated)));
        }
        Some(out.unwrap_or_default())
    }

    /// Returns `true` if a transform animation may grow the element's bounds.
    #[must_use]
    pub fn has_transform_animation_that_inflates_bounds(&self) -> bool {
        self.is_animating_property(TargetProperty::Transform)
    }

    /// Returns `true` if an unfinished filter animation moves pixels.
    #[must_use]
    pub fn has_filter_animation_that_inflates_bounds(&self) -> bool {
        self.animations.iter().any(|a| {
            !a.is_finished()
                && a.curve()
                    .as_filter()
                    .is_some_and(|c| c.has_filter_that_moves_pixels())
        })
    }

    /// Returns `true` if an unfinished transform animation can change scale.
    #[must_use]
    pub fn has_animation_that_affects_scale(&self) -> bool {
        self.unfinished_transform_animations()
            .any(|a| a.curve().as_transform().is_some_and(|c| c.affects_scale()))
    }

    /// Returns `true` if every unfinished transform animation only translates.
    #[must_use]
    pub fn has_only_translation_transforms(&self) -> bool {
        self.unfinished_transform_animations()
            .all(|a| a.curve().as_transform().is_some_and(|c| c.is_translation()))
    }

    /// Largest axis scale reached by any unfinished transform animation, or
    /// `None` if one of them cannot be bounded. `Some(0.0)` without
    /// transform animations.
    #[must_use]
    pub fn maximum_scale(&self) -> Option<f64> {
        let mut max_scale = 0.0_f64;
        for a in self.unfinished_transform_animations() {
            max_scale = max_scale.max(a.curve().as_transform()?.maximum_scale()?);
        }
        Some(max_scale)
    }

    /// Largest axis scale among the keyframes that the unfinished transform
    /// animations feeding `list` move towards, taking their direction into
    /// account. `None` if one of them cannot be bounded.
    #[must_use]
    pub fn maximum_target_scale(&self, list: ObserverList) -> Option<f64> {
        let mut max_scale = 0.0_f64;
        for a in self.unfinished_transform_animations().filter(|a| affects(a, list)) {
            let forward = matches!(a.direction(), Direction::Normal | Direction::Alternate);
            let scale = a.curve().as_transform()?.maximum_target_scale(forward)?;
            max_scale = max_scale.max(scale);
        }
        Some(max_scale)
    }
}
