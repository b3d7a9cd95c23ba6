// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-thread registry of players.
//!
//! An [`AnimationHost`] owns every [`Player`] of one timeline, keyed by
//! [`PlayerId`]. The compositor loop drives it once per frame:
//!
//! ```text
//!   main host                          impl host
//!   ─────────                          ─────────
//!   add_animation ...
//!   push_properties_to ─────────────►  (pending-only copies)
//!                                      activate_animations
//!                                      animate(now)
//!                                      update_state(true) ──► events
//!   set_animation_events ◄───────────────────────────────────┘
//! ```
//!
//! The host never owns elements. Each call that reaches observers goes
//! through a [`MutatorClient`], which hands out a short-lived
//! [`ElementAnimations`] binding per element. Players bound to the same
//! element share one binding per call, which is how they keep each other off
//! the properties they hold.
//!
//! Elements whose animated values were applied are tracked per property
//! channel (see [`dirty`](crate::dirty)) and handed out by
//! [`take_changes`](AnimationHost::take_changes).

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use understory_dirty::{Channel, CycleHandling, DirtyTracker};

use crate::animation::{Animation, AnimationId, PropertySet, RunState};
use crate::dirty;
use crate::element::{ElementAnimations, ElementId};
use crate::event::AnimationEvent;
use crate::player::{Player, PlayerId, PlayerRole};
use crate::time::{HostTime, Timebase};
use crate::trace::{
    AnimationEventEmitted, FrameSummaryBuilder, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    RunStateChangeEvent, Tracer,
};

/// Hands out element bindings for host calls.
pub trait MutatorClient {
    /// Returns the binding for `element`, valid for one host call.
    fn bind(&mut self, element: ElementId) -> ElementAnimations<'_>;
}

/// Host configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostConfig {
    /// Role given to every player the host creates.
    pub role: PlayerRole,
    /// Converts the tick readings passed to `animate` into engine time.
    pub timebase: Timebase,
}

impl HostConfig {
    /// A main-timeline host with nanosecond ticks.
    pub const MAIN: Self = Self {
        role: PlayerRole::Main,
        timebase: Timebase::NANOS,
    };

    /// An impl-timeline host with nanosecond ticks.
    pub const IMPL: Self = Self {
        role: PlayerRole::Impl,
        timebase: Timebase::NANOS,
    };

    /// Returns a copy using `timebase`.
    #[must_use]
    pub const fn with_timebase(self, timebase: Timebase) -> Self {
        Self { timebase, ..self }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::MAIN
    }
}

/// Elements whose animated values were applied, by property.
///
/// Each list holds raw [`ElementId`] values in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimatedChanges {
    /// Elements that received a transform.
    pub transforms: Vec<u32>,
    /// Elements that received an opacity.
    pub opacities: Vec<u32>,
    /// Elements that received a filter list.
    pub filters: Vec<u32>,
    /// Elements that received a scroll offset.
    pub scroll_offsets: Vec<u32>,
    /// Elements that received a background color.
    pub background_colors: Vec<u32>,
}

impl AnimatedChanges {
    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
            && self.opacities.is_empty()
            && self.filters.is_empty()
            && self.scroll_offsets.is_empty()
            && self.background_colors.is_empty()
    }

    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.opacities.clear();
        self.filters.clear();
        self.scroll_offsets.clear();
        self.background_colors.clear();
    }
}

/// Run state of every animation, keyed by player and animation.
type RunStates = BTreeMap<(PlayerId, AnimationId), RunState>;

/// Owns the players of one timeline and drives them.
#[derive(Debug)]
pub struct AnimationHost {
    config: HostConfig,
    players: BTreeMap<PlayerId, Player>,
    dirty: DirtyTracker<u32>,
    frame_index: u64,
    last_tick: Option<HostTime>,
    summary: Option<FrameSummaryBuilder>,
}

impl Default for AnimationHost {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

impl AnimationHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            players: BTreeMap::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            frame_index: 0,
            last_tick: None,
            summary: None,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> HostConfig {
        self.config
    }

    /// Number of `animate` calls so far.
    #[must_use]
    pub const fn frame_index(&self) -> u64 {
        self.frame_index
    }

    // -- Registry --

    /// Returns the player with `id`, creating it with the host's role if
    /// needed.
    pub fn add_player(&mut self, id: PlayerId) -> &mut Player {
        let role = self.config.role;
        self.players
            .entry(id)
            .or_insert_with(|| Player::new(id, role))
    }

    /// Removes and returns the player with `id`.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        self.players.remove(&id)
    }

    /// Returns the player with `id`.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Returns the player with `id` mutably.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Adds `animation` to the player with `id`. Returns `false` if there is
    /// no such player.
    ///
    /// On a main host the animation waits for its start time from the impl
    /// timeline.
    pub fn add_animation(&mut self, id: PlayerId, mut animation: Animation) -> bool {
        let Some(player) = self.players.get_mut(&id) else {
            return false;
        };
        if self.config.role == PlayerRole::Main {
            animation.set_needs_synchronized_start_time(true);
        }
        player.add_animation(animation);
        true
    }

    /// Number of players, active or not.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Number of players that still need ticking.
    #[must_use]
    pub fn active_player_count(&self) -> usize {
        self.active_players().count()
    }

    /// Players that still need ticking, in id order.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| p.is_active())
    }

    /// Active players with a bound element, grouped by element.
    fn active_players_by_element(&self) -> BTreeMap<ElementId, Vec<PlayerId>> {
        let mut by_element: BTreeMap<ElementId, Vec<PlayerId>> = BTreeMap::new();
        for player in self.active_players() {
            if let Some(element) = player.element() {
                by_element.entry(element).or_default().push(player.id());
            }
        }
        by_element
    }

    // -- Per-frame driving --

    /// Starts and ticks every active player at `now`, given in host ticks.
    pub fn animate(&mut self, now: HostTime, client: &mut dyn MutatorClient) {
        self.animate_traced(now, client, &mut Tracer::none());
    }

    /// [`animate`](Self::animate) with tracing.
    pub fn animate_traced(
        &mut self,
        now: HostTime,
        client: &mut dyn MutatorClient,
        tracer: &mut Tracer<'_>,
    ) {
        let now = self.config.timebase.to_engine_time(now);
        self.frame_index += 1;
        self.last_tick = Some(now);
        self.begin_phase(PhaseKind::Animate, now, tracer);
        let before = tracer.is_active().then(|| self.run_states());
        self.summary = tracer
            .is_active()
            .then(|| FrameSummaryBuilder::new(self.frame_index, now));

        let by_element = self.active_players_by_element();
        let mut animated = 0_u32;
        for (element, ids) in &by_element {
            let mut binding = client.bind(*element);
            for id in ids {
                if let Some(player) = self.players.get(id) {
                    player.claim_running_properties(&mut binding);
                }
            }
            for id in ids {
                if let Some(player) = self.players.get_mut(id) {
                    player.animate(now, &mut binding);
                    animated += 1;
                }
            }
            mark_mutated(&mut self.dirty, *element, binding.mutated_properties());
        }
        if let Some(summary) = &mut self.summary {
            summary.set_animated_players(animated);
        }

        #[cfg(feature = "trace-rich")]
        if tracer.is_active() {
            self.sample_values(now, tracer);
        }

        if let Some(before) = before {
            self.report_changes(&before, PhaseKind::Animate, now, tracer);
        }
        self.end_phase(PhaseKind::Animate, now, tracer);
    }

    /// Commits run-state transitions for the last `animate` and returns the
    /// events produced, in player id order.
    pub fn update_state(
        &mut self,
        start_ready_animations: bool,
        client: &mut dyn MutatorClient,
    ) -> Vec<AnimationEvent> {
        self.update_state_traced(start_ready_animations, client, &mut Tracer::none())
    }

    /// [`update_state`](Self::update_state) with tracing.
    ///
    /// Ends the frame: the summary started by the matching
    /// [`animate_traced`](Self::animate_traced) is emitted here.
    pub fn update_state_traced(
        &mut self,
        start_ready_animations: bool,
        client: &mut dyn MutatorClient,
        tracer: &mut Tracer<'_>,
    ) -> Vec<AnimationEvent> {
        let now = self.last_tick.unwrap_or_default();
        self.begin_phase(PhaseKind::UpdateState, now, tracer);
        let before = tracer.is_active().then(|| self.run_states());

        let mut events = Vec::new();
        let by_element = self.active_players_by_element();
        for (element, ids) in &by_element {
            let mut binding = client.bind(*element);
            for id in ids {
                if let Some(player) = self.players.get(id) {
                    player.claim_running_properties(&mut binding);
                }
            }
            for id in ids {
                if let Some(player) = self.players.get_mut(id) {
                    events.extend(player.update_state(start_ready_animations, &mut binding));
                }
            }
        }
        events.sort_by_key(|e| e.player_id);

        if tracer.is_active() {
            for event in &events {
                tracer.animation_event(&AnimationEventEmitted::new(self.frame_index, event));
                if let Some(summary) = &mut self.summary {
                    summary.record_event();
                }
            }
        }
        if let Some(before) = before {
            self.report_changes(&before, PhaseKind::UpdateState, now, tracer);
        }
        self.end_phase(PhaseKind::UpdateState, now, tracer);
        if let Some(summary) = self.summary.take() {
            tracer.frame_summary(&summary.finish());
        }
        events
    }

    // -- Commit --

    /// Copies this main host's players to `impl_host`.
    ///
    /// Missing impl players are created, element bindings are mirrored and
    /// animation updates are pushed. Impl players with no counterpart here
    /// are removed unless they hold impl-only animations. `impl_client`
    /// supplies scroll positions for new scroll offset animations.
    pub fn push_properties_to(
        &mut self,
        impl_host: &mut Self,
        impl_client: &mut dyn MutatorClient,
    ) {
        self.push_properties_to_traced(impl_host, impl_client, &mut Tracer::none());
    }

    /// [`push_properties_to`](Self::push_properties_to) with tracing. Run-state
    /// changes are reported for the impl side.
    pub fn push_properties_to_traced(
        &mut self,
        impl_host: &mut Self,
        impl_client: &mut dyn MutatorClient,
        tracer: &mut Tracer<'_>,
    ) {
        let now = impl_host.last_tick.unwrap_or_default();
        impl_host.begin_phase(PhaseKind::Push, now, tracer);
        let before = tracer.is_active().then(|| impl_host.run_states());

        let role = impl_host.config.role;
        impl_host.players.retain(|id, player| {
            self.players.contains_key(id)
                || player.animations().iter().any(Animation::is_impl_only)
        });
        for (id, main_player) in &mut self.players {
            let impl_player = impl_host
                .players
                .entry(*id)
                .or_insert_with(|| Player::new(*id, role));
            match main_player.element() {
                Some(element) => {
                    impl_player.attach_element(element);
                    let binding = impl_client.bind(element);
                    main_player.push_animation_updates_to(impl_player, binding.value_provider());
                }
                None => {
                    impl_player.detach_element();
                    main_player.push_animation_updates_to(impl_player, None);
                }
            }
        }

        if let Some(before) = before {
            impl_host.report_changes(&before, PhaseKind::Push, now, tracer);
        }
        impl_host.end_phase(PhaseKind::Push, now, tracer);
    }

    /// Makes pushed animations affect the active tree, on every player.
    pub fn activate_animations(&mut self) {
        self.activate_animations_traced(&mut Tracer::none());
    }

    /// [`activate_animations`](Self::activate_animations) with tracing.
    pub fn activate_animations_traced(&mut self, tracer: &mut Tracer<'_>) {
        let now = self.last_tick.unwrap_or_default();
        self.begin_phase(PhaseKind::Activate, now, tracer);
        for player in self.players.values_mut() {
            player.activate_animations();
        }
        self.end_phase(PhaseKind::Activate, now, tracer);
    }

    /// Delivers events from the other timeline to the players they name.
    ///
    /// Events for unknown or unbound players are dropped.
    pub fn set_animation_events(&mut self, events: &[AnimationEvent], client: &mut dyn MutatorClient) {
        for event in events {
            let Some(player) = self.players.get_mut(&event.player_id) else {
                continue;
            };
            let Some(element) = player.element() else {
                continue;
            };
            let mut binding = client.bind(element);
            player.dispatch_event(event, &mut binding);
            mark_mutated(&mut self.dirty, element, binding.mutated_properties());
        }
    }

    /// Returns the elements whose animated values were applied since the last
    /// call.
    pub fn take_changes(&mut self) -> AnimatedChanges {
        AnimatedChanges {
            transforms: self.drain(dirty::TRANSFORM),
            opacities: self.drain(dirty::OPACITY),
            filters: self.drain(dirty::FILTER),
            scroll_offsets: self.drain(dirty::SCROLL_OFFSET),
            background_colors: self.drain(dirty::BACKGROUND_COLOR),
        }
    }

    fn drain(&mut self, channel: Channel) -> Vec<u32> {
        let mut elements: Vec<u32> = self.dirty.drain(channel).deterministic().run().collect();
        elements.sort_unstable();
        elements
    }

    // -- Tracing helpers --

    fn begin_phase(&self, phase: PhaseKind, timestamp: HostTime, tracer: &mut Tracer<'_>) {
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: self.frame_index,
            phase,
            timestamp,
        });
    }

    fn end_phase(&self, phase: PhaseKind, timestamp: HostTime, tracer: &mut Tracer<'_>) {
        tracer.phase_end(&PhaseEndEvent {
            frame_index: self.frame_index,
            phase,
            timestamp,
        });
    }

    fn run_states(&self) -> RunStates {
        self.players
            .values()
            .flat_map(|p| {
                p.animations()
                    .iter()
                    .map(move |a| ((p.id(), a.id()), a.run_state()))
            })
            .collect()
    }

    /// Reports animations present before and after a phase whose run state
    /// differs.
    fn report_changes(
        &mut self,
        before: &RunStates,
        phase: PhaseKind,
        at: HostTime,
        tracer: &mut Tracer<'_>,
    ) {
        for player in self.players.values() {
            for a in player.animations() {
                let Some(&from) = before.get(&(player.id(), a.id())) else {
                    continue;
                };
                if from == a.run_state() {
                    continue;
                }
                tracer.run_state_change(&RunStateChangeEvent {
                    frame_index: self.frame_index,
                    phase,
                    player: player.id(),
                    animation: a.id(),
                    group: a.group(),
                    property: a.target_property(),
                    from,
                    to: a.run_state(),
                    at,
                });
                if let Some(summary) = &mut self.summary {
                    summary.record_change(phase);
                }
            }
        }
    }

    #[cfg(feature = "trace-rich")]
    fn sample_values(&self, now: HostTime, tracer: &mut Tracer<'_>) {
        use crate::trace::ValueSample;

        let samples: Vec<ValueSample> = self
            .active_players()
            .flat_map(|p| {
                p.animations()
                    .iter()
                    .filter(move |a| {
                        matches!(
                            a.run_state(),
                            RunState::Starting | RunState::Running | RunState::Paused
                        ) && a.in_effect(now)
                    })
                    .map(move |a| ValueSample {
                        player: p.id(),
                        animation: a.id(),
                        property: a.target_property(),
                        curve_time: a.trim_time_to_current_iteration(now),
                    })
            })
            .collect();
        if !samples.is_empty() {
            tracer.value_samples(self.frame_index, &samples);
        }
    }
}

/// Marks `element` dirty on the channel of every property in `mutated`.
fn mark_mutated(dirty_tracker: &mut DirtyTracker<u32>, element: ElementId, mutated: PropertySet) {
    for property in mutated.iter() {
        dirty_tracker.mark(element.0, dirty::channel_for(property));
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::vec::Vec;

    use super::*;
    use crate::animation::{GroupId, TargetProperty};
    use crate::curve::FloatCurve;
    use crate::element::tests::{RecordingDelegate, RecordingObserver};
    use crate::element::ObserverList;
    use crate::event::AnimationEventKind;
    use crate::time::TimeDelta;

    /// Elements with one active observer and a delegate each.
    #[derive(Debug, Default)]
    struct Elements {
        observers: BTreeMap<ElementId, RecordingObserver>,
        delegates: BTreeMap<ElementId, RecordingDelegate>,
    }

    impl MutatorClient for Elements {
        fn bind(&mut self, element: ElementId) -> ElementAnimations<'_> {
            let observer = self.observers.entry(element).or_default();
            let delegate = self.delegates.entry(element).or_default();
            ElementAnimations::new(element)
                .with_observer(ObserverList::Active, observer)
                .with_delegate(delegate)
        }
    }

    impl Elements {
        fn opacity(&self, element: ElementId) -> Option<f32> {
            self.observers.get(&element).and_then(|o| o.opacity)
        }
    }

    fn ms(v: u64) -> HostTime {
        HostTime::from_millis(v)
    }

    fn fade(id: u32) -> Animation {
        Animation::new(
            FloatCurve::transition(1.0, 0.0, 1.0, None),
            AnimationId(id),
            GroupId(id),
            TargetProperty::Opacity,
        )
    }

    const E1: ElementId = ElementId(1);
    const E2: ElementId = ElementId(2);

    #[test]
    fn registry_counts_active_players() {
        let mut host = AnimationHost::new(HostConfig::IMPL);
        host.add_player(PlayerId(1)).attach_element(E1);
        host.add_player(PlayerId(2)).attach_element(E2);
        assert_eq!(host.player_count(), 2);
        assert_eq!(host.active_player_count(), 0, "no animations yet");

        assert!(host.add_animation(PlayerId(1), fade(1)));
        assert!(!host.add_animation(PlayerId(9), fade(2)));
        assert_eq!(host.active_player_count(), 1);
        assert_eq!(
            host.active_players().map(Player::id).collect::<Vec<_>>(),
            [PlayerId(1)]
        );

        let mut elements = Elements::default();
        host.animate(ms(0), &mut elements);
        host.update_state(true, &mut elements);
        host.animate(ms(1000), &mut elements);
        host.update_state(true, &mut elements);
        assert_eq!(host.active_player_count(), 0, "finished animations await deletion");
        assert_eq!(host.player_count(), 2);

        assert!(host.remove_player(PlayerId(2)).is_some());
        assert_eq!(host.player_count(), 1);
    }

    #[test]
    fn impl_host_does_not_wait_for_start_time() {
        let mut host = AnimationHost::new(HostConfig::IMPL);
        host.add_player(PlayerId(1));
        host.add_animation(PlayerId(1), fade(1));
        let a = host
            .player(PlayerId(1))
            .and_then(|p| p.animation_by_id(AnimationId(1)))
            .expect("added");
        assert!(!a.needs_synchronized_start_time());

        let mut main = AnimationHost::new(HostConfig::MAIN);
        main.add_player(PlayerId(1));
        main.add_animation(PlayerId(1), fade(1));
        let a = main
            .player(PlayerId(1))
            .and_then(|p| p.animation_by_id(AnimationId(1)))
            .expect("added");
        assert!(a.needs_synchronized_start_time());
    }

    #[test]
    fn full_commit_cycle() {
        let mut main = AnimationHost::new(HostConfig::MAIN);
        let mut impl_host = AnimationHost::new(HostConfig::IMPL);
        let mut main_elements = Elements::default();
        let mut impl_elements = Elements::default();

        main.add_player(PlayerId(1)).attach_element(E1);
        main.add_animation(PlayerId(1), fade(1));

        main.push_properties_to(&mut impl_host, &mut impl_elements);
        impl_host.activate_animations();
        let impl_player = impl_host.player(PlayerId(1)).expect("created on push");
        assert_eq!(impl_player.element(), Some(E1));
        assert_eq!(impl_player.role(), PlayerRole::Impl);

        impl_host.animate(ms(100), &mut impl_elements);
        let events = impl_host.update_state(true, &mut impl_elements);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AnimationEventKind::Started);

        main.animate(ms(100), &mut main_elements);
        main.update_state(true, &mut main_elements);
        main.set_animation_events(&events, &mut main_elements);
        let a = main
            .player(PlayerId(1))
            .and_then(|p| p.animation_by_id(AnimationId(1)))
            .expect("still on main");
        assert_eq!(a.start_time(), Some(ms(100)));
        assert_eq!(
            main_elements.delegates[&E1].started,
            [(ms(100), TargetProperty::Opacity)]
        );

        impl_host.animate(ms(1100), &mut impl_elements);
        let events = impl_host.update_state(true, &mut impl_elements);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AnimationEventKind::Finished);
        assert_eq!(impl_elements.opacity(E1), Some(1.0));

        main.animate(ms(1100), &mut main_elements);
        main.update_state(true, &mut main_elements);
        main.set_animation_events(&events, &mut main_elements);
        main.animate(ms(1116), &mut main_elements);
        main.update_state(true, &mut main_elements);
        assert_eq!(main.active_player_count(), 0);

        // The next commit purges the deleted animation on both sides.
        main.push_properties_to(&mut impl_host, &mut impl_elements);
        impl_host.activate_animations();
        assert!(!main.player(PlayerId(1)).expect("player").has_any_animation());
        assert!(!impl_host.player(PlayerId(1)).expect("player").has_any_animation());
    }

    #[test]
    fn push_removes_impl_players_gone_from_main() {
        let mut main = AnimationHost::new(HostConfig::MAIN);
        let mut impl_host = AnimationHost::new(HostConfig::IMPL);
        let mut impl_elements = Elements::default();
        main.add_player(PlayerId(1)).attach_element(E1);
        main.add_player(PlayerId(2));
        main.push_properties_to(&mut impl_host, &mut impl_elements);
        assert_eq!(impl_host.player_count(), 2);

        main.remove_player(PlayerId(1));
        main.push_properties_to(&mut impl_host, &mut impl_elements);
        assert_eq!(impl_host.player_count(), 1);
        assert!(impl_host.player(PlayerId(2)).is_some());
    }

    #[test]
    fn push_keeps_impl_only_players() {
        let mut main = AnimationHost::new(HostConfig::MAIN);
        let mut impl_host = AnimationHost::new(HostConfig::IMPL);
        let mut impl_elements = Elements::default();
        impl_host.add_player(PlayerId(9)).attach_element(E2);
        let mut a = fade(1);
        a.set_is_impl_only(true);
        impl_host.add_animation(PlayerId(9), a);
        impl_host.add_player(PlayerId(10));

        main.push_properties_to(&mut impl_host, &mut impl_elements);
        let player = impl_host.player(PlayerId(9)).expect("impl-only player survives the commit");
        assert!(player.animation_by_id(AnimationId(1)).is_some());
        assert!(
            impl_host.player(PlayerId(10)).is_none(),
            "players without impl-only animations still follow main"
        );

        impl_host.animate(ms(0), &mut impl_elements);
        let events = impl_host.update_state(true, &mut impl_elements);
        assert_eq!(
            events.iter().map(|e| e.kind).collect::<Vec<_>>(),
            [AnimationEventKind::Started, AnimationEventKind::PropertyUpdate]
        );
        assert_eq!(impl_elements.opacity(E2), Some(0.0));
    }

    #[test]
    fn changes_are_tracked_per_property() {
        let mut host = AnimationHost::new(HostConfig::IMPL);
        let mut elements = Elements::default();
        host.add_player(PlayerId(1)).attach_element(E2);
        host.add_player(PlayerId(2)).attach_element(E1);
        host.add_animation(PlayerId(1), fade(1));
        host.add_animation(PlayerId(2), fade(1));
        assert!(host.take_changes().is_empty());

        host.animate(ms(0), &mut elements);
        let changes = host.take_changes();
        assert_eq!(changes.opacities, [1, 2]);
        assert!(changes.transforms.is_empty());
        assert!(host.take_changes().is_empty(), "changes are drained");
    }

    #[test]
    fn players_on_one_element_take_turns() {
        let mut host = AnimationHost::new(HostConfig::IMPL);
        let mut elements = Elements::default();
        host.add_player(PlayerId(1)).attach_element(E1);
        host.add_player(PlayerId(2)).attach_element(E1);
        host.add_animation(PlayerId(1), fade(1));
        host.add_animation(PlayerId(2), fade(1));

        host.animate(ms(0), &mut elements);
        let events = host.update_state(true, &mut elements);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].player_id, PlayerId(1));
        let waiting = host
            .player(PlayerId(2))
            .and_then(|p| p.animation_by_id(AnimationId(1)))
            .map(Animation::run_state);
        assert_eq!(waiting, Some(RunState::WaitingForTargetAvailability));

        host.animate(ms(1000), &mut elements);
        let events = host.update_state(true, &mut elements);
        let kinds: Vec<_> = events.iter().map(|e| (e.player_id, e.kind)).collect();
        assert_eq!(
            kinds,
            [
                (PlayerId(1), AnimationEventKind::Finished),
                (PlayerId(2), AnimationEventKind::Started)
            ]
        );
    }

    #[test]
    fn ticks_are_converted_with_the_timebase() {
        let config = HostConfig::IMPL.with_timebase(Timebase::MICROS);
        let mut host = AnimationHost::new(config);
        let mut elements = Elements::default();
        host.add_player(PlayerId(1)).attach_element(E1);
        host.add_animation(PlayerId(1), fade(1));

        host.animate(HostTime(0), &mut elements);
        host.update_state(true, &mut elements);
        host.animate(HostTime(250_000), &mut elements);
        assert_eq!(elements.opacity(E1), Some(0.25));
        assert_eq!(
            host.player(PlayerId(1)).and_then(Player::last_tick_time),
            Some(HostTime::from_millis(250))
        );
        assert_eq!(host.frame_index(), 2);
    }

    #[test]
    fn property_updates_reach_main_observers() {
        let mut impl_host = AnimationHost::new(HostConfig::IMPL);
        let mut main = AnimationHost::new(HostConfig::MAIN);
        let mut impl_elements = Elements::default();
        let mut main_elements = Elements::default();
        main.add_player(PlayerId(4)).attach_element(E2);
        impl_host.add_player(PlayerId(4)).attach_element(E2);
        let mut a = fade(1);
        a.set_is_impl_only(true);
        a.set_time_offset(TimeDelta::from_millis(500));
        impl_host.add_animation(PlayerId(4), a);

        impl_host.animate(ms(0), &mut impl_elements);
        let events = impl_host.update_state(true, &mut impl_elements);
        assert_eq!(events.len(), 2);
        main.set_animation_events(&events, &mut main_elements);
        assert_eq!(main_elements.opacity(E2), Some(0.5));
        assert_eq!(main.take_changes().opacities, [2]);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn traced_frame_reports_changes_and_summary() {
        use crate::trace::{AnimationEventEmitted, FrameSummary, TraceSink};

        #[derive(Default)]
        struct Sink {
            phases: Vec<(PhaseKind, bool)>,
            changes: Vec<(RunState, RunState)>,
            events: Vec<AnimationEventKind>,
            summaries: Vec<FrameSummary>,
        }
        impl TraceSink for Sink {
            fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
                self.phases.push((e.phase, true));
            }
            fn on_phase_end(&mut self, e: &PhaseEndEvent) {
                self.phases.push((e.phase, false));
            }
            fn on_run_state_change(&mut self, e: &RunStateChangeEvent) {
                self.changes.push((e.from, e.to));
            }
            fn on_animation_event(&mut self, e: &AnimationEventEmitted) {
                self.events.push(e.kind);
            }
            fn on_frame_summary(&mut self, s: &FrameSummary) {
                self.summaries.push(*s);
            }
        }

        let mut host = AnimationHost::new(HostConfig::IMPL);
        let mut elements = Elements::default();
        host.add_player(PlayerId(1)).attach_element(E1);
        host.add_animation(PlayerId(1), fade(1));

        let mut sink = Sink::default();
        let mut tracer = Tracer::new(&mut sink);
        host.animate_traced(ms(0), &mut elements, &mut tracer);
        host.update_state_traced(true, &mut elements, &mut tracer);
        drop(tracer);

        assert_eq!(
            sink.phases,
            [
                (PhaseKind::Animate, true),
                (PhaseKind::Animate, false),
                (PhaseKind::UpdateState, true),
                (PhaseKind::UpdateState, false)
            ]
        );
        assert_eq!(
            sink.changes,
            [
                (RunState::WaitingForTargetAvailability, RunState::Starting),
                (RunState::Starting, RunState::Running)
            ]
        );
        assert_eq!(sink.events, [AnimationEventKind::Started]);
        assert_eq!(sink.summaries.len(), 1);
        let summary = sink.summaries[0];
        assert_eq!(summary.frame_index, 1);
        assert_eq!(summary.animated_players, 1);
        assert_eq!(summary.events, 1);
        assert_eq!(summary.run_state_changes(), 2);
    }
}
