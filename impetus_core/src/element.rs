// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The narrow contract between players and the elements they animate.
//!
//! The engine never owns elements. Each call that can produce values
//! receives an [`ElementAnimations`] binding: borrowed observers for the
//! active and pending trees, an optional [`ValueProvider`] and an optional
//! [`AnimationDelegate`]. The binding lives for one call and records which
//! properties it delivered values for.

use alloc::vec::Vec;

use kurbo::Vec2;

use crate::animation::{GroupId, PropertySet, TargetProperty};
use crate::curve::ScrollOffsetCurve;
use crate::filter::FilterOperations;
use crate::player::PlayerId;
use crate::time::HostTime;
use crate::transform::Transform3d;
use crate::value::{AnimatedValue, Color};

/// Identifies an animatable element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u32);

/// Which tree an observer belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObserverList {
    /// The tree currently on screen.
    Active,
    /// The tree being prepared for the next activation.
    Pending,
}

/// Receives computed values for one element in one tree.
pub trait ValueObserver {
    /// An opacity in `[0, 1]`.
    fn on_opacity_animated(&mut self, opacity: f32) {
        _ = opacity;
    }

    /// A composed transform.
    fn on_transform_animated(&mut self, transform: &Transform3d) {
        _ = transform;
    }

    /// A filter list.
    fn on_filter_animated(&mut self, filters: &FilterOperations) {
        _ = filters;
    }

    /// A scroll offset.
    fn on_scroll_offset_animated(&mut self, offset: Vec2) {
        _ = offset;
    }

    /// A background color.
    fn on_background_color_animated(&mut self, color: Color) {
        _ = color;
    }

    /// Some animation on the element became ready for deletion.
    fn on_animation_waiting_for_deletion(&mut self) {}
}

/// Supplies live values that animations start from.
pub trait ValueProvider {
    /// The element's current scroll offset.
    fn current_scroll_offset(&self) -> Vec2;
}

/// Receives group-level lifecycle callbacks.
pub trait AnimationDelegate {
    /// A group started at `time`.
    fn on_animation_started(&mut self, time: HostTime, property: TargetProperty, group: GroupId) {
        _ = (time, property, group);
    }

    /// A group finished at `time`.
    fn on_animation_finished(&mut self, time: HostTime, property: TargetProperty, group: GroupId) {
        _ = (time, property, group);
    }

    /// A group was aborted at `time`.
    fn on_animation_aborted(&mut self, time: HostTime, property: TargetProperty, group: GroupId) {
        _ = (time, property, group);
    }

    /// The impl timeline gave up a scroll animation; `curve` continues it
    /// from `animation_start_time`.
    fn on_animation_takeover(
        &mut self,
        time: HostTime,
        property: TargetProperty,
        animation_start_time: Option<HostTime>,
        curve: &ScrollOffsetCurve,
    ) {
        _ = (time, property, animation_start_time, curve);
    }
}

/// One element's observers, provider and delegate, borrowed for one call.
pub struct ElementAnimations<'a> {
    element: ElementId,
    active: Option<&'a mut dyn ValueObserver>,
    pending: Option<&'a mut dyn ValueObserver>,
    provider: Option<&'a dyn ValueProvider>,
    delegate: Option<&'a mut dyn AnimationDelegate>,
    mutated: PropertySet,
    claims: Vec<PropertyClaim>,
}

/// Properties one player's starting and running animations hold.
#[derive(Clone, Copy, Debug)]
struct PropertyClaim {
    player: PlayerId,
    active: PropertySet,
    pending: PropertySet,
}

impl core::fmt::Debug for ElementAnimations<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ElementAnimations")
            .field("element", &self.element)
            .field("active", &self.active.is_some())
            .field("pending", &self.pending.is_some())
            .field("mutated", &self.mutated)
            .finish_non_exhaustive()
    }
}

impl<'a> ElementAnimations<'a> {
    /// Creates a binding with no observers.
    #[must_use]
    pub fn new(element: ElementId) -> Self {
        Self {
            element,
            active: None,
            pending: None,
            provider: None,
            delegate: None,
            mutated: PropertySet::EMPTY,
            claims: Vec::new(),
        }
    }

    /// Attaches the observer for `list`.
    #[must_use]
    pub fn with_observer(mut self, list: ObserverList, observer: &'a mut dyn ValueObserver) -> Self {
        match list {
            ObserverList::Active => self.active = Some(observer),
            ObserverList::Pending => self.pending = Some(observer),
        }
        self
    }

    /// Attaches a value provider.
    #[must_use]
    pub fn with_value_provider(mut self, provider: &'a dyn ValueProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Attaches a delegate.
    #[must_use]
    pub fn with_delegate(mut self, delegate: &'a mut dyn AnimationDelegate) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Returns the bound element.
    #[inline]
    #[must_use]
    pub const fn element(&self) -> ElementId {
        self.element
    }

    /// Returns `true` if an observer is attached for `list`.
    #[must_use]
    pub const fn has_observer(&self, list: ObserverList) -> bool {
        match list {
            ObserverList::Active => self.active.is_some(),
            ObserverList::Pending => self.pending.is_some(),
        }
    }

    /// Returns `true` if any observer is attached.
    #[inline]
    #[must_use]
    pub const fn has_any_observer(&self) -> bool {
        self.active.is_some() || self.pending.is_some()
    }

    /// Returns the value provider, if attached.
    #[inline]
    #[must_use]
    pub fn value_provider(&self) -> Option<&'a dyn ValueProvider> {
        self.provider
    }

    /// Current scroll offset from the provider, if one is attached.
    #[must_use]
    pub fn scroll_offset_for_animation(&self) -> Option<Vec2> {
        self.provider.map(|p| p.current_scroll_offset())
    }

    /// Returns the delegate, if attached.
    #[inline]
    pub fn delegate(&mut self) -> Option<&mut (dyn AnimationDelegate + 'a)> {
        self.delegate.as_deref_mut()
    }

    /// Properties that reached at least one observer through this binding.
    #[inline]
    #[must_use]
    pub const fn mutated_properties(&self) -> PropertySet {
        self.mutated
    }

    /// Delivers `value` to the selected observers.
    pub fn notify_value(&mut self, value: &AnimatedValue, notify_active: bool, notify_pending: bool) {
        let mut delivered = false;
        if notify_active && let Some(o) = self.active.as_deref_mut() {
            deliver(o, value);
            delivered = true;
        }
        if notify_pending && let Some(o) = self.pending.as_deref_mut() {
            deliver(o, value);
            delivered = true;
        }
        if delivered {
            self.mutated.insert(property_of(value));
        }
    }

    /// Tells every observer that an animation awaits deletion.
    pub fn notify_waiting_for_deletion(&mut self) {
        if let Some(o) = self.active.as_deref_mut() {
            o.on_animation_waiting_for_deletion();
        }
        if let Some(o) = self.pending.as_deref_mut() {
            o.on_animation_waiting_for_deletion();
        }
    }

    /// Replaces the properties `player` holds on this element.
    pub(crate) fn set_claim(&mut self, player: PlayerId, active: PropertySet, pending: PropertySet) {
        let claim = PropertyClaim {
            player,
            active,
            pending,
        };
        match self.claims.iter_mut().find(|c| c.player == player) {
            Some(existing) => *existing = claim,
            None => self.claims.push(claim),
        }
    }

    /// Properties held on the active and pending trees by players other than
    /// `player`.
    pub(crate) fn claimed_by_others(&self, player: PlayerId) -> (PropertySet, PropertySet) {
        self.claims
            .iter()
            .filter(|c| c.player != player)
            .fold((PropertySet::EMPTY, PropertySet::EMPTY), |(a, p), c| {
                (a.union(c.active), p.union(c.pending))
            })
    }
}

fn property_of(value: &AnimatedValue) -> TargetProperty {
    match value {
        AnimatedValue::Opacity(_) => TargetProperty::Opacity,
        AnimatedValue::Transform(_) => TargetProperty::Transform,
        AnimatedValue::Filter(_) => TargetProperty::Filter,
        AnimatedValue::ScrollOffset(_) => TargetProperty::ScrollOffset,
        AnimatedValue::BackgroundColor(_) => TargetProperty::BackgroundColor,
    }
}

fn deliver(observer: &mut dyn ValueObserver, value: &AnimatedValue) {
    match value {
        AnimatedValue::Opacity(v) => observer.on_opacity_animated(*v),
        AnimatedValue::Transform(t) => observer.on_transform_animated(t),
        AnimatedValue::Filter(f) => observer.on_filter_animated(f),
        AnimatedValue::ScrollOffset(o) => observer.on_scroll_offset_animated(*o),
        AnimatedValue::BackgroundColor(c) => observer.on_background_color_animated(*c),
    }
}
