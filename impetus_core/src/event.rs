// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation events: values sent from the impl timeline to the main one.

use crate::animation::{Animation, GroupId, TargetProperty};
use crate::curve::ScrollOffsetCurve;
use crate::element::ElementId;
use crate::player::PlayerId;
use crate::time::HostTime;
use crate::value::AnimatedValue;

/// What an [`AnimationEvent`] reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationEventKind {
    /// A group started running; carries the authoritative start time.
    Started,
    /// A group finished.
    Finished,
    /// An animation was aborted.
    Aborted,
    /// A computed value of an impl-only animation.
    PropertyUpdate,
    /// A scroll animation handed back for the main timeline to continue.
    Takeover,
}

impl AnimationEventKind {
    /// Short lowercase name, for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Aborted => "aborted",
            Self::PropertyUpdate => "property_update",
            Self::Takeover => "takeover",
        }
    }
}

/// One event, addressed to a player by id and to an animation by group and
/// property.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationEvent {
    /// What happened.
    pub kind: AnimationEventKind,
    /// The player whose animation produced the event.
    pub player_id: PlayerId,
    /// The element that player is bound to, if any.
    pub element_id: Option<ElementId>,
    /// The animation's group.
    pub group_id: GroupId,
    /// The animation's property.
    pub target_property: TargetProperty,
    /// When it happened.
    pub monotonic_time: HostTime,
    /// Whether the animation lives only on the impl timeline.
    pub is_impl_only: bool,
    /// The computed value, for [`PropertyUpdate`](AnimationEventKind::PropertyUpdate).
    pub value: Option<AnimatedValue>,
    /// Start time of the handed-back animation, for
    /// [`Takeover`](AnimationEventKind::Takeover).
    pub animation_start_time: Option<HostTime>,
    /// The handed-back curve, for [`Takeover`](AnimationEventKind::Takeover).
    pub curve: Option<ScrollOffsetCurve>,
}

impl AnimationEvent {
    /// Creates an event about `animation` with no payload.
    #[must_use]
    pub fn for_animation(
        kind: AnimationEventKind,
        player_id: PlayerId,
        element_id: Option<ElementId>,
        animation: &Animation,
        monotonic_time: HostTime,
    ) -> Self {
        Self {
            kind,
            player_id,
            element_id,
            group_id: animation.group(),
            target_property: animation.target_property(),
            monotonic_time,
            is_impl_only: animation.is_impl_only(),
            value: None,
            animation_start_time: None,
            curve: None,
        }
    }
}
