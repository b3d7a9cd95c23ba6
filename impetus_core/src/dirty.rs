// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The [`AnimationHost`](crate::host::AnimationHost) tracks which elements had
//! an animated value applied since the last
//! [`take_changes`](crate::host::AnimationHost::take_changes), using
//! [`understory_dirty`] with one channel per animatable property. Elements
//! are keyed by their raw [`ElementId`](crate::element::ElementId) value.
//!
//! All channels are local-only: an animated value belongs to one element and
//! never propagates to others. Propagation to descendants is the business of
//! whatever consumes the drained [`AnimatedChanges`](crate::host::AnimatedChanges).

use understory_dirty::Channel;

use crate::animation::TargetProperty;

/// An animated transform was applied.
pub const TRANSFORM: Channel = Channel::new(0);

/// An animated opacity was applied.
pub const OPACITY: Channel = Channel::new(1);

/// An animated filter list was applied.
pub const FILTER: Channel = Channel::new(2);

/// An animated scroll offset was applied.
pub const SCROLL_OFFSET: Channel = Channel::new(3);

/// An animated background color was applied.
pub const BACKGROUND_COLOR: Channel = Channel::new(4);

/// Returns the channel that records changes to `property`.
#[must_use]
pub const fn channel_for(property: TargetProperty) -> Channel {
    match property {
        TargetProperty::Transform => TRANSFORM,
        TargetProperty::Opacity => OPACITY,
        TargetProperty::Filter => FILTER,
        TargetProperty::ScrollOffset => SCROLL_OFFSET,
        TargetProperty::BackgroundColor => BACKGROUND_COLOR,
    }
}
