// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A compositor animation engine with two synchronized timelines.
//!
//! `impetus_core` drives property animations (transform, opacity, filter,
//! scroll offset, background color) on compositing elements. It is `no_std`
//! compatible (with `alloc`). A *main* timeline owns the authoritative
//! animation state; an *impl* timeline ticks copies of it at display rate and
//! reports back what happened.
//!
//! # Architecture
//!
//! Each frame is split into a tick and a state commit, and the two timelines
//! meet once per commit:
//!
//! ```text
//!   main AnimationHost                         impl AnimationHost
//!   ──────────────────                         ──────────────────
//!   Player::add_animation
//!          │
//!          ▼
//!   push_properties_to ──────────────────────► activate_animations
//!                                                     │
//!                                                     ▼
//!                                        animate(now) ──► ValueObserver
//!                                                     │
//!                                                     ▼
//!                                        update_state ──► AnimationEvent
//!                                                               │
//!   set_animation_events ◄──────────────────────────────────────┘
//!          │
//!          ▼
//!   AnimationDelegate, take_changes() ──► AnimatedChanges
//! ```
//!
//! **[`animation`]**: One property animation: curve, iterations,
//! direction, fill mode, run state and the mapping from monotonic time to
//! curve time.
//!
//! **[`curve`]**: Keyframed curves for each value kind plus the retargetable
//! scroll offset curve, all unified under [`Curve`](curve::Curve).
//!
//! **[`player`]**: A [`Player`](player::Player) owns the animations of one
//! element on one timeline and implements starting, finishing, deletion and
//! the commit to the other timeline.
//!
//! **[`host`]**: [`AnimationHost`](host::AnimationHost), the per-timeline
//! registry that drives players and records which elements changed.
//!
//! **[`element`]**: Observer, value provider and delegate traits, and the
//! per-call [`ElementAnimations`](element::ElementAnimations) binding.
//!
//! **[`dirty`]**: Property channels for per-element change tracking via
//! `understory_dirty`.
//!
//! **[`event`]**: Events the impl timeline reports to the main timeline.
//!
//! **[`time`]**: Monotonic instants, signed deltas and tick conversion.
//!
//! **[`timing_function`]**: Easing: cubic bezier, steps and linear.
//!
//! **[`value`]**, **[`transform`]**, **[`transform_operations`]**,
//! **[`filter`]**: Animated value types and their interpolation.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-animation
//!   value samples.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animation;
pub mod curve;
pub mod dirty;
pub mod element;
pub mod event;
pub mod filter;
pub mod host;
pub mod player;
pub mod time;
pub mod timing_function;
pub mod trace;
pub mod transform;
pub mod transform_operations;
pub mod value;
