// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retargetable scroll offset curve.
//!
//! A scroll animation is created from a target alone; the start position is
//! supplied later, when the live scroll offset is known. While running, the
//! target may move ([`ScrollOffsetCurve::update_target`]) without a visible
//! jump or loss of velocity.

use kurbo::Vec2;

use crate::timing_function::TimingFunction;

const EPSILON: f64 = 0.01;

/// Segment durations are measured in frames at this rate.
const FRAMES_PER_SECOND: f64 = 60.0;

const CONSTANT_FRAMES: f64 = 9.0;
const INVERSE_DELTA_RAMP_START_PX: f64 = 120.0;
const INVERSE_DELTA_RAMP_END_PX: f64 = 480.0;
const INVERSE_DELTA_MIN_FRAMES: f64 = 6.0;
const INVERSE_DELTA_MAX_FRAMES: f64 = 12.0;
const INVERSE_DELTA_SLOPE: f64 = (INVERSE_DELTA_MIN_FRAMES - INVERSE_DELTA_MAX_FRAMES)
    / (INVERSE_DELTA_RAMP_END_PX - INVERSE_DELTA_RAMP_START_PX);
const INVERSE_DELTA_OFFSET: f64 =
    INVERSE_DELTA_MAX_FRAMES - INVERSE_DELTA_RAMP_START_PX * INVERSE_DELTA_SLOPE;

/// How a scroll segment's duration follows from its distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DurationBehavior {
    /// Grows with the square root of the distance.
    #[default]
    DeltaBased,
    /// Fixed length, independent of distance.
    Constant,
    /// Shorter for longer distances, within fixed bounds.
    InverseDelta,
}

/// The signed component with the larger magnitude.
fn maximum_dimension(delta: Vec2) -> f64 {
    if libm::fabs(delta.x) > libm::fabs(delta.y) {
        delta.x
    } else {
        delta.y
    }
}

fn segment_duration(delta: Vec2, behavior: DurationBehavior) -> f64 {
    let distance = libm::fabs(maximum_dimension(delta));
    let frames = match behavior {
        DurationBehavior::Constant => CONSTANT_FRAMES,
        DurationBehavior::DeltaBased => libm::sqrt(distance),
        DurationBehavior::InverseDelta => (INVERSE_DELTA_OFFSET + distance * INVERSE_DELTA_SLOPE)
            .clamp(INVERSE_DELTA_MIN_FRAMES, INVERSE_DELTA_MAX_FRAMES),
    };
    frames / FRAMES_PER_SECOND
}

/// Ease-out whose initial slope is `velocity`.
fn ease_out_with_initial_velocity(velocity: f64) -> TimingFunction {
    let velocity = velocity.clamp(-1000.0, 1000.0);
    let x1 = 0.42;
    TimingFunction::cubic_bezier(x1, velocity * x1, 0.58, 1.0)
}

/// Upper bound on a retargeted segment's duration, estimated from the
/// current velocity. Infinite when no estimate is possible.
fn velocity_based_duration_bound(
    old_delta: Vec2,
    old_normalized_velocity: f64,
    old_duration: f64,
    new_delta: Vec2,
) -> f64 {
    let old_max = maximum_dimension(old_delta);
    let new_max = maximum_dimension(new_delta);
    if libm::fabs(new_max) < EPSILON {
        return 0.0;
    }
    if libm::fabs(old_max) < EPSILON || libm::fabs(old_normalized_velocity) < EPSILON {
        return f64::INFINITY;
    }
    let old_true_velocity = old_normalized_velocity * old_max / old_duration;
    // 2.5 allows for the deceleration of the ease-out.
    let bound = new_max / old_true_velocity * 2.5;
    if bound < 0.0 { f64::INFINITY } else { bound }
}

/// A curve from an (initially unknown) scroll position to a target.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollOffsetCurve {
    initial_value: Option<Vec2>,
    target_value: Vec2,
    /// End of the current segment, in seconds from the curve's start.
    total_duration: f64,
    /// Start of the current segment.
    last_retarget: f64,
    timing_function: TimingFunction,
    duration_behavior: DurationBehavior,
}

impl ScrollOffsetCurve {
    /// Creates a curve towards `target` eased with ease-in-out.
    #[must_use]
    pub fn new(target: Vec2, duration_behavior: DurationBehavior) -> Self {
        Self::with_timing_function(target, TimingFunction::ease_in_out(), duration_behavior)
    }

    /// Creates a curve towards `target` with a custom timing function.
    #[must_use]
    pub fn with_timing_function(
        target: Vec2,
        timing_function: TimingFunction,
        duration_behavior: DurationBehavior,
    ) -> Self {
        Self {
            initial_value: None,
            target_value: target,
            total_duration: 0.0,
            last_retarget: 0.0,
            timing_function,
            duration_behavior,
        }
    }

    /// Sets the start position and derives the duration from the distance.
    pub fn set_initial_value(&mut self, initial: Vec2) {
        self.initial_value = Some(initial);
        self.total_duration = segment_duration(self.target_value - initial, self.duration_behavior);
    }

    /// Returns `true` once a start position has been supplied.
    #[inline]
    #[must_use]
    pub const fn has_initial_value(&self) -> bool {
        self.initial_value.is_some()
    }

    /// Returns the target.
    #[inline]
    #[must_use]
    pub const fn target_value(&self) -> Vec2 {
        self.target_value
    }

    /// Returns the duration behavior.
    #[inline]
    #[must_use]
    pub const fn duration_behavior(&self) -> DurationBehavior {
        self.duration_behavior
    }

    /// Total duration in seconds, including any earlier segments.
    #[inline]
    #[must_use]
    pub const fn duration(&self) -> f64 {
        self.total_duration
    }

    /// Start position, or the target when none has been supplied.
    fn start(&self) -> Vec2 {
        self.initial_value.unwrap_or(self.target_value)
    }

    /// Position at `t` seconds.
    #[must_use]
    pub fn value_at(&self, t: f64) -> Vec2 {
        let duration = self.total_duration - self.last_retarget;
        let t = t - self.last_retarget;
        if t <= 0.0 {
            return self.start();
        }
        if duration <= 0.0 || t >= duration {
            return self.target_value;
        }
        let progress = self.timing_function.value(t / duration);
        self.start().lerp(self.target_value, progress)
    }

    /// Moves the target at `t` seconds, continuing from the current position
    /// and velocity.
    pub fn update_target(&mut self, t: f64, new_target: Vec2) {
        if libm::fabs(maximum_dimension(self.target_value - new_target)) < EPSILON {
            self.target_value = new_target;
            return;
        }
        let t = t.max(self.last_retarget);
        let current = self.value_at(t);
        let old_delta = self.target_value - self.start();
        let new_delta = new_target - current;
        let old_duration = self.total_duration - self.last_retarget;

        if old_duration <= 0.0 {
            self.total_duration = t + segment_duration(new_delta, self.duration_behavior);
            self.last_retarget = t;
            self.initial_value = Some(current);
            self.target_value = new_target;
            return;
        }

        let old_normalized_velocity = self
            .timing_function
            .velocity((t - self.last_retarget) / old_duration);
        let new_duration = segment_duration(new_delta, self.duration_behavior).min(
            velocity_based_duration_bound(old_delta, old_normalized_velocity, old_duration, new_delta),
        );

        if new_duration < EPSILON {
            // Already at the new target.
            self.target_value = new_target;
            self.total_duration = t;
            return;
        }

        // Rescale the slope from the old segment's units into the new one's.
        let new_normalized_velocity = old_normalized_velocity
            * (new_duration / old_duration)
            * (maximum_dimension(old_delta) / maximum_dimension(new_delta));

        self.initial_value = Some(current);
        self.target_value = new_target;
        self.total_duration = t + new_duration;
        self.last_retarget = t;
        self.timing_function = ease_out_with_initial_velocity(new_normalized_velocity);
    }

    /// Shifts both endpoints, e.g. after the scrolled content moved.
    pub fn apply_adjustment(&mut self, adjustment: Vec2) {
        if let Some(initial) = &mut self.initial_value {
            *initial += adjustment;
        }
        self.target_value += adjustment;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        let d = a - b;
        libm::fabs(d.x) < 1e-6 && libm::fabs(d.y) < 1e-6
    }

    #[test]
    fn delta_based_duration() {
        let mut curve = ScrollOffsetCurve::new(Vec2::new(0.0, 3600.0), DurationBehavior::DeltaBased);
        assert!(!curve.has_initial_value());
        curve.set_initial_value(Vec2::ZERO);
        assert!(curve.has_initial_value());
        assert_eq!(curve.duration(), 1.0, "sqrt(3600) frames at 60 fps");
    }

    #[test]
    fn constant_and_inverse_delta_durations() {
        let mut constant = ScrollOffsetCurve::new(Vec2::new(10.0, 0.0), DurationBehavior::Constant);
        constant.set_initial_value(Vec2::ZERO);
        assert_eq!(constant.duration(), 9.0 / 60.0);

        let mut near = ScrollOffsetCurve::new(Vec2::new(0.0, 50.0), DurationBehavior::InverseDelta);
        near.set_initial_value(Vec2::ZERO);
        assert_eq!(near.duration(), 12.0 / 60.0);

        let mut far = ScrollOffsetCurve::new(Vec2::new(0.0, 1000.0), DurationBehavior::InverseDelta);
        far.set_initial_value(Vec2::ZERO);
        assert_eq!(far.duration(), 6.0 / 60.0);
    }

    #[test]
    fn endpoints_and_midpoint() {
        let mut curve = ScrollOffsetCurve::with_timing_function(
            Vec2::new(400.0, 500.0),
            TimingFunction::Linear,
            DurationBehavior::DeltaBased,
        );
        curve.set_initial_value(Vec2::ZERO);
        let d = curve.duration();
        assert_eq!(curve.value_at(-1.0), Vec2::ZERO);
        assert_eq!(curve.value_at(d), Vec2::new(400.0, 500.0));
        assert!(close(curve.value_at(d / 2.0), Vec2::new(200.0, 250.0)));
    }

    #[test]
    fn zero_distance_has_zero_duration() {
        let mut curve = ScrollOffsetCurve::new(Vec2::new(5.0, 5.0), DurationBehavior::DeltaBased);
        curve.set_initial_value(Vec2::new(5.0, 5.0));
        assert_eq!(curve.duration(), 0.0);
        assert_eq!(curve.value_at(0.0), Vec2::new(5.0, 5.0));
        assert_eq!(curve.value_at(1.0), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn retarget_keeps_position() {
        let mut curve = ScrollOffsetCurve::new(Vec2::new(0.0, 3600.0), DurationBehavior::DeltaBased);
        curve.set_initial_value(Vec2::ZERO);
        let before = curve.value_at(0.5);

        curve.update_target(0.5, Vec2::new(0.0, 7200.0));
        assert!(close(curve.value_at(0.5), before), "no jump at the retarget");
        assert!(curve.duration() > 0.5);
        assert_eq!(curve.value_at(curve.duration()), Vec2::new(0.0, 7200.0));
        assert!(curve.value_at(0.6).y > before.y, "keeps moving forward");
    }

    #[test]
    fn retarget_to_current_position_stops() {
        let mut curve = ScrollOffsetCurve::with_timing_function(
            Vec2::new(0.0, 3600.0),
            TimingFunction::Linear,
            DurationBehavior::DeltaBased,
        );
        curve.set_initial_value(Vec2::ZERO);
        let here = curve.value_at(0.5);
        curve.update_target(0.5, here);
        assert_eq!(curve.duration(), 0.5);
        assert_eq!(curve.value_at(1.0), here);
    }

    #[test]
    fn tiny_retarget_only_moves_target() {
        let mut curve = ScrollOffsetCurve::new(Vec2::new(0.0, 100.0), DurationBehavior::DeltaBased);
        curve.set_initial_value(Vec2::ZERO);
        let duration = curve.duration();
        curve.update_target(0.05, Vec2::new(0.0, 100.001));
        assert_eq!(curve.duration(), duration);
        assert_eq!(curve.target_value(), Vec2::new(0.0, 100.001));
    }

    #[test]
    fn adjustment_shifts_both_ends() {
        let mut curve = ScrollOffsetCurve::new(Vec2::new(0.0, 100.0), DurationBehavior::DeltaBased);
        curve.set_initial_value(Vec2::new(0.0, 10.0));
        curve.apply_adjustment(Vec2::new(5.0, -10.0));
        assert_eq!(curve.value_at(0.0), Vec2::new(5.0, 0.0));
        assert_eq!(curve.target_value(), Vec2::new(5.0, 90.0));
    }
}
