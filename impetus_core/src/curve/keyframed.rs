// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyframed curves.

use alloc::vec::Vec;

use crate::filter::FilterOperations;
use crate::timing_function::TimingFunction;
use crate::transform::Box3d;
use crate::transform_operations::TransformOperations;
use crate::value::Color;

/// A keyframe value type that can be interpolated.
pub trait Interpolate: Clone {
    /// Returns the value `progress` of the way from `from` to `to`.
    ///
    /// `progress` may leave `[0, 1]` when an easing overshoots.
    fn interpolate(from: &Self, to: &Self, progress: f64) -> Self;
}

impl Interpolate for f32 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "float keyframes are stored as f32"
    )]
    fn interpolate(from: &Self, to: &Self, progress: f64) -> Self {
        (f64::from(*from) + (f64::from(*to) - f64::from(*from)) * progress) as Self
    }
}

impl Interpolate for Color {
    fn interpolate(from: &Self, to: &Self, progress: f64) -> Self {
        Self::blend(from, to, progress)
    }
}

impl Interpolate for TransformOperations {
    fn interpolate(from: &Self, to: &Self, progress: f64) -> Self {
        Self::blend(from, to, progress)
    }
}

impl Interpolate for FilterOperations {
    fn interpolate(from: &Self, to: &Self, progress: f64) -> Self {
        Self::blend(from, to, progress)
    }
}

/// One keyframe: a value at a time, plus the easing used towards the next
/// keyframe.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe<T> {
    /// Time of this keyframe in seconds from the start of the curve.
    pub time: f64,
    /// Value at `time`.
    pub value: T,
    /// Easing for the segment that starts at this keyframe; `None` is linear.
    pub timing_function: Option<TimingFunction>,
}

impl<T> Keyframe<T> {
    /// Creates a keyframe.
    #[inline]
    #[must_use]
    pub const fn new(time: f64, value: T, timing_function: Option<TimingFunction>) -> Self {
        Self {
            time,
            value,
            timing_function,
        }
    }
}

/// A curve defined by keyframes sorted by time.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframedCurve<T> {
    keyframes: Vec<Keyframe<T>>,
}

/// Opacity curve.
pub type FloatCurve = KeyframedCurve<f32>;
/// Background color curve.
pub type ColorCurve = KeyframedCurve<Color>;
/// Transform curve.
pub type TransformCurve = KeyframedCurve<TransformOperations>;
/// Filter curve.
pub type FilterCurve = KeyframedCurve<FilterOperations>;

impl<T> Default for KeyframedCurve<T> {
    fn default() -> Self {
        Self {
            keyframes: Vec::new(),
        }
    }
}

impl<T: Interpolate> KeyframedCurve<T> {
    /// Creates an empty curve.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a two-keyframe curve from `from` to `to` over `duration`
    /// seconds, eased by `timing_function`.
    #[must_use]
    pub fn transition(
        duration: f64,
        from: T,
        to: T,
        timing_function: Option<TimingFunction>,
    ) -> Self {
        Self::new()
            .with_keyframe(Keyframe::new(0.0, from, timing_function))
            .with_keyframe(Keyframe::new(duration, to, None))
    }

    /// Inserts a keyframe, keeping keyframes sorted by time. A keyframe whose
    /// time equals an existing one goes after it.
    pub fn add_keyframe(&mut self, keyframe: Keyframe<T>) {
        let at = self.keyframes.partition_point(|k| k.time <= keyframe.time);
        self.keyframes.insert(at, keyframe);
    }

    /// Builder form of [`add_keyframe`](Self::add_keyframe).
    #[must_use]
    pub fn with_keyframe(mut self, keyframe: Keyframe<T>) -> Self {
        self.add_keyframe(keyframe);
        self
    }

    /// Returns the keyframes in time order.
    #[inline]
    #[must_use]
    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    /// Returns the time span covered by the keyframes, in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    /// Returns the value at `t` seconds, holding the first and last values
    /// outside the keyframe range.
    ///
    /// # Panics
    ///
    /// Panics if the curve has no keyframes.
    #[must_use]
    pub fn value_at(&self, t: f64) -> T {
        let (Some(first), Some(last)) = (self.keyframes.first(), self.keyframes.last()) else {
            panic!("keyframed curve has no keyframes");
        };
        if t <= first.time {
            return first.value.clone();
        }
        if t >= last.time {
            return last.value.clone();
        }
        // First segment whose end lies after `t`.
        let i = self.keyframes.partition_point(|k| k.time <= t) - 1;
        let from = &self.keyframes[i];
        let to = &self.keyframes[i + 1];
        let span = to.time - from.time;
        let mut progress = if span > 0.0 {
            (t - from.time) / span
        } else {
            1.0
        };
        if let Some(tf) = &from.timing_function {
            progress = tf.value(progress);
        }
        T::interpolate(&from.value, &to.value, progress)
    }

    /// Calls `f` for each segment with its endpoints and eased progress
    /// range.
    fn segments(&self) -> impl Iterator<Item = (&Keyframe<T>, &Keyframe<T>, f64, f64)> {
        self.keyframes.windows(2).map(|pair| {
            let (min, max) = pair[0]
                .timing_function
                .as_ref()
                .map_or((0.0, 1.0), TimingFunction::range);
            (&pair[0], &pair[1], min, max)
        })
    }
}

impl TransformCurve {
    /// Bounds of `bounds` under every transform this curve can produce, or
    /// `None` if some segment cannot be bounded.
    #[must_use]
    pub fn animated_bounds_for_box(&self, bounds: &Box3d) -> Option<Box3d> {
        let mut out: Option<Box3d> = None;
        for (from, to, min, max) in self.segments() {
            let segment = TransformOperations::blended_bounds_for_box(
                bounds, &from.value, &to.value, min, max,
            )?;
            out = Some(out.map_or(segment, |acc| acc.union(&segment)));
        }
        Some(out.unwrap_or(*bounds))
    }

    /// Returns `true` if any keyframe can change scale.
    #[must_use]
    pub fn affects_scale(&self) -> bool {
        self.keyframes.iter().any(|k| k.value.affects_scale())
    }

    /// Returns `true` if every keyframe only translates.
    #[must_use]
    pub fn is_translation(&self) -> bool {
        self.keyframes.iter().all(|k| k.value.is_translation())
    }

    /// Largest axis scale reached anywhere on the curve, or `None` if it
    /// cannot be bounded.
    #[must_use]
    pub fn maximum_scale(&self) -> Option<f64> {
        let mut max_scale = 0.0_f64;
        for (from, to, min, max) in self.segments() {
            let segment = TransformOperations::maximum_scale(&from.value, &to.value, min, max)?;
            max_scale = max_scale.max(segment);
        }
        Some(max_scale)
    }

    /// Largest axis scale among the keyframes the curve moves towards.
    ///
    /// Playing forwards, that is every keyframe but the first; playing
    /// backwards, every keyframe but the last.
    #[must_use]
    pub fn maximum_target_scale(&self, forward: bool) -> Option<f64> {
        let targets = match (forward, self.keyframes.len()) {
            (_, 0) => &self.keyframes[..],
            (true, _) => &self.keyframes[1..],
            (false, n) => &self.keyframes[..n - 1],
        };
        let mut max_scale = 0.0_f64;
        for k in targets {
            let scale = TransformOperations::maximum_scale(&k.value, &k.value, 1.0, 1.0)?;
            max_scale = max_scale.max(scale);
        }
        Some(max_scale)
    }
}

impl FilterCurve {
    /// Returns `true` if any keyframe holds a filter that moves pixels.
    #[must_use]
    pub fn has_filter_that_moves_pixels(&self) -> bool {
        self.keyframes
            .iter()
            .any(|k| k.value.has_filter_that_moves_pixels())
    }
}
