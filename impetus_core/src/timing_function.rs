// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing functions mapping normalized progress to eased progress.
//!
//! A [`TimingFunction`] takes `x ∈ [0, 1]` (the fraction of a keyframe
//! segment that has elapsed) and returns the eased progress. Cubic béziers may
//! overshoot `[0, 1]`; [`TimingFunction::range`] reports the actual output
//! bounds so that bounds queries can account for it.

const NEWTON_ITERATIONS: u8 = 8;
const BISECTION_ITERATIONS: u8 = 64;
const SOLVE_EPSILON: f64 = 1e-7;

/// A unit cubic bézier with endpoints fixed at `(0, 0)` and `(1, 1)`.
///
/// Stored in polynomial form (`a t³ + b t² + c t` per axis) so that sampling
/// and differentiation are a few multiplies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    ax: f64,
    bx: f64,
    cx: f64,
    ay: f64,
    by: f64,
    cy: f64,
}

impl CubicBezier {
    /// Creates a curve from its two inner control points.
    ///
    /// `x1` and `x2` are clamped to `[0, 1]` so that the curve stays a
    /// function of time.
    #[must_use]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let x1 = x1.clamp(0.0, 1.0);
        let x2 = x2.clamp(0.0, 1.0);
        let cx = 3.0 * x1;
        let bx = 3.0 * (x2 - x1) - cx;
        let cy = 3.0 * y1;
        let by = 3.0 * (y2 - y1) - cy;
        Self {
            x1,
            y1,
            x2,
            y2,
            ax: 1.0 - cx - bx,
            bx,
            cx,
            ay: 1.0 - cy - by,
            by,
            cy,
        }
    }

    /// Returns the control points as `(x1, y1, x2, y2)`.
    #[inline]
    #[must_use]
    pub const fn control_points(&self) -> (f64, f64, f64, f64) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    #[inline]
    fn sample_x(&self, t: f64) -> f64 {
        ((self.ax * t + self.bx) * t + self.cx) * t
    }

    #[inline]
    fn sample_y(&self, t: f64) -> f64 {
        ((self.ay * t + self.by) * t + self.cy) * t
    }

    #[inline]
    fn derivative_x(&self, t: f64) -> f64 {
        (3.0 * self.ax * t + 2.0 * self.bx) * t + self.cx
    }

    #[inline]
    fn derivative_y(&self, t: f64) -> f64 {
        (3.0 * self.ay * t + 2.0 * self.by) * t + self.cy
    }

    /// Finds the curve parameter `t` whose x coordinate is `x`.
    fn solve_t(&self, x: f64) -> f64 {
        // Newton first; it converges in a handful of steps for sane curves.
        let mut t = x;
        for _ in 0..NEWTON_ITERATIONS {
            let err = self.sample_x(t) - x;
            if libm::fabs(err) < SOLVE_EPSILON {
                return t;
            }
            let dx = self.derivative_x(t);
            if libm::fabs(dx) < 1e-6 {
                break;
            }
            t -= err / dx;
        }

        // Bisection fallback; x(t) is monotonic on [0, 1].
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        t = x;
        for _ in 0..BISECTION_ITERATIONS {
            let x2 = self.sample_x(t);
            if libm::fabs(x2 - x) < SOLVE_EPSILON {
                break;
            }
            if x > x2 {
                lo = t;
            } else {
                hi = t;
            }
            t = lo + (hi - lo) / 2.0;
        }
        t
    }

    /// Returns the eased progress at `x`.
    #[must_use]
    pub fn solve(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        if x == 0.0 || x == 1.0 {
            return x;
        }
        self.sample_y(self.solve_t(x))
    }

    /// Returns dy/dx at `x`.
    #[must_use]
    pub fn slope(&self, x: f64) -> f64 {
        let t = self.solve_t(x.clamp(0.0, 1.0));
        let dx = self.derivative_x(t);
        if libm::fabs(dx) < 1e-12 {
            return 0.0;
        }
        self.derivative_y(t) / dx
    }

    /// Returns the minimum and maximum of y over `t ∈ [0, 1]`.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        let mut min = 0.0_f64;
        let mut max = 1.0_f64;
        let mut consider = |t: f64| {
            if t > 0.0 && t < 1.0 {
                let y = self.sample_y(t);
                min = min.min(y);
                max = max.max(y);
            }
        };

        // dy/dt = 3a t² + 2b t + c
        let a = 3.0 * self.ay;
        let b = 2.0 * self.by;
        let c = self.cy;
        if libm::fabs(a) < 1e-12 {
            if libm::fabs(b) > 1e-12 {
                consider(-c / b);
            }
        } else {
            let disc = b * b - 4.0 * a * c;
            if disc >= 0.0 {
                let root = libm::sqrt(disc);
                consider((-b + root) / (2.0 * a));
                consider((-b - root) / (2.0 * a));
            }
        }
        (min, max)
    }
}

/// Where a step function jumps within each interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepPosition {
    /// Jump at the start of each interval (`steps(n, start)`).
    Start,
    /// Jump halfway through each interval.
    Middle,
    /// Jump at the end of each interval (`steps(n, end)`).
    End,
}

impl StepPosition {
    const fn offset(self) -> f64 {
        match self {
            Self::Start => 1.0,
            Self::Middle => 0.5,
            Self::End => 0.0,
        }
    }
}

/// An easing curve applied to a keyframe segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimingFunction {
    /// Identity easing.
    Linear,
    /// A cubic bézier easing.
    CubicBezier(CubicBezier),
    /// A step function with `steps` equal intervals.
    Steps {
        /// Number of intervals; always at least one.
        steps: u32,
        /// Where in each interval the output jumps.
        position: StepPosition,
    },
}

impl TimingFunction {
    /// CSS `ease`.
    #[must_use]
    pub fn ease() -> Self {
        Self::cubic_bezier(0.25, 0.1, 0.25, 1.0)
    }

    /// CSS `ease-in`.
    #[must_use]
    pub fn ease_in() -> Self {
        Self::cubic_bezier(0.42, 0.0, 1.0, 1.0)
    }

    /// CSS `ease-out`.
    #[must_use]
    pub fn ease_out() -> Self {
        Self::cubic_bezier(0.0, 0.0, 0.58, 1.0)
    }

    /// CSS `ease-in-out`.
    #[must_use]
    pub fn ease_in_out() -> Self {
        Self::cubic_bezier(0.42, 0.0, 0.58, 1.0)
    }

    /// An arbitrary cubic bézier.
    #[must_use]
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::CubicBezier(CubicBezier::new(x1, y1, x2, y2))
    }

    /// A step function.
    ///
    /// # Panics
    ///
    /// Panics if `steps` is zero.
    #[must_use]
    pub fn steps(steps: u32, position: StepPosition) -> Self {
        assert!(steps > 0, "step timing function needs at least one step");
        Self::Steps { steps, position }
    }

    /// Returns the eased progress for `x ∈ [0, 1]`.
    #[must_use]
    pub fn value(&self, x: f64) -> f64 {
        match self {
            Self::Linear => x,
            Self::CubicBezier(b) => b.solve(x),
            Self::Steps { steps, position } => {
                let n = f64::from(*steps);
                let x = x.clamp(0.0, 1.0);
                (libm::floor(n * x + position.offset()) / n).clamp(0.0, 1.0)
            }
        }
    }

    /// Returns the rate of change of eased progress at `x`.
    #[must_use]
    pub fn velocity(&self, x: f64) -> f64 {
        match self {
            Self::Linear => 1.0,
            Self::CubicBezier(b) => b.slope(x),
            Self::Steps { .. } => 0.0,
        }
    }

    /// Returns the `(min, max)` output over `x ∈ [0, 1]`.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Linear | Self::Steps { .. } => (0.0, 1.0),
            Self::CubicBezier(b) => b.range(),
        }
    }
}

impl Default for TimingFunction {
    fn default() -> Self {
        Self::Linear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        libm::fabs(a - b) < 1e-4
    }

    #[test]
    fn endpoints_are_fixed() {
        for tf in [
            TimingFunction::ease(),
            TimingFunction::ease_in(),
            TimingFunction::ease_out(),
            TimingFunction::ease_in_out(),
        ] {
            assert_eq!(tf.value(0.0), 0.0, "{tf:?} at 0");
            assert_eq!(tf.value(1.0), 1.0, "{tf:?} at 1");
        }
    }

    #[test]
    fn ease_in_out_is_symmetric() {
        let tf = TimingFunction::ease_in_out();
        assert!(close(tf.value(0.5), 0.5), "midpoint: {}", tf.value(0.5));
        assert!(close(tf.value(0.25) + tf.value(0.75), 1.0));
    }

    #[test]
    fn ease_matches_reference_samples() {
        let tf = TimingFunction::ease();
        // Reference values for cubic-bezier(0.25, 0.1, 0.25, 1).
        assert!(close(tf.value(0.25), 0.4085), "got {}", tf.value(0.25));
        assert!(close(tf.value(0.5), 0.8024), "got {}", tf.value(0.5));
    }

    #[test]
    fn monotonic_curve_range_is_unit() {
        assert_eq!(TimingFunction::ease().range(), (0.0, 1.0));
        assert_eq!(TimingFunction::Linear.range(), (0.0, 1.0));
    }

    #[test]
    fn overshooting_curve_reports_range() {
        let tf = TimingFunction::cubic_bezier(0.5, -1.0, 0.5, 2.0);
        let (min, max) = tf.range();
        assert!(min < 0.0, "min {min}");
        assert!(max > 1.0, "max {max}");
        // Curve is point-symmetric around (0.5, 0.5).
        assert!(close(min, 1.0 - max), "min {min} max {max}");
    }

    #[test]
    fn steps_positions() {
        let end = TimingFunction::steps(4, StepPosition::End);
        assert_eq!(end.value(0.0), 0.0);
        assert_eq!(end.value(0.3), 0.25);
        assert_eq!(end.value(1.0), 1.0);

        let start = TimingFunction::steps(4, StepPosition::Start);
        assert_eq!(start.value(0.0), 0.25);
        assert_eq!(start.value(0.3), 0.5);
        assert_eq!(start.value(1.0), 1.0);

        let middle = TimingFunction::steps(2, StepPosition::Middle);
        assert_eq!(middle.value(0.2), 0.5);
        assert_eq!(middle.value(0.8), 1.0);
    }

    #[test]
    #[should_panic(expected = "at least one step")]
    fn zero_steps_panics() {
        let _ = TimingFunction::steps(0, StepPosition::End);
    }

    #[test]
    fn velocity_of_linear_and_bezier() {
        assert_eq!(TimingFunction::Linear.velocity(0.3), 1.0);
        let ease_out = TimingFunction::ease_out();
        assert!(
            ease_out.velocity(0.0) > ease_out.velocity(0.9),
            "ease-out decelerates"
        );
    }
}
