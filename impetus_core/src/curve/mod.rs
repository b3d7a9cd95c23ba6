// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation curves: pure mappings from curve time (seconds) to a value.
//!
//! [`Curve`] is a closed sum over the supported curve kinds. Code that needs a
//! particular kind pattern-matches or uses the `as_*` accessors, which return
//! `None` on a kind mismatch.

mod keyframed;
mod scroll_offset;

pub use keyframed::{
    ColorCurve, FilterCurve, FloatCurve, Interpolate, Keyframe, KeyframedCurve, TransformCurve,
};
pub use scroll_offset::{DurationBehavior, ScrollOffsetCurve};

use crate::value::AnimatedValue;

/// Tag naming the kind of a [`Curve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CurveType {
    /// Scalar curve.
    Float,
    /// Color curve.
    Color,
    /// Transform curve.
    Transform,
    /// Filter curve.
    Filter,
    /// Scroll offset curve.
    ScrollOffset,
}

/// A curve of any supported kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Curve {
    /// Scalar (opacity) keyframes.
    Float(FloatCurve),
    /// Color keyframes.
    Color(ColorCurve),
    /// Transform keyframes.
    Transform(TransformCurve),
    /// Filter keyframes.
    Filter(FilterCurve),
    /// Retargetable scroll curve.
    ScrollOffset(ScrollOffsetCurve),
}

macro_rules! accessors {
    ($($variant:ident, $curve:ty, $as:ident, $as_mut:ident;)*) => {
        $(
            #[doc = concat!("Returns the curve as a `", stringify!($curve), "`, if it is one.")]
            #[inline]
            #[must_use]
            pub const fn $as(&self) -> Option<&$curve> {
                match self {
                    Self::$variant(c) => Some(c),
                    _ => None,
                }
            }

            #[doc = concat!("Mutable form of [`", stringify!($as), "`](Self::", stringify!($as), ").")]
            #[inline]
            #[must_use]
            pub const fn $as_mut(&mut self) -> Option<&mut $curve> {
                match self {
                    Self::$variant(c) => Some(c),
                    _ => None,
                }
            }
        )*
    };
}

impl Curve {
    /// Returns the kind tag.
    #[must_use]
    pub const fn curve_type(&self) -> CurveType {
        match self {
            Self::Float(_) => CurveType::Float,
            Self::Color(_) => CurveType::Color,
            Self::Transform(_) => CurveType::Transform,
            Self::Filter(_) => CurveType::Filter,
            Self::ScrollOffset(_) => CurveType::ScrollOffset,
        }
    }

    /// Duration in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        match self {
            Self::Float(c) => c.duration(),
            Self::Color(c) => c.duration(),
            Self::Transform(c) => c.duration(),
            Self::Filter(c) => c.duration(),
            Self::ScrollOffset(c) => c.duration(),
        }
    }

    /// Returns `true` for a keyframed curve without keyframes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Float(c) => c.keyframes().is_empty(),
            Self::Color(c) => c.keyframes().is_empty(),
            Self::Transform(c) => c.keyframes().is_empty(),
            Self::Filter(c) => c.keyframes().is_empty(),
            Self::ScrollOffset(_) => false,
        }
    }

    /// Evaluates the curve at `t` seconds. Transform curves are composed into
    /// a single matrix.
    #[must_use]
    pub fn value_at(&self, t: f64) -> AnimatedValue {
        match self {
            Self::Float(c) => AnimatedValue::Opacity(c.value_at(t)),
            Self::Color(c) => AnimatedValue::BackgroundColor(c.value_at(t)),
            Self::Transform(c) => AnimatedValue::Transform(c.value_at(t).apply()),
            Self::Filter(c) => AnimatedValue::Filter(c.value_at(t)),
            Self::ScrollOffset(c) => AnimatedValue::ScrollOffset(c.value_at(t)),
        }
    }

    accessors! {
        Float, FloatCurve, as_float, as_float_mut;
        Color, ColorCurve, as_color, as_color_mut;
        Transform, TransformCurve, as_transform, as_transform_mut;
        Filter, FilterCurve, as_filter, as_filter_mut;
        ScrollOffset, ScrollOffsetCurve, as_scroll_offset, as_scroll_offset_mut;
    }
}

impl From<FloatCurve> for Curve {
    fn from(c: FloatCurve) -> Self {
        Self::Float(c)
    }
}

impl From<ColorCurve> for Curve {
    fn from(c: ColorCurve) -> Self {
        Self::Color(c)
    }
}

impl From<TransformCurve> for Curve {
    fn from(c: TransformCurve) -> Self {
        Self::Transform(c)
    }
}

impl From<FilterCurve> for Curve {
    fn from(c: FilterCurve) -> Self {
        Self::Filter(c)
    }
}

impl From<ScrollOffsetCurve> for Curve {
    fn from(c: ScrollOffsetCurve) -> Self {
        Self::ScrollOffset(c)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Vec2;

    use super::*;
    use crate::transform::Transform3d;
    use crate::transform_operations::TransformOperations;

    #[test]
    fn accessors_match_kind() {
        let mut curve = Curve::from(FloatCurve::transition(1.0, 0.0, 1.0, None));
        assert_eq!(curve.curve_type(), CurveType::Float);
        assert!(curve.as_float().is_some());
        assert!(curve.as_transform().is_none());
        assert!(curve.as_scroll_offset_mut().is_none());
        assert!(curve.as_float_mut().is_some());
    }

    #[test]
    fn transform_values_are_composed() {
        let curve = Curve::from(TransformCurve::transition(
            2.0,
            TransformOperations::new().translate(0.0, 0.0, 0.0),
            TransformOperations::new().translate(10.0, 20.0, 0.0),
            None,
        ));
        assert_eq!(curve.duration(), 2.0);
        assert_eq!(
            curve.value_at(1.0),
            AnimatedValue::Transform(Transform3d::from_translation(5.0, 10.0, 0.0))
        );
    }

    #[test]
    fn scroll_curve_through_sum_type() {
        let mut curve = Curve::from(ScrollOffsetCurve::new(
            Vec2::new(0.0, 100.0),
            DurationBehavior::Constant,
        ));
        if let Some(c) = curve.as_scroll_offset_mut() {
            c.set_initial_value(Vec2::ZERO);
        }
        assert_eq!(curve.duration(), 9.0 / 60.0);
        assert_eq!(
            curve.value_at(1.0),
            AnimatedValue::ScrollOffset(Vec2::new(0.0, 100.0))
        );
    }
}
