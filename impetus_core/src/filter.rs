// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Filter operation lists, the keyframe value type of filter curves.

use alloc::vec::Vec;
use core::mem::discriminant;

use kurbo::Vec2;

use crate::value::Color;

/// One filter primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterOperation {
    /// Desaturate by `amount` (0 = unchanged, 1 = fully gray).
    Grayscale(f32),
    /// Sepia tone by `amount`.
    Sepia(f32),
    /// Saturation multiplier.
    Saturate(f32),
    /// Hue rotation in degrees.
    HueRotate(f32),
    /// Color inversion by `amount`.
    Invert(f32),
    /// Brightness multiplier.
    Brightness(f32),
    /// Contrast multiplier.
    Contrast(f32),
    /// Opacity multiplier.
    Opacity(f32),
    /// Gaussian blur with the given standard deviation.
    Blur(f32),
    /// Offset, blurred copy of the content's alpha.
    DropShadow {
        /// Shadow offset.
        offset: Vec2,
        /// Blur standard deviation.
        std_deviation: f32,
        /// Shadow color.
        color: Color,
    },
}

impl FilterOperation {
    /// The no-op filter of the same kind as `self`.
    #[must_use]
    pub fn identity_like(&self) -> Self {
        match self {
            Self::Grayscale(_) => Self::Grayscale(0.0),
            Self::Sepia(_) => Self::Sepia(0.0),
            Self::Saturate(_) => Self::Saturate(1.0),
            Self::HueRotate(_) => Self::HueRotate(0.0),
            Self::Invert(_) => Self::Invert(0.0),
            Self::Brightness(_) => Self::Brightness(1.0),
            Self::Contrast(_) => Self::Contrast(1.0),
            Self::Opacity(_) => Self::Opacity(1.0),
            Self::Blur(_) => Self::Blur(0.0),
            Self::DropShadow { .. } => Self::DropShadow {
                offset: Vec2::ZERO,
                std_deviation: 0.0,
                color: Color::TRANSPARENT,
            },
        }
    }

    /// Returns `true` if the filter samples outside each pixel's footprint.
    #[must_use]
    pub const fn moves_pixels(&self) -> bool {
        matches!(self, Self::Blur(_) | Self::DropShadow { .. })
    }

    /// Interpolates two filters of the same kind. Either side may be absent,
    /// standing for the identity of the other side's kind.
    ///
    /// # Panics
    ///
    /// Panics if both sides are absent or the kinds differ.
    #[must_use]
    pub fn blend(from: Option<&Self>, to: Option<&Self>, progress: f64) -> Self {
        let (from, to) = match (from, to) {
            (Some(f), Some(t)) => (*f, *t),
            (Some(f), None) => (*f, f.identity_like()),
            (None, Some(t)) => (t.identity_like(), *t),
            (None, None) => panic!("filter blend needs at least one operand"),
        };
        assert!(
            discriminant(&from) == discriminant(&to),
            "filter blend across different kinds"
        );
        #[expect(
            clippy::cast_possible_truncation,
            reason = "filter amounts are stored as f32"
        )]
        let lerp = |a: f32, b: f32| (f64::from(a) + (f64::from(b) - f64::from(a)) * progress) as f32;
        let unit = |v: f32| v.clamp(0.0, 1.0);
        let non_negative = |v: f32| v.max(0.0);
        match (from, to) {
            (Self::Grayscale(a), Self::Grayscale(b)) => Self::Grayscale(unit(lerp(a, b))),
            (Self::Sepia(a), Self::Sepia(b)) => Self::Sepia(unit(lerp(a, b))),
            (Self::Saturate(a), Self::Saturate(b)) => Self::Saturate(non_negative(lerp(a, b))),
            (Self::HueRotate(a), Self::HueRotate(b)) => Self::HueRotate(lerp(a, b)),
            (Self::Invert(a), Self::Invert(b)) => Self::Invert(unit(lerp(a, b))),
            (Self::Brightness(a), Self::Brightness(b)) => {
                Self::Brightness(non_negative(lerp(a, b)))
            }
            (Self::Contrast(a), Self::Contrast(b)) => Self::Contrast(non_negative(lerp(a, b))),
            (Self::Opacity(a), Self::Opacity(b)) => Self::Opacity(unit(lerp(a, b))),
            (Self::Blur(a), Self::Blur(b)) => Self::Blur(non_negative(lerp(a, b))),
            (
                Self::DropShadow {
                    offset: o0,
                    std_deviation: s0,
                    color: c0,
                },
                Self::DropShadow {
                    offset,
                    std_deviation,
                    color,
                },
            ) => Self::DropShadow {
                offset: o0.lerp(offset, progress),
                std_deviation: non_negative(lerp(s0, std_deviation)),
                color: Color::blend(&c0, &color, progress),
            },
            _ => to,
        }
    }
}

/// An ordered list of filters, applied left to right.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterOperations {
    ops: Vec<FilterOperation>,
}

impl FilterOperations {
    /// Creates an empty (no-op) list.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Creates a list from operations.
    #[inline]
    #[must_use]
    pub fn from_ops(ops: Vec<FilterOperation>) -> Self {
        Self { ops }
    }

    /// Appends a filter.
    #[must_use]
    pub fn with(mut self, op: FilterOperation) -> Self {
        self.ops.push(op);
        self
    }

    /// Returns the filters.
    #[inline]
    #[must_use]
    pub fn ops(&self) -> &[FilterOperation] {
        &self.ops
    }

    /// Returns `true` if the list is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Returns `true` if any filter samples outside each pixel's footprint,
    /// which grows the painted bounds.
    #[must_use]
    pub fn has_filter_that_moves_pixels(&self) -> bool {
        self.ops.iter().any(FilterOperation::moves_pixels)
    }

    /// Interpolates from `from` to `to`.
    ///
    /// The common prefix must have matching kinds; the longer list's tail is
    /// blended against identity filters. Mismatched kinds yield `to`
    /// unchanged.
    #[must_use]
    pub fn blend(from: &Self, to: &Self, progress: f64) -> Self {
        let shared = from.ops.len().min(to.ops.len());
        let kinds_match = from.ops[..shared]
            .iter()
            .zip(&to.ops[..shared])
            .all(|(a, b)| discriminant(a) == discriminant(b));
        if !kinds_match {
            return to.clone();
        }
        let longest = from.ops.len().max(to.ops.len());
        let ops = (0..longest)
            .map(|i| FilterOperation::blend(from.ops.get(i), to.ops.get(i), progress))
            .collect();
        Self { ops }
    }
}
