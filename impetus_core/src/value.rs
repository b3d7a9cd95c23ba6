// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animated value types.

use kurbo::Vec2;

use crate::filter::FilterOperations;
use crate::transform::Transform3d;

/// An RGBA color with straight (non-premultiplied) alpha, components in
/// `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);

    /// Opaque white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    /// Creates a color from its components.
    #[inline]
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Interpolates in premultiplied space so that a fade towards a
    /// transparent color does not darken.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "color channels are stored as f32"
    )]
    pub fn blend(from: &Self, to: &Self, progress: f64) -> Self {
        let lerp = |a: f32, b: f32| f64::from(a) + (f64::from(b) - f64::from(a)) * progress;
        let alpha = lerp(from.a, to.a).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return Self::TRANSPARENT;
        }
        let channel = |c0: f32, c1: f32| {
            let pre = lerp(c0 * from.a, c1 * to.a);
            (pre / alpha).clamp(0.0, 1.0) as f32
        };
        Self {
            r: channel(from.r, to.r),
            g: channel(from.g, to.g),
            b: channel(from.b, to.b),
            a: alpha as f32,
        }
    }
}

/// One computed value of an animated property.
#[derive(Clone, Debug, PartialEq)]
pub enum AnimatedValue {
    /// An opacity in `[0, 1]`.
    Opacity(f32),
    /// A composed transform.
    Transform(Transform3d),
    /// A filter list.
    Filter(FilterOperations),
    /// A scroll offset.
    ScrollOffset(Vec2),
    /// A background color.
    BackgroundColor(Color),
}

impl AnimatedValue {
    /// Returns the opacity, if this is one.
    #[inline]
    #[must_use]
    pub const fn as_opacity(&self) -> Option<f32> {
        match self {
            Self::Opacity(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the transform, if this is one.
    #[inline]
    #[must_use]
    pub const fn as_transform(&self) -> Option<&Transform3d> {
        match self {
            Self::Transform(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the filters, if this is a filter value.
    #[inline]
    #[must_use]
    pub const fn as_filter(&self) -> Option<&FilterOperations> {
        match self {
            Self::Filter(f) => Some(f),
            _ => None,
        }
    }

    /// Returns the scroll offset, if this is one.
    #[inline]
    #[must_use]
    pub const fn as_scroll_offset(&self) -> Option<Vec2> {
        match self {
            Self::ScrollOffset(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the color, if this is one.
    #[inline]
    #[must_use]
    pub const fn as_background_color(&self) -> Option<Color> {
        match self {
            Self::BackgroundColor(c) => Some(*c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_colors_blend_linearly() {
        let mid = Color::blend(&Color::BLACK, &Color::WHITE, 0.5);
        assert_eq!(mid, Color::rgba(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn fading_to_transparent_keeps_hue() {
        let red = Color::rgba(1.0, 0.0, 0.0, 1.0);
        let mid = Color::blend(&red, &Color::TRANSPARENT, 0.5);
        assert_eq!(mid, Color::rgba(1.0, 0.0, 0.0, 0.5));
        assert_eq!(
            Color::blend(&red, &Color::TRANSPARENT, 1.0),
            Color::TRANSPARENT
        );
    }

    #[test]
    fn accessors_are_exclusive() {
        let v = AnimatedValue::Opacity(0.25);
        assert_eq!(v.as_opacity(), Some(0.25));
        assert!(v.as_transform().is_none());
        assert!(v.as_scroll_offset().is_none());
    }
}
