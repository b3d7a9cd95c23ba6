// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform operation lists, the keyframe value type of transform curves.
//!
//! A [`TransformOperations`] list keeps its primitive operations so that two
//! lists with matching shapes interpolate per component (a translation
//! interpolates its offsets, a rotation its angle) instead of per matrix
//! entry. Lists whose shapes differ switch discretely at the midpoint.

use alloc::vec::Vec;
use core::mem::discriminant;

use crate::transform::{Box3d, Transform3d};

/// One primitive transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransformOperation {
    /// No-op placeholder; matches any other operation when blending.
    Identity,
    /// Translation by `(x, y, z)`.
    Translate {
        /// Offset along x.
        x: f64,
        /// Offset along y.
        y: f64,
        /// Offset along z.
        z: f64,
    },
    /// Rotation of `degrees` around `axis`.
    Rotate {
        /// Rotation axis; need not be normalized.
        axis: [f64; 3],
        /// Angle in degrees.
        degrees: f64,
    },
    /// Non-uniform scale.
    Scale {
        /// Factor along x.
        x: f64,
        /// Factor along y.
        y: f64,
        /// Factor along z.
        z: f64,
    },
    /// 2-D skew, angles in degrees.
    Skew {
        /// Skew angle along x.
        x: f64,
        /// Skew angle along y.
        y: f64,
    },
    /// Perspective with the viewer at `depth`.
    Perspective {
        /// Distance to the viewer.
        depth: f64,
    },
    /// An arbitrary matrix; only blends with an identical matrix.
    Matrix(Transform3d),
}

impl TransformOperation {
    /// Returns the matrix for this operation.
    #[must_use]
    pub fn to_matrix(&self) -> Transform3d {
        match *self {
            Self::Identity => Transform3d::IDENTITY,
            Self::Translate { x, y, z } => Transform3d::from_translation(x, y, z),
            Self::Rotate { axis, degrees } => Transform3d::from_axis_angle(axis, degrees),
            Self::Scale { x, y, z } => Transform3d::from_scale(x, y, z),
            Self::Skew { x, y } => Transform3d::from_skew(x, y),
            Self::Perspective { depth } => Transform3d::from_perspective(depth),
            Self::Matrix(m) => m,
        }
    }

    fn is_identity(&self) -> bool {
        match *self {
            Self::Identity => true,
            Self::Translate { x, y, z } => x == 0.0 && y == 0.0 && z == 0.0,
            Self::Rotate { degrees, .. } => degrees == 0.0,
            Self::Scale { x, y, z } => x == 1.0 && y == 1.0 && z == 1.0,
            Self::Skew { x, y } => x == 0.0 && y == 0.0,
            Self::Perspective { .. } => false,
            Self::Matrix(m) => m == Transform3d::IDENTITY,
        }
    }

    /// The identity element of the same kind as `self`.
    fn identity_like(&self) -> Self {
        match *self {
            Self::Identity | Self::Perspective { .. } | Self::Matrix(_) => Self::Identity,
            Self::Translate { .. } => Self::Translate {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
            Self::Rotate { axis, .. } => Self::Rotate { axis, degrees: 0.0 },
            Self::Scale { .. } => Self::Scale {
                x: 1.0,
                y: 1.0,
                z: 1.0,
            },
            Self::Skew { .. } => Self::Skew { x: 0.0, y: 0.0 },
        }
    }

    /// Interpolates between two operations of the same kind.
    ///
    /// Returns `None` when the pair has no component-wise interpolation.
    fn blend(from: &Self, to: &Self, progress: f64) -> Option<Self> {
        let (from, to) = match (from, to) {
            (Self::Identity, Self::Identity) => return Some(Self::Identity),
            (Self::Identity, to) => (to.identity_like(), *to),
            (from, Self::Identity) => (*from, from.identity_like()),
            (from, to) => (*from, *to),
        };
        let lerp = |a: f64, b: f64| a + (b - a) * progress;
        match (from, to) {
            (Self::Translate { x: x0, y: y0, z: z0 }, Self::Translate { x, y, z }) => {
                Some(Self::Translate {
                    x: lerp(x0, x),
                    y: lerp(y0, y),
                    z: lerp(z0, z),
                })
            }
            (Self::Scale { x: x0, y: y0, z: z0 }, Self::Scale { x, y, z }) => Some(Self::Scale {
                x: lerp(x0, x),
                y: lerp(y0, y),
                z: lerp(z0, z),
            }),
            (
                Self::Rotate {
                    axis: a0,
                    degrees: d0,
                },
                Self::Rotate { axis, degrees },
            ) => {
                if !same_direction(a0, axis) {
                    return None;
                }
                Some(Self::Rotate {
                    axis,
                    degrees: lerp(d0, degrees),
                })
            }
            (Self::Skew { x: x0, y: y0 }, Self::Skew { x, y }) => Some(Self::Skew {
                x: lerp(x0, x),
                y: lerp(y0, y),
            }),
            (Self::Perspective { depth: d0 }, Self::Perspective { depth }) => {
                Some(Self::Perspective {
                    depth: lerp(d0, depth),
                })
            }
            (Self::Matrix(a), Self::Matrix(b)) if a == b => Some(Self::Matrix(a)),
            _ => None,
        }
    }
}

fn same_direction(a: [f64; 3], b: [f64; 3]) -> bool {
    let cross = [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ];
    let dot = a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
    cross.iter().all(|c| libm::fabs(*c) < 1e-9) && dot > 0.0
}

/// An ordered list of transform operations, applied left to right.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformOperations {
    ops: Vec<TransformOperation>,
}

impl TransformOperations {
    /// Creates an empty (identity) list.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Creates a list from operations.
    #[inline]
    #[must_use]
    pub fn from_ops(ops: Vec<TransformOperation>) -> Self {
        Self { ops }
    }

    /// Appends an operation.
    pub fn push(&mut self, op: TransformOperation) {
        self.ops.push(op);
    }

    /// Appends a translation.
    #[must_use]
    pub fn translate(mut self, x: f64, y: f64, z: f64) -> Self {
        self.push(TransformOperation::Translate { x, y, z });
        self
    }

    /// Appends a scale.
    #[must_use]
    pub fn scale(mut self, x: f64, y: f64, z: f64) -> Self {
        self.push(TransformOperation::Scale { x, y, z });
        self
    }

    /// Appends a rotation.
    #[must_use]
    pub fn rotate(mut self, axis: [f64; 3], degrees: f64) -> Self {
        self.push(TransformOperation::Rotate { axis, degrees });
        self
    }

    /// Appends a perspective.
    #[must_use]
    pub fn perspective(mut self, depth: f64) -> Self {
        self.push(TransformOperation::Perspective { depth });
        self
    }

    /// Returns the operations.
    #[inline]
    #[must_use]
    pub fn ops(&self) -> &[TransformOperation] {
        &self.ops
    }

    /// Returns `true` if every operation is a no-op.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(TransformOperation::is_identity)
    }

    /// Composes the list into a single matrix.
    #[must_use]
    pub fn apply(&self) -> Transform3d {
        self.ops
            .iter()
            .fold(Transform3d::IDENTITY, |acc, op| acc * op.to_matrix())
    }

    /// Whether `self` and `other` can be interpolated operation by operation.
    #[must_use]
    pub fn matches_shape(&self, other: &Self) -> bool {
        if self.is_identity() || other.is_identity() {
            return true;
        }
        self.ops.len() == other.ops.len()
            && self.ops.iter().zip(&other.ops).all(|(a, b)| {
                discriminant(a) == discriminant(b) || a.is_identity() || b.is_identity()
            })
    }

    /// Operation pairs for a shape-matching blend; `None` if shapes differ.
    fn paired<'a>(
        from: &'a Self,
        to: &'a Self,
    ) -> Option<impl Iterator<Item = (&'a TransformOperation, &'a TransformOperation)>> {
        if !from.matches_shape(to) {
            return None;
        }
        let len = from.ops.len().max(to.ops.len());
        Some((0..len).map(move |i| {
            (
                from.ops.get(i).unwrap_or(&TransformOperation::Identity),
                to.ops.get(i).unwrap_or(&TransformOperation::Identity),
            )
        }))
    }

    fn try_blend(from: &Self, to: &Self, progress: f64) -> Option<Self> {
        let ops = Self::paired(from, to)?
            .map(|(a, b)| TransformOperation::blend(a, b, progress))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { ops })
    }

    /// Interpolates from `from` to `to`.
    ///
    /// Lists without a per-operation interpolation switch from `from` to `to`
    /// at progress 0.5.
    #[must_use]
    pub fn blend(from: &Self, to: &Self, progress: f64) -> Self {
        Self::try_blend(from, to, progress).unwrap_or_else(|| {
            if progress < 0.5 {
                from.clone()
            } else {
                to.clone()
            }
        })
    }

    /// Returns `true` if any operation can change scale.
    #[must_use]
    pub fn affects_scale(&self) -> bool {
        self.ops.iter().any(|op| match op {
            TransformOperation::Scale { .. } => true,
            TransformOperation::Matrix(m) => !m.is_identity_or_translation(),
            _ => false,
        })
    }

    /// Returns `true` if the list only translates.
    #[must_use]
    pub fn is_translation(&self) -> bool {
        self.ops.iter().all(|op| match op {
            TransformOperation::Identity | TransformOperation::Translate { .. } => true,
            TransformOperation::Matrix(m) => m.is_identity_or_translation(),
            other => other.is_identity(),
        })
    }

    /// Bounds swept by `bounds` while blending from `from` to `to` with
    /// progress between `min_progress` and `max_progress`.
    ///
    /// Only translations and scales are supported; anything else returns
    /// `None`.
    #[must_use]
    pub fn blended_bounds_for_box(
        bounds: &Box3d,
        from: &Self,
        to: &Self,
        min_progress: f64,
        max_progress: f64,
    ) -> Option<Box3d> {
        let pairs: Vec<_> = Self::paired(from, to)?.collect();
        let mut out = *bounds;
        // The operation nearest the content is applied first.
        for (a, b) in pairs.into_iter().rev() {
            let supported = |op: &TransformOperation| {
                matches!(
                    op,
                    TransformOperation::Identity
                        | TransformOperation::Translate { .. }
                        | TransformOperation::Scale { .. }
                )
            };
            if !supported(a) || !supported(b) {
                return None;
            }
            let at_min = TransformOperation::blend(a, b, min_progress)?;
            let at_max = TransformOperation::blend(a, b, max_progress)?;
            out = out
                .transformed(&at_min.to_matrix())
                .union(&out.transformed(&at_max.to_matrix()));
        }
        Some(out)
    }

    /// Largest axis scale reached while blending from `from` to `to` with
    /// progress between `min_progress` and `max_progress`.
    ///
    /// Returns `None` when the scale cannot be bounded (skew, perspective,
    /// matrices, or lists that switch discretely).
    #[must_use]
    pub fn maximum_scale(
        from: &Self,
        to: &Self,
        min_progress: f64,
        max_progress: f64,
    ) -> Option<f64> {
        let pairs: Vec<_> = Self::paired(from, to)?.collect();
        let mut max_scale = 0.0_f64;
        for progress in [min_progress, max_progress] {
            let mut scale = [1.0_f64; 3];
            for (a, b) in &pairs {
                match TransformOperation::blend(a, b, progress)? {
                    TransformOperation::Identity
                    | TransformOperation::Translate { .. }
                    | TransformOperation::Rotate { .. } => {}
                    TransformOperation::Scale { x, y, z } => {
                        scale[0] *= x;
                        scale[1] *= y;
                        scale[2] *= z;
                    }
                    TransformOperation::Skew { .. }
                    | TransformOperation::Perspective { .. }
                    | TransformOperation::Matrix(_) => return None,
                }
            }
            for s in scale {
                max_scale = max_scale.max(libm::fabs(s));
            }
        }
        Some(max_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_blends_from_identity() {
        let to = TransformOperations::new().scale(2.0, 3.0, 4.0);
        let mid = TransformOperations::blend(&TransformOperations::new(), &to, 0.5);
        assert_eq!(mid, TransformOperations::new().scale(1.5, 2.0, 2.5));
    }

    #[test]
    fn matching_lists_blend_per_operation() {
        let from = TransformOperations::new()
            .translate(0.0, 0.0, 0.0)
            .rotate([0.0, 0.0, 1.0], 0.0);
        let to = TransformOperations::new()
            .translate(10.0, 20.0, 0.0)
            .rotate([0.0, 0.0, 2.0], 90.0);
        let mid = TransformOperations::blend(&from, &to, 0.5);
        assert_eq!(
            mid.ops(),
            &[
                TransformOperation::Translate {
                    x: 5.0,
                    y: 10.0,
                    z: 0.0
                },
                TransformOperation::Rotate {
                    axis: [0.0, 0.0, 2.0],
                    degrees: 45.0
                },
            ]
        );
    }

    #[test]
    fn mismatched_lists_switch_at_midpoint() {
        let from = TransformOperations::new().translate(1.0, 0.0, 0.0);
        let to = TransformOperations::new().scale(2.0, 2.0, 1.0);
        assert!(!from.matches_shape(&to));
        assert_eq!(TransformOperations::blend(&from, &to, 0.49), from);
        assert_eq!(TransformOperations::blend(&from, &to, 0.5), to);
    }

    #[test]
    fn apply_composes_left_to_right() {
        let ops = TransformOperations::new()
            .translate(10.0, 0.0, 0.0)
            .scale(2.0, 2.0, 2.0);
        assert_eq!(ops.apply().map_point([1.0, 1.0, 0.0]), [12.0, 2.0, 0.0]);
    }

    #[test]
    fn scale_and_translation_queries() {
        let translate = TransformOperations::new().translate(1.0, 2.0, 3.0);
        let scale = TransformOperations::new().scale(2.0, 1.0, 1.0);
        assert!(translate.is_translation());
        assert!(!translate.affects_scale());
        assert!(!scale.is_translation());
        assert!(scale.affects_scale());
        assert!(TransformOperations::new().is_translation());
    }

    #[test]
    fn bounds_for_translation_and_scale() {
        let b = Box3d::new(1.0, 2.0, -1.0, 3.0, 4.0, 5.0);
        let translated = TransformOperations::blended_bounds_for_box(
            &b,
            &TransformOperations::new().translate(0.0, 0.0, 0.0),
            &TransformOperations::new().translate(10.0, 15.0, 0.0),
            0.0,
            1.0,
        );
        assert_eq!(translated, Some(Box3d::new(1.0, 2.0, -1.0, 13.0, 19.0, 5.0)));

        let scaled = TransformOperations::blended_bounds_for_box(
            &b,
            &TransformOperations::new(),
            &TransformOperations::new().scale(2.0, 3.0, 4.0),
            0.0,
            1.0,
        );
        assert_eq!(scaled, Some(Box3d::new(1.0, 2.0, -4.0, 7.0, 16.0, 20.0)));
    }

    #[test]
    fn bounds_unsupported_for_rotation() {
        let b = Box3d::new(0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        let rotated = TransformOperations::blended_bounds_for_box(
            &b,
            &TransformOperations::new(),
            &TransformOperations::new().rotate([0.0, 0.0, 1.0], 90.0),
            0.0,
            1.0,
        );
        assert_eq!(rotated, None);
    }

    #[test]
    fn maximum_scale_over_progress_range() {
        let to = TransformOperations::new().scale(2.0, 3.0, 4.0);
        assert_eq!(
            TransformOperations::maximum_scale(&TransformOperations::new(), &to, 0.0, 1.0),
            Some(4.0)
        );
        // Overshooting easing pushes the peak past the end value.
        assert_eq!(
            TransformOperations::maximum_scale(&TransformOperations::new(), &to, 0.0, 1.5),
            Some(5.5)
        );
        let persp = TransformOperations::new().perspective(10.0);
        assert_eq!(
            TransformOperations::maximum_scale(&persp, &persp, 0.0, 1.0),
            None
        );
    }
}
