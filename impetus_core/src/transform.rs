// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal column-major 4×4 transform and axis-aligned 3-D boxes.
//!
//! [`Transform3d`] covers what animated transforms need (the primitive
//! operation matrices, multiply, point mapping) without pulling in a full
//! linear-algebra crate. [`Box3d`] is the axis-aligned box used by animated
//! bounds queries.

use core::ops::Mul;

use kurbo::Rect;

/// A column-major 4×4 transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix, matching the memory layout
/// used by GPU APIs and Core Animation's `CATransform3D`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from a column-major 2-D array.
    #[inline]
    #[must_use]
    pub const fn from_cols_array_2d(cols: [[f64; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation of `degrees` around `axis`.
    ///
    /// A zero-length axis yields the identity.
    #[must_use]
    pub fn from_axis_angle(axis: [f64; 3], degrees: f64) -> Self {
        let len = libm::sqrt(axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]);
        if len == 0.0 {
            return Self::IDENTITY;
        }
        let (x, y, z) = (axis[0] / len, axis[1] / len, axis[2] / len);
        let radians = degrees.to_radians();
        let s = libm::sin(radians);
        let c = libm::cos(radians);
        let t = 1.0 - c;
        Self {
            cols: [
                [t * x * x + c, t * x * y + s * z, t * x * z - s * y, 0.0],
                [t * x * y - s * z, t * y * y + c, t * y * z + s * x, 0.0],
                [t * x * z + s * y, t * y * z - s * x, t * z * z + c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a 2-D skew (angles in degrees).
    #[must_use]
    pub fn from_skew(x_degrees: f64, y_degrees: f64) -> Self {
        let tx = libm::tan(x_degrees.to_radians());
        let ty = libm::tan(y_degrees.to_radians());
        Self {
            cols: [
                [1.0, ty, 0.0, 0.0],
                [tx, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a perspective projection with the viewer at `depth`.
    ///
    /// A depth of zero (or less) means no perspective.
    #[must_use]
    pub fn from_perspective(depth: f64) -> Self {
        let mut m = Self::IDENTITY;
        if depth > 0.0 {
            m.cols[2][3] = -1.0 / depth;
        }
        m
    }

    /// Returns `true` if this transform only translates.
    #[must_use]
    pub fn is_identity_or_translation(&self) -> bool {
        let c = &self.cols;
        c[0] == [1.0, 0.0, 0.0, 0.0]
            && c[1] == [0.0, 1.0, 0.0, 0.0]
            && c[2] == [0.0, 0.0, 1.0, 0.0]
            && c[3][3] == 1.0
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }

    /// Maps a point, applying the homogeneous divide.
    #[must_use]
    pub fn map_point(&self, p: [f64; 3]) -> [f64; 3] {
        let c = &self.cols;
        let mut out = [0.0_f64; 4];
        for (i, o) in out.iter_mut().enumerate() {
            *o = c[0][i] * p[0] + c[1][i] * p[1] + c[2][i] * p[2] + c[3][i];
        }
        if out[3] != 0.0 && out[3] != 1.0 {
            [out[0] / out[3], out[1] / out[3], out[2] / out[3]]
        } else {
            [out[0], out[1], out[2]]
        }
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        let mut j = 0;
        while j < 4 {
            let mut i = 0;
            while i < 4 {
                out[j][i] =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}

/// An axis-aligned box given by its minimum corner and its extent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Box3d {
    /// Minimum x.
    pub x: f64,
    /// Minimum y.
    pub y: f64,
    /// Minimum z.
    pub z: f64,
    /// Extent along x.
    pub width: f64,
    /// Extent along y.
    pub height: f64,
    /// Extent along z.
    pub depth: f64,
}

impl Box3d {
    /// Creates a box from its minimum corner and extent.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, width: f64, height: f64, depth: f64) -> Self {
        Self {
            x,
            y,
            z,
            width,
            height,
            depth,
        }
    }

    /// Returns the maximum corner.
    #[inline]
    #[must_use]
    pub fn max_corner(&self) -> [f64; 3] {
        [
            self.x + self.width,
            self.y + self.height,
            self.z + self.depth,
        ]
    }

    fn from_extrema(min: [f64; 3], max: [f64; 3]) -> Self {
        Self::new(
            min[0],
            min[1],
            min[2],
            max[0] - min[0],
            max[1] - min[1],
            max[2] - min[2],
        )
    }

    /// Returns the smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let a = self.max_corner();
        let b = other.max_corner();
        Self::from_extrema(
            [
                self.x.min(other.x),
                self.y.min(other.y),
                self.z.min(other.z),
            ],
            [a[0].max(b[0]), a[1].max(b[1]), a[2].max(b[2])],
        )
    }

    /// Returns the bounds of this box after mapping its eight corners.
    #[must_use]
    pub fn transformed(&self, m: &Transform3d) -> Self {
        let hi = self.max_corner();
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for corner in 0..8_u8 {
            let p = [
                if corner & 1 == 0 { self.x } else { hi[0] },
                if corner & 2 == 0 { self.y } else { hi[1] },
                if corner & 4 == 0 { self.z } else { hi[2] },
            ];
            let q = m.map_point(p);
            for axis in 0..3 {
                min[axis] = min[axis].min(q[axis]);
                max[axis] = max[axis].max(q[axis]);
            }
        }
        Self::from_extrema(min, max)
    }

    /// Projects the box onto the xy plane.
    #[inline]
    #[must_use]
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b) * (a - b) < 1e-18
    }

    #[test]
    fn identity_multiply() {
        let t = Transform3d::from_translation(1.0, 2.0, 3.0);
        assert_eq!(Transform3d::IDENTITY * t, t);
        assert_eq!(t * Transform3d::IDENTITY, t);
    }

    #[test]
    fn scale_then_translate() {
        let s = Transform3d::from_scale(2.0, 2.0, 2.0);
        let t = Transform3d::from_translation(3.0, 4.0, 0.0);
        let combined = t * s;
        assert_eq!(combined.map_point([1.0, 1.0, 1.0]), [5.0, 6.0, 2.0]);
    }

    #[test]
    fn rotation_about_z_matches_quarter_turn() {
        let r = Transform3d::from_axis_angle([0.0, 0.0, 1.0], 90.0);
        let p = r.map_point([1.0, 0.0, 0.0]);
        assert!(close(p[0], 0.0) && close(p[1], 1.0), "got {p:?}");
    }

    #[test]
    fn zero_axis_rotation_is_identity() {
        assert_eq!(
            Transform3d::from_axis_angle([0.0, 0.0, 0.0], 45.0),
            Transform3d::IDENTITY
        );
    }

    #[test]
    fn translation_detection() {
        assert!(Transform3d::from_translation(4.0, 5.0, 6.0).is_identity_or_translation());
        assert!(!Transform3d::from_scale(2.0, 1.0, 1.0).is_identity_or_translation());
        assert!(!Transform3d::from_perspective(100.0).is_identity_or_translation());
    }

    #[test]
    fn box_union_and_transform() {
        let b = Box3d::new(1.0, 2.0, -1.0, 3.0, 4.0, 5.0);
        let moved = b.transformed(&Transform3d::from_translation(10.0, 15.0, 0.0));
        assert_eq!(moved, Box3d::new(11.0, 17.0, -1.0, 3.0, 4.0, 5.0));
        assert_eq!(b.union(&moved), Box3d::new(1.0, 2.0, -1.0, 13.0, 19.0, 5.0));

        let scaled = b.transformed(&Transform3d::from_scale(2.0, 3.0, 4.0));
        assert_eq!(scaled, Box3d::new(2.0, 6.0, -4.0, 6.0, 12.0, 20.0));
    }

    #[test]
    fn box_projects_to_rect() {
        let b = Box3d::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert_eq!(b.to_rect(), Rect::new(1.0, 2.0, 5.0, 7.0));
    }
}
