use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, AXES};

/// A closed axis-aligned box.
///
/// Cuboids are the cells the kernel builds solids from. A cuboid with a zero
/// extent along one or more axes is a face, edge or point; one with
/// `max < min` along an odd number of axes has a negative volume and is
/// reported as badly oriented by the checker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cuboid {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Cuboid {
    /// Creates a cuboid from two corners without validating them.
    #[must_use]
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Creates a cuboid from two corners, rejecting non-finite coordinates and
    /// inverted extents.
    ///
    /// # Errors
    ///
    /// Returns an error if any coordinate is not finite or `max < min` on any
    /// axis.
    pub fn try_new(min: Point3, max: Point3) -> Result<Self> {
        let cell = Self::new(min, max);
        if !cell.is_finite() {
            return Err(GeometryError::NonFinite("cuboid").into());
        }
        if (0..AXES).any(|axis| max[axis] < min[axis]) {
            return Err(GeometryError::Degenerate(format!(
                "cuboid max {max:?} is below min {min:?}"
            ))
            .into());
        }
        Ok(cell)
    }

    /// Returns the point cuboid at `point`.
    #[must_use]
    pub fn point(point: Point3) -> Self {
        Self::new(point, point)
    }

    /// Returns the signed extent along each axis.
    #[must_use]
    pub fn extent(&self) -> Vector3 {
        self.max - self.min
    }

    /// Returns the signed volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        let e = self.extent();
        e.x * e.y * e.z
    }

    /// Returns `true` if every coordinate is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|c| c.is_finite())
    }

    /// Returns `true` if `max < min` along any axis.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        (0..AXES).any(|axis| self.max[axis] < self.min[axis])
    }

    /// Number of axes along which the cuboid has no thickness.
    #[allow(clippy::float_cmp)]
    #[must_use]
    pub fn flat_axes(&self) -> usize {
        (0..AXES)
            .filter(|&axis| self.max[axis] == self.min[axis])
            .count()
    }

    /// Returns `true` if the cuboid encloses a positive volume.
    #[must_use]
    pub fn is_solid(&self) -> bool {
        (0..AXES).all(|axis| self.max[axis] > self.min[axis])
    }

    /// Returns the eight corners.
    ///
    /// Corner `i` takes `max` along axis `k` when bit `k` of `i` is set.
    #[must_use]
    pub fn corners(&self) -> [Point3; 8] {
        std::array::from_fn(|i| {
            let mut p = self.min;
            for axis in 0..AXES {
                if i & (1 << axis) != 0 {
                    p[axis] = self.max[axis];
                }
            }
            p
        })
    }

    /// Closed intersection: `None` when the cuboids do not even touch.
    #[must_use]
    pub fn intersection(&self, other: &Cuboid) -> Option<Cuboid> {
        let mut out = *self;
        for axis in 0..AXES {
            out.min[axis] = self.min[axis].max(other.min[axis]);
            out.max[axis] = self.max[axis].min(other.max[axis]);
            if out.max[axis] < out.min[axis] {
                return None;
            }
        }
        Some(out)
    }

    /// Returns `true` if the interiors of the cuboids overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Cuboid) -> bool {
        self.intersection(other).is_some_and(|c| c.is_solid())
    }

    /// Returns `true` if the cuboids touch along a patch of positive area.
    #[must_use]
    pub fn shares_face(&self, other: &Cuboid) -> bool {
        self.intersection(other).is_some_and(|c| c.flat_axes() <= 1)
    }

    /// Returns `self - other` as a set of disjoint cuboids.
    ///
    /// The remainder is cut into at most six slabs, peeling one side of the
    /// overlap region per axis.
    #[must_use]
    pub fn subtract(&self, other: &Cuboid) -> Vec<Cuboid> {
        let Some(hole) = self.intersection(other).filter(Cuboid::is_solid) else {
            return vec![*self];
        };

        let mut pieces = Vec::with_capacity(6);
        let mut rest = *self;
        for axis in 0..AXES {
            if rest.min[axis] < hole.min[axis] {
                let mut slab = rest;
                slab.max[axis] = hole.min[axis];
                pieces.push(slab);
                rest.min[axis] = hole.min[axis];
            }
            if rest.max[axis] > hole.max[axis] {
                let mut slab = rest;
                slab.min[axis] = hole.max[axis];
                pieces.push(slab);
                rest.max[axis] = hole.max[axis];
            }
        }
        pieces
    }

    /// Euclidean distance between the closest points of two cuboids.
    #[must_use]
    pub fn distance(&self, other: &Cuboid) -> f64 {
        let mut sq = 0.0;
        for axis in 0..AXES {
            let gap = (other.min[axis] - self.max[axis])
                .max(self.min[axis] - other.max[axis])
                .max(0.0);
            sq += gap * gap;
        }
        sq.sqrt()
    }

    /// Merges two cuboids that share a complete face into one.
    #[allow(clippy::float_cmp)]
    #[must_use]
    pub fn try_merge(&self, other: &Cuboid) -> Option<Cuboid> {
        let mut joined = None;
        for axis in 0..AXES {
            let same_section = (0..AXES).filter(|&k| k != axis).all(|k| {
                self.min[k] == other.min[k] && self.max[k] == other.max[k]
            });
            if !same_section {
                continue;
            }
            if self.max[axis] == other.min[axis] || other.max[axis] == self.min[axis] {
                let mut cell = *self;
                cell.min[axis] = self.min[axis].min(other.min[axis]);
                cell.max[axis] = self.max[axis].max(other.max[axis]);
                joined = Some(cell);
                break;
            }
        }
        joined
    }
}
