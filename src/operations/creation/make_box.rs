use crate::error::{GeometryError, Result};
use crate::geometry::Cuboid;
use crate::math::{Point3, Vector3};
use crate::shape::Shape;

/// Creates a box solid from two corner points.
pub struct MakeBox {
    min_corner: Point3,
    max_corner: Point3,
}

impl MakeBox {
    /// Creates a new `MakeBox` operation.
    #[must_use]
    pub fn new(min_corner: Point3, max_corner: Point3) -> Self {
        Self {
            min_corner,
            max_corner,
        }
    }

    /// Creates a box with its minimum corner at `origin` and the given
    /// edge lengths.
    #[must_use]
    pub fn from_size(origin: Point3, size: Vector3) -> Self {
        Self::new(origin, origin + size)
    }

    /// Executes the operation, returning a single-cell solid.
    ///
    /// # Errors
    ///
    /// Returns an error if a coordinate is not finite, the corners are
    /// inverted, or the box has no volume.
    pub fn execute(&self) -> Result<Shape> {
        let cell = Cuboid::try_new(self.min_corner, self.max_corner)?;
        if !cell.is_solid() {
            return Err(GeometryError::Degenerate("box has zero thickness".into()).into());
        }
        Ok(Shape::solid(vec![cell]))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn box_from_size() {
        let shape = MakeBox::from_size(Point3::new(1.0, 2.0, 3.0), Vector3::new(2.0, 3.0, 4.0))
            .execute()
            .unwrap();
        let cells = shape.solid_cells();
        assert_eq!(cells.len(), 1);
        assert_relative_eq!(cells[0].volume(), 24.0);
        assert_relative_eq!(cells[0].max.z, 7.0);
    }

    #[test]
    fn flat_or_inverted_boxes_are_rejected() {
        assert!(MakeBox::new(Point3::origin(), Point3::new(1.0, 0.0, 1.0))
            .execute()
            .is_err());
        assert!(MakeBox::new(Point3::new(1.0, 1.0, 1.0), Point3::origin())
            .execute()
            .is_err());
    }
}
