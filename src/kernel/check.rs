use std::collections::BTreeMap;

use crate::geometry::Cuboid;
use crate::shape::Shape;

use super::components::DisjointSets;

/// Defect kinds reported by the shape checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckStatus {
    NoError,
    /// A coordinate is NaN or infinite.
    InvalidCoordinate,
    /// A cell has `max < min` along some axis.
    BadOrientation,
    /// A solid cell has no thickness along some axis.
    NotClosed,
    /// A solid has no cells.
    EmptySolid,
    /// Two cells of the same solid overlap.
    SelfIntersecting,
    /// The cells of a solid do not form a single face-connected piece.
    NotConnected,
}

/// Aggregated checker statuses for a shape and all of its sub-shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    counts: BTreeMap<CheckStatus, usize>,
}

impl CheckReport {
    fn record(&mut self, status: CheckStatus) {
        *self.counts.entry(status).or_default() += 1;
    }

    /// A shape is valid when the checker found nothing but `NoError`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.counts.keys().all(|s| *s == CheckStatus::NoError)
    }

    /// Number of times `status` was reported.
    #[must_use]
    pub fn count(&self, status: CheckStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    /// Defects and how often each occurred, in a stable order.
    pub fn defects(&self) -> impl Iterator<Item = (CheckStatus, usize)> + '_ {
        self.counts
            .iter()
            .filter(|(s, _)| **s != CheckStatus::NoError)
            .map(|(s, n)| (*s, *n))
    }
}

/// Checks a shape and, recursively, all of its sub-shapes.
#[must_use]
pub fn check_shape(shape: &Shape) -> CheckReport {
    let mut report = CheckReport::default();
    check_into(shape, &mut report);
    report
}

fn check_into(shape: &Shape, report: &mut CheckReport) {
    match shape {
        Shape::Compound { children } | Shape::CompSolid { children } => {
            report.record(CheckStatus::NoError);
            for child in children {
                check_into(child, report);
            }
        }
        Shape::Solid { cells } => check_solid(cells, report),
        Shape::Face { cell } | Shape::Edge { cell } => {
            if cell.is_finite() {
                report.record(CheckStatus::NoError);
            } else {
                report.record(CheckStatus::InvalidCoordinate);
            }
        }
        Shape::Vertex { point } => {
            if point.iter().all(|c| c.is_finite()) {
                report.record(CheckStatus::NoError);
            } else {
                report.record(CheckStatus::InvalidCoordinate);
            }
        }
    }
}

fn check_solid(cells: &[Cuboid], report: &mut CheckReport) {
    if cells.is_empty() {
        report.record(CheckStatus::EmptySolid);
        return;
    }

    let mut sound = Vec::with_capacity(cells.len());
    for cell in cells {
        if !cell.is_finite() {
            report.record(CheckStatus::InvalidCoordinate);
        } else if cell.is_inverted() {
            report.record(CheckStatus::BadOrientation);
        } else if !cell.is_solid() {
            report.record(CheckStatus::NotClosed);
        } else {
            report.record(CheckStatus::NoError);
            sound.push(*cell);
        }
    }

    for (i, a) in sound.iter().enumerate() {
        for b in &sound[i + 1..] {
            if a.overlaps(b) {
                report.record(CheckStatus::SelfIntersecting);
            }
        }
    }

    if face_connected_components(&sound) > 1 {
        report.record(CheckStatus::NotConnected);
    }
}

/// Number of groups of cells connected through shared face patches.
fn face_connected_components(cells: &[Cuboid]) -> usize {
    let mut sets = DisjointSets::new(cells.len());
    for i in 0..cells.len() {
        for j in i + 1..cells.len() {
            if cells[i].shares_face(&cells[j]) {
                sets.union(i, j);
            }
        }
    }
    sets.groups().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point3;

    fn cell(min: [f64; 3], max: [f64; 3]) -> Cuboid {
        Cuboid::new(Point3::from(min), Point3::from(max))
    }

    #[test]
    fn unit_cube_is_valid() {
        let report = check_shape(&Shape::compound(vec![Shape::solid(vec![cell(
            [0.0; 3],
            [1.0; 3],
        )])]));
        assert!(report.is_valid());
        assert_eq!(report.defects().count(), 0);
    }

    #[test]
    fn inverted_and_flat_cells_are_reported() {
        let report = check_shape(&Shape::solid(vec![
            cell([1.0, 0.0, 0.0], [0.0, 1.0, 1.0]),
            cell([2.0, 0.0, 0.0], [2.0, 1.0, 1.0]),
        ]));
        assert!(!report.is_valid());
        assert_eq!(report.count(CheckStatus::BadOrientation), 1);
        assert_eq!(report.count(CheckStatus::NotClosed), 1);
    }

    #[test]
    fn overlapping_cells_self_intersect() {
        let report = check_shape(&Shape::solid(vec![
            cell([0.0; 3], [2.0; 3]),
            cell([1.0; 3], [3.0; 3]),
        ]));
        assert_eq!(report.count(CheckStatus::SelfIntersecting), 1);
    }

    #[test]
    fn separated_cells_are_not_connected() {
        let report = check_shape(&Shape::solid(vec![
            cell([0.0; 3], [1.0; 3]),
            cell([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]),
            cell([5.0; 3], [6.0; 3]),
        ]));
        assert_eq!(report.count(CheckStatus::NotConnected), 1);
        assert_eq!(report.count(CheckStatus::NoError), 3);
    }

    #[test]
    fn empty_solid_and_nan_vertex() {
        let report = check_shape(&Shape::compound(vec![
            Shape::solid(vec![]),
            Shape::Vertex {
                point: Point3::new(f64::NAN, 0.0, 0.0),
            },
        ]));
        let defects: Vec<_> = report.defects().collect();
        assert_eq!(
            defects,
            vec![
                (CheckStatus::InvalidCoordinate, 1),
                (CheckStatus::EmptySolid, 1)
            ]
        );
    }
}
