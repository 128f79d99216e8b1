use crate::geometry::Cuboid;
use crate::math::AXES;

/// Snap table for the coordinates along one axis.
#[derive(Debug, Clone, Default)]
struct AxisSnap {
    /// Distinct input coordinates, sorted, with their representative.
    entries: Vec<(f64, f64)>,
    /// Clusters that gathered more than one distinct coordinate.
    merged: usize,
}

impl AxisSnap {
    fn build(values: Vec<f64>, fuzzy_value: f64) -> Self {
        let mut values: Vec<f64> = values.into_iter().map(positive_zero).collect();
        values.sort_by(f64::total_cmp);
        values.dedup_by(|a, b| a.total_cmp(b).is_eq());

        let mut entries = Vec::with_capacity(values.len());
        let mut merged = 0;
        let mut start = 0;
        for i in 1..=values.len() {
            if i < values.len() && values[i] - values[start] <= fuzzy_value {
                continue;
            }
            let (lo, hi) = (values[start], values[i - 1]);
            let representative = if i - start == 1 { lo } else { (lo + hi) / 2.0 };
            if i - start > 1 {
                merged += 1;
            }
            entries.extend(values[start..i].iter().map(|&v| (v, representative)));
            start = i;
        }
        Self { entries, merged }
    }

    fn snap(&self, value: f64) -> f64 {
        let value = positive_zero(value);
        self.entries
            .binary_search_by(|(v, _)| v.total_cmp(&value))
            .map_or(value, |i| self.entries[i].1)
    }
}

/// Folds `-0.0` onto `0.0`; every other value is returned unchanged.
fn positive_zero(value: f64) -> f64 {
    value + 0.0
}

/// Maps coordinates that lie within a fuzzy value of each other onto a
/// single representative, independently per axis.
///
/// Sorted coordinates join the current cluster while they lie within the
/// fuzzy value of its first member, so no cluster spans more than the fuzzy
/// value and no coordinate moves by more than half of it. A cluster is
/// represented by the midpoint of its extremes, so an isolated coordinate
/// maps onto itself exactly.
#[derive(Debug, Clone, Default)]
pub struct CoordinateSnap {
    axes: [AxisSnap; AXES],
}

impl CoordinateSnap {
    /// Builds the snap table from every corner coordinate of `cells`.
    pub fn build<'a>(cells: impl IntoIterator<Item = &'a Cuboid>, fuzzy_value: f64) -> Self {
        let mut values: [Vec<f64>; AXES] = Default::default();
        for cell in cells {
            for (axis, bucket) in values.iter_mut().enumerate() {
                bucket.push(cell.min[axis]);
                bucket.push(cell.max[axis]);
            }
        }
        let [x, y, z] = values;
        Self {
            axes: [
                AxisSnap::build(x, fuzzy_value),
                AxisSnap::build(y, fuzzy_value),
                AxisSnap::build(z, fuzzy_value),
            ],
        }
    }

    /// Snaps both corners of a cell.
    #[must_use]
    pub fn apply(&self, cell: &Cuboid) -> Cuboid {
        let mut out = *cell;
        for (axis, table) in self.axes.iter().enumerate() {
            out.min[axis] = table.snap(cell.min[axis]);
            out.max[axis] = table.snap(cell.max[axis]);
        }
        out
    }

    /// Number of clusters, over all axes, that merged distinct coordinates.
    #[must_use]
    pub fn merged_clusters(&self) -> usize {
        self.axes.iter().map(|a| a.merged).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point3;

    fn cell(min: [f64; 3], max: [f64; 3]) -> Cuboid {
        Cuboid::new(Point3::from(min), Point3::from(max))
    }

    #[test]
    fn isolated_coordinates_are_untouched() {
        let cells = [
            cell([0.0, 0.0, 0.0], [4.0, 4.0, 4.0]),
            cell([5.0, 0.0, 0.0], [9.0, 4.0, 4.0]),
        ];
        let snap = CoordinateSnap::build(&cells, 0.5);
        assert_eq!(snap.apply(&cells[0]), cells[0]);
        assert_eq!(snap.apply(&cells[1]), cells[1]);
        assert_eq!(snap.merged_clusters(), 0);
    }

    #[test]
    fn close_faces_snap_to_midpoint() {
        let cells = [
            cell([0.0, 0.0, 0.0], [4.0, 1.0, 1.0]),
            cell([4.1, 0.0, 0.0], [8.0, 1.0, 1.0]),
        ];
        let snap = CoordinateSnap::build(&cells, 0.2);
        let a = snap.apply(&cells[0]);
        let b = snap.apply(&cells[1]);
        assert!((a.max.x - 4.05).abs() < 1e-12);
        assert_eq!(a.max.x.to_bits(), b.min.x.to_bits());
        assert_eq!(snap.merged_clusters(), 1);
    }

    #[test]
    fn zero_fuzzy_keeps_distinct_values() {
        let cells = [
            cell([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
            cell([1.0 + 1e-12, 0.0, 0.0], [2.0, 1.0, 1.0]),
        ];
        let snap = CoordinateSnap::build(&cells, 0.0);
        assert_eq!(snap.apply(&cells[1]), cells[1]);
        assert_eq!(snap.merged_clusters(), 0);
    }

    #[test]
    fn chained_coordinates_do_not_drift() {
        let cells: Vec<_> = (0..11)
            .map(|i| {
                let x = 1.0 + 0.0009 * f64::from(i);
                let y = 5.0 * f64::from(i);
                cell([x, y, 0.0], [x + 1.0, y + 1.0, 1.0])
            })
            .collect();
        let snap = CoordinateSnap::build(&cells, 1e-3);
        for original in &cells {
            let moved = snap.apply(original);
            assert!((moved.min.x - original.min.x).abs() <= 0.5e-3 + 1e-12);
            assert!((moved.max.x - original.max.x).abs() <= 0.5e-3 + 1e-12);
        }
    }

    #[test]
    fn cluster_span_is_bounded_by_the_fuzzy_value() {
        let cells = [
            cell([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
            cell([0.0009, 2.0, 0.0], [1.0, 3.0, 1.0]),
            cell([0.0018, 4.0, 0.0], [1.0, 5.0, 1.0]),
        ];
        let snap = CoordinateSnap::build(&cells, 1e-3);
        let first = snap.apply(&cells[0]).min.x;
        let second = snap.apply(&cells[1]).min.x;
        let third = snap.apply(&cells[2]).min.x;
        assert_eq!(first.to_bits(), second.to_bits());
        assert!((first - 0.00045).abs() < 1e-12);
        assert_eq!(third.to_bits(), 0.0018_f64.to_bits());
    }

    #[test]
    fn negative_zero_snaps_with_positive_zero() {
        let cells = [
            cell([-1.0, 0.0, 0.0], [-0.0, 1.0, 1.0]),
            cell([-1.0, 2.0, 0.0], [0.0, 3.0, 1.0]),
            cell([0.0005, 0.0, 0.0], [1.0, 1.0, 1.0]),
        ];
        let snap = CoordinateSnap::build(&cells, 1e-3);
        let a = snap.apply(&cells[0]).max.x;
        let b = snap.apply(&cells[1]).max.x;
        let c = snap.apply(&cells[2]).min.x;
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(b.to_bits(), c.to_bits());
        assert!((c - 0.00025).abs() < 1e-12);
    }
}
