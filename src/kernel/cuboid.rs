use crate::error::KernelError;
use crate::geometry::Cuboid;
use crate::shape::{Shape, ShapeKind};

use super::check::{check_shape, CheckReport};
use super::components::DisjointSets;
use super::fuzzy::CoordinateSnap;
use super::{BooleanOp, BooleanOutcome, Filler, Kernel, ProgressIndicator, Report};

/// Exact boolean kernel over unions of axis-aligned cells.
///
/// Every solid is a set of disjoint [`Cuboid`]s, so COMMON, CUT and FUSE are
/// closed over the representation and volumes are exact up to floating point
/// rounding. The kernel is sequential: identical inputs always give identical
/// outputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CuboidKernel;

impl CuboidKernel {
    /// Creates the kernel.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Contact between one cell of each argument.
#[derive(Debug, Clone, Copy)]
struct Interference {
    /// `(solid, cell)` index into the first argument.
    shape: (usize, usize),
    /// `(solid, cell)` index into the second argument.
    tool: (usize, usize),
    /// Closed intersection of the two cells.
    region: Cuboid,
}

/// Snapped arguments and their pairwise cell interferences.
#[derive(Debug, Clone)]
pub struct CuboidFiller {
    fuzzy_value: f64,
    report: Report,
    shape: Vec<Vec<Cuboid>>,
    tool: Vec<Vec<Cuboid>>,
    interferences: Vec<Interference>,
}

impl Filler for CuboidFiller {
    fn report(&self) -> &Report {
        &self.report
    }

    fn fuzzy_value(&self) -> f64 {
        self.fuzzy_value
    }
}

impl CuboidFiller {
    fn new(fuzzy_value: f64) -> Self {
        Self {
            fuzzy_value,
            report: Report::new(),
            shape: Vec::new(),
            tool: Vec::new(),
            interferences: Vec::new(),
        }
    }

    fn failed(mut self, message: &str) -> Self {
        self.report.fail(message);
        self
    }

    fn is_interrupted(progress: &mut Option<&mut dyn ProgressIndicator>) -> bool {
        progress.as_mut().is_some_and(|p| p.user_break())
    }

    fn common(&self) -> Vec<Cuboid> {
        self.interferences
            .iter()
            .filter(|i| i.region.is_solid())
            .map(|i| i.region)
            .collect()
    }

    /// Cells of `from` with every interfering cell of `other` removed.
    fn cut(&self, reversed: bool) -> Vec<Vec<Cuboid>> {
        let (from, other) = if reversed {
            (&self.tool, &self.shape)
        } else {
            (&self.shape, &self.tool)
        };

        let mut solids = Vec::with_capacity(from.len());
        for (si, cells) in from.iter().enumerate() {
            let mut remaining = Vec::new();
            for (ci, cell) in cells.iter().enumerate() {
                let mut pieces = vec![*cell];
                for i in &self.interferences {
                    let (own, against) = if reversed {
                        (i.tool, i.shape)
                    } else {
                        (i.shape, i.tool)
                    };
                    if own != (si, ci) || !i.region.is_solid() {
                        continue;
                    }
                    let hole = other[against.0][against.1];
                    pieces = pieces.iter().flat_map(|p| p.subtract(&hole)).collect();
                }
                remaining.extend(pieces);
            }
            solids.push(remaining);
        }
        solids
    }

    fn section(&self) -> Vec<Shape> {
        let mut pieces = Vec::new();
        for i in &self.interferences {
            let region = i.region;
            match region.flat_axes() {
                0 => pieces.extend(box_edges(&region)),
                1 => pieces.push(Shape::Face { cell: region }),
                2 => pieces.push(Shape::Edge { cell: region }),
                _ => pieces.push(Shape::Vertex { point: region.min }),
            }
        }
        pieces
    }

    /// Union that keeps the solids of the first argument apart.
    ///
    /// Each remaining piece of the second argument joins every solid it
    /// shares a face with; solids of the first argument only become one when
    /// such a piece links them. Pieces touching nothing stay separate solids.
    fn fuse(&self) -> Vec<Vec<Cuboid>> {
        let mut solids: Vec<Vec<Cuboid>> = self
            .shape
            .iter()
            .filter(|cells| !cells.is_empty())
            .cloned()
            .collect();
        let own = solids.len();
        solids.extend(self.cut(true).into_iter().filter(|cells| !cells.is_empty()));

        let mut sets = DisjointSets::new(solids.len());
        for i in 0..solids.len() {
            for j in (i + 1).max(own)..solids.len() {
                let linked = solids[i]
                    .iter()
                    .any(|a| solids[j].iter().any(|b| a.shares_face(b)));
                if linked {
                    sets.union(i, j);
                }
            }
        }

        sets.groups()
            .into_iter()
            .map(|group| {
                let cells = group.iter().flat_map(|&i| solids[i].iter().copied());
                coalesce(cells.collect())
            })
            .collect()
    }
}

/// The twelve edges of a box, as edge shapes.
fn box_edges(cell: &Cuboid) -> Vec<Shape> {
    let corners = cell.corners();
    let mut edges = Vec::with_capacity(12);
    for i in 0..corners.len() {
        for bit in 0..3 {
            let j = i | (1 << bit);
            if j != i {
                edges.push(Shape::Edge {
                    cell: Cuboid::new(corners[i], corners[j]),
                });
            }
        }
    }
    edges
}

/// Repeatedly merges cells sharing a complete face.
fn coalesce(mut cells: Vec<Cuboid>) -> Vec<Cuboid> {
    loop {
        let mut merged = None;
        'search: for i in 0..cells.len() {
            for j in i + 1..cells.len() {
                if let Some(cell) = cells[i].try_merge(&cells[j]) {
                    merged = Some((i, j, cell));
                    break 'search;
                }
            }
        }
        let Some((i, j, cell)) = merged else {
            return cells;
        };
        cells.swap_remove(j);
        cells[i] = cell;
    }
}

/// Solid cells grouped per solid, in exploration order.
fn solids_of(shape: &Shape) -> Vec<Vec<Cuboid>> {
    shape
        .explore(ShapeKind::Solid)
        .into_iter()
        .map(|s| match s {
            Shape::Solid { cells } => cells.clone(),
            _ => Vec::new(),
        })
        .collect()
}

/// Every touching cell pair, polling `progress` before each test. Returns
/// `None` once the indicator asks to stop.
fn collect_interferences(
    shape: &[Vec<Cuboid>],
    tool: &[Vec<Cuboid>],
    progress: &mut Option<&mut dyn ProgressIndicator>,
) -> Option<Vec<Interference>> {
    let mut found = Vec::new();
    for (si, cells) in shape.iter().enumerate() {
        for (ci, a) in cells.iter().enumerate() {
            for (ti, tool_cells) in tool.iter().enumerate() {
                for (tci, b) in tool_cells.iter().enumerate() {
                    if CuboidFiller::is_interrupted(progress) {
                        return None;
                    }
                    if let Some(region) = a.intersection(b) {
                        found.push(Interference {
                            shape: (si, ci),
                            tool: (ti, tci),
                            region,
                        });
                    }
                }
            }
        }
    }
    Some(found)
}

fn compound_of_solids(solids: Vec<Vec<Cuboid>>) -> Shape {
    Shape::compound(
        solids
            .into_iter()
            .filter(|cells| !cells.is_empty())
            .map(Shape::solid)
            .collect(),
    )
}

impl Kernel for CuboidKernel {
    type Filler = CuboidFiller;

    fn fill(
        &self,
        shape: &Shape,
        tool: &Shape,
        fuzzy_value: f64,
        mut progress: Option<&mut dyn ProgressIndicator>,
    ) -> CuboidFiller {
        let filler = CuboidFiller::new(fuzzy_value);
        if !fuzzy_value.is_finite() || fuzzy_value < 0.0 {
            return filler.failed("fuzzy value must be finite and non-negative");
        }
        if CuboidFiller::is_interrupted(&mut progress) {
            return filler.failed("interrupted by user break");
        }

        let shape_solids = solids_of(shape);
        let tool_solids = solids_of(tool);
        let all_cells = || shape_solids.iter().chain(&tool_solids).flatten();
        if all_cells().any(|c| !c.is_finite()) {
            return filler.failed("argument has non-finite coordinates");
        }

        let mut filler = filler;
        let snap = CoordinateSnap::build(all_cells(), fuzzy_value);
        for _ in 0..snap.merged_clusters() {
            filler
                .report
                .warn("coordinates within the fuzzy value were made coincident");
        }

        let mut collapsed = 0;
        let mut snap_solids = |solids: &[Vec<Cuboid>]| -> Vec<Vec<Cuboid>> {
            solids
                .iter()
                .map(|cells| {
                    cells
                        .iter()
                        .map(|c| snap.apply(c))
                        .filter(|c| {
                            let keep = c.is_solid();
                            collapsed += usize::from(!keep);
                            keep
                        })
                        .collect()
                })
                .collect()
        };
        filler.shape = snap_solids(shape_solids.as_slice());
        filler.tool = snap_solids(tool_solids.as_slice());
        for _ in 0..collapsed {
            filler.report.warn("cell collapsed by fuzzy snapping");
        }

        match collect_interferences(&filler.shape, &filler.tool, &mut progress) {
            Some(found) => filler.interferences = found,
            None => return filler.failed("interrupted by user break"),
        }
        filler
    }

    fn build(&self, filler: &CuboidFiller, op: BooleanOp) -> BooleanOutcome {
        let mut report = Report::new();
        if filler.report.has_errors() {
            report.fail("intersection data was not prepared");
            return BooleanOutcome::failed(report);
        }
        if filler.shape.iter().all(Vec::is_empty) {
            report.warn("first argument has no solid cells");
        }
        if filler.tool.iter().all(Vec::is_empty) {
            report.warn("second argument has no solid cells");
        }

        let shape = match op {
            BooleanOp::Common => {
                let cells = filler.common();
                compound_of_solids(vec![cells])
            }
            BooleanOp::Cut => compound_of_solids(filler.cut(false)),
            BooleanOp::Cut21 => compound_of_solids(filler.cut(true)),
            BooleanOp::Section => Shape::compound(filler.section()),
            BooleanOp::Fuse => compound_of_solids(filler.fuse()),
        };
        BooleanOutcome { shape, report }
    }

    fn volume_of(&self, shape: &Shape) -> f64 {
        shape.solid_cells().iter().map(Cuboid::volume).sum()
    }

    fn min_distance(&self, a: &Shape, b: &Shape) -> Result<f64, KernelError> {
        let cells_a = a.solid_cells();
        let cells_b = b.solid_cells();
        if cells_a.is_empty() {
            return Err(KernelError::EmptyShape("first"));
        }
        if cells_b.is_empty() {
            return Err(KernelError::EmptyShape("second"));
        }
        let mut best = f64::INFINITY;
        for ca in &cells_a {
            for cb in &cells_b {
                best = best.min(ca.distance(cb));
            }
        }
        Ok(best)
    }

    fn check(&self, shape: &Shape) -> CheckReport {
        check_shape(shape)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use approx::assert_relative_eq;

    fn cube(x: f64, y: f64, z: f64, s: f64) -> Shape {
        Shape::solid(vec![Cuboid::new(
            Point3::new(x, y, z),
            Point3::new(x + s, y + s, z + s),
        )])
    }

    struct Never;

    impl ProgressIndicator for Never {
        fn user_break(&mut self) -> bool {
            false
        }
    }

    struct Always;

    impl ProgressIndicator for Always {
        fn user_break(&mut self) -> bool {
            true
        }
    }

    #[test]
    fn corner_overlap_volumes() {
        let kernel = CuboidKernel::new();
        let a = cube(0.0, 0.0, 0.0, 5.0);
        let b = cube(4.0, 4.0, 4.0, 2.0);
        let filler = kernel.fill(&a, &b, 0.1, None);
        assert!(!filler.report().has_errors());

        let common = kernel.build(&filler, BooleanOp::Common);
        let cut = kernel.build(&filler, BooleanOp::Cut);
        let cut21 = kernel.build(&filler, BooleanOp::Cut21);
        assert_relative_eq!(kernel.volume_of(&common.shape), 1.0);
        assert_relative_eq!(kernel.volume_of(&cut.shape), 124.0);
        assert_relative_eq!(kernel.volume_of(&cut21.shape), 7.0);
    }

    #[test]
    fn cut_and_common_do_not_overlap() {
        let kernel = CuboidKernel::new();
        let a = cube(0.0, 0.0, 0.0, 4.0);
        let b = cube(3.0, 1.0, 1.0, 2.0);
        let filler = kernel.fill(&a, &b, 0.0, None);
        let common = kernel.build(&filler, BooleanOp::Common).shape.solid_cells();
        let cut = kernel.build(&filler, BooleanOp::Cut).shape.solid_cells();
        for c in &common {
            assert!(cut.iter().all(|r| !r.overlaps(c)));
        }
    }

    #[test]
    fn touching_cubes_have_empty_common_and_face_section() {
        let kernel = CuboidKernel::new();
        let a = cube(0.0, 0.0, 0.0, 5.0);
        let b = cube(5.0, 0.0, 0.0, 5.0);
        let filler = kernel.fill(&a, &b, 0.5, None);
        let common = kernel.build(&filler, BooleanOp::Common);
        assert!(!common.shape.has_solids());
        assert!(!common.shape.has_vertices());

        let section = kernel.build(&filler, BooleanOp::Section);
        assert_eq!(section.shape.explore(ShapeKind::Face).len(), 1);
    }

    #[test]
    fn overlapping_section_yields_edges() {
        let kernel = CuboidKernel::new();
        let filler = kernel.fill(&cube(0.0, 0.0, 0.0, 2.0), &cube(1.0, 1.0, 1.0, 2.0), 0.0, None);
        let section = kernel.build(&filler, BooleanOp::Section);
        assert_eq!(section.shape.explore(ShapeKind::Edge).len(), 12);
    }

    #[test]
    fn fuse_coalesces_into_one_cell() {
        let kernel = CuboidKernel::new();
        let fused = kernel.fuse(&cube(0.0, 0.0, 0.0, 1.0), &cube(1.0, 0.0, 0.0, 1.0));
        assert!(!fused.has_errors());
        assert_eq!(fused.shape.solid_cells().len(), 1);
        assert_relative_eq!(kernel.volume_of(&fused.shape), 2.0);
    }

    #[test]
    fn fuse_of_overlapping_counts_shared_volume_once() {
        let kernel = CuboidKernel::new();
        let fused = kernel.fuse(&cube(0.0, 0.0, 0.0, 2.0), &cube(1.0, 1.0, 1.0, 2.0));
        assert_relative_eq!(kernel.volume_of(&fused.shape), 15.0);
    }

    #[test]
    fn fuse_keeps_separate_solids_apart() {
        let kernel = CuboidKernel::new();
        let pair = Shape::compound(vec![cube(0.0, 0.0, 0.0, 4.0), cube(10.0, 0.0, 0.0, 4.0)]);
        let fused = kernel.fuse(&pair, &cube(4.0, 0.0, 0.0, 1.0));
        assert!(!fused.has_errors());
        assert_eq!(fused.shape.explore(ShapeKind::Solid).len(), 2);
        assert_relative_eq!(kernel.volume_of(&fused.shape), 129.0);
        assert!(kernel.check(&fused.shape).is_valid());
    }

    #[test]
    fn fuse_joins_solids_linked_by_the_tool() {
        let kernel = CuboidKernel::new();
        let pair = Shape::compound(vec![cube(0.0, 0.0, 0.0, 1.0), cube(2.0, 0.0, 0.0, 1.0)]);
        let bridge = Shape::solid(vec![Cuboid::new(
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 1.0),
        )]);
        let fused = kernel.fuse(&pair, &bridge);
        assert_eq!(fused.shape.explore(ShapeKind::Solid).len(), 1);
        assert_eq!(fused.shape.solid_cells().len(), 1);
        assert_relative_eq!(kernel.volume_of(&fused.shape), 3.0);
    }

    #[test]
    fn fuzzy_snapping_closes_small_gap() {
        let kernel = CuboidKernel::new();
        let a = cube(0.0, 0.0, 0.0, 1.0);
        let b = cube(1.05, 0.0, 0.0, 1.0);
        let filler = kernel.fill(&a, &b, 0.1, None);
        assert!(filler.report().warning_count() > 0);
        let section = kernel.build(&filler, BooleanOp::Section);
        assert!(section.shape.has_vertices());

        let strict = kernel.fill(&a, &b, 0.01, None);
        assert!(!kernel.build(&strict, BooleanOp::Section).shape.has_vertices());
    }

    #[test]
    fn invalid_fuzzy_fails_fill() {
        let kernel = CuboidKernel::new();
        let a = cube(0.0, 0.0, 0.0, 1.0);
        assert!(kernel.fill(&a, &a, -1.0, None).report().has_errors());
        assert!(kernel.fill(&a, &a, f64::NAN, None).report().has_errors());

        let filler = kernel.fill(&a, &a, -1.0, None);
        assert!(kernel.build(&filler, BooleanOp::Common).has_errors());
    }

    #[test]
    fn progress_is_polled() {
        let kernel = CuboidKernel::new();
        let a = cube(0.0, 0.0, 0.0, 1.0);
        let mut never = Never;
        assert!(!kernel.fill(&a, &a, 0.0, Some(&mut never)).report().has_errors());
        let mut always = Always;
        assert!(kernel.fill(&a, &a, 0.0, Some(&mut always)).report().has_errors());
    }

    #[test]
    fn min_distance_between_cubes() {
        let kernel = CuboidKernel::new();
        let d = kernel
            .min_distance(&cube(0.0, 0.0, 0.0, 4.0), &cube(5.0, 0.0, 0.0, 4.0))
            .unwrap();
        assert_relative_eq!(d, 1.0);
        assert!(kernel.min_distance(&Shape::empty(), &cube(0.0, 0.0, 0.0, 1.0)).is_err());
    }
}
