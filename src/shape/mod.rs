use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Cuboid;
use crate::math::Point3;

/// The topological kind of a [`Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShapeKind {
    Compound,
    CompSolid,
    Solid,
    Face,
    Edge,
    Vertex,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Compound => "COMPOUND",
            Self::CompSolid => "COMPSOLID",
            Self::Solid => "SOLID",
            Self::Face => "FACE",
            Self::Edge => "EDGE",
            Self::Vertex => "VERTEX",
        };
        f.write_str(name)
    }
}

/// A boundary-represented shape.
///
/// Shapes are plain values: cloning one copies its geometry, and kernel
/// operations never mutate their arguments. A solid is the union of its
/// cells, which are expected to be pairwise disjoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Compound { children: Vec<Shape> },
    CompSolid { children: Vec<Shape> },
    Solid { cells: Vec<Cuboid> },
    Face { cell: Cuboid },
    Edge { cell: Cuboid },
    Vertex { point: Point3 },
}

impl Default for Shape {
    fn default() -> Self {
        Self::empty()
    }
}

impl Shape {
    /// An empty compound, the result of boolean operations with no output.
    #[must_use]
    pub fn empty() -> Self {
        Self::Compound {
            children: Vec::new(),
        }
    }

    /// Wraps shapes into a compound.
    #[must_use]
    pub fn compound(children: Vec<Shape>) -> Self {
        Self::Compound { children }
    }

    /// Creates a solid from cells.
    #[must_use]
    pub fn solid(cells: Vec<Cuboid>) -> Self {
        Self::Solid { cells }
    }

    /// Returns the kind of this shape.
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Compound { .. } => ShapeKind::Compound,
            Self::CompSolid { .. } => ShapeKind::CompSolid,
            Self::Solid { .. } => ShapeKind::Solid,
            Self::Face { .. } => ShapeKind::Face,
            Self::Edge { .. } => ShapeKind::Edge,
            Self::Vertex { .. } => ShapeKind::Vertex,
        }
    }

    /// Direct children of a compound or compsolid; empty for other kinds.
    #[must_use]
    pub fn children(&self) -> &[Shape] {
        match self {
            Self::Compound { children } | Self::CompSolid { children } => children,
            _ => &[],
        }
    }

    /// Collects every sub-shape of the given kind, depth first.
    #[must_use]
    pub fn explore(&self, kind: ShapeKind) -> Vec<&Shape> {
        let mut found = Vec::new();
        self.explore_into(kind, &mut found);
        found
    }

    fn explore_into<'a>(&'a self, kind: ShapeKind, found: &mut Vec<&'a Shape>) {
        if self.kind() == kind {
            found.push(self);
            return;
        }
        for child in self.children() {
            child.explore_into(kind, found);
        }
    }

    /// Returns `true` if the shape contains at least one solid.
    #[must_use]
    pub fn has_solids(&self) -> bool {
        !self.explore(ShapeKind::Solid).is_empty()
    }

    /// Returns `true` if the shape has at least one vertex anywhere in its
    /// boundary.
    #[must_use]
    pub fn has_vertices(&self) -> bool {
        match self {
            Self::Compound { children } | Self::CompSolid { children } => {
                children.iter().any(Shape::has_vertices)
            }
            Self::Solid { cells } => !cells.is_empty(),
            Self::Face { .. } | Self::Edge { .. } | Self::Vertex { .. } => true,
        }
    }

    /// The cells of every solid in the shape, flattened in exploration order.
    #[must_use]
    pub fn solid_cells(&self) -> Vec<Cuboid> {
        self.explore(ShapeKind::Solid)
            .into_iter()
            .flat_map(|solid| match solid {
                Self::Solid { cells } => cells.clone(),
                _ => Vec::new(),
            })
            .collect()
    }

    /// Returns a copy of the shape with every cell (and vertex point)
    /// transformed by `f`.
    #[must_use]
    pub fn map_cells(&self, f: &mut impl FnMut(&Cuboid) -> Cuboid) -> Shape {
        match self {
            Self::Compound { children } => Self::Compound {
                children: children.iter().map(|c| c.map_cells(f)).collect(),
            },
            Self::CompSolid { children } => Self::CompSolid {
                children: children.iter().map(|c| c.map_cells(f)).collect(),
            },
            Self::Solid { cells } => Self::Solid {
                cells: cells.iter().map(|c| f(c)).collect(),
            },
            Self::Face { cell } => Self::Face { cell: f(cell) },
            Self::Edge { cell } => Self::Edge { cell: f(cell) },
            Self::Vertex { point } => Self::Vertex {
                point: f(&Cuboid::point(*point)).min,
            },
        }
    }
}
