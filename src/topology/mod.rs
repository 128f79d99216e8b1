pub mod edge;
pub mod face;
pub mod solid;
pub mod vertex;

pub use edge::{EdgeData, EdgeId};
pub use face::{FaceData, FaceId};
pub use solid::{SolidData, SolidId};
pub use vertex::{VertexData, VertexId};

use crate::error::TopologyError;
use crate::geometry::Cuboid;
use crate::math::AXES;
use crate::shape::{Shape, ShapeKind};
use slotmap::SlotMap;

/// Central arena that owns all topological entities.
///
/// Entities reference each other via typed IDs (generational indices),
/// avoiding self-referential structures and enabling safe mutation.
#[derive(Debug, Default)]
pub struct TopologyStore {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    faces: SlotMap<FaceId, FaceData>,
    solids: SlotMap<SolidId, SolidData>,
}

/// Number of entities of each kind in a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopologyCounts {
    pub vertices: usize,
    pub edges: usize,
    pub faces: usize,
    pub solids: usize,
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the unshared boundary of every solid cell in `shapes`.
    ///
    /// Each cell contributes its own 8 vertices, 12 edges and 6 faces; nothing
    /// is shared between cells until the store is glued.
    #[must_use]
    pub fn from_shapes(shapes: &[Shape]) -> Self {
        let mut store = Self::new();
        for (shape_index, shape) in shapes.iter().enumerate() {
            for solid in shape.explore(ShapeKind::Solid) {
                let Shape::Solid { cells } = solid else {
                    continue;
                };
                let mut faces = Vec::with_capacity(cells.len() * 6);
                for cell in cells.iter().filter(|c| c.is_solid()) {
                    faces.extend(store.add_cell(cell));
                }
                store.add_solid(SolidData { shape_index, faces });
            }
        }
        store
    }

    /// Adds the boundary of one cell and returns its six faces.
    fn add_cell(&mut self, cell: &Cuboid) -> [FaceId; 6] {
        let vertices = cell.corners().map(|p| self.add_vertex(VertexData::new(p)));

        // corners i and i | (1 << axis) span an edge along `axis`
        let mut edge_between = [[EdgeId::default(); 8]; 8];
        for (i, &start) in vertices.iter().enumerate() {
            for axis in 0..AXES {
                let j = i | (1 << axis);
                if j != i {
                    let id = self.add_edge(EdgeData::new(start, vertices[j]));
                    edge_between[i][j] = id;
                    edge_between[j][i] = id;
                }
            }
        }

        let mut faces = [FaceId::default(); 6];
        for normal_axis in 0..AXES {
            let (a, b) = ((normal_axis + 1) % AXES, (normal_axis + 2) % AXES);
            for side in 0..2 {
                let base = side << normal_axis;
                let ring = [
                    base,
                    base | (1 << a),
                    base | (1 << a) | (1 << b),
                    base | (1 << b),
                ];
                let edges = std::array::from_fn(|k| edge_between[ring[k]][ring[(k + 1) % 4]]);
                faces[normal_axis * 2 + side] = self.add_face(FaceData { edges, normal_axis });
            }
        }
        faces
    }

    /// Number of entities of each kind.
    #[must_use]
    pub fn counts(&self) -> TopologyCounts {
        TopologyCounts {
            vertices: self.vertices.len(),
            edges: self.edges.len(),
            faces: self.faces.len(),
            solids: self.solids.len(),
        }
    }

    // --- Vertex operations ---

    /// Inserts a vertex and returns its ID.
    pub fn add_vertex(&mut self, data: VertexData) -> VertexId {
        self.vertices.insert(data)
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Iterates over all vertices.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &VertexData)> {
        self.vertices.iter()
    }

    // --- Edge operations ---

    /// Inserts an edge and returns its ID.
    pub fn add_edge(&mut self, data: EdgeData) -> EdgeId {
        self.edges.insert(data)
    }

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    /// Iterates over all edges.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeData)> {
        self.edges.iter()
    }

    // --- Face operations ---

    /// Inserts a face and returns its ID.
    pub fn add_face(&mut self, data: FaceData) -> FaceId {
        self.faces.insert(data)
    }

    /// Iterates over all faces.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &FaceData)> {
        self.faces.iter()
    }

    // --- Solid operations ---

    /// Inserts a solid and returns its ID.
    pub fn add_solid(&mut self, data: SolidData) -> SolidId {
        self.solids.insert(data)
    }

    /// Returns a reference to the solid data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn solid(&self, id: SolidId) -> Result<&SolidData, TopologyError> {
        self.solids
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("solid".into()))
    }

    /// Iterates over all solids.
    pub fn solids(&self) -> impl Iterator<Item = (SolidId, &SolidData)> {
        self.solids.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use std::collections::HashSet;

    fn cube(x: f64, s: f64) -> Shape {
        Shape::solid(vec![Cuboid::new(
            Point3::new(x, 0.0, 0.0),
            Point3::new(x + s, s, s),
        )])
    }

    #[test]
    fn single_cell_boundary() {
        let store = TopologyStore::from_shapes(&[cube(0.0, 1.0)]);
        assert_eq!(
            store.counts(),
            TopologyCounts {
                vertices: 8,
                edges: 12,
                faces: 6,
                solids: 1,
            }
        );
    }

    #[test]
    fn faces_are_closed_rectangles() {
        let store = TopologyStore::from_shapes(&[cube(0.0, 2.0)]);
        for (_, face) in store.faces() {
            let mut seen = HashSet::new();
            for id in face.edges {
                let edge = store.edge(id).unwrap();
                let (p, q) = (
                    store.vertex(edge.start).unwrap().point,
                    store.vertex(edge.end).unwrap().point,
                );
                assert!((p[face.normal_axis] - q[face.normal_axis]).abs() < 1e-12);
                seen.insert(edge.start);
                seen.insert(edge.end);
            }
            assert_eq!(seen.len(), 4);
        }
    }

    #[test]
    fn every_edge_bounds_two_faces_of_its_cell() {
        let store = TopologyStore::from_shapes(&[cube(0.0, 1.0)]);
        for (id, _) in store.edges() {
            let uses = store
                .faces()
                .filter(|(_, f)| f.edges.contains(&id))
                .count();
            assert_eq!(uses, 2);
        }
    }

    #[test]
    fn solids_remember_their_shape() {
        let store = TopologyStore::from_shapes(&[cube(0.0, 1.0), cube(1.0, 1.0)]);
        let mut indices: Vec<_> = store.solids().map(|(_, s)| s.shape_index).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1]);
        for (_, solid) in store.solids() {
            assert_eq!(solid.faces.len(), 6);
        }
    }

    #[test]
    fn missing_entity_is_an_error() {
        let store = TopologyStore::new();
        assert!(store.vertex(VertexId::default()).is_err());
        assert!(store.solid(SolidId::default()).is_err());
    }
}
