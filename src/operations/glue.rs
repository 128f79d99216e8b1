use std::collections::HashMap;

use tracing::trace;

use crate::error::{Result, TopologyError};
use crate::geometry::Cuboid;
use crate::kernel::components::DisjointSets;
use crate::kernel::fuzzy::CoordinateSnap;
use crate::shape::Shape;
use crate::topology::{
    EdgeData, EdgeId, FaceData, FaceId, SolidData, TopologyStore, VertexData, VertexId,
};

/// Snaps coordinates within each group of shapes in contact so that
/// boundaries closer than `tolerance` become bit-identical.
///
/// `contacts` holds index pairs of shapes found touching or overlapping.
/// Shapes linked through contacts are snapped together with the same
/// per-axis clustering as the kernel's fuzzy fill; shapes without any
/// contact are returned unchanged.
#[must_use]
pub fn snap_shapes(shapes: &[Shape], contacts: &[(usize, usize)], tolerance: f64) -> Vec<Shape> {
    let mut sets = DisjointSets::new(shapes.len());
    for &(a, b) in contacts {
        if a < shapes.len() && b < shapes.len() {
            sets.union(a, b);
        }
    }

    let mut snapped = shapes.to_vec();
    for group in sets.groups() {
        if group.len() < 2 {
            continue;
        }
        let cells: Vec<_> = group.iter().flat_map(|&i| shapes[i].solid_cells()).collect();
        let snap = CoordinateSnap::build(&cells, tolerance);
        trace!(
            shapes = ?group,
            clusters = snap.merged_clusters(),
            "snapped contact group"
        );
        for &i in &group {
            snapped[i] = shapes[i].map_cells(&mut |cell: &Cuboid| snap.apply(cell));
        }
    }
    snapped
}

/// Shares coincident boundary entities between the solids of a store.
///
/// Vertices within the tolerance of each other collapse into one, then edges
/// with the same end vertices, then faces with the same four edges.
pub struct Glue {
    tolerance: f64,
}

impl Glue {
    /// Creates a glue operation with the given vertex tolerance.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Builds a new store in which coincident entities are shared.
    ///
    /// # Errors
    ///
    /// Returns an error if the input store references missing entities or
    /// an edge collapses onto a single vertex.
    pub fn execute(&self, store: &TopologyStore) -> Result<TopologyStore> {
        let mut glued = TopologyStore::new();

        let mut vertex_map: HashMap<VertexId, VertexId> = HashMap::new();
        let mut kept: Vec<(VertexId, VertexData)> = Vec::new();
        for (id, vertex) in store.vertices() {
            let existing = kept
                .iter()
                .find(|(_, k)| k.coincides(vertex, self.tolerance))
                .map(|(kid, _)| *kid);
            let target = match existing {
                Some(kid) => kid,
                None => {
                    let kid = glued.add_vertex(vertex.clone());
                    kept.push((kid, vertex.clone()));
                    kid
                }
            };
            vertex_map.insert(id, target);
        }

        let mut edge_map: HashMap<EdgeId, EdgeId> = HashMap::new();
        let mut edge_keys: HashMap<(VertexId, VertexId), EdgeId> = HashMap::new();
        for (id, edge) in store.edges() {
            let remapped = EdgeData::new(
                lookup(&vertex_map, edge.start, "vertex")?,
                lookup(&vertex_map, edge.end, "vertex")?,
            );
            if remapped.start == remapped.end {
                return Err(TopologyError::InvalidTopology(
                    "edge shorter than the glue tolerance".into(),
                )
                .into());
            }
            let target = *edge_keys
                .entry(remapped.key())
                .or_insert_with(|| glued.add_edge(remapped));
            edge_map.insert(id, target);
        }

        let mut face_map: HashMap<FaceId, FaceId> = HashMap::new();
        let mut face_keys: HashMap<[EdgeId; 4], FaceId> = HashMap::new();
        for (id, face) in store.faces() {
            let mut edges = face.edges;
            for edge in &mut edges {
                *edge = lookup(&edge_map, *edge, "edge")?;
            }
            let remapped = FaceData {
                edges,
                normal_axis: face.normal_axis,
            };
            let target = *face_keys
                .entry(remapped.key())
                .or_insert_with(|| glued.add_face(remapped));
            face_map.insert(id, target);
        }

        for (_, solid) in store.solids() {
            let mut faces = Vec::with_capacity(solid.faces.len());
            for face in &solid.faces {
                let target = lookup(&face_map, *face, "face")?;
                if !faces.contains(&target) {
                    faces.push(target);
                }
            }
            glued.add_solid(SolidData {
                shape_index: solid.shape_index,
                faces,
            });
        }

        Ok(glued)
    }
}

fn lookup<K: std::hash::Hash + Eq, V: Copy>(
    map: &HashMap<K, V>,
    key: K,
    what: &str,
) -> std::result::Result<V, TopologyError> {
    map.get(&key)
        .copied()
        .ok_or_else(|| TopologyError::EntityNotFound(what.into()))
}
