use super::edge::EdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the topology store.
    pub struct FaceId;
}

/// Data associated with a topological face.
///
/// A cell face is an axis-aligned rectangle bounded by four edges.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// Boundary edges, in loop order.
    pub edges: [EdgeId; 4],
    /// Axis the face is perpendicular to.
    pub normal_axis: usize,
}

impl FaceData {
    /// Boundary edges in a loop-independent order.
    #[must_use]
    pub fn key(&self) -> [EdgeId; 4] {
        let mut key = self.edges;
        key.sort_unstable();
        key
    }
}
