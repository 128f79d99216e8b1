use super::face::FaceId;

slotmap::new_key_type! {
    /// Unique identifier for a solid in the topology store.
    pub struct SolidId;
}

/// Data associated with a topological solid.
///
/// A solid is bounded by the faces of all of its cells. Faces shared by
/// two cells of the same solid are listed once.
#[derive(Debug, Clone)]
pub struct SolidData {
    /// Index of the document shape the solid belongs to.
    pub shape_index: usize,
    /// Boundary faces of the solid's cells.
    pub faces: Vec<FaceId>,
}
