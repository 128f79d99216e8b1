use std::path::Path;

use tracing::{debug, warn};

use crate::error::DocumentError;
use crate::kernel::io::{read_container, write_container, Container};
use crate::kernel::Kernel;
use crate::shape::{Shape, ShapeKind};

/// Shapes and their labels, addressed by index.
///
/// The index of a shape is its identity for the whole run. Labels are kept
/// parallel to the shapes and default to `solid{i}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    shapes: Vec<Shape>,
    labels: Vec<String>,
}

fn default_label(index: usize) -> String {
    format!("solid{index}")
}

impl Document {
    /// Creates a document from shapes, labelling them `solid0`, `solid1`, ...
    #[must_use]
    pub fn new(shapes: Vec<Shape>) -> Self {
        let labels = (0..shapes.len()).map(default_label).collect();
        Self { shapes, labels }
    }

    /// Creates a document from shapes and matching labels.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::LabelCount`] if the lengths differ.
    pub fn with_labels(shapes: Vec<Shape>, labels: Vec<String>) -> Result<Self, DocumentError> {
        if shapes.len() != labels.len() {
            return Err(DocumentError::LabelCount {
                shapes: shapes.len(),
                labels: labels.len(),
            });
        }
        Ok(Self { shapes, labels })
    }

    /// Loads a document from a container file.
    ///
    /// The container's top-level shape must be a compound or compsolid, and
    /// each of its children a compound, compsolid or solid.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if its
    /// structure or labels do not match the rules above.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let Container { shape, labels } = read_container(path)?;
        let children = match shape {
            Shape::Compound { children } | Shape::CompSolid { children } => children,
            other => return Err(DocumentError::UnexpectedTopLevel(other.kind())),
        };

        for (index, child) in children.iter().enumerate() {
            match child.kind() {
                ShapeKind::Compound | ShapeKind::CompSolid | ShapeKind::Solid => {}
                kind => return Err(DocumentError::UnexpectedChild { index, kind }),
            }
        }

        debug!(path = %path.display(), shapes = children.len(), "loaded document");
        if labels.is_empty() {
            Ok(Self::new(children))
        } else {
            Self::with_labels(children, labels)
        }
    }

    /// Saves the document as a single compound container.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let container = Container {
            shape: Shape::compound(self.shapes.clone()),
            labels: self.labels.clone(),
        };
        write_container(path, &container)?;
        debug!(path = %path.display(), shapes = self.shapes.len(), "saved document");
        Ok(())
    }

    /// Number of shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns `true` if the document holds no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the shape at `index`.
    #[must_use]
    pub fn shape(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    /// Returns the label of the shape at `index`.
    #[must_use]
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Replaces every shape at once, keeping the labels.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::LabelCount`] if the number of shapes changes.
    pub fn replace_shapes(&mut self, shapes: Vec<Shape>) -> Result<(), DocumentError> {
        if shapes.len() != self.labels.len() {
            return Err(DocumentError::LabelCount {
                shapes: shapes.len(),
                labels: self.labels.len(),
            });
        }
        self.shapes = shapes;
        Ok(())
    }

    /// Resolves a user-supplied reference to a shape index.
    ///
    /// The reference is first read as an index, then matched exactly against
    /// the labels.
    #[must_use]
    pub fn lookup_solid(&self, reference: &str) -> Option<usize> {
        if let Ok(index) = reference.trim().parse::<usize>() {
            return (index < self.shapes.len()).then_some(index);
        }
        self.labels.iter().position(|label| label == reference)
    }

    /// Checks every shape, logging the defects of each invalid one.
    ///
    /// Returns the number of invalid shapes.
    pub fn count_invalid_shapes<K: Kernel>(&self, kernel: &K) -> usize {
        let mut invalid = 0;
        for (index, (shape, label)) in self.shapes.iter().zip(&self.labels).enumerate() {
            let report = kernel.check(shape);
            if report.is_valid() {
                continue;
            }
            invalid += 1;

            let defects: Vec<String> = report
                .defects()
                .map(|(status, count)| format!("{status:?} {count} times"))
                .collect();
            warn!(
                index,
                label = label.as_str(),
                kind = %shape.kind(),
                "shape contains errors: {}",
                defects.join(", ")
            );
        }
        invalid
    }

    /// Sum of the volumes of every shape.
    pub fn total_volume<K: Kernel>(&self, kernel: &K) -> f64 {
        self.shapes.iter().map(|s| kernel.volume_of(s)).sum()
    }
}
