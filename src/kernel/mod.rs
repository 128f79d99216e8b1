pub mod check;
pub(crate) mod components;
mod cuboid;
pub mod fuzzy;
pub mod io;
mod report;

#[cfg(test)]
pub(crate) mod testing;

pub use check::{check_shape, CheckReport, CheckStatus};
pub use cuboid::{CuboidFiller, CuboidKernel};
pub use report::Report;

use crate::error::KernelError;
use crate::shape::Shape;

/// Boolean operation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Volume shared by both arguments.
    Common,
    /// First argument minus the second.
    Cut,
    /// Second argument minus the first.
    Cut21,
    /// Boundary contact between the arguments.
    Section,
    /// Union of both arguments.
    Fuse,
}

/// Cooperative cancellation hook polled by long-running kernel algorithms.
pub trait ProgressIndicator {
    /// Returns `true` once the running algorithm should stop.
    fn user_break(&mut self) -> bool;
}

/// Result of a boolean operation together with its report.
#[derive(Debug, Clone)]
pub struct BooleanOutcome {
    pub shape: Shape,
    pub report: Report,
}

impl BooleanOutcome {
    /// Outcome carrying no shape and the given report.
    #[must_use]
    pub fn failed(report: Report) -> Self {
        Self {
            shape: Shape::empty(),
            report,
        }
    }

    /// Returns `true` if the operation reported errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.report.has_errors()
    }
}

/// Intersection data prepared once for a pair of arguments and shared by
/// every boolean operation built on that pair.
pub trait Filler {
    /// Warnings and errors raised while filling.
    fn report(&self) -> &Report;

    /// The fuzzy value actually used.
    fn fuzzy_value(&self) -> f64;
}

/// Geometry kernel primitives consumed by the engine.
pub trait Kernel {
    type Filler: Filler;

    /// Intersects `shape` with `tool`, treating features closer than
    /// `fuzzy_value` as coincident. Arguments are never modified.
    ///
    /// When `progress` is given the kernel polls it and abandons the fill
    /// with an error once it asks to stop.
    fn fill(
        &self,
        shape: &Shape,
        tool: &Shape,
        fuzzy_value: f64,
        progress: Option<&mut dyn ProgressIndicator>,
    ) -> Self::Filler;

    /// Builds a boolean operation from prepared intersection data.
    fn build(&self, filler: &Self::Filler, op: BooleanOp) -> BooleanOutcome;

    /// Fuses two shapes without any fuzzy tolerance.
    fn fuse(&self, shape: &Shape, tool: &Shape) -> BooleanOutcome {
        let filler = self.fill(shape, tool, 0.0, None);
        if filler.report().has_errors() {
            return BooleanOutcome::failed(filler.report().clone());
        }
        self.build(&filler, BooleanOp::Fuse)
    }

    /// Signed volume of a shape; negative values indicate malformed geometry.
    fn volume_of(&self, shape: &Shape) -> f64;

    /// Minimum distance between two shapes.
    ///
    /// # Errors
    ///
    /// Returns an error if either shape has no solid geometry.
    fn min_distance(&self, a: &Shape, b: &Shape) -> Result<f64, KernelError>;

    /// Validates a shape and its sub-shapes.
    fn check(&self, shape: &Shape) -> CheckReport;
}
