use tracing::debug;

use crate::error::Result;
use crate::kernel::{BooleanOp, Filler, Kernel};
use crate::shape::Shape;

use super::volume::non_negative_volume;

/// How an imprint resolved a pair of solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImprintStatus {
    /// The kernel reported errors; no shapes were produced.
    Failed,
    /// The solids share no volume; the outputs equal the inputs.
    Distinct,
    /// The shared volume was added to the first solid.
    MergeIntoShape,
    /// The shared volume was added to the second solid.
    MergeIntoTool,
}

/// Outcome of imprinting one pair of solids.
#[derive(Debug, Clone, PartialEq)]
pub struct ImprintResult {
    pub status: ImprintStatus,
    /// Fuzzy value the kernel actually used.
    pub fuzzy_value: f64,
    pub num_filler_warnings: usize,
    pub num_common_warnings: usize,
    pub num_fuse_warnings: usize,
    pub vol_common: Option<f64>,
    pub vol_cut: Option<f64>,
    pub vol_cut21: Option<f64>,
    /// Replacement for the first solid; `None` when failed.
    pub shape: Option<Shape>,
    /// Replacement for the second solid; `None` when failed.
    pub tool: Option<Shape>,
}

impl ImprintResult {
    fn failed() -> Self {
        Self {
            status: ImprintStatus::Failed,
            fuzzy_value: 0.0,
            num_filler_warnings: 0,
            num_common_warnings: 0,
            num_fuse_warnings: 0,
            vol_common: None,
            vol_cut: None,
            vol_cut21: None,
            shape: None,
            tool: None,
        }
    }
}

/// Splits two overlapping solids along their shared boundary.
///
/// The shared volume goes to whichever solid keeps the larger remainder
/// (the first one on ties), so the two results tile the union of the inputs
/// without overlapping each other.
pub struct Imprint<'a> {
    shape: &'a Shape,
    tool: &'a Shape,
    fuzzy_value: f64,
}

impl<'a> Imprint<'a> {
    /// Creates an imprint of `shape` against `tool`.
    #[must_use]
    pub fn new(shape: &'a Shape, tool: &'a Shape, fuzzy_value: f64) -> Self {
        Self {
            shape,
            tool,
            fuzzy_value,
        }
    }

    /// Runs the imprint. Kernel failures are reported through the status
    /// and leave both output shapes unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel reports a negative volume for the
    /// common or cut results.
    pub fn execute<K: Kernel>(&self, kernel: &K) -> Result<ImprintResult> {
        let mut result = ImprintResult::failed();

        let filler = kernel.fill(self.shape, self.tool, self.fuzzy_value, None);
        result.num_filler_warnings = filler.report().warning_count();
        result.fuzzy_value = filler.fuzzy_value();
        if filler.report().has_errors() {
            debug!(errors = %filler.report().error_summary(), "imprint fill failed");
            return Ok(result);
        }

        let common = kernel.build(&filler, BooleanOp::Common);
        result.num_common_warnings = common.report.warning_count();
        if common.has_errors() {
            return Ok(result);
        }
        let vol_common = non_negative_volume(kernel, &common.shape, "common")?;
        result.vol_common = Some(vol_common);

        let cut = kernel.build(&filler, BooleanOp::Cut);
        if cut.has_errors() {
            return Ok(result);
        }
        let vol_cut = non_negative_volume(kernel, &cut.shape, "cut")?;
        result.vol_cut = Some(vol_cut);

        let cut21 = kernel.build(&filler, BooleanOp::Cut21);
        if cut21.has_errors() {
            return Ok(result);
        }
        let vol_cut21 = non_negative_volume(kernel, &cut21.shape, "reversed cut")?;
        result.vol_cut21 = Some(vol_cut21);

        if !common.shape.has_vertices() {
            result.status = ImprintStatus::Distinct;
            result.shape = Some(cut.shape);
            result.tool = Some(cut21.shape);
            return Ok(result);
        }

        let merge_into_shape = vol_cut >= vol_cut21;
        let larger = if merge_into_shape {
            &cut.shape
        } else {
            &cut21.shape
        };

        // the pieces are already disjoint, so no further fuzzy value
        let fused = kernel.fuse(larger, &common.shape);
        result.num_fuse_warnings = fused.report.warning_count();
        if fused.has_errors() {
            debug!(errors = %fused.report.error_summary(), "imprint fuse failed");
            return Ok(result);
        }

        if merge_into_shape {
            result.status = ImprintStatus::MergeIntoShape;
            result.shape = Some(fused.shape);
            result.tool = Some(cut21.shape);
        } else {
            result.status = ImprintStatus::MergeIntoTool;
            result.shape = Some(cut.shape);
            result.tool = Some(fused.shape);
        }
        Ok(result)
    }
}
