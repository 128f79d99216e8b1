use tracing::debug;

use crate::error::{EngineError, Result};
use crate::kernel::{BooleanOp, Filler, Kernel};
use crate::shape::Shape;

use super::timeout::TimeoutGuard;
use super::volume::non_negative_volume;

/// Largest tolerated negative common volume, as a fraction of the smaller
/// cut volume.
///
/// Kernels occasionally report a slightly negative COMMON volume when two
/// solids have faces within the fuzzy value of each other. Such slivers are
/// classified as touching; anything larger is an error.
pub const NEGATIVE_COMMON_RATIO: f64 = 0.1;

/// Spatial relationship between two solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectStatus {
    /// The kernel reported errors.
    Failed,
    /// No shared volume and no boundary contact.
    Distinct,
    /// Boundary contact only.
    Touching,
    /// The solids share volume.
    Overlap,
    /// The fill did not finish before its deadline.
    Timeout,
}

/// Outcome of classifying one pair of solids.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectResult {
    pub status: IntersectStatus,
    /// Fuzzy value the kernel actually used.
    pub fuzzy_value: f64,
    pub num_filler_warnings: usize,
    pub num_common_warnings: usize,
    pub num_section_warnings: usize,
    /// Unclamped; only computed when COMMON holds a solid.
    pub vol_common: Option<f64>,
    pub vol_cut: Option<f64>,
    pub vol_cut21: Option<f64>,
    pub pave_time_seconds: f64,
}

impl IntersectResult {
    fn failed() -> Self {
        Self {
            status: IntersectStatus::Failed,
            fuzzy_value: 0.0,
            num_filler_warnings: 0,
            num_common_warnings: 0,
            num_section_warnings: 0,
            vol_common: None,
            vol_cut: None,
            vol_cut21: None,
            pave_time_seconds: 0.0,
        }
    }
}

/// Classifies the spatial relationship between two solids.
pub struct ClassifyIntersection<'a> {
    shape: &'a Shape,
    tool: &'a Shape,
    fuzzy_value: f64,
    pave_timeout_millis: u32,
}

impl<'a> ClassifyIntersection<'a> {
    /// Creates a classification of `shape` against `tool` without a deadline.
    #[must_use]
    pub fn new(shape: &'a Shape, tool: &'a Shape, fuzzy_value: f64) -> Self {
        Self {
            shape,
            tool,
            fuzzy_value,
            pave_timeout_millis: 0,
        }
    }

    /// Bounds the intersection fill; zero disables the deadline.
    #[must_use]
    pub fn with_pave_timeout(mut self, millis: u32) -> Self {
        self.pave_timeout_millis = millis;
        self
    }

    /// Runs the classification.
    ///
    /// Kernel failures and timeouts are reported through the returned
    /// status.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel reports a negative cut volume, or a
    /// negative common volume larger than [`NEGATIVE_COMMON_RATIO`] of the
    /// smaller cut volume.
    pub fn execute<K: Kernel>(&self, kernel: &K) -> Result<IntersectResult> {
        let mut result = IntersectResult::failed();

        // One filler serves COMMON, CUT, CUT21 and SECTION below.
        let mut guard = TimeoutGuard::new(self.pave_timeout_millis);
        let filler = guard.run(|progress| {
            kernel.fill(self.shape, self.tool, self.fuzzy_value, progress)
        });

        result.pave_time_seconds = guard.elapsed_secs();
        result.fuzzy_value = filler.fuzzy_value();
        result.num_filler_warnings = filler.report().warning_count();

        if guard.expired() {
            result.status = IntersectStatus::Timeout;
            return Ok(result);
        }
        if filler.report().has_errors() {
            debug!(errors = %filler.report().error_summary(), "intersection fill failed");
            return Ok(result);
        }

        let common = kernel.build(&filler, BooleanOp::Common);
        result.num_common_warnings = common.report.warning_count();
        if common.has_errors() {
            return Ok(result);
        }

        if common.shape.has_solids() {
            let vol_common = kernel.volume_of(&common.shape);
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

            if vol_common < 0.0 {
                let limit = vol_cut.min(vol_cut21) * NEGATIVE_COMMON_RATIO;
                if -vol_common > limit {
                    return Err(EngineError::NegativeCommonVolume {
                        common: vol_common,
                        limit,
                    }
                    .into());
                }
                // boundary sliver: keep the pair as neighbours for merging
                result.status = IntersectStatus::Touching;
            } else {
                result.status = IntersectStatus::Overlap;
            }
            return Ok(result);
        }

        let section = kernel.build(&filler, BooleanOp::Section);
        result.num_section_warnings = section.report.warning_count();
        if !section.has_errors() {
            result.status = if section.shape.has_vertices() {
                IntersectStatus::Touching
            } else {
                IntersectStatus::Distinct
            };
        }
        Ok(result)
    }
}
