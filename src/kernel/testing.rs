use std::thread;
use std::time::Duration;

use crate::error::KernelError;
use crate::geometry::Cuboid;
use crate::shape::Shape;

use super::{
    BooleanOp, BooleanOutcome, CheckReport, CuboidFiller, CuboidKernel, Kernel, ProgressIndicator,
};

/// Reports a chosen volume for one specific cell, mimicking kernels that
/// return slightly negative volumes for tolerance-close faces.
pub(crate) struct SliverKernel {
    pub sliver: Cuboid,
    pub volume: f64,
}

impl Kernel for SliverKernel {
    type Filler = CuboidFiller;

    fn fill(
        &self,
        shape: &Shape,
        tool: &Shape,
        fuzzy_value: f64,
        progress: Option<&mut dyn ProgressIndicator>,
    ) -> CuboidFiller {
        CuboidKernel.fill(shape, tool, fuzzy_value, progress)
    }

    fn build(&self, filler: &CuboidFiller, op: BooleanOp) -> BooleanOutcome {
        CuboidKernel.build(filler, op)
    }

    fn volume_of(&self, shape: &Shape) -> f64 {
        shape
            .solid_cells()
            .iter()
            .map(|c| if *c == self.sliver { self.volume } else { c.volume() })
            .sum()
    }

    fn min_distance(&self, a: &Shape, b: &Shape) -> Result<f64, KernelError> {
        CuboidKernel.min_distance(a, b)
    }

    fn check(&self, shape: &Shape) -> CheckReport {
        CuboidKernel.check(shape)
    }
}

/// Spins inside `fill` until the progress indicator asks it to stop, or
/// gives up after `max_polls` polls and behaves like [`CuboidKernel`].
pub(crate) struct StallingKernel {
    pub max_polls: usize,
}

impl Kernel for StallingKernel {
    type Filler = CuboidFiller;

    fn fill(
        &self,
        shape: &Shape,
        tool: &Shape,
        fuzzy_value: f64,
        mut progress: Option<&mut dyn ProgressIndicator>,
    ) -> CuboidFiller {
        if let Some(p) = progress.as_mut() {
            for _ in 0..self.max_polls {
                if p.user_break() {
                    break;
                }
                thread::sleep(Duration::from_millis(1));
            }
        }
        CuboidKernel.fill(shape, tool, fuzzy_value, progress)
    }

    fn build(&self, filler: &CuboidFiller, op: BooleanOp) -> BooleanOutcome {
        CuboidKernel.build(filler, op)
    }

    fn volume_of(&self, shape: &Shape) -> f64 {
        CuboidKernel.volume_of(shape)
    }

    fn min_distance(&self, a: &Shape, b: &Shape) -> Result<f64, KernelError> {
        CuboidKernel.min_distance(a, b)
    }

    fn check(&self, shape: &Shape) -> CheckReport {
        CuboidKernel.check(shape)
    }
}

/// Fails every FUSE, leaving the other operations intact.
pub(crate) struct BrokenFuseKernel;

impl Kernel for BrokenFuseKernel {
    type Filler = CuboidFiller;

    fn fill(
        &self,
        shape: &Shape,
        tool: &Shape,
        fuzzy_value: f64,
        progress: Option<&mut dyn ProgressIndicator>,
    ) -> CuboidFiller {
        CuboidKernel.fill(shape, tool, fuzzy_value, progress)
    }

    fn build(&self, filler: &CuboidFiller, op: BooleanOp) -> BooleanOutcome {
        if op == BooleanOp::Fuse {
            let mut report = super::Report::new();
            report.fail("fuse not supported");
            return BooleanOutcome::failed(report);
        }
        CuboidKernel.build(filler, op)
    }

    fn volume_of(&self, shape: &Shape) -> f64 {
        CuboidKernel.volume_of(shape)
    }

    fn min_distance(&self, a: &Shape, b: &Shape) -> Result<f64, KernelError> {
        CuboidKernel.min_distance(a, b)
    }

    fn check(&self, shape: &Shape) -> CheckReport {
        CuboidKernel.check(shape)
    }
}
