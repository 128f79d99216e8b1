use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::MergeConfig;
use crate::document::Document;
use crate::error::{GeomergeError, MergeError, Result};
use crate::kernel::Kernel;
use crate::operations::{
    snap_shapes, ClassifyIntersection, Glue, Imprint, ImprintStatus, IntersectStatus,
};
use crate::shape::Shape;
use crate::topology::{TopologyCounts, TopologyStore};

/// How the pairs of a document were resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairStats {
    /// Pairs further apart than the tolerance.
    pub screened_out: usize,
    pub distinct: usize,
    pub touching: usize,
    /// Overlapping pairs that were imprinted.
    pub imprinted: usize,
    /// Classifications retried after a timeout.
    pub retried: usize,
}

/// Result of a successful merge.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The merged shapes, in input order and with the input labels.
    pub document: Document,
    pub pairs: PairStats,
    /// Boundary entities before coincident ones were shared.
    pub before_glue: TopologyCounts,
    /// Boundary entities after sharing. Only the counts are kept; the glued
    /// store is dropped once they are taken.
    pub after_glue: TopologyCounts,
}

/// Merges the shapes of a document so that neighbours share their
/// boundaries instead of overlapping.
pub struct Merger<'k, K: Kernel> {
    kernel: &'k K,
    config: MergeConfig,
}

impl<'k, K: Kernel> Merger<'k, K> {
    #[must_use]
    pub fn new(kernel: &'k K, config: MergeConfig) -> Self {
        Self { kernel, config }
    }

    /// Merges `document`, leaving it untouched.
    ///
    /// Pairs are processed sequentially in index order; each imprint
    /// replaces both shapes of its pair before the next pair is examined.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, any pair fails or
    /// times out, the topology cannot be glued, or the audit finds a changed
    /// shape count or volume.
    pub fn merge(&self, document: &Document) -> Result<MergeOutcome> {
        self.config.validate()?;
        let tolerance = self.config.tolerance;

        let mut shapes = document.shapes().to_vec();
        let mut pairs = PairStats::default();
        let mut contacts = Vec::new();
        for a in 0..shapes.len() {
            for b in a + 1..shapes.len() {
                if !shapes[a].has_solids() || !shapes[b].has_solids() {
                    continue;
                }
                let distance = self.kernel.min_distance(&shapes[a], &shapes[b])?;
                if distance > tolerance {
                    pairs.screened_out += 1;
                    continue;
                }

                match self.classify(&shapes, a, b, &mut pairs)? {
                    IntersectStatus::Distinct => pairs.distinct += 1,
                    IntersectStatus::Touching => {
                        pairs.touching += 1;
                        contacts.push((a, b));
                    }
                    IntersectStatus::Overlap => {
                        let (shape, tool) = self.imprint(&shapes, a, b)?;
                        shapes[a] = shape;
                        shapes[b] = tool;
                        pairs.imprinted += 1;
                        contacts.push((a, b));
                    }
                    IntersectStatus::Timeout => {
                        return Err(MergeError::PairTimedOut { a, b }.into());
                    }
                    IntersectStatus::Failed => {
                        return Err(MergeError::PairFailed {
                            a,
                            b,
                            stage: "classification",
                        }
                        .into());
                    }
                }
            }
        }
        info!(
            screened_out = pairs.screened_out,
            distinct = pairs.distinct,
            touching = pairs.touching,
            imprinted = pairs.imprinted,
            "pairs resolved"
        );

        let shapes = snap_shapes(&shapes, &contacts, tolerance);
        let store = TopologyStore::from_shapes(&shapes);
        let before_glue = store.counts();
        let after_glue = Glue::new(tolerance).execute(&store)?.counts();
        info!(
            vertices = %format!("{} => {}", before_glue.vertices, after_glue.vertices),
            edges = %format!("{} => {}", before_glue.edges, after_glue.edges),
            faces = %format!("{} => {}", before_glue.faces, after_glue.faces),
            "glued coincident boundaries"
        );

        let mut merged = document.clone();
        merged.replace_shapes(shapes)?;
        audit_volumes(self.kernel, document, &merged, tolerance)?;
        debug!(
            before = document.total_volume(self.kernel),
            after = merged.total_volume(self.kernel),
            "total volume"
        );

        Ok(MergeOutcome {
            document: merged,
            pairs,
            before_glue,
            after_glue,
        })
    }

    fn classify(
        &self,
        shapes: &[Shape],
        a: usize,
        b: usize,
        pairs: &mut PairStats,
    ) -> Result<IntersectStatus> {
        let mut result = ClassifyIntersection::new(&shapes[a], &shapes[b], self.config.tolerance)
            .with_pave_timeout(self.config.pave_timeout_ms)
            .execute(self.kernel)
            .map_err(|err| in_pair(err, a, b))?;

        if result.status == IntersectStatus::Timeout {
            warn!(
                a,
                b,
                seconds = result.pave_time_seconds,
                "intersection timed out"
            );
            if !self.config.retry_timeouts {
                return Err(MergeError::PairTimedOut { a, b }.into());
            }
            pairs.retried += 1;
            result = ClassifyIntersection::new(&shapes[a], &shapes[b], self.config.tolerance)
                .execute(self.kernel)
                .map_err(|err| in_pair(err, a, b))?;
        }

        debug!(
            a,
            b,
            status = ?result.status,
            fuzzy = result.fuzzy_value,
            warnings = result.num_filler_warnings
                + result.num_common_warnings
                + result.num_section_warnings,
            common = ?result.vol_common,
            seconds = result.pave_time_seconds,
            "classified pair"
        );
        Ok(result.status)
    }

    fn imprint(&self, shapes: &[Shape], a: usize, b: usize) -> Result<(Shape, Shape)> {
        let result = Imprint::new(&shapes[a], &shapes[b], self.config.tolerance)
            .execute(self.kernel)
            .map_err(|err| in_pair(err, a, b))?;
        debug!(
            a,
            b,
            status = ?result.status,
            common = ?result.vol_common,
            cut = ?result.vol_cut,
            cut21 = ?result.vol_cut21,
            "imprinted pair"
        );

        match (result.status, result.shape, result.tool) {
            (ImprintStatus::Distinct, _, _) => {
                Err(MergeError::ClassificationMismatch { a, b }.into())
            }
            (
                ImprintStatus::MergeIntoShape | ImprintStatus::MergeIntoTool,
                Some(shape),
                Some(tool),
            ) => Ok((shape, tool)),
            _ => Err(MergeError::PairFailed {
                a,
                b,
                stage: "imprint",
            }
            .into()),
        }
    }
}

/// Attaches the pair to engine errors so the failing shapes can be found.
fn in_pair(err: GeomergeError, a: usize, b: usize) -> GeomergeError {
    match err {
        GeomergeError::Engine(source) => MergeError::Engine {
            context: format!("shapes {a} and {b}"),
            source,
        }
        .into(),
        other => other,
    }
}

/// Compares a merged document against its input.
///
/// Every shape whose volume changed by more than `tolerance` times the
/// smaller of its two volumes is logged; the audit fails if there is any.
///
/// # Errors
///
/// Returns [`MergeError::CountChanged`] if the documents differ in length,
/// or [`MergeError::VolumeChanged`] listing every changed shape.
pub fn audit_volumes<K: Kernel>(
    kernel: &K,
    input: &Document,
    output: &Document,
    tolerance: f64,
) -> std::result::Result<(), MergeError> {
    if input.len() != output.len() {
        return Err(MergeError::CountChanged {
            before: input.len(),
            after: output.len(),
        });
    }

    let mut indices = Vec::new();
    for (index, (before, after)) in input.shapes().iter().zip(output.shapes()).enumerate() {
        let v1 = kernel.volume_of(before);
        let v2 = kernel.volume_of(after);
        if (v1 - v2).abs() > v1.min(v2) * tolerance {
            warn!(
                index,
                label = input.label(index).unwrap_or_default(),
                "non-trivial change in volume during merge, {v1} => {v2}"
            );
            indices.push(index);
        }
    }

    if indices.is_empty() {
        Ok(())
    } else {
        Err(MergeError::VolumeChanged { indices })
    }
}

/// Loads `input`, merges it and writes the result to `output`.
///
/// Nothing is written unless every step succeeds.
///
/// # Errors
///
/// Returns an error if loading, the optional geometry check, merging or
/// saving fails.
pub fn run<K: Kernel>(
    kernel: &K,
    input: &Path,
    output: &Path,
    config: &MergeConfig,
) -> Result<MergeOutcome> {
    info!(
        input = %input.display(),
        output = %output.display(),
        tolerance = config.tolerance,
        "starting merge"
    );

    let document = Document::load(input)?;
    info!(shapes = document.len(), "document loaded");

    if config.check_geometry {
        let count = document.count_invalid_shapes(kernel);
        if count > 0 {
            return Err(MergeError::InvalidShapes { count }.into());
        }
        info!("geometry checks passed");
    }

    let outcome = Merger::new(kernel, config.clone()).merge(&document)?;

    info!("writing merged document");
    outcome.document.save(output)?;
    Ok(outcome)
}
