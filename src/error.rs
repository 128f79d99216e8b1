use std::path::PathBuf;

use thiserror::Error;

use crate::shape::ShapeKind;

/// Top-level error type for geomerge.
#[derive(Debug, Error)]
pub enum GeomergeError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Errors raised while constructing geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("non-finite coordinate in {0}")]
    NonFinite(&'static str),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors from kernel queries that do not go through a boolean report.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("{0} shape has no geometry")]
    EmptyShape(&'static str),
}

/// Errors related to the boundary topology store.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Invariant violations detected by the classification and imprint engine.
///
/// These are never recovered from: they indicate either a kernel defect or
/// input geometry outside what the engine can reason about.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("volume of {stage} result is negative ({volume})")]
    NegativeVolume { stage: &'static str, volume: f64 },

    #[error("negative common volume {common} exceeds sliver limit {limit}")]
    NegativeCommonVolume { common: f64, limit: f64 },
}

/// Errors related to loading and saving documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed container: {0}")]
    Format(#[from] serde_json::Error),

    #[error("expected a compound or compsolid at top level, not {0}")]
    UnexpectedTopLevel(ShapeKind),

    #[error("expected shape {index} to be a compound, compsolid or solid, not {kind}")]
    UnexpectedChild { index: usize, kind: ShapeKind },

    #[error("container holds {shapes} shapes but {labels} labels")]
    LabelCount { shapes: usize, labels: usize },
}

/// Errors that abort a whole merge run.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{count} shapes were not valid")]
    InvalidShapes { count: usize },

    #[error("{stage} failed for shapes {a} and {b}")]
    PairFailed {
        a: usize,
        b: usize,
        stage: &'static str,
    },

    #[error("intersection of shapes {a} and {b} timed out")]
    PairTimedOut { a: usize, b: usize },

    #[error("shapes {a} and {b} classified as overlapping but imprinted as distinct")]
    ClassificationMismatch { a: usize, b: usize },

    #[error("number of shapes changed after merge, {before} => {after}")]
    CountChanged { before: usize, after: usize },

    #[error("non-trivial change in volume during merge for shapes {indices:?}")]
    VolumeChanged { indices: Vec<usize> },

    #[error("{context}: {source}")]
    Engine {
        context: String,
        source: EngineError,
    },
}

/// Convenience type alias for results using [`GeomergeError`].
pub type Result<T> = std::result::Result<T, GeomergeError>;
