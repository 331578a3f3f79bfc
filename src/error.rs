// Error kinds for the pipeline.
//
// Each stage surfaces its own kind so a failed run can be diagnosed from
// the message alone (row index, field name, file path). None of these are
// retried: the pipeline either completes fully or aborts.
use std::path::PathBuf;
use thiserror::Error;

/// A record's numeric field could not be coerced to a non-negative count.
///
/// Raised during aggregation. `row` is the 1-based data-row index (the
/// header row is not counted).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row {row}, field '{field}': cannot coerce '{value}' to a non-negative count")]
pub struct MalformedRecordError {
    pub row: usize,
    pub field: String,
    pub value: String,
}

/// The chart artifact could not be produced or persisted.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("chart font could not be registered")]
    FontRegistration,

    #[error("failed to draw chart: {0}")]
    Draw(String),

    #[error("failed to persist chart to '{path}': {reason}")]
    Persist { path: PathBuf, reason: String },
}

/// The document could not be assembled or flushed.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The chart dependency is missing or unreadable at embed time.
    #[error("chart artifact missing or unreadable at '{path}': {reason}")]
    ChartArtifact { path: PathBuf, reason: String },

    #[error("document backend error: {0}")]
    Backend(String),

    #[error("failed to write report to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Umbrella error for a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read input '{path}': {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("input '{path}' has no header row")]
    MissingHeader { path: PathBuf },

    #[error(transparent)]
    MalformedRecord(#[from] MalformedRecordError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Compose(#[from] ComposeError),
}
