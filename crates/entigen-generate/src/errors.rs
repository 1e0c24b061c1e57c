use std::path::PathBuf;

use thiserror::Error;

use crate::model::GenerationReport;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Core(#[from] entigen_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "generation failed: {} of {} artifacts written",
        .0.artifacts_written,
        .0.artifacts_total
    )]
    Failed(GenerationReport),
}

pub type Result<T> = std::result::Result<T, GenerationError>;
