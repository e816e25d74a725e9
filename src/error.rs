//! Error taxonomy for the transformation pipeline.

use thiserror::Error;

/// Fatal conditions that abort a pipeline run.
///
/// Field-level gaps inside a quay are not errors; they are absorbed with
/// `null` defaults and counted in [`RunStats`](crate::stats::RunStats).
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("XML parse failed: {0}")]
    Parse(#[from] roxmltree::Error),

    #[error("Unexpected document shape: missing `{0}`")]
    SchemaShape(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
