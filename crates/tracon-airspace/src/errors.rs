//! Error types for airport data loading and validation.

use thiserror::Error;

pub type AirspaceResult<T> = std::result::Result<T, AirspaceError>;

#[derive(Error, Debug)]
pub enum AirspaceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate runway end: {0}")]
    DuplicateRunway(String),

    #[error("default runway {0} is not defined")]
    UnknownDefaultRunway(String),

    #[error("procedure {procedure} references unknown fix {fix}")]
    UnknownProcedureFix { procedure: String, fix: String },

    #[error("polygon for {0} has fewer than 3 vertices")]
    DegeneratePolygon(String),
}
