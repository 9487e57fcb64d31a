use thiserror::Error;

use vsl_core::CoreError;
use vsl_oracle::OracleError;

/// Fatal sweep errors.  Unmatchable fixes and failed oracle runs are not
/// errors; they are logged and the sweep carries on.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error("road network has no edges")]
    EmptyNetwork,

    /// A port or file could not be reserved before dispatch.
    #[error("could not reserve run resources: {0}")]
    Lease(#[from] OracleError),

    #[error("could not start worker pool: {0}")]
    ThreadPool(String),

    #[error("every candidate failed and the failure policy excludes failed runs")]
    NoViableCandidate,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid fix for vehicle {vehicle_id:?}: {reason}")]
    InvalidFix { vehicle_id: String, reason: &'static str },
}

pub type SweepResult<T> = Result<T, SweepError>;
