//! Network-subsystem error type.

use thiserror::Error;

/// Errors produced while loading a road network.  Matching never fails with
/// an error; see [`MatchMiss`](crate::MatchMiss).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed network XML: {0}")]
    Xml(String),

    #[error("<{element}> is missing attribute `{attr}`")]
    MissingAttribute { element: &'static str, attr: &'static str },

    #[error("invalid value {value:?} for `{attr}`")]
    InvalidValue { attr: &'static str, value: String },

    #[error("unsupported projection: {0}")]
    UnsupportedProjection(String),

    #[error("network contains no drivable edges")]
    NoEdges,
}

pub type NetworkResult<T> = Result<T, NetworkError>;
