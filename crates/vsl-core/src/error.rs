//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant where configuration problems can surface.

use thiserror::Error;

/// Errors produced while validating configuration.  All of them are fatal:
/// they surface before any simulation run is dispatched.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid speed grid: lower {lower} km/h, upper {upper} km/h, step {step} km/h")]
    InvalidGrid { lower: u32, upper: u32, step: u32 },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `vsl-core`.
pub type CoreResult<T> = Result<T, CoreError>;
