//! Oracle-subsystem error type.

use std::path::PathBuf;

use thiserror::Error;

use vsl_route::RouteError;

/// Errors from a single oracle run.  The sweep downgrades every one of these
/// to an empty outcome; none of them aborts a sweep.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("failed to start simulator `{binary}`: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not connect to simulator on port {port} after {attempts} attempts")]
    Connect { port: u16, attempts: u32 },

    #[error("TraCI command 0x{command:02x} failed: {message}")]
    Command { command: u8, message: String },

    #[error("TraCI protocol error: {0}")]
    Protocol(String),

    #[error("simulator wrote no tripinfo to {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("malformed tripinfo output: {0}")]
    Tripinfo(String),

    #[error("no free port available")]
    PortsExhausted,
}

pub type OracleResult<T> = Result<T, OracleError>;
