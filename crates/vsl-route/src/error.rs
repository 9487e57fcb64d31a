use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("route file XML error: {0}")]
    Xml(String),
}

pub type RouteResult<T> = Result<T, RouteError>;
