use thiserror::Error;

/// Failures of the collection engine. The `Display` text is what clients
/// see in `{"message": ...}` bodies, so the validation messages stay short.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid ID")]
    InvalidId,
    #[error("Invalid Body")]
    InvalidBody,
    #[error("Invalid query params")]
    InvalidParams,
    #[error("Element Not found")]
    ElementNotFound,
    #[error("endpoint not found")]
    UnknownCollection(String),
    #[error("Unexpected error: {op} is not supported on a {shape} collection")]
    UnsupportedShape { op: &'static str, shape: &'static str },
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("load error: {0}")]
    Load(String),
}

impl ServiceError {
    pub fn unsupported(op: &'static str, shape: &'static str) -> Self {
        Self::UnsupportedShape { op, shape }
    }
}
