use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Upload payload is not a JSON array: {0}")]
    InvalidPayload(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
