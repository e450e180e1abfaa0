use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("API error: {0}")]
    ApiError(String),
}
