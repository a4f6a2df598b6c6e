use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    UnexpectedBody(String),
}

pub type ApiResult<T> = Result<T, ApiError>;
