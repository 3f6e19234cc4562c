use thiserror::Error;

use crate::serializers::errors::ValidationErrors;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid payload: {0}")]
    Validation(ValidationErrors),

    #[error("not found")]
    NotFound,

    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("database pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation(errors)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
