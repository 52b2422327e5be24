use actix_web::{http::StatusCode, HttpResponse};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::store::StoreError;

/// Errors surfaced by the match and fast-match engines.
///
/// The first four abort the mutation and map to 4xx responses. `Store` and
/// `Dependency` mean the engine itself could not commit and map to 500;
/// side-effect failures after a committed write never become errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("a user cannot act on themselves")]
    InvalidActor,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("a fast match request already exists for this pair")]
    AlreadyExists,

    #[error("the fast match request has expired")]
    Expired,

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("dependency unavailable: {0}")]
    Dependency(String),
}

impl EngineError {
    fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidActor => "invalid_actor",
            EngineError::NotFound(_) => "not_found",
            EngineError::AlreadyExists => "already_exists",
            EngineError::Expired => "expired",
            EngineError::Store(_) => "store_error",
            EngineError::Dependency(_) => "dependency_error",
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => EngineError::NotFound("fast match request".to_string()),
            StoreError::AlreadyExists => EngineError::AlreadyExists,
            StoreError::Expired => EngineError::Expired,
            other => EngineError::Store(other),
        }
    }
}

impl actix_web::error::ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::InvalidActor => StatusCode::BAD_REQUEST,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::AlreadyExists => StatusCode::CONFLICT,
            EngineError::Expired => StatusCode::GONE,
            EngineError::Store(_) | EngineError::Dependency(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            status_code: self.status_code().as_u16(),
        })
    }
}
