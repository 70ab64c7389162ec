use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

use crate::blueprint::ServiceError;
use crate::db::StoreError;

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ServiceError::Store(StoreError::AlreadyExists { .. }) => StatusCode::BAD_REQUEST,
            ServiceError::Store(StoreError::NotFound { .. })
            | ServiceError::Store(StoreError::AuthorNotFound { .. }) => StatusCode::NOT_FOUND,
            ServiceError::Store(StoreError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ServiceError::Store(StoreError::Database(err)) = self {
            log::error!("storage failure: {err}");
        }
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: &self.to_string(),
        })
    }
}
