//! Mapping of core errors onto the response envelope.

use api_shared::{ApiEnvelope, ErrorCode};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clinic_core::CoreError;
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),
    /// The body or query string could not be decoded into the expected shape.
    #[error("malformed {part}: {message}")]
    Malformed { part: &'static str, message: String },
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed {
            part: "body",
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Malformed {
            part: "query",
            message: rejection.body_text(),
        }
    }
}

pub type ApiResult<T> = Result<Json<ApiEnvelope<T>>, ApiError>;
pub type CreatedResult<T> = Result<(StatusCode, Json<ApiEnvelope<T>>), ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiEnvelope::ok(data)))
}

pub fn created<T>(data: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(ApiEnvelope::ok(data))))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            ApiError::Malformed { part, message } => {
                let mut details = BTreeMap::new();
                details.insert(part.to_string(), message);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::ValidationError,
                    format!("malformed request {part}"),
                    Some(details),
                )
            }
            ApiError::Core(CoreError::Validation(fields)) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::ValidationError,
                "validation failed".to_string(),
                Some(fields.into_map()),
            ),
            ApiError::Core(CoreError::BadRequest(m)) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadRequest, m, None)
            }
            ApiError::Core(CoreError::Unauthorized(m)) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, m, None)
            }
            ApiError::Core(CoreError::Forbidden(m)) => {
                (StatusCode::FORBIDDEN, ErrorCode::Forbidden, m, None)
            }
            ApiError::Core(CoreError::NotFound(m)) => {
                (StatusCode::NOT_FOUND, ErrorCode::NotFound, m, None)
            }
            ApiError::Core(CoreError::Conflict(m)) => {
                (StatusCode::CONFLICT, ErrorCode::Conflict, m, None)
            }
            ApiError::Core(other) => {
                tracing::error!("request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    "internal server error".to_string(),
                    None,
                )
            }
        };
        (status, Json(ApiEnvelope::failure(code, message, details))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::FieldErrors;

    #[test]
    fn test_status_for_each_kind() {
        let cases = [
            (CoreError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (CoreError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (CoreError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (CoreError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (CoreError::Conflict("x".into()), StatusCode::CONFLICT),
            (CoreError::Validation(FieldErrors::new()), StatusCode::BAD_REQUEST),
            (
                CoreError::StorageWrite(std::io::Error::other("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).into_response().status(), status);
        }
    }
}
