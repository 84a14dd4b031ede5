use axum::{
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{error, warn};

use crate::error::AppError;

/// An HTTP failure rendered as `{"success": false, "error": <code>, "message": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: u16,
    message: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode) -> Self {
        Self { status }
    }

    pub fn bad_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    pub fn unprocessable() -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &'static str {
        match self.status {
            StatusCode::BAD_REQUEST => "bad request",
            StatusCode::NOT_FOUND => "resource not found",
            StatusCode::METHOD_NOT_ALLOWED => "method not allowed",
            StatusCode::UNPROCESSABLE_ENTITY => "unprocessable",
            _ => "internal server error",
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(what) => {
                warn!("Not found: {}", what);
                Self::not_found()
            }
            AppError::Validation(reason) | AppError::Duplicate(reason) => {
                warn!("Unprocessable request: {}", reason);
                Self::unprocessable()
            }
            other => {
                error!("Request failed: {}", other);
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.status.as_u16(),
            message: self.message(),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Router fallback for unknown paths.
pub async fn not_found() -> ApiError {
    ApiError::not_found()
}

/// axum answers a wrong method with an empty 405; give it the JSON envelope.
pub async fn method_not_allowed_as_json<B>(req: Request<B>, next: Next<B>) -> Response {
    let response = next.run(req).await;
    if response.status() == StatusCode::METHOD_NOT_ALLOWED {
        return ApiError::new(StatusCode::METHOD_NOT_ALLOWED).into_response();
    }
    response
}
