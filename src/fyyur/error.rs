use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use super::templates::{NotFoundTemplate, ServerErrorTemplate};
use crate::error::AppError;

/// Render a template into an HTML response with `status`.
///
/// A template that fails to render becomes a bare 500 so a broken error page
/// cannot recurse.
pub fn render_page<T: Template>(status: StatusCode, template: &T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("{}", AppError::from(e));
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
        }
    }
}

/// Failures surfaced to the browser as the 404 or 500 page.
#[derive(Debug)]
pub enum PageError {
    NotFound,
    Internal,
}

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(what) => {
                tracing::debug!("Not found: {}", what);
                PageError::NotFound
            }
            other => {
                error!("Request failed: {}", other);
                PageError::Internal
            }
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::NotFound => render_page(StatusCode::NOT_FOUND, &NotFoundTemplate),
            PageError::Internal => {
                render_page(StatusCode::INTERNAL_SERVER_ERROR, &ServerErrorTemplate)
            }
        }
    }
}

pub async fn not_found() -> PageError {
    PageError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404_page() {
        let response = PageError::from(AppError::NotFound("venue 9".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn database_errors_map_to_500_page() {
        let err = AppError::Database(rusqlite::Error::InvalidQuery);
        let response = PageError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
