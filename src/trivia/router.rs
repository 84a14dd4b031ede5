use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use super::error::{method_not_allowed_as_json, not_found};
use super::handlers::{
    create_question, delete_question, get_categories, get_questions, questions_by_category,
    quiz_question, search_questions, TriviaState,
};
use super::store::TriviaStore;
use crate::constants::TRIVIA_APP;
use crate::server::{cors_layer, with_service_routes};

pub fn trivia_router(store: Arc<dyn TriviaStore>) -> Router {
    let api = Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/:id/questions", get(questions_by_category))
        .route("/questions", get(get_questions).post(create_question))
        .route("/questions/search", post(search_questions))
        .route("/questions/:id", delete(delete_question))
        .route("/quizzes", post(quiz_question))
        .fallback(not_found)
        .with_state(TriviaState { store })
        .layer(middleware::from_fn(method_not_allowed_as_json));

    with_service_routes(api, TRIVIA_APP).layer(cors_layer())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::trivia::models::{Category, NewQuestion, Question};
    use crate::trivia::store::tests::seeded_store;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        trivia_router(Arc::new(seeded_store()))
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn categories_map_ids_to_names() {
        let (status, body) = send(app(), Method::GET, "/categories", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["categories"]["1"], "Science");
        assert_eq!(body["categories"].as_object().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (status, body) = send(app(), Method::GET, "/category", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "resource not found");
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn questions_are_paginated_by_ten() {
        let (status, body) = send(app(), Method::GET, "/questions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["questions"].as_array().unwrap().len(), 10);
        assert_eq!(body["total_questions"], 19);
        assert!(body["current_category"].is_null());
        assert_eq!(body["categories"].as_object().unwrap().len(), 6);

        let (_, second) = send(app(), Method::GET, "/questions?page=2", None).await;
        assert_eq!(second["questions"].as_array().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn page_past_the_end_is_404() {
        let (status, body) = send(app(), Method::GET, "/questions?page=1000", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], 404);
    }

    #[tokio::test]
    async fn delete_existing_then_missing_question() {
        let app = app();
        let (status, body) = send(app.clone(), Method::DELETE, "/questions/5", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], 5);

        let (status, _) = send(app.clone(), Method::DELETE, "/questions/5", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(app, Method::DELETE, "/questions/abc", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_question_then_duplicate_is_422() {
        let app = app();
        let question = json!({
            "question": "Who invented the telegraph?",
            "answer": "Samuel Morse",
            "difficulty": 3,
            "category": 1
        });
        let (status, body) =
            send(app.clone(), Method::POST, "/questions", Some(question.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["created"].as_i64().unwrap() > 0);

        let (status, body) = send(app, Method::POST, "/questions", Some(question)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "unprocessable");
    }

    #[tokio::test]
    async fn malformed_question_body_is_400() {
        let (status, body) = send(
            app(),
            Method::POST,
            "/questions",
            Some(json!({"question": "missing the rest"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "bad request");
    }

    #[tokio::test]
    async fn blank_answer_is_422() {
        let (status, _) = send(
            app(),
            Method::POST,
            "/questions",
            Some(json!({"question": "Q?", "answer": "  ", "difficulty": 1, "category": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn search_returns_matches_or_empty_list() {
        let (status, body) = send(
            app(),
            Method::POST,
            "/questions/search",
            Some(json!({"searchTerm": "penicillin"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_questions"], 1);
        assert_eq!(body["questions"][0]["answer"], "Alexander Fleming");

        let (status, body) = send(
            app(),
            Method::POST,
            "/questions/search",
            Some(json!({"searchTerm": "$"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_questions"], 0);
    }

    #[tokio::test]
    async fn questions_by_category_reports_current_category() {
        let (status, body) = send(app(), Method::GET, "/categories/3/questions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_category"], json!({"3": "Geography"}));
        assert!(body["questions"]
            .as_array()
            .unwrap()
            .iter()
            .all(|q| q["category"] == 3));

        let (status, _) = send(app(), Method::GET, "/categories/10000/questions", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn quiz_skips_previous_questions() {
        // Sports holds questions 10 and 11.
        let (status, body) = send(
            app(),
            Method::POST,
            "/quizzes",
            Some(json!({"previous_questions": [10], "quiz_category": {"type": "Sports", "id": "6"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["question"]["id"], 11);

        let (status, body) = send(
            app(),
            Method::POST,
            "/quizzes",
            Some(json!({"previous_questions": [10, 11], "quiz_category": {"id": 6}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body.get("question").is_none());
    }

    #[tokio::test]
    async fn quiz_over_all_categories() {
        let (status, body) = send(
            app(),
            Method::POST,
            "/quizzes",
            Some(json!({"previous_questions": [], "quiz_category": {"id": 0}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["question"]["id"].as_i64().is_some());
    }

    #[tokio::test]
    async fn wrong_method_is_json_405() {
        let (status, body) = send(app(), Method::PUT, "/categories", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], 405);
    }

    struct BrokenStore;

    #[async_trait]
    impl TriviaStore for BrokenStore {
        async fn categories(&self) -> Result<Vec<Category>> {
            Err(AppError::Internal("disk on fire".into()))
        }
        async fn category(&self, _id: i64) -> Result<Option<Category>> {
            Err(AppError::Internal("disk on fire".into()))
        }
        async fn questions(&self) -> Result<Vec<Question>> {
            Err(AppError::Internal("disk on fire".into()))
        }
        async fn questions_in_category(&self, _id: i64) -> Result<Vec<Question>> {
            Err(AppError::Internal("disk on fire".into()))
        }
        async fn search_questions(&self, _term: &str) -> Result<Vec<Question>> {
            Err(AppError::Internal("disk on fire".into()))
        }
        async fn create_question(&self, _new: &NewQuestion) -> Result<i64> {
            Err(AppError::Internal("disk on fire".into()))
        }
        async fn delete_question(&self, _id: i64) -> Result<bool> {
            Err(AppError::Internal("disk on fire".into()))
        }
        async fn quiz_pool(&self, _category: Option<i64>) -> Result<Vec<Question>> {
            Err(AppError::Internal("disk on fire".into()))
        }
    }

    #[tokio::test]
    async fn store_failure_is_json_500() {
        let app = trivia_router(Arc::new(BrokenStore));
        let (status, body) = send(app, Method::GET, "/categories", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "internal server error");
    }

    #[tokio::test]
    async fn cors_headers_are_present() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/categories")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
