use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::error::ApiError;
use super::models::{
    category_map, CategoriesResponse, Created, Deleted, NewQuestion, QuestionList, QuestionPage,
    QuizRequest, QuizResponse, SearchRequest,
};
use super::pagination::{page_number, paginate};
use super::quiz::pick_question;
use super::store::TriviaStore;
use crate::constants::ALL_CATEGORIES;
use crate::error::AppError;

#[derive(Clone)]
pub struct TriviaState {
    pub store: Arc<dyn TriviaStore>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|e| {
        warn!("Rejected request body: {}", e);
        ApiError::bad_request()
    })
}

/// Non-integer ids cannot name a row, so they are "not found" rather than malformed.
fn id_param(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id).map_err(|_| ApiError::not_found())
}

pub async fn get_categories(
    State(state): State<TriviaState>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = state.store.categories().await?;
    Ok(Json(CategoriesResponse {
        success: true,
        categories: category_map(&categories),
    }))
}

pub async fn get_questions(
    State(state): State<TriviaState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<QuestionPage>, ApiError> {
    let questions = state.store.questions().await?;
    let page = page_number(query.page.as_deref());

    let current = paginate(&questions, page);
    if current.is_empty() {
        return Err(ApiError::not_found());
    }

    let categories = state.store.categories().await?;
    Ok(Json(QuestionPage {
        success: true,
        questions: current.to_vec(),
        total_questions: questions.len(),
        categories: category_map(&categories),
        current_category: None,
    }))
}

pub async fn delete_question(
    State(state): State<TriviaState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Deleted>, ApiError> {
    let id = id_param(path)?;
    if !state.store.delete_question(id).await? {
        return Err(ApiError::not_found());
    }
    info!("Deleted question {}", id);
    Ok(Json(Deleted {
        success: true,
        deleted: id,
    }))
}

pub async fn create_question(
    State(state): State<TriviaState>,
    payload: Result<Json<NewQuestion>, JsonRejection>,
) -> Result<Json<Created>, ApiError> {
    let new = json_body(payload)?;
    new.validate().map_err(AppError::Validation)?;

    let id = state.store.create_question(&new).await?;
    info!("Created question {} in category {}", id, new.category);
    Ok(Json(Created {
        success: true,
        created: id,
    }))
}

pub async fn search_questions(
    State(state): State<TriviaState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<QuestionList>, ApiError> {
    let search = json_body(payload)?;
    let questions = state.store.search_questions(&search.search_term).await?;
    Ok(Json(QuestionList {
        success: true,
        total_questions: questions.len(),
        questions,
        current_category: None,
    }))
}

pub async fn questions_by_category(
    State(state): State<TriviaState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<QuestionList>, ApiError> {
    let id = id_param(path)?;
    let category = state
        .store
        .category(id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    let questions = state.store.questions_in_category(category.id).await?;
    Ok(Json(QuestionList {
        success: true,
        total_questions: questions.len(),
        questions,
        current_category: Some(category_map([&category])),
    }))
}

pub async fn quiz_question(
    State(state): State<TriviaState>,
    payload: Result<Json<QuizRequest>, JsonRejection>,
) -> Result<Json<QuizResponse>, ApiError> {
    let quiz = json_body(payload)?;
    let category = match quiz.quiz_category.id {
        ALL_CATEGORIES => None,
        id => Some(id),
    };

    let pool = state.store.quiz_pool(category).await?;
    let question = {
        let mut rng = rand::thread_rng();
        pick_question(&pool, &quiz.previous_questions, &mut rng).cloned()
    };

    if question.is_none() {
        info!(
            "Quiz exhausted after {} question(s)",
            quiz.previous_questions.len()
        );
    }
    Ok(Json(QuizResponse {
        success: true,
        question,
    }))
}
