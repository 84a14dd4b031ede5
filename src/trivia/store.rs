use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Mutex;
use tracing::debug;

use super::models::{Category, NewQuestion, Question};
use crate::db::matches_term;
use crate::error::{AppError, Result};

/// Storage trait for the question bank
#[async_trait]
pub trait TriviaStore: Send + Sync {
    async fn categories(&self) -> Result<Vec<Category>>;
    async fn category(&self, id: i64) -> Result<Option<Category>>;

    /// All questions, ordered by id.
    async fn questions(&self) -> Result<Vec<Question>>;
    async fn questions_in_category(&self, category_id: i64) -> Result<Vec<Question>>;
    /// Case-insensitive literal substring match on the question text.
    async fn search_questions(&self, term: &str) -> Result<Vec<Question>>;

    /// Insert and return the new id. Rejects exact-duplicate question text and unknown categories.
    async fn create_question(&self, new: &NewQuestion) -> Result<i64>;
    /// `false` when no question had that id.
    async fn delete_question(&self, id: i64) -> Result<bool>;

    /// Quiz candidates: one category, or every question when `None`.
    async fn quiz_pool(&self, category_id: Option<i64>) -> Result<Vec<Question>>;
}

pub struct SqliteTriviaStore {
    conn: Mutex<Connection>,
}

const QUESTION_COLUMNS: &str = "id, question, answer, category, difficulty";

fn question_from_row(row: &Row<'_>) -> rusqlite::Result<Question> {
    Ok(Question {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        category: row.get(3)?,
        difficulty: row.get(4)?,
    })
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        kind: row.get(1)?,
    })
}

impl SqliteTriviaStore {
    /// Wrap a connection that already has the trivia schema.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut conn = self.conn.lock().map_err(|_| AppError::lock_poisoned())?;
        f(&mut conn)
    }

    fn query_questions(&self, sql: &str, args: impl rusqlite::Params) -> Result<Vec<Question>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map(args, question_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }
}

#[async_trait]
impl TriviaStore for SqliteTriviaStore {
    async fn categories(&self) -> Result<Vec<Category>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, type FROM categories ORDER BY id")?;
            let rows = stmt.query_map([], category_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    async fn category(&self, id: i64) -> Result<Option<Category>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT id, type FROM categories WHERE id = ?1",
                    params![id],
                    category_from_row,
                )
                .optional()?)
        })
    }

    async fn questions(&self) -> Result<Vec<Question>> {
        self.query_questions(
            &format!("SELECT {QUESTION_COLUMNS} FROM questions ORDER BY id"),
            [],
        )
    }

    async fn questions_in_category(&self, category_id: i64) -> Result<Vec<Question>> {
        self.query_questions(
            &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE category = ?1 ORDER BY id"),
            params![category_id],
        )
    }

    async fn search_questions(&self, term: &str) -> Result<Vec<Question>> {
        let mut questions = self.questions().await?;
        questions.retain(|q| matches_term(&q.question, term));
        Ok(questions)
    }

    async fn create_question(&self, new: &NewQuestion) -> Result<i64> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;

            let duplicate: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM questions WHERE question = ?1)",
                params![new.question],
                |row| row.get(0),
            )?;
            if duplicate {
                return Err(AppError::Duplicate(format!(
                    "question '{}' already exists",
                    new.question
                )));
            }

            let category_known: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1)",
                params![new.category],
                |row| row.get(0),
            )?;
            if !category_known {
                return Err(AppError::Validation(format!(
                    "unknown category {}",
                    new.category
                )));
            }

            tx.execute(
                "INSERT INTO questions (question, answer, difficulty, category) VALUES (?1, ?2, ?3, ?4)",
                params![new.question, new.answer, new.difficulty, new.category],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;

            debug!("Created question {}", id);
            Ok(id)
        })
    }

    async fn delete_question(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let deleted = tx.execute("DELETE FROM questions WHERE id = ?1", params![id])?;
            tx.commit()?;
            debug!("Deleted {} question(s) with id {}", deleted, id);
            Ok(deleted > 0)
        })
    }

    async fn quiz_pool(&self, category_id: Option<i64>) -> Result<Vec<Question>> {
        match category_id {
            Some(id) => self.questions_in_category(id).await,
            None => self.questions().await,
        }
    }
}
