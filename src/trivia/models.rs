use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// `{"<id>": "<type>"}`, the shape the frontend expects for category maps.
pub type CategoryMap = BTreeMap<i64, String>;

pub fn category_map<'a, I>(categories: I) -> CategoryMap
where
    I: IntoIterator<Item = &'a Category>,
{
    categories
        .into_iter()
        .map(|c| (c.id, c.kind.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    #[serde(deserialize_with = "int_or_string")]
    pub difficulty: i64,
    #[serde(deserialize_with = "int_or_string")]
    pub category: i64,
}

impl NewQuestion {
    /// Blank text or a difficulty outside 1..=5 is unprocessable.
    pub fn validate(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("question text is required".to_string());
        }
        if self.answer.trim().is_empty() {
            return Err("answer text is required".to_string());
        }
        if !(1..=5).contains(&self.difficulty) {
            return Err(format!("difficulty {} is outside 1..=5", self.difficulty));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    #[serde(rename = "searchTerm")]
    pub search_term: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizRequest {
    #[serde(default)]
    pub previous_questions: Vec<i64>,
    pub quiz_category: QuizCategory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizCategory {
    #[serde(deserialize_with = "int_or_string")]
    pub id: i64,
}

/// The browser client posts select-box values, so ids may arrive as `"3"`.
fn int_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        Str(String),
    }

    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(n) => Ok(n),
        IntOrString::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: CategoryMap,
}

#[derive(Debug, Serialize)]
pub struct QuestionPage {
    pub success: bool,
    pub questions: Vec<Question>,
    pub total_questions: usize,
    pub categories: CategoryMap,
    pub current_category: Option<CategoryMap>,
}

#[derive(Debug, Serialize)]
pub struct QuestionList {
    pub success: bool,
    pub questions: Vec<Question>,
    pub total_questions: usize,
    pub current_category: Option<CategoryMap>,
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub success: bool,
    pub created: i64,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub success: bool,
    pub deleted: i64,
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,
}
