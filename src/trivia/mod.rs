//! Trivia: a JSON API over a question bank, with pagination, search and a quiz picker.

pub mod error;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod quiz;
pub mod router;
pub mod store;

pub use router::trivia_router;
pub use store::{SqliteTriviaStore, TriviaStore};
