//! Fyyur: server-rendered listings of venues, artists and the shows between them.

pub mod error;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod router;
pub mod store;
pub mod templates;

pub use router::fyyur_router;
pub use store::{FyyurStore, SqliteFyyurStore};
