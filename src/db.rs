use crate::constants::{FYYUR_APP, TRIVIA_APP};
use crate::error::Result;
use rusqlite::Connection;
use std::fmt;
use std::path::Path;
use tracing::info;

/// Which application's schema a database holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppKind {
    Fyyur,
    Trivia,
}

impl AppKind {
    pub fn name(self) -> &'static str {
        match self {
            AppKind::Fyyur => FYYUR_APP,
            AppKind::Trivia => TRIVIA_APP,
        }
    }

    fn migration_sql(self) -> &'static str {
        match self {
            AppKind::Fyyur => include_str!("../migrations/001_create_fyyur_tables.sql"),
            AppKind::Trivia => include_str!("../migrations/002_create_trivia_tables.sql"),
        }
    }

    fn seed_sql(self) -> &'static str {
        match self {
            AppKind::Fyyur => include_str!("../seeds/fyyur.sql"),
            AppKind::Trivia => include_str!("../seeds/trivia.sql"),
        }
    }

    /// Child tables first so the delete order respects foreign keys.
    fn tables(self) -> &'static [&'static str] {
        match self {
            AppKind::Fyyur => &["shows", "venues", "artists"],
            AppKind::Trivia => &["questions", "categories"],
        }
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct DatabaseManager {
    conn: Connection,
    app: AppKind,
}

impl DatabaseManager {
    /// Open (or create) the SQLite file at `path`. `:memory:` opens a private in-memory database.
    pub fn open<P: AsRef<Path>>(path: P, app: AppKind) -> Result<Self> {
        let path = path.as_ref();
        let conn = if path == Path::new(":memory:") {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            info!("Opening {} database at {}", app, path.display());
            Connection::open(path)?
        };
        // Cascades and non-null foreign keys are only enforced with this pragma on.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn, app })
    }

    pub fn open_in_memory(app: AppKind) -> Result<Self> {
        Self::open(":memory:", app)
    }

    pub fn app(&self) -> AppKind {
        self.app
    }

    /// Run database migrations
    pub fn run_migrations(&self) -> Result<()> {
        info!("Running {} migrations...", self.app);
        self.conn.execute_batch(self.app.migration_sql())?;
        info!("{} migrations completed successfully", self.app);
        Ok(())
    }

    /// Load the sample rows. Rows keep fixed ids, so re-seeding is a no-op.
    pub fn seed(&self) -> Result<()> {
        self.conn.execute_batch(self.app.seed_sql())?;
        info!("Seeded {} database", self.app);
        Ok(())
    }

    /// Clear all data from the database (useful for development)
    pub fn clear_all_data(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        for table in self.app.tables() {
            tx.execute(&format!("DELETE FROM {table}"), [])?;
        }
        tx.commit()?;
        info!("Cleared all data from {} database", self.app);
        Ok(())
    }

    pub fn row_count(&self, table: &str) -> Result<i64> {
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

/// Case-insensitive substring test with full Unicode case folding.
///
/// SQLite's `lower()` only folds ASCII, so name and text searches filter in Rust.
/// The term is literal; an empty term matches everything.
pub fn matches_term(text: &str, term: &str) -> bool {
    text.to_lowercase().contains(&term.to_lowercase())
}

/// Open, migrate and optionally seed in one step; what the serve commands and tests want.
pub fn prepare(path: &str, app: AppKind, seed: bool) -> Result<Connection> {
    let db = DatabaseManager::open(path, app)?;
    db.run_migrations()?;
    if seed {
        db.seed()?;
    }
    Ok(db.into_connection())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_matching_folds_non_ascii_letters() {
        assert!(matches_term("CAFÉ ÉTOILE", "café"));
        assert!(matches_term("anything", ""));
        assert!(!matches_term("100 percent", "%"));
    }

    #[test]
    fn migrations_are_idempotent() {
        let db = DatabaseManager::open_in_memory(AppKind::Trivia).unwrap();
        db.run_migrations().unwrap();
        db.run_migrations().unwrap();
        assert_eq!(db.row_count("questions").unwrap(), 0);
    }

    #[test]
    fn seeding_twice_does_not_duplicate_rows() {
        let db = DatabaseManager::open_in_memory(AppKind::Fyyur).unwrap();
        db.run_migrations().unwrap();
        db.seed().unwrap();
        let venues = db.row_count("venues").unwrap();
        db.seed().unwrap();
        assert_eq!(db.row_count("venues").unwrap(), venues);
        assert!(venues > 0);
    }

    #[test]
    fn clear_removes_every_row() {
        let mut db = DatabaseManager::open_in_memory(AppKind::Fyyur).unwrap();
        db.run_migrations().unwrap();
        db.seed().unwrap();
        db.clear_all_data().unwrap();
        for table in ["shows", "venues", "artists"] {
            assert_eq!(db.row_count(table).unwrap(), 0);
        }
    }

    #[test]
    fn deleting_a_category_cascades_to_its_questions() {
        let db = DatabaseManager::open_in_memory(AppKind::Trivia).unwrap();
        db.run_migrations().unwrap();
        db.seed().unwrap();
        let before = db.row_count("questions").unwrap();
        let conn = db.into_connection();
        let in_science: i64 = conn
            .query_row("SELECT COUNT(*) FROM questions WHERE category = 1", [], |r| r.get(0))
            .unwrap();
        conn.execute("DELETE FROM categories WHERE id = 1", []).unwrap();
        let after: i64 = conn
            .query_row("SELECT COUNT(*) FROM questions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(after, before - in_science);
    }
}
