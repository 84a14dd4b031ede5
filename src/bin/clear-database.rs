use anyhow::Context;
use fyyur_trivia::config::Config;
use fyyur_trivia::db::{AppKind, DatabaseManager};

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = Config::load("config.toml").context("loading configuration")?;

    println!("⚠️  WARNING: This will delete ALL Fyyur and Trivia data!");
    println!("   fyyur:  {}", config.fyyur.database);
    println!("   trivia: {}", config.trivia.database);
    println!("Press Enter to continue or Ctrl+C to cancel...");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    println!("🗑️  Clearing databases...");
    for (app, path) in [
        (AppKind::Fyyur, &config.fyyur.database),
        (AppKind::Trivia, &config.trivia.database),
    ] {
        let mut db = DatabaseManager::open(path, app)?;
        db.run_migrations()?;
        db.clear_all_data()?;
        println!("   {} cleared", db.app());
    }

    println!("✅ Databases cleared successfully!");
    Ok(())
}
