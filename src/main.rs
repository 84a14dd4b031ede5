use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use fyyur_trivia::config::{AppConfig, Config};
use fyyur_trivia::constants::{FYYUR_APP, TRIVIA_APP};
use fyyur_trivia::db::{self, AppKind, DatabaseManager};
use fyyur_trivia::fyyur::{fyyur_router, SqliteFyyurStore};
use fyyur_trivia::trivia::{trivia_router, SqliteTriviaStore};
use fyyur_trivia::{logging, metrics, server};

#[derive(Parser)]
#[command(name = "fyyur_trivia")]
#[command(about = "Fyyur venue listings and the Trivia question API")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the Fyyur HTML site
    Fyyur {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Serve the Trivia JSON API
    Trivia {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create tables if they do not exist
    Migrate {
        #[arg(long, value_enum, default_value_t = AppArg::All)]
        app: AppArg,
    },
    /// Load the sample data set
    Seed {
        #[arg(long, value_enum, default_value_t = AppArg::All)]
        app: AppArg,
    },
    /// Delete every row, keeping the tables
    Clear {
        #[arg(long, value_enum, default_value_t = AppArg::All)]
        app: AppArg,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AppArg {
    Fyyur,
    Trivia,
    All,
}

impl AppArg {
    fn kinds(self) -> Vec<AppKind> {
        match self {
            AppArg::Fyyur => vec![AppKind::Fyyur],
            AppArg::Trivia => vec![AppKind::Trivia],
            AppArg::All => vec![AppKind::Fyyur, AppKind::Trivia],
        }
    }
}

fn app_config(config: &Config, app: AppKind) -> &AppConfig {
    match app {
        AppKind::Fyyur => &config.fyyur,
        AppKind::Trivia => &config.trivia,
    }
}

fn open_manager(config: &Config, app: AppKind) -> anyhow::Result<DatabaseManager> {
    let path = &app_config(config, app).database;
    DatabaseManager::open(path, app).with_context(|| format!("opening {app} database at {path}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load(&cli.config).context("loading configuration")?;

    let log_name = match cli.command {
        Commands::Fyyur { .. } => FYYUR_APP,
        Commands::Trivia { .. } => TRIVIA_APP,
        _ => "admin",
    };
    // Held until exit so buffered file logs are flushed.
    let _guard = logging::init_logging(log_name, &config.logging);

    match cli.command {
        Commands::Fyyur { port } => {
            metrics::init_metrics();
            let conn = db::prepare(&config.fyyur.database, AppKind::Fyyur, false)
                .context("preparing fyyur database")?;
            let app = fyyur_router(Arc::new(SqliteFyyurStore::new(conn)));
            let port = port.unwrap_or(config.fyyur.port);
            info!("Serving Fyyur from {}", config.fyyur.database);
            server::start_server(app, &config.server.host, port).await?;
        }
        Commands::Trivia { port } => {
            metrics::init_metrics();
            let conn = db::prepare(&config.trivia.database, AppKind::Trivia, false)
                .context("preparing trivia database")?;
            let app = trivia_router(Arc::new(SqliteTriviaStore::new(conn)));
            let port = port.unwrap_or(config.trivia.port);
            info!("Serving Trivia from {}", config.trivia.database);
            server::start_server(app, &config.server.host, port).await?;
        }
        Commands::Migrate { app } => {
            for kind in app.kinds() {
                open_manager(&config, kind)?.run_migrations()?;
                println!("✅ Migrated {} database", kind);
            }
        }
        Commands::Seed { app } => {
            for kind in app.kinds() {
                let manager = open_manager(&config, kind)?;
                manager.run_migrations()?;
                manager.seed()?;
                println!("🌱 Seeded {} database", kind);
            }
        }
        Commands::Clear { app } => {
            for kind in app.kinds() {
                let mut manager = open_manager(&config, kind)?;
                manager.run_migrations()?;
                manager.clear_all_data()?;
                println!("🗑️  Cleared {} database", kind);
            }
        }
    }
    Ok(())
}
