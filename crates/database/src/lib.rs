//! SQLite persistence layer for ComfyClaude Studio.
//!
//! This crate provides async database operations for learning modules,
//! podcast episodes, trends and the screenshot inbox using SQLx with SQLite.
//! Every state transition that must be race-free (unit completion, episode
//! generation guard, trend dedup, episode numbering) is expressed here as a
//! single statement or a single transaction.
//!
//! # Example
//!
//! ```no_run
//! use database::{learning, Database, NewModule};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:comfyclaude.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let module = learning::create_module(
//!         db.pool(),
//!         "user-1",
//!         &NewModule::from_topic("Aprende ComfyUI"),
//!     )
//!     .await?;
//!     learning::add_units(db.pool(), "user-1", &module.id, &["Instalación", "Nodos"]).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod learning;
pub mod models;
pub mod podcast_config;
pub mod podcast_episode;
pub mod screenshot;
pub mod trend;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use learning::NewModule;
pub use models::{
    EpisodeChanges, EpisodeStatus, GeneratedAudio, GenerationClaim, LearningModule, LearningUnit,
    ModuleStatus, ModuleWithUnits, NewEpisode, NewTrend, PodcastConfig, PodcastEpisode,
    Screenshot, Trend, TrendCategory,
};
pub use validation::ValidationError;

/// JSON column wrapper used by the models.
pub use sqlx::types::Json;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Set high enough to handle concurrent requests that each hold a connection
    /// for the length of a transaction.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/comfyclaude.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    ///
    /// In-memory databases are private to a single connection, so the pool is
    /// clamped to one connection that is never recycled.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let in_memory = url.contains(":memory:");

        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(10));
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let mut pool_options = SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(30));
        let pool_size = if in_memory {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
            1
        } else {
            pool_size
        };

        let pool = pool_options
            .max_connections(pool_size)
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Generate a new record id.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
