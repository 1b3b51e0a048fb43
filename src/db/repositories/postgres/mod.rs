//! Postgres repository implementation using Diesel.
//!
//! This module implements [`BeerRepository`] against a Postgres database.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task;

use crate::db::models::{Beer, BeerFilter, BeerId, BeerStyle, PageRequest};
use crate::db::repository::{
    BeerRepository, ErrorContext, RepositoryError, RepositoryResult,
};

mod models;
mod schema;

use models::{BeerRow, NewBeerRow};
use schema::beers;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// `DATABASE_URL` (or `PG_DATABASE_URL`) is required; the pool and retry
    /// settings fall back to their defaults when unset.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        Ok(Self {
            database_url,
            max_pool_size: env_parse("PG_POOL_MAX", 10),
            min_pool_size: env_parse("PG_POOL_MIN", 1),
            connection_timeout_sec: env_parse("PG_CONN_TIMEOUT_SEC", 30),
            idle_timeout_sec: env_parse("PG_IDLE_TIMEOUT_SEC", 600),
            max_retries: env_parse("PG_MAX_RETRIES", 3),
            retry_delay_ms: env_parse("PG_RETRY_DELAY_MS", 100),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
///
/// Queries run on the blocking thread pool so no async worker is held for
/// the duration of a database call. Transient failures (pool checkout,
/// serialization conflicts) are retried with exponential backoff up to the
/// configured limit.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    // Metrics counters
    total_queries: std::sync::Arc<AtomicU64>,
    failed_queries: std::sync::Arc<AtomicU64>,
    retried_operations: std::sync::Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true) // Validate connections before use
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        // Run migrations once during initialization
        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: std::sync::Arc::new(AtomicU64::new(0)),
            failed_queries: std::sync::Arc::new(AtomicU64::new(0)),
            retried_operations: std::sync::Arc::new(AtomicU64::new(0)),
        })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// Retries the operation up to `max_retries` times when a retryable error
    /// occurs (connection errors, timeouts, serialization failures).
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2; // Exponential backoff
                }

                // Get connection
                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                // Execute the operation
                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    ///
    /// Returns current pool state and query statistics for monitoring.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }

    /// Check if the database connection is healthy.
    pub async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

fn row_to_beer(row: BeerRow) -> RepositoryResult<Beer> {
    let beer_style = row.beer_style.parse::<BeerStyle>().map_err(|e| {
        RepositoryError::internal_with_context(
            e,
            ErrorContext::new("row_to_beer")
                .with_entity("beer")
                .with_entity_id(row.id),
        )
    })?;

    Ok(Beer {
        id: Some(BeerId::new(row.id)),
        beer_name: row.beer_name,
        beer_style,
        upc: row.upc,
        price: row.price,
        quantity_on_hand: row.quantity_on_hand,
        created_date: Some(row.created_date),
        last_modified_date: Some(row.last_modified_date),
        version: Some(row.version),
    })
}

#[async_trait]
impl BeerRepository for PostgresRepository {
    async fn find_by_id(&self, beer_id: BeerId) -> RepositoryResult<Option<Beer>> {
        self.with_conn(move |conn| {
            let row = beers::table
                .find(beer_id.value())
                .select(BeerRow::as_select())
                .first::<BeerRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;

            row.map(row_to_beer).transpose()
        })
        .await
    }

    async fn find_by_upc(&self, upc: &str) -> RepositoryResult<Option<Beer>> {
        let upc = upc.to_string();
        self.with_conn(move |conn| {
            let row = beers::table
                .filter(beers::upc.eq(&upc))
                .order(beers::id.asc())
                .select(BeerRow::as_select())
                .first::<BeerRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;

            row.map(row_to_beer).transpose()
        })
        .await
    }

    async fn find_all(
        &self,
        filter: &BeerFilter,
        page: PageRequest,
    ) -> RepositoryResult<Vec<Beer>> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut query = beers::table.into_boxed();
            if let Some(ref name) = filter.beer_name {
                query = query.filter(beers::beer_name.eq(name.clone()));
            }
            if let Some(style) = filter.beer_style {
                query = query.filter(beers::beer_style.eq(style.as_str()));
            }

            let rows = query
                .order(beers::id.asc())
                .offset(page.offset())
                .limit(page.limit())
                .select(BeerRow::as_select())
                .load::<BeerRow>(conn)
                .map_err(map_diesel_error)?;

            rows.into_iter().map(row_to_beer).collect()
        })
        .await
    }

    async fn save(&self, beer: Beer) -> RepositoryResult<Beer> {
        self.with_conn(move |conn| {
            let row = match beer.id {
                None => {
                    let new_row = NewBeerRow {
                        beer_name: beer.beer_name.clone(),
                        beer_style: beer.beer_style.as_str().to_string(),
                        upc: beer.upc.clone(),
                        price: beer.price.clone(),
                        quantity_on_hand: beer.quantity_on_hand,
                    };

                    diesel::insert_into(beers::table)
                        .values(&new_row)
                        .returning(BeerRow::as_returning())
                        .get_result::<BeerRow>(conn)
                        .map_err(map_diesel_error)?
                }
                Some(id) => {
                    // Only the mutable columns change; created_date stays,
                    // last_modified_date and version advance server-side.
                    diesel::update(beers::table.find(id.value()))
                        .set((
                            beers::beer_name.eq(beer.beer_name.clone()),
                            beers::beer_style.eq(beer.beer_style.as_str()),
                            beers::upc.eq(beer.upc.clone()),
                            beers::price.eq(beer.price.clone()),
                            beers::last_modified_date.eq(diesel::dsl::now),
                            beers::version.eq(beers::version + 1),
                        ))
                        .returning(BeerRow::as_returning())
                        .get_result::<BeerRow>(conn)
                        .map_err(|e| {
                            map_diesel_error(e).into_not_found_for(id)
                        })?
                }
            };

            row_to_beer(row)
        })
        .await
    }

    async fn delete_by_id(&self, beer_id: BeerId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            // Zero rows affected means the id did not exist; that is fine.
            diesel::delete(beers::table.find(beer_id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            Ok(())
        })
        .await
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }
}

impl RepositoryError {
    /// Attach the beer id to a not-found raised while updating it.
    fn into_not_found_for(self, id: BeerId) -> Self {
        match self {
            RepositoryError::NotFound { message, .. } => {
                RepositoryError::not_found_with_context(
                    message,
                    ErrorContext::new("save")
                        .with_entity("beer")
                        .with_entity_id(id.value()),
                )
            }
            other => other,
        }
    }
}
