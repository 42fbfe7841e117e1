use std::str::FromStr;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgConnection, PgPool, Postgres};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::DatabaseConfig;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");
const SCHEMA_LOCK_KEY: i64 = 0x636f_7572_7365;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the shared connection pool. The pool is created once by the
/// binary and handed to the router as state; nothing here is global.
pub struct DatabaseManager;

impl DatabaseManager {
    pub fn database_url() -> Result<String, DatabaseError> {
        std::env::var("DATABASE_URL").map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))
    }

    fn connect_options(url: &str, config: &DatabaseConfig) -> Result<PgConnectOptions, DatabaseError> {
        let options = PgConnectOptions::from_str(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        Ok(if config.enable_query_logging {
            options
        } else {
            options.disable_statement_logging()
        })
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
    }

    /// Connect eagerly so a bad URL or unreachable server fails at startup.
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let options = Self::connect_options(url, config)?;
        let pool = Self::pool_options(config).connect_with(options).await?;
        info!("Created database pool for: {}", Self::redact_url(url));
        Ok(pool)
    }

    /// Pool that opens connections on first use.
    pub fn connect_lazy(url: &str, config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let options = Self::connect_options(url, config)?;
        Ok(Self::pool_options(config).connect_lazy_with(options))
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Create any missing tables from `sql/schema.sql`. Existing tables are
    /// left alone; there is no migration step.
    pub async fn bootstrap_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        let mut conn = pool.acquire().await?;

        // Serialize concurrent bootstraps; CREATE ... IF NOT EXISTS can still race.
        sqlx::query("SELECT pg_advisory_lock($1)")
            .bind(SCHEMA_LOCK_KEY)
            .execute(&mut *conn)
            .await?;
        let mut result = Ok(());
        for statement in schema_statements(SCHEMA_SQL) {
            if let Err(e) = sqlx::query(&statement).execute(&mut *conn).await {
                result = Err(e);
                break;
            }
        }
        sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(SCHEMA_LOCK_KEY)
            .execute(&mut *conn)
            .await?;
        result?;

        info!("Database schema bootstrapped");
        Ok(())
    }

    /// Connection string safe for logs (password masked)
    pub fn redact_url(raw: &str) -> String {
        match url::Url::parse(raw) {
            Ok(mut u) => {
                if u.password().is_some() {
                    let _ = u.set_password(Some("***"));
                }
                u.to_string()
            }
            Err(_) => "<invalid url>".to_string(),
        }
    }
}

/// Split a schema script into statements, dropping `--` comment lines.
fn schema_statements(script: &str) -> Vec<String> {
    let without_comments = script
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");
    without_comments
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Request-scoped database handle. A pooled connection is acquired on the
/// first call to [`RequestDb::conn`] and reused until the request ends, so
/// requests that fail validation never touch the pool.
pub struct RequestDb {
    pool: PgPool,
    conn: Option<PoolConnection<Postgres>>,
}

impl RequestDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, conn: None }
    }

    pub async fn conn(&mut self) -> Result<&mut PgConnection, DatabaseError> {
        let conn = match self.conn.take() {
            Some(c) => c,
            None => {
                debug!("Acquiring request connection");
                self.pool.acquire().await?
            }
        };
        Ok(&mut **self.conn.insert(conn))
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }
}
