use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use course_api::config::{self, AppConfig};
use course_api::database::DatabaseManager;
use course_api::handlers::AppState;
use course_api::is_production;

/// Course management API server
#[derive(Debug, Parser)]
#[command(name = "course-api", version, about)]
struct Args {
    /// Bind host (overrides API_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides API_PORT / PORT)
    #[arg(long, short)]
    port: Option<u16>,
}

fn init_tracing() {
    let default_filter = if is_production!() { "warn,sqlx=warn" } else { "info,sqlx=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    init_tracing();

    let mut config: AppConfig = config::config().clone();
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    tracing::info!("Starting Course API in {:?} mode", config.environment);

    let url = DatabaseManager::database_url()?;
    let pool = DatabaseManager::connect(&url, &config.database)
        .await
        .context("failed to connect to database")?;

    if config.database.bootstrap_schema {
        DatabaseManager::bootstrap_schema(&pool)
            .await
            .context("failed to bootstrap schema")?;
    }

    let app = course_api::app(AppState::new(pool), &config);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Course API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
