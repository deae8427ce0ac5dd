use std::env::set_var;
use std::sync::Arc;

use lambda_http::{run, Error};
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::{config::AppConfig, create_app, state::AppState};
use shared::auth::clock::SystemClock;
use shared::repositories::meeting_repository::PostgresMeetingRepository;
use shared::repositories::member_repository::PostgresMemberRepository;
use shared::repositories::session_cache::RedisSessionCache;

#[tokio::main]
async fn main() -> Result<(), Error> {
    set_var("AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH", "true");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("../shared/migrations").run(&pool).await?;
    info!("Database migrations applied");

    let redis_client = redis::Client::open(config.redis_url.as_str())?;
    let redis_connection = ConnectionManager::new(redis_client).await?;

    let state = AppState::new(
        Arc::new(PostgresMemberRepository::new(pool.clone())),
        Arc::new(PostgresMeetingRepository::new(pool)),
        Arc::new(RedisSessionCache::new(redis_connection)),
        Arc::new(config.signing_key),
        Arc::new(SystemClock),
        config.token_lifetimes,
    );

    info!("Moit API starting");
    run(create_app(state)).await
}
