use pipedesk::api::run_server;
use pipedesk::config::AppConfig;
use pipedesk::observability::init_tracing;
use pipedesk::storage::create_pool;
use pipedesk::{Result, APP_NAME, VERSION};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; environment variables still apply.
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env()?;
    init_tracing(&config.observability)?;

    info!(
        service = %config.observability.service_name,
        version = VERSION,
        "starting {}",
        APP_NAME
    );

    let pool = create_pool(&config.database).await?;
    run_server(pool, config).await
}
