use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use eventbook_api::{config::ApiConfig, init_tracing};
use eventbook_core::EventRepository;
use eventbook_db::{
    InMemoryEventRepository, PgEventRepository, create_pool, schema::initialize_database,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;
    init_tracing(config.log_level)?;

    let repository: Arc<dyn EventRepository> = match &config.database_url {
        Some(database_url) => {
            let db_pool = create_pool(database_url).await?;
            initialize_database(&db_pool).await?;
            info!("Using PostgreSQL event store");
            Arc::new(PgEventRepository::new(db_pool))
        }
        None => {
            warn!("DATABASE_URL is not set, bookings are kept in memory and lost on restart");
            Arc::new(InMemoryEventRepository::new())
        }
    };

    // Start API server
    eventbook_api::start_server(config, repository).await?;

    Ok(())
}
