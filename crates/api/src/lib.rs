//! # Eventbook API
//!
//! The API crate provides the web server for the Eventbook booking service.
//! It exposes a single provider's calendar over HTTP:
//!
//! - `GET /events/free-slots` - Bookable slots for a date, in the caller's timezone
//! - `GET /events` - Booked events whose start falls inside a UTC range
//! - `POST /events` - Book an interval if it does not overlap an existing event
//! - `GET /health`, `GET /version` - Liveness and build information
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Extract request input and call the booking service
//! - **Middleware**: Map domain errors to HTTP responses
//! - **Config**: Handle environment and application configuration
//!
//! Storage is injected as an [`EventRepository`], so the same router runs
//! against PostgreSQL in production and an in-memory store in tests.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Error handling middleware
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use eventbook_core::{BookingService, EventRepository};
use eyre::Result;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// Booking operations over the configured provider schedule
    pub service: BookingService,
}

/// Builds the application router with all routes and the given state.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Event booking endpoints
        .merge(routes::events::routes())
        .with_state(state)
}

/// Installs the global `tracing` subscriber.
///
/// # Errors
///
/// Fails if a global subscriber has already been set.
pub fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Starts the API server with the provided configuration and event store
///
/// # Arguments
///
/// * `config` - API configuration including host, port, and provider schedule
/// * `repository` - Storage for booked events
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use eventbook_api::{config::ApiConfig, start_server};
/// use eventbook_db::InMemoryEventRepository;
///
/// # async fn run() -> eyre::Result<()> {
/// let config = ApiConfig::from_env()?;
/// start_server(config, Arc::new(InMemoryEventRepository::new())).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(
    config: config::ApiConfig,
    repository: Arc<dyn EventRepository>,
) -> Result<()> {
    // Create shared state with dependencies
    let service = BookingService::new(repository, config.schedule.clone());
    let state = Arc::new(ApiState { service });

    let app = app(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();

        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_origin(AllowOrigin::list(allowed));

        app.layer(cors)
    } else {
        app
    };

    // Request tracing and timeout
    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        "Server listening on http://{} (slots {}-{} {}, {} min)",
        addr,
        config.schedule.start_time(),
        config.schedule.end_time(),
        config.schedule.timezone(),
        config.schedule.duration_minutes()
    );
    axum::serve(listener, app).await?;

    Ok(())
}
