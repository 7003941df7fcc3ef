use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    api::handler::{
        commit_to_trip, create_trip, get_trip_status, health_check, list_trips, AppState,
    },
    config::Config,
    middleware::{create_cors_layer, rate_limit_middleware, RateLimitLayer},
};

pub fn create_app(state: AppState, config: &Config) -> Router {
    info!("⚙️ Setting up HTTP routes...");

    let rate_limit = RateLimitLayer::new(config.rate_limit_requests, config.rate_limit_window_secs);

    let app = Router::new()
        // Public health check endpoint
        .route("/health", get(health_check))
        // Trip endpoints
        .route("/trips", post(create_trip).get(list_trips))
        .route(
            "/trips/:trip_id/commit",
            post(commit_to_trip).layer(from_fn_with_state(rate_limit, rate_limit_middleware)),
        )
        .route("/trips/:trip_id/status", get(get_trip_status))
        .layer(CompressionLayer::new())
        .layer(create_cors_layer())
        // Add request tracing
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("✓ HTTP routes configured");
    app
}

pub async fn run_server(app: Router, bind_address: &str) -> Result<(), Box<dyn std::error::Error>> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("🌐 Server listening on: {}", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
