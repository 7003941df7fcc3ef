mod api;
mod bootstrap;
mod config;
mod error;
mod gateway;
mod ledger;
mod middleware;
mod server;
mod settlement;
mod trips;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Initialize logging and tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,tower_http=debug,tripfund=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("🚀 Starting Trip Commitment Backend");

    dotenv::dotenv().ok();
    let config = config::Config::from_env();

    let state = bootstrap::initialize_app_state(&config)?;
    let app = server::create_app(state, &config);

    server::run_server(app, &config.bind_address).await?;

    Ok(())
}
