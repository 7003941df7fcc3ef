use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    api::handler::AppState,
    config::Config,
    error::AppResult,
    gateway::{MockGateway, PaymentGateway, StripeGateway},
    ledger::CommitmentLedger,
    settlement::SettlementCoordinator,
    trips::TripRegistry,
};

pub fn initialize_app_state(config: &Config) -> AppResult<AppState> {
    info!("Initializing application components ...");

    let ledger = Arc::new(CommitmentLedger::new());
    let registry = Arc::new(TripRegistry::new(ledger.clone()));

    let gateway: Arc<dyn PaymentGateway> = match &config.stripe_secret_key {
        Some(secret_key) => Arc::new(StripeGateway::with_api_url(
            secret_key.clone(),
            config.stripe_api_url.clone(),
        )),
        None => {
            warn!("⚠️  STRIPE_SECRET_KEY not set - using mock gateway, no real charges");
            Arc::new(MockGateway::new())
        }
    };
    info!("✅ Payment gateway configured: {}", gateway.name());

    let coordinator = Arc::new(SettlementCoordinator::new(
        registry.clone(),
        ledger,
        gateway,
    ));

    Ok(AppState {
        registry,
        coordinator,
    })
}
