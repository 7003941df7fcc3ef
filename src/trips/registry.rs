use crate::error::{AppError, AppResult};
use crate::ledger::CommitmentLedger;
use crate::trips::models::{Trip, TripPhase};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// In-memory trip store
///
/// Exclusively owns all Trip records. `total_committed` is a derived view
/// over the commitment ledger and is only ever written by `refresh_total`,
/// so it cannot drift from the ledger's authoritative data.
pub struct TripRegistry {
    // In production, this would be PostgreSQL via sqlx
    inner: tokio::sync::RwLock<RegistryInner>,
    ledger: Arc<CommitmentLedger>,
}

#[derive(Default)]
struct RegistryInner {
    trips: HashMap<Uuid, Trip>,
    /// Insertion order
    order: Vec<Uuid>,
}

impl TripRegistry {
    pub fn new(ledger: Arc<CommitmentLedger>) -> Self {
        Self {
            inner: tokio::sync::RwLock::new(RegistryInner::default()),
            ledger,
        }
    }

    /// Create a trip with a fresh id and a zero total
    pub async fn create(&self, threshold_amount: i64) -> AppResult<Trip> {
        if threshold_amount <= 0 {
            return Err(AppError::InvalidInput(format!(
                "threshold_amount must be positive, got {}",
                threshold_amount
            )));
        }

        let trip = Trip::new(threshold_amount);
        let mut inner = self.inner.write().await;
        inner.order.push(trip.id);
        inner.trips.insert(trip.id, trip.clone());
        info!(
            "Created trip {} with threshold {} cents",
            trip.id, trip.threshold_amount
        );
        Ok(trip)
    }

    pub async fn get(&self, trip_id: Uuid) -> AppResult<Trip> {
        let inner = self.inner.read().await;
        inner
            .trips
            .get(&trip_id)
            .cloned()
            .ok_or(AppError::TripNotFound(trip_id))
    }

    /// All trips, in insertion order
    pub async fn list(&self) -> Vec<Trip> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.trips.get(id))
            .cloned()
            .collect()
    }

    /// Recompute `total_committed` from the ledger's eligible total
    ///
    /// The single writer path for the total.
    pub async fn refresh_total(&self, trip_id: Uuid) -> AppResult<Trip> {
        let total = self.ledger.eligible_total(trip_id).await;
        let mut inner = self.inner.write().await;
        let trip = inner
            .trips
            .get_mut(&trip_id)
            .ok_or(AppError::TripNotFound(trip_id))?;
        trip.total_committed = total;
        debug!("Refreshed trip {} total to {} cents", trip_id, total);
        Ok(trip.clone())
    }

    /// Advance a trip's settlement phase; never moves backwards
    pub async fn set_phase(&self, trip_id: Uuid, phase: TripPhase) -> AppResult<Trip> {
        let mut inner = self.inner.write().await;
        let trip = inner
            .trips
            .get_mut(&trip_id)
            .ok_or(AppError::TripNotFound(trip_id))?;
        trip.phase = phase;
        Ok(trip.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::models::{Commitment, CommitmentStatus};

    fn registry() -> (TripRegistry, Arc<CommitmentLedger>) {
        let ledger = Arc::new(CommitmentLedger::new());
        (TripRegistry::new(ledger.clone()), ledger)
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_threshold() {
        let (registry, _) = registry();
        for threshold in [0, -1, -10_000] {
            let err = registry.create(threshold).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn test_create_initializes_collecting_with_zero_total() {
        let (registry, _) = registry();
        let trip = registry.create(10_000).await.unwrap();
        assert_eq!(trip.total_committed, 0);
        assert_eq!(trip.phase, TripPhase::Collecting);
        assert!(!trip.threshold_met());
    }

    #[tokio::test]
    async fn test_get_unknown_trip() {
        let (registry, _) = registry();
        let err = registry.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::TripNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let (registry, _) = registry();
        let a = registry.create(100).await.unwrap();
        let b = registry.create(200).await.unwrap();
        let c = registry.create(300).await.unwrap();

        let ids: Vec<Uuid> = registry.list().await.into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[tokio::test]
    async fn test_refresh_total_tracks_ledger() {
        let (registry, ledger) = registry();
        let trip = registry.create(10_000).await.unwrap();

        let c = ledger
            .append(Commitment::new(
                trip.id,
                "auth_1".to_string(),
                4000,
                "alice".to_string(),
            ))
            .await
            .unwrap();
        let refreshed = registry.refresh_total(trip.id).await.unwrap();
        assert_eq!(refreshed.total_committed, 4000);

        ledger.set_status(c.id, CommitmentStatus::Failed).await.unwrap();
        let refreshed = registry.refresh_total(trip.id).await.unwrap();
        assert_eq!(refreshed.total_committed, 0);
    }
}
