use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::models::*;
use crate::{
    error::{AppError, AppResult},
    settlement::SettlementCoordinator,
    trips::TripRegistry,
};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<TripRegistry>,
    pub coordinator: Arc<SettlementCoordinator>,
}

fn validate_request<T: Validate>(request: &T) -> AppResult<()> {
    request.validate().map_err(|e| {
        let errors = e
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages: Vec<String> = errors
                    .iter()
                    .map(|e| e.message.as_ref().map(|s| s.to_string()).unwrap_or_default())
                    .collect();
                format!("{}: {}", field, messages.join(", "))
            })
            .collect::<Vec<String>>()
            .join("; ");
        AppError::InvalidInput(errors)
    })
}

/// Create a trip with a capture threshold
/// POST /trips
pub async fn create_trip(
    State(state): State<AppState>,
    Json(request): Json<CreateTripRequest>,
) -> AppResult<Json<TripResponse>> {
    validate_request(&request)?;

    let trip = state.registry.create(request.threshold_amount).await?;
    info!("🏖️  Created trip {}", trip.id);

    Ok(Json(TripResponse::from(trip)))
}

/// A traveler commits to a trip with payment info
/// POST /trips/:trip_id/commit
///
/// The response status may already be captured or failed when this pledge
/// tipped the threshold and settlement ran synchronously.
pub async fn commit_to_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    Json(request): Json<CommitRequest>,
) -> AppResult<Json<CommitResponse>> {
    validate_request(&request)?;

    let commitment = state
        .coordinator
        .record_pledge(
            trip_id,
            &request.traveler_name,
            request.committed_amount,
            &request.payment_method_id,
        )
        .await?;

    Ok(Json(CommitResponse::from(commitment)))
}

/// Trip status: totals, phase, and the ordered traveler list
/// GET /trips/:trip_id/status
pub async fn get_trip_status(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> AppResult<Json<TripStatusResponse>> {
    let (trip, commitments) = state.coordinator.trip_status(trip_id).await?;

    Ok(Json(TripStatusResponse {
        trip_id: trip.id,
        threshold_amount: trip.threshold_amount,
        total_committed: trip.total_committed,
        threshold_met: trip.threshold_met(),
        phase: trip.phase,
        travelers: commitments.into_iter().map(TravelerInfo::from).collect(),
    }))
}

/// List all trips in creation order
/// GET /trips
pub async fn list_trips(State(state): State<AppState>) -> AppResult<Json<Vec<TripResponse>>> {
    let trips = state.registry.list().await;
    Ok(Json(trips.into_iter().map(TripResponse::from).collect()))
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Trip Commitment System API",
        "status": "running",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use crate::ledger::{CommitmentLedger, CommitmentStatus};

    fn state() -> AppState {
        let ledger = Arc::new(CommitmentLedger::new());
        let registry = Arc::new(TripRegistry::new(ledger.clone()));
        let gateway = Arc::new(MockGateway::new());
        let coordinator = Arc::new(SettlementCoordinator::new(
            registry.clone(),
            ledger,
            gateway,
        ));
        AppState {
            registry,
            coordinator,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_trips() {
        let state = state();

        let Json(created) = create_trip(
            State(state.clone()),
            Json(CreateTripRequest {
                threshold_amount: 10_000,
            }),
        )
        .await
        .unwrap();
        assert_eq!(created.threshold_amount, 10_000);
        assert_eq!(created.total_committed, 0);

        let Json(trips) = list_trips(State(state)).await.unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].trip_id, created.trip_id);
    }

    #[tokio::test]
    async fn test_create_trip_rejects_zero_threshold() {
        let state = state();
        let err = create_trip(
            State(state),
            Json(CreateTripRequest {
                threshold_amount: 0,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_commit_and_status_flow() {
        let state = state();
        let Json(trip) = create_trip(
            State(state.clone()),
            Json(CreateTripRequest {
                threshold_amount: 5000,
            }),
        )
        .await
        .unwrap();

        let Json(commit) = commit_to_trip(
            State(state.clone()),
            Path(trip.trip_id),
            Json(CommitRequest {
                traveler_name: "Alice".to_string(),
                committed_amount: 5000,
                payment_method_id: "pm_card_visa".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(commit.status, CommitmentStatus::Captured);

        let Json(status) = get_trip_status(State(state), Path(trip.trip_id))
            .await
            .unwrap();
        assert!(status.threshold_met);
        assert_eq!(status.total_committed, 5000);
        assert_eq!(status.travelers.len(), 1);
        assert_eq!(status.travelers[0].traveler_name, "Alice");
    }

    #[tokio::test]
    async fn test_status_for_unknown_trip() {
        let state = state();
        let err = get_trip_status(State(state), Path(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TripNotFound(_)));
    }
}
