use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::ledger::models::{Commitment, CommitmentStatus};
use crate::trips::models::{Trip, TripPhase};

// ========== REQUEST MODELS ==========

/// Request to create a trip
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripRequest {
    /// Threshold in minor currency units (cents)
    #[validate(range(min = 1, message = "threshold_amount must be positive"))]
    pub threshold_amount: i64,
}

/// Request for a traveler to commit to a trip
#[derive(Debug, Deserialize, Validate)]
pub struct CommitRequest {
    #[validate(length(min = 1, max = 128, message = "traveler_name is required"))]
    pub traveler_name: String,

    /// Amount in minor currency units (cents)
    #[validate(range(min = 1, message = "committed_amount must be positive"))]
    pub committed_amount: i64,

    /// Opaque gateway payment method token
    #[validate(length(min = 1, message = "payment_method_id is required"))]
    pub payment_method_id: String,
}

// ========== RESPONSE MODELS ==========

#[derive(Debug, Serialize)]
pub struct TripResponse {
    pub trip_id: Uuid,
    pub threshold_amount: i64,
    pub total_committed: i64,
    pub phase: TripPhase,
    pub created_at: DateTime<Utc>,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        Self {
            trip_id: trip.id,
            threshold_amount: trip.threshold_amount,
            total_committed: trip.total_committed,
            phase: trip.phase,
            created_at: trip.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub commitment_id: Uuid,
    pub authorization_id: String,
    pub status: CommitmentStatus,
    pub committed_amount: i64,
}

impl From<Commitment> for CommitResponse {
    fn from(commitment: Commitment) -> Self {
        Self {
            commitment_id: commitment.id,
            authorization_id: commitment.authorization_id,
            status: commitment.status,
            committed_amount: commitment.committed_amount,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TravelerInfo {
    pub traveler_name: String,
    pub committed_amount: i64,
    pub status: CommitmentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Commitment> for TravelerInfo {
    fn from(commitment: Commitment) -> Self {
        Self {
            traveler_name: commitment.traveler_name,
            committed_amount: commitment.committed_amount,
            status: commitment.status,
            created_at: commitment.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TripStatusResponse {
    pub trip_id: Uuid,
    pub threshold_amount: i64,
    pub total_committed: i64,
    pub threshold_met: bool,
    pub phase: TripPhase,
    pub travelers: Vec<TravelerInfo>,
}
