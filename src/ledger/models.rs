use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Commitment status enum
///
/// Pending commitments hold an authorization that has not been captured.
/// Captured and Failed are terminal: once a commitment reaches either, its
/// status never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentStatus {
    Pending,
    Captured,
    Failed,
}

impl CommitmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitmentStatus::Pending => "pending",
            CommitmentStatus::Captured => "captured",
            CommitmentStatus::Failed => "failed",
        }
    }

    /// Terminal statuses are immutable
    pub fn is_terminal(&self) -> bool {
        matches!(self, CommitmentStatus::Captured | CommitmentStatus::Failed)
    }

    /// Only non-failed commitments count toward a trip's eligible total
    pub fn is_eligible(&self) -> bool {
        matches!(self, CommitmentStatus::Pending | CommitmentStatus::Captured)
    }
}

impl fmt::Display for CommitmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One traveler's pledge toward a trip, backed by an authorization hold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commitment {
    pub id: Uuid,
    /// Back-reference to the owning trip (never the reverse)
    pub trip_id: Uuid,
    /// Opaque reference to the gateway-side hold
    pub authorization_id: String,
    /// Amount in minor currency units (cents)
    pub committed_amount: i64,
    pub status: CommitmentStatus,
    pub traveler_name: String,
    pub created_at: DateTime<Utc>,
}

impl Commitment {
    pub fn new(
        trip_id: Uuid,
        authorization_id: String,
        committed_amount: i64,
        traveler_name: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            trip_id,
            authorization_id,
            committed_amount,
            status: CommitmentStatus::Pending,
            traveler_name,
            created_at: Utc::now(),
        }
    }
}
