use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Per-trip settlement phase
///
/// Collecting -> Settling -> Settled, never backwards. Settling marks a
/// capture pass in flight; at most one pass runs per trip at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripPhase {
    Collecting,
    Settling,
    Settled,
}

impl TripPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripPhase::Collecting => "collecting",
            TripPhase::Settling => "settling",
            TripPhase::Settled => "settled",
        }
    }
}

impl fmt::Display for TripPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A funding pool with a capture threshold shared by multiple pledges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    /// Threshold in minor currency units (cents); always positive
    pub threshold_amount: i64,
    /// Derived view over the ledger: sum of non-failed committed amounts.
    /// Only `TripRegistry::refresh_total` writes this.
    pub total_committed: i64,
    pub phase: TripPhase,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(threshold_amount: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            threshold_amount,
            total_committed: 0,
            phase: TripPhase::Collecting,
            created_at: Utc::now(),
        }
    }

    pub fn threshold_met(&self) -> bool {
        self.total_committed >= self.threshold_amount
    }
}
