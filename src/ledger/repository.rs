use crate::error::{AppError, AppResult};
use crate::ledger::models::{Commitment, CommitmentStatus};
use std::collections::HashMap;
use tracing::{debug, error};
use uuid::Uuid;

/// In-memory commitment store
///
/// Exclusively owns all Commitment records. Commitments are appended in
/// Pending status, transition at most once to a terminal status, and are
/// never deleted.
pub struct CommitmentLedger {
    // In production, this would be PostgreSQL via sqlx
    inner: tokio::sync::RwLock<LedgerInner>,
}

#[derive(Default)]
struct LedgerInner {
    commitments: HashMap<Uuid, Commitment>,
    /// Insertion order across all trips
    order: Vec<Uuid>,
}

impl CommitmentLedger {
    pub fn new() -> Self {
        Self {
            inner: tokio::sync::RwLock::new(LedgerInner::default()),
        }
    }

    /// Insert a new commitment in Pending status
    pub async fn append(&self, commitment: Commitment) -> AppResult<Commitment> {
        let mut inner = self.inner.write().await;
        if inner.commitments.contains_key(&commitment.id) {
            error!("Duplicate commitment id: {}", commitment.id);
            return Err(AppError::Duplicate(commitment.id));
        }

        let commitment = Commitment {
            status: CommitmentStatus::Pending,
            ..commitment
        };
        inner.order.push(commitment.id);
        inner.commitments.insert(commitment.id, commitment.clone());
        debug!(
            "Appended commitment {} for trip {} ({} cents)",
            commitment.id, commitment.trip_id, commitment.committed_amount
        );
        Ok(commitment)
    }

    pub async fn get(&self, commitment_id: Uuid) -> AppResult<Commitment> {
        let inner = self.inner.read().await;
        inner
            .commitments
            .get(&commitment_id)
            .cloned()
            .ok_or(AppError::CommitmentNotFound(commitment_id))
    }

    /// All commitments for a trip, in insertion order
    ///
    /// Does not validate trip existence; unknown trips yield an empty list.
    pub async fn list_by_trip(&self, trip_id: Uuid) -> Vec<Commitment> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.commitments.get(id))
            .filter(|c| c.trip_id == trip_id)
            .cloned()
            .collect()
    }

    /// Commitments for a trip still awaiting capture, in insertion order
    pub async fn pending_for_trip(&self, trip_id: Uuid) -> Vec<Commitment> {
        self.list_by_trip(trip_id)
            .await
            .into_iter()
            .filter(|c| c.status == CommitmentStatus::Pending)
            .collect()
    }

    /// Transition a commitment's status
    ///
    /// Terminal statuses are immutable: a captured commitment cannot be
    /// re-captured and a failed one cannot be resurrected.
    pub async fn set_status(
        &self,
        commitment_id: Uuid,
        new_status: CommitmentStatus,
    ) -> AppResult<Commitment> {
        let mut inner = self.inner.write().await;
        let commitment = inner
            .commitments
            .get_mut(&commitment_id)
            .ok_or(AppError::CommitmentNotFound(commitment_id))?;

        if commitment.status.is_terminal() {
            error!(
                "Rejected transition to {:?}: commitment {} is already {:?}",
                new_status, commitment_id, commitment.status
            );
            return Err(AppError::InvalidTransition {
                id: commitment_id,
                current: commitment.status,
            });
        }

        commitment.status = new_status;
        Ok(commitment.clone())
    }

    /// Sum of committed amounts over non-failed commitments for a trip
    ///
    /// Failed commitments never count, even transiently.
    pub async fn eligible_total(&self, trip_id: Uuid) -> i64 {
        let inner = self.inner.read().await;
        inner
            .commitments
            .values()
            .filter(|c| c.trip_id == trip_id && c.status.is_eligible())
            .map(|c| c.committed_amount)
            .sum()
    }
}

impl Default for CommitmentLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commitment(trip_id: Uuid, amount: i64, name: &str) -> Commitment {
        Commitment::new(trip_id, format!("auth_{}", name), amount, name.to_string())
    }

    #[tokio::test]
    async fn test_append_rejects_duplicate_id() {
        let ledger = CommitmentLedger::new();
        let trip_id = Uuid::new_v4();
        let c = commitment(trip_id, 1000, "alice");

        ledger.append(c.clone()).await.unwrap();
        let err = ledger.append(c).await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_append_forces_pending_status() {
        let ledger = CommitmentLedger::new();
        let trip_id = Uuid::new_v4();
        let mut c = commitment(trip_id, 1000, "alice");
        c.status = CommitmentStatus::Captured;

        let stored = ledger.append(c).await.unwrap();
        assert_eq!(stored.status, CommitmentStatus::Pending);
    }

    #[tokio::test]
    async fn test_list_by_trip_preserves_insertion_order() {
        let ledger = CommitmentLedger::new();
        let trip_id = Uuid::new_v4();
        let other_trip = Uuid::new_v4();

        ledger.append(commitment(trip_id, 100, "alice")).await.unwrap();
        ledger.append(commitment(other_trip, 999, "mallory")).await.unwrap();
        ledger.append(commitment(trip_id, 200, "bob")).await.unwrap();
        ledger.append(commitment(trip_id, 300, "charlie")).await.unwrap();

        let names: Vec<String> = ledger
            .list_by_trip(trip_id)
            .await
            .into_iter()
            .map(|c| c.traveler_name)
            .collect();
        assert_eq!(names, vec!["alice", "bob", "charlie"]);
        assert!(ledger.list_by_trip(Uuid::new_v4()).await.is_empty());
    }

    #[tokio::test]
    async fn test_set_status_unknown_id() {
        let ledger = CommitmentLedger::new();
        let err = ledger
            .set_status(Uuid::new_v4(), CommitmentStatus::Captured)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CommitmentNotFound(_)));
    }

    #[tokio::test]
    async fn test_terminal_statuses_are_immutable() {
        let ledger = CommitmentLedger::new();
        let trip_id = Uuid::new_v4();
        let c = ledger.append(commitment(trip_id, 100, "alice")).await.unwrap();

        ledger.set_status(c.id, CommitmentStatus::Captured).await.unwrap();

        for next in [CommitmentStatus::Failed, CommitmentStatus::Pending] {
            let err = ledger.set_status(c.id, next).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidTransition { .. }));
        }
        assert_eq!(
            ledger.get(c.id).await.unwrap().status,
            CommitmentStatus::Captured
        );
    }

    #[tokio::test]
    async fn test_eligible_total_excludes_failed() {
        let ledger = CommitmentLedger::new();
        let trip_id = Uuid::new_v4();

        let a = ledger.append(commitment(trip_id, 3000, "alice")).await.unwrap();
        let b = ledger.append(commitment(trip_id, 2000, "bob")).await.unwrap();
        assert_eq!(ledger.eligible_total(trip_id).await, 5000);

        ledger.set_status(a.id, CommitmentStatus::Captured).await.unwrap();
        assert_eq!(ledger.eligible_total(trip_id).await, 5000);

        ledger.set_status(b.id, CommitmentStatus::Failed).await.unwrap();
        assert_eq!(ledger.eligible_total(trip_id).await, 3000);
    }

    #[tokio::test]
    async fn test_eligible_total_empty_trip() {
        let ledger = CommitmentLedger::new();
        assert_eq!(ledger.eligible_total(Uuid::new_v4()).await, 0);
    }
}
