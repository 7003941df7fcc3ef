use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::gateway::PaymentGateway;
use crate::ledger::{Commitment, CommitmentLedger, CommitmentStatus};
use crate::trips::{Trip, TripPhase, TripRegistry};

/// Per-trip mutual exclusion
///
/// Pledge processing within one trip is a read-then-act sequence and must
/// be serialized; different trips never block each other.
struct TripLockTable {
    locks: parking_lot::Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl TripLockTable {
    fn new() -> Self {
        Self {
            locks: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    fn for_trip(&self, trip_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .entry(trip_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

/// Orchestrates pledge intake and threshold-triggered capture
///
/// Holds no record state of its own; reads and writes the trip registry and
/// the commitment ledger through their contracts. The threshold decision for
/// a trip is always made under that trip's lock; the gateway capture calls
/// run outside it so a long settlement pass does not stall the process.
pub struct SettlementCoordinator {
    registry: Arc<TripRegistry>,
    ledger: Arc<CommitmentLedger>,
    gateway: Arc<dyn PaymentGateway>,
    locks: TripLockTable,
}

impl SettlementCoordinator {
    pub fn new(
        registry: Arc<TripRegistry>,
        ledger: Arc<CommitmentLedger>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            registry,
            ledger,
            gateway,
            locks: TripLockTable::new(),
        }
    }

    /// Accept a pledge: authorize a hold, record the commitment, refresh the
    /// trip total, and trigger settlement if the threshold is reached.
    ///
    /// Authorization failures abort before any record is created. The
    /// returned commitment reflects any settlement that ran synchronously,
    /// so it may already be Captured or Failed when this pledge tipped the
    /// threshold.
    pub async fn record_pledge(
        &self,
        trip_id: Uuid,
        traveler_name: &str,
        amount: i64,
        payment_method: &str,
    ) -> AppResult<Commitment> {
        if amount <= 0 {
            return Err(AppError::InvalidInput(format!(
                "committed_amount must be positive, got {}",
                amount
            )));
        }

        // Reject unknown trips before touching the gateway
        self.registry.get(trip_id).await?;

        // Gateway I/O happens outside the per-trip lock
        let authorization = self.gateway.authorize(amount, payment_method).await?;
        info!(
            "💳 {} committed {} cents to trip {} (hold {})",
            traveler_name, amount, trip_id, authorization.authorization_id
        );

        let commitment = {
            let lock = self.locks.for_trip(trip_id);
            let _guard = lock.lock().await;

            let commitment = self
                .ledger
                .append(Commitment::new(
                    trip_id,
                    authorization.authorization_id,
                    amount,
                    traveler_name.to_string(),
                ))
                .await?;
            let trip = self.registry.refresh_total(trip_id).await?;
            info!(
                "Trip {} total committed: {} / {} cents",
                trip_id, trip.total_committed, trip.threshold_amount
            );
            commitment
        };

        self.try_trigger_settlement(trip_id).await?;

        // Re-read: the settlement pass may have resolved this commitment
        self.ledger.get(commitment.id).await
    }

    /// Evaluate the threshold and run a capture pass if it is reached
    ///
    /// Safe to invoke any number of times for the same trip. At most one
    /// capture pass runs per trip at a time: whichever caller advances the
    /// phase to Settling owns the pass, and loops to pick up commitments
    /// that landed while its captures were in flight. Everyone else sees
    /// Settling and returns immediately.
    pub async fn try_trigger_settlement(&self, trip_id: Uuid) -> AppResult<()> {
        let lock = self.locks.for_trip(trip_id);

        loop {
            // Decision phase, under the trip lock
            let snapshot = {
                let _guard = lock.lock().await;
                let trip = self.registry.get(trip_id).await?;

                if trip.phase == TripPhase::Settling {
                    // Another task owns the pass; it will re-check after
                    return Ok(());
                }
                if trip.total_committed < trip.threshold_amount {
                    return Ok(());
                }

                let pending = self.ledger.pending_for_trip(trip_id).await;
                if pending.is_empty() {
                    if trip.phase == TripPhase::Collecting {
                        self.registry.set_phase(trip_id, TripPhase::Settled).await?;
                    }
                    return Ok(());
                }

                info!(
                    "🎉 Threshold reached for trip {}: {} >= {} cents, capturing {} commitment(s)",
                    trip_id,
                    trip.total_committed,
                    trip.threshold_amount,
                    pending.len()
                );
                self.registry.set_phase(trip_id, TripPhase::Settling).await?;
                pending
            };

            // Capture phase, outside the trip lock. Terminal-state checks in
            // the ledger make a stray re-entrant attempt harmless.
            for commitment in snapshot {
                self.capture_commitment(&commitment).await;
            }

            {
                let _guard = lock.lock().await;
                self.registry.refresh_total(trip_id).await?;
                self.registry.set_phase(trip_id, TripPhase::Settled).await?;
            }
            // Loop: pledges accepted during the pass are still Pending and
            // get their own pass now
        }
    }

    /// Capture one commitment, isolating failures to that commitment
    ///
    /// A failed capture is recorded as Failed and never retried; it simply
    /// stops counting toward the trip total on the next refresh.
    async fn capture_commitment(&self, commitment: &Commitment) {
        let status = match self.gateway.capture(&commitment.authorization_id).await {
            Ok(outcome) if outcome.succeeded => {
                info!(
                    "✅ Captured {} cents from {} (commitment {})",
                    commitment.committed_amount, commitment.traveler_name, commitment.id
                );
                CommitmentStatus::Captured
            }
            Ok(_) => {
                warn!(
                    "❌ Capture declined for {} (commitment {})",
                    commitment.traveler_name, commitment.id
                );
                CommitmentStatus::Failed
            }
            Err(e) => {
                warn!(
                    "❌ Capture error for {} (commitment {}): {}",
                    commitment.traveler_name, commitment.id, e
                );
                CommitmentStatus::Failed
            }
        };

        if let Err(e) = self.ledger.set_status(commitment.id, status).await {
            // Invariant violation: the snapshot should only hold Pending ids
            error!("Failed to record capture outcome for {}: {}", commitment.id, e);
        }
    }

    /// Trip plus its commitments in insertion order, with a fresh total
    pub async fn trip_status(&self, trip_id: Uuid) -> AppResult<(Trip, Vec<Commitment>)> {
        let lock = self.locks.for_trip(trip_id);
        let _guard = lock.lock().await;

        let trip = self.registry.refresh_total(trip_id).await?;
        let commitments = self.ledger.list_by_trip(trip_id).await;
        Ok((trip, commitments))
    }
}
