// Commitment ledger - authoritative store for pledge records
pub mod models;
pub mod repository;

pub use models::{Commitment, CommitmentStatus};
pub use repository::CommitmentLedger;
