// Threshold-triggered settlement coordination
pub mod coordinator;

pub use coordinator::SettlementCoordinator;
