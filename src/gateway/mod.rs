// Payment gateway adapters - authorization holds and captures
pub mod mock;
pub mod stripe;
pub mod traits;

pub use mock::MockGateway;
pub use stripe::StripeGateway;
pub use traits::{Authorization, CaptureOutcome, PaymentGateway};
