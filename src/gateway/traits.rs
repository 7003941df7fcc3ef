use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PaymentError;

/// A gateway-side reservation of funds, not yet transferred
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authorization {
    pub authorization_id: String,
}

/// Outcome of a single capture attempt
///
/// The gateway exposes exactly one attempt per invocation; there is no
/// retry of an individual capture call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CaptureOutcome {
    pub succeeded: bool,
}

/// Abstract payment gateway
///
/// Authorizes a hold for an amount against a payment method, and later
/// captures that hold. Amounts are minor currency units in a single fixed
/// currency.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn authorize(
        &self,
        amount: i64,
        payment_method: &str,
    ) -> Result<Authorization, PaymentError>;

    async fn capture(&self, authorization_id: &str) -> Result<CaptureOutcome, PaymentError>;
}
