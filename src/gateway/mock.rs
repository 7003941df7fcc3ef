use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::debug;

use crate::error::PaymentError;
use crate::gateway::traits::{Authorization, CaptureOutcome, PaymentGateway};

/// Payment method prefix that is refused at authorization time
pub const DECLINED_METHOD_PREFIX: &str = "pm_declined";
/// Payment method prefix that authorizes fine but fails at capture time
pub const CAPTURE_FAILS_METHOD_PREFIX: &str = "pm_capture_fails";

struct Hold {
    payment_method: String,
    captured: bool,
}

/// In-memory gateway for local runs and tests
///
/// Mirrors the Stripe test-token convention: behavior is keyed off the
/// payment method string, so callers pick outcomes per pledge.
pub struct MockGateway {
    next_id: AtomicU64,
    capture_calls: AtomicUsize,
    holds: Mutex<HashMap<String, Hold>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            capture_calls: AtomicUsize::new(0),
            holds: Mutex::new(HashMap::new()),
        }
    }

    /// Number of capture calls issued so far
    pub fn capture_calls(&self) -> usize {
        self.capture_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn authorize(
        &self,
        amount: i64,
        payment_method: &str,
    ) -> Result<Authorization, PaymentError> {
        if payment_method.starts_with(DECLINED_METHOD_PREFIX) {
            return Err(PaymentError::AuthorizationDeclined(format!(
                "payment method {} was declined",
                payment_method
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let authorization_id = format!("mock_auth_{}", id);
        self.holds.lock().insert(
            authorization_id.clone(),
            Hold {
                payment_method: payment_method.to_string(),
                captured: false,
            },
        );
        debug!("Mock authorized {} cents as {}", amount, authorization_id);
        Ok(Authorization { authorization_id })
    }

    async fn capture(&self, authorization_id: &str) -> Result<CaptureOutcome, PaymentError> {
        self.capture_calls.fetch_add(1, Ordering::SeqCst);

        let mut holds = self.holds.lock();
        let hold = holds
            .get_mut(authorization_id)
            .ok_or_else(|| PaymentError::UnknownAuthorization(authorization_id.to_string()))?;

        if hold.payment_method.starts_with(CAPTURE_FAILS_METHOD_PREFIX) {
            return Ok(CaptureOutcome { succeeded: false });
        }
        if hold.captured {
            return Err(PaymentError::CaptureDeclined {
                authorization_id: authorization_id.to_string(),
                reason: "hold already captured".to_string(),
            });
        }

        hold.captured = true;
        Ok(CaptureOutcome { succeeded: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_authorize_and_capture() {
        let gateway = MockGateway::new();
        let auth = gateway.authorize(5000, "pm_card_visa").await.unwrap();

        let outcome = gateway.capture(&auth.authorization_id).await.unwrap();
        assert!(outcome.succeeded);
        assert_eq!(gateway.capture_calls(), 1);
    }

    #[tokio::test]
    async fn test_declined_method_refused_at_authorize() {
        let gateway = MockGateway::new();
        let err = gateway.authorize(5000, "pm_declined_visa").await.unwrap_err();
        assert!(matches!(err, PaymentError::AuthorizationDeclined(_)));
        assert_eq!(gateway.capture_calls(), 0);
    }

    #[tokio::test]
    async fn test_capture_fails_method_authorizes_then_fails() {
        let gateway = MockGateway::new();
        let auth = gateway
            .authorize(2000, "pm_capture_fails_visa")
            .await
            .unwrap();

        let outcome = gateway.capture(&auth.authorization_id).await.unwrap();
        assert!(!outcome.succeeded);
    }

    #[tokio::test]
    async fn test_double_capture_rejected() {
        let gateway = MockGateway::new();
        let auth = gateway.authorize(1000, "pm_card_visa").await.unwrap();

        gateway.capture(&auth.authorization_id).await.unwrap();
        let err = gateway.capture(&auth.authorization_id).await.unwrap_err();
        assert!(matches!(err, PaymentError::CaptureDeclined { .. }));
    }

    #[tokio::test]
    async fn test_unknown_authorization() {
        let gateway = MockGateway::new();
        let err = gateway.capture("mock_auth_999").await.unwrap_err();
        assert!(matches!(err, PaymentError::UnknownAuthorization(_)));
    }
}
