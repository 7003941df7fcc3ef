use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::PaymentError;
use crate::gateway::traits::{Authorization, CaptureOutcome, PaymentGateway};

const DEFAULT_API_URL: &str = "https://api.stripe.com";

/// Stripe adapter
///
/// Authorizes by creating a manual-capture PaymentIntent and captures it
/// later. `requires_capture` is the expected post-authorize status and
/// `succeeded` the expected post-capture status.
pub struct StripeGateway {
    client: reqwest::Client,
    api_url: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct PaymentIntent {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

impl StripeGateway {
    pub fn new(secret_key: String) -> Self {
        Self::with_api_url(secret_key, DEFAULT_API_URL.to_string())
    }

    pub fn with_api_url(secret_key: String, api_url: String) -> Self {
        if !secret_key.starts_with("sk_test_") {
            warn!("Stripe secret key does not look like a test key");
        }
        Self {
            client: reqwest::Client::new(),
            api_url,
            secret_key,
        }
    }

    async fn parse_intent(response: reqwest::Response) -> Result<PaymentIntent, PaymentError> {
        if response.status().is_success() {
            Ok(response.json::<PaymentIntent>().await?)
        } else {
            let status = response.status();
            let body = response.json::<StripeErrorBody>().await.map_err(|_| {
                PaymentError::Gateway(format!("Stripe returned HTTP {}", status))
            })?;
            let reason = body
                .error
                .message
                .or(body.error.error_type)
                .unwrap_or_else(|| format!("HTTP {}", status));
            Err(PaymentError::Gateway(reason))
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn authorize(
        &self,
        amount: i64,
        payment_method: &str,
    ) -> Result<Authorization, PaymentError> {
        let params = [
            ("amount", amount.to_string()),
            ("currency", "usd".to_string()),
            ("payment_method", payment_method.to_string()),
            ("confirmation_method", "manual".to_string()),
            ("capture_method", "manual".to_string()),
            ("confirm", "true".to_string()),
            // Required by confirm=true, unused in this flow
            ("return_url", "https://example.com/return".to_string()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_url))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await?;

        let intent = Self::parse_intent(response)
            .await
            .map_err(|e| match e {
                PaymentError::Gateway(reason) => PaymentError::AuthorizationDeclined(reason),
                other => other,
            })?;

        if intent.status == "requires_capture" {
            info!("Authorized hold {} for {} cents", intent.id, amount);
            Ok(Authorization {
                authorization_id: intent.id,
            })
        } else {
            Err(PaymentError::AuthorizationDeclined(format!(
                "payment intent {} in unexpected status {}",
                intent.id, intent.status
            )))
        }
    }

    async fn capture(&self, authorization_id: &str) -> Result<CaptureOutcome, PaymentError> {
        let response = self
            .client
            .post(format!(
                "{}/v1/payment_intents/{}/capture",
                self.api_url, authorization_id
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        let intent = Self::parse_intent(response).await.map_err(|e| match e {
            PaymentError::Gateway(reason) => PaymentError::CaptureDeclined {
                authorization_id: authorization_id.to_string(),
                reason,
            },
            other => other,
        })?;

        Ok(CaptureOutcome {
            succeeded: intent.status == "succeeded",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payment_intent() {
        let intent: PaymentIntent = serde_json::from_str(
            r#"{"id": "pi_3abc", "status": "requires_capture", "amount": 5000}"#,
        )
        .unwrap();
        assert_eq!(intent.id, "pi_3abc");
        assert_eq!(intent.status, "requires_capture");
    }

    #[test]
    fn test_parse_stripe_error_body() {
        let body: StripeErrorBody = serde_json::from_str(
            r#"{"error": {"type": "card_error", "message": "Your card was declined."}}"#,
        )
        .unwrap();
        assert_eq!(body.error.message.as_deref(), Some("Your card was declined."));
        assert_eq!(body.error.error_type.as_deref(), Some("card_error"));
    }
}
