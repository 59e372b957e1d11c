//! Paystack webhook handling
//!
//! Paystack signs each notification with HMAC-SHA512 over the raw request body,
//! keyed by the merchant secret key, and sends the hex digest in
//! `x-paystack-signature`. A verified `charge.success` marks the matching order paid.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha512;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::error::{PaymentError, PaymentResult};
use crate::store::{MarkPaidOutcome, OrderStore};

type HmacSha512 = Hmac<Sha512>;

/// Header carrying the hex-encoded body signature
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

const CHARGE_SUCCESS: &str = "charge.success";

/// Envelope of a Paystack notification
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub data: EventData,
}

/// The part of `data` the order transition needs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventData {
    pub reference: Option<String>,
    pub status: Option<String>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
}

/// What handling a verified event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Order(MarkPaidOutcome),
    Ignored { event: String },
}

#[derive(Clone)]
pub struct PaystackWebhook {
    secret: Vec<u8>,
}

impl PaystackWebhook {
    pub fn new(secret: &str) -> PaymentResult<Self> {
        if secret.is_empty() {
            return Err(PaymentError::Config(
                "Paystack secret key must not be empty".to_string(),
            ));
        }
        Ok(Self {
            secret: secret.as_bytes().to_vec(),
        })
    }

    /// Hex digest Paystack would send for `body`
    pub fn sign(&self, body: &[u8]) -> PaymentResult<String> {
        let mut mac = HmacSha512::new_from_slice(&self.secret)
            .map_err(|_| PaymentError::Config("HMAC initialization failed".to_string()))?;
        mac.update(body);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Check `signature` against the raw body in constant time
    pub fn verify_signature(&self, body: &[u8], signature: &str) -> PaymentResult<()> {
        let provided = hex::decode(signature.trim().to_ascii_lowercase())
            .map_err(|_| PaymentError::WebhookSignatureInvalid)?;

        let mut mac = HmacSha512::new_from_slice(&self.secret)
            .map_err(|_| PaymentError::Config("HMAC initialization failed".to_string()))?;
        mac.update(body);
        let expected = mac.finalize().into_bytes();

        if provided.len() != expected.len() {
            return Err(PaymentError::WebhookSignatureInvalid);
        }

        if bool::from(provided.as_slice().ct_eq(expected.as_slice())) {
            Ok(())
        } else {
            Err(PaymentError::WebhookSignatureInvalid)
        }
    }

    pub fn parse_event(&self, body: &[u8]) -> PaymentResult<WebhookEvent> {
        serde_json::from_slice(body).map_err(|e| PaymentError::MalformedPayload(e.to_string()))
    }

    /// Verify, parse and apply a notification in one step
    pub async fn process(
        &self,
        store: &dyn OrderStore,
        body: &[u8],
        signature: Option<&str>,
    ) -> PaymentResult<WebhookOutcome> {
        let signature = signature.ok_or(PaymentError::WebhookSignatureMissing)?;
        self.verify_signature(body, signature)?;
        let event = self.parse_event(body)?;
        self.handle(store, &event).await
    }

    pub async fn handle(
        &self,
        store: &dyn OrderStore,
        event: &WebhookEvent,
    ) -> PaymentResult<WebhookOutcome> {
        if event.event != CHARGE_SUCCESS {
            info!(event = %event.event, "Ignoring Paystack event");
            return Ok(WebhookOutcome::Ignored {
                event: event.event.clone(),
            });
        }

        let reference = event
            .data
            .reference
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                PaymentError::MalformedPayload("charge.success without reference".to_string())
            })?;

        let outcome = store.mark_paid(reference).await?;

        match &outcome {
            MarkPaidOutcome::Transitioned(order_id) => {
                info!(%order_id, reference, amount = ?event.data.amount, "Order marked paid");
            }
            MarkPaidOutcome::AlreadyPaid(order_id) => {
                info!(%order_id, reference, "Duplicate charge notification for paid order");
            }
            MarkPaidOutcome::NotPayable { order_id, status } => {
                warn!(%order_id, reference, %status, "Charge received for order that cannot be paid");
            }
            MarkPaidOutcome::UnknownOrder => {
                warn!(reference, "Charge received for unknown order reference");
            }
        }

        Ok(WebhookOutcome::Order(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryOrderStore;
    use zynkart_shared::OrderStatus;

    const SECRET: &str = "sk_test_4f1c2a9e0b7d";

    fn charge_body(reference: &str) -> Vec<u8> {
        serde_json::json!({
            "event": "charge.success",
            "data": {
                "reference": reference,
                "status": "success",
                "amount": 250000,
                "currency": "NGN"
            }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_rejects_empty_secret() {
        assert!(matches!(
            PaystackWebhook::new(""),
            Err(PaymentError::Config(_))
        ));
    }

    #[test]
    fn test_verify_signature_accepts_own_signature() {
        let webhook = PaystackWebhook::new(SECRET).unwrap();
        let body = charge_body("ref_abc");
        let signature = webhook.sign(&body).unwrap();

        assert_eq!(signature.len(), 128);
        assert!(webhook.verify_signature(&body, &signature).is_ok());
        assert!(webhook
            .verify_signature(&body, &signature.to_uppercase())
            .is_ok());
    }

    #[test]
    fn test_verify_signature_rejects_tampering() {
        let webhook = PaystackWebhook::new(SECRET).unwrap();
        let body = charge_body("ref_abc");
        let signature = webhook.sign(&body).unwrap();

        let tampered = charge_body("ref_xyz");
        assert!(matches!(
            webhook.verify_signature(&tampered, &signature),
            Err(PaymentError::WebhookSignatureInvalid)
        ));

        let other = PaystackWebhook::new("sk_test_other").unwrap();
        assert!(other.verify_signature(&body, &signature).is_err());
    }

    #[test]
    fn test_verify_signature_rejects_garbage() {
        let webhook = PaystackWebhook::new(SECRET).unwrap();
        let body = charge_body("ref_abc");

        assert!(webhook.verify_signature(&body, "not-hex").is_err());
        assert!(webhook.verify_signature(&body, "abcd").is_err());
        assert!(webhook.verify_signature(&body, "").is_err());
    }

    #[tokio::test]
    async fn test_process_marks_order_paid() {
        let webhook = PaystackWebhook::new(SECRET).unwrap();
        let store = InMemoryOrderStore::new();
        let order_id = store.insert("ref_paid", OrderStatus::Pending).unwrap();

        let body = charge_body("ref_paid");
        let signature = webhook.sign(&body).unwrap();
        let outcome = webhook
            .process(&store, &body, Some(&signature))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Order(MarkPaidOutcome::Transitioned(order_id))
        );
        assert_eq!(store.status("ref_paid"), Some(OrderStatus::Paid));
    }

    #[tokio::test]
    async fn test_process_without_signature_changes_nothing() {
        let webhook = PaystackWebhook::new(SECRET).unwrap();
        let store = InMemoryOrderStore::new();
        store.insert("ref_unsigned", OrderStatus::Pending).unwrap();

        let body = charge_body("ref_unsigned");
        let result = webhook.process(&store, &body, None).await;

        assert!(matches!(result, Err(PaymentError::WebhookSignatureMissing)));
        assert_eq!(store.status("ref_unsigned"), Some(OrderStatus::Pending));
    }

    #[tokio::test]
    async fn test_other_events_are_ignored() {
        let webhook = PaystackWebhook::new(SECRET).unwrap();
        let store = InMemoryOrderStore::new();
        store.insert("ref_transfer", OrderStatus::Pending).unwrap();

        let event = webhook
            .parse_event(br#"{"event":"transfer.success","data":{"reference":"ref_transfer"}}"#)
            .unwrap();
        let outcome = webhook.handle(&store, &event).await.unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Ignored {
                event: "transfer.success".to_string()
            }
        );
        assert_eq!(store.status("ref_transfer"), Some(OrderStatus::Pending));
    }

    #[tokio::test]
    async fn test_charge_without_reference_is_malformed() {
        let webhook = PaystackWebhook::new(SECRET).unwrap();
        let store = InMemoryOrderStore::new();

        let event = webhook
            .parse_event(br#"{"event":"charge.success","data":{}}"#)
            .unwrap();
        let result = webhook.handle(&store, &event).await;

        assert!(matches!(result, Err(PaymentError::MalformedPayload(_))));
    }

    #[test]
    fn test_parse_event_rejects_non_json() {
        let webhook = PaystackWebhook::new(SECRET).unwrap();
        assert!(matches!(
            webhook.parse_event(b"event=charge.success"),
            Err(PaymentError::MalformedPayload(_))
        ));
    }
}
