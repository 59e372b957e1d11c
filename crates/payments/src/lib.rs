//! Zynkart Payments
//!
//! Paystack webhook verification and the order status transition it drives.

pub mod error;
pub mod paystack;
pub mod store;

pub use error::{PaymentError, PaymentResult};
pub use paystack::{PaystackWebhook, WebhookEvent, WebhookOutcome, SIGNATURE_HEADER};
pub use store::{InMemoryOrderStore, MarkPaidOutcome, OrderStore, PgOrderStore};
