//! Order persistence seam for payment notifications

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use zynkart_shared::{OrderId, OrderStatus};

use crate::error::{PaymentError, PaymentResult};

/// Result of asking the store to mark an order paid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkPaidOutcome {
    /// The order moved from pending to paid
    Transitioned(OrderId),
    /// The order was already paid; nothing changed
    AlreadyPaid(OrderId),
    /// The order exists but is in a status that cannot become paid
    NotPayable { order_id: OrderId, status: OrderStatus },
    /// No order carries this payment reference
    UnknownOrder,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Transition the order identified by `reference` from pending to paid
    async fn mark_paid(&self, reference: &str) -> PaymentResult<MarkPaidOutcome>;

    /// Cheap connectivity check used by health probes
    async fn ping(&self) -> PaymentResult<()>;
}

/// Postgres-backed order store
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn mark_paid(&self, reference: &str) -> PaymentResult<MarkPaidOutcome> {
        #[derive(sqlx::FromRow)]
        struct UpdatedRow {
            id: Uuid,
        }

        // Conditional update keeps redelivered notifications idempotent
        let updated: Option<UpdatedRow> = sqlx::query_as(
            r#"
            UPDATE orders
            SET status = 'paid', paid_at = NOW(), updated_at = NOW()
            WHERE payment_reference = $1 AND status = 'pending'
            RETURNING id
            "#,
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = updated {
            return Ok(MarkPaidOutcome::Transitioned(OrderId(row.id)));
        }

        #[derive(sqlx::FromRow)]
        struct OrderRow {
            id: Uuid,
            status: String,
        }

        let existing: Option<OrderRow> =
            sqlx::query_as("SELECT id, status FROM orders WHERE payment_reference = $1")
                .bind(reference)
                .fetch_optional(&self.pool)
                .await?;

        match existing {
            None => Ok(MarkPaidOutcome::UnknownOrder),
            Some(row) => {
                let status: OrderStatus = row.status.parse()?;
                Ok(settled_outcome(OrderId(row.id), status))
            }
        }
    }

    async fn ping(&self) -> PaymentResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-process order store for local runs and tests
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<String, (OrderId, OrderStatus)>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an order under a payment reference
    pub fn insert(&self, reference: &str, status: OrderStatus) -> PaymentResult<OrderId> {
        let order_id = OrderId(Uuid::new_v4());
        self.orders
            .write()
            .map_err(|_| PaymentError::Database("order store lock poisoned".to_string()))?
            .insert(reference.to_string(), (order_id, status));
        Ok(order_id)
    }

    /// Current status of the order carrying `reference`
    pub fn status(&self, reference: &str) -> Option<OrderStatus> {
        let orders = self.orders.read().ok()?;
        orders.get(reference).map(|(_, status)| *status)
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn mark_paid(&self, reference: &str) -> PaymentResult<MarkPaidOutcome> {
        let mut orders = self
            .orders
            .write()
            .map_err(|_| PaymentError::Database("order store lock poisoned".to_string()))?;

        let Some((order_id, status)) = orders.get_mut(reference) else {
            return Ok(MarkPaidOutcome::UnknownOrder);
        };

        if status.can_transition_to(OrderStatus::Paid) {
            *status = OrderStatus::Paid;
            return Ok(MarkPaidOutcome::Transitioned(*order_id));
        }

        Ok(settled_outcome(*order_id, *status))
    }

    async fn ping(&self) -> PaymentResult<()> {
        Ok(())
    }
}

fn settled_outcome(order_id: OrderId, status: OrderStatus) -> MarkPaidOutcome {
    if status == OrderStatus::Paid {
        MarkPaidOutcome::AlreadyPaid(order_id)
    } else {
        MarkPaidOutcome::NotPayable { order_id, status }
    }
}
