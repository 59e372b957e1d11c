//! Shared application state

use std::sync::Arc;

use zynkart_payments::{OrderStore, PaystackWebhook};

use crate::config::RouteTable;
use crate::routing::TenantRouter;

#[derive(Clone)]
pub struct AppState {
    pub tenant_router: Arc<TenantRouter>,
    pub orders: Arc<dyn OrderStore>,
    pub paystack: PaystackWebhook,
}

impl AppState {
    pub fn new(routes: RouteTable, orders: Arc<dyn OrderStore>, paystack: PaystackWebhook) -> Self {
        Self {
            tenant_router: Arc::new(TenantRouter::new(routes)),
            orders,
            paystack,
        }
    }
}
