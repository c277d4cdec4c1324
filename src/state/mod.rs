use crate::services::{CheckoutService, DeviceRepository};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub checkout_service: Arc<CheckoutService>,
}

impl AppState {
    pub fn build(pool: SqlitePool) -> Self {
        let repository = DeviceRepository::new(pool);
        Self {
            checkout_service: Arc::new(CheckoutService::new(repository)),
        }
    }
}

