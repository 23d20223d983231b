//! Application state management
//!
//! Shared by all request handlers through Axum's State extractor.

use std::sync::Arc;

use redis::aio::ConnectionManager;
use sqlx::PgPool;

use crate::{config::Config, gateway::PayuClient, services::notification::Notifier};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    db: PgPool,

    /// Refresh token store
    redis: ConnectionManager,

    config: Config,

    payu: PayuClient,

    /// Tells payers their entries are paid
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(
        db: PgPool,
        redis: ConnectionManager,
        config: Config,
        payu: PayuClient,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db,
                redis,
                config,
                payu,
                notifier,
            }),
        }
    }

    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get a clone of the Redis connection manager
    pub fn redis(&self) -> ConnectionManager {
        self.inner.redis.clone()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn payu(&self) -> &PayuClient {
        &self.inner.payu
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.inner.notifier.as_ref()
    }
}
