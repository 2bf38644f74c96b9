//! Shared application state for all routes.

use crate::service::Services;
use crate::settings::Settings;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub services: Services,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(pool: PgPool, settings: Settings) -> Self {
        let services = Services::new(pool.clone(), settings.db.query_timeout);
        AppState {
            pool,
            services,
            settings: Arc::new(settings),
        }
    }
}
