//! Use cases: validation, transactions and repository calls per request.

mod daylog;
mod report;
mod tag;
mod user;
pub mod validation;

pub use daylog::DaylogService;
pub use report::ReportService;
pub use tag::TagService;
pub use user::UserService;
pub use validation::Validator;

use sqlx::PgPool;
use std::time::Duration;

/// Every service over one pool and one statement timeout.
#[derive(Debug, Clone)]
pub struct Services {
    pub users: UserService,
    pub daylogs: DaylogService,
    pub tags: TagService,
    pub reports: ReportService,
}

impl Services {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Services {
            users: UserService::new(pool.clone(), timeout),
            daylogs: DaylogService::new(pool.clone(), timeout),
            tags: TagService::new(pool.clone(), timeout),
            reports: ReportService::new(pool, timeout),
        }
    }
}
