use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Audit and concurrency columns shared by every table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BaseModel {
    /// Incremented by every successful update.
    pub version: i32,
    #[serde(skip)]
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub created_by: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub updated_by: Option<Uuid>,
}

crate::impl_entity!(BaseModel {
    version: column("version"),
    deleted: column("deleted"),
    created_at: column("created_at"),
    created_by: column("created_by"),
    updated_at: column("updated_at"),
    updated_by: column("updated_by"),
});
