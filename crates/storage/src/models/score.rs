use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One persisted game result.
///
/// `id` and `created_at` are always assigned by the store; rows are never
/// updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Score {
    pub id: i64,
    pub user_name: String,
    pub result: i32,
    pub created_at: DateTime<Utc>,
}
