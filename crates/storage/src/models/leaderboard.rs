use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A user's best result under some ranking policy. Derived on every query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaderboardEntry {
    pub user_name: String,
    pub best: i32,
}
