use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use storage::{Database, dto::leaderboard::LeaderboardParams, models::LeaderboardEntry};

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/leaderboard",
    params(LeaderboardParams),
    responses(
        (status = 200, description = "Leaderboard retrieved successfully", body = Vec<LeaderboardEntry>),
        (status = 400, description = "Invalid ranking parameters"),
        (status = 503, description = "Score store unavailable")
    ),
    tag = "leaderboard"
)]
pub async fn get_leaderboard(
    State(db): State<Database>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Response, WebError> {
    let policy = params.policy(db.ranking()).map_err(WebError::BadRequest)?;

    let entries = services::get_leaderboard(&db, params.limit, policy).await?;

    Ok(Json(entries).into_response())
}
