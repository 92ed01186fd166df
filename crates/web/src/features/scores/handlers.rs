use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::score::{RecentScoresParams, SubmitScoreRequest},
    models::Score,
};

use crate::error::WebError;

use super::services;

#[utoipa::path(
    post,
    path = "/api/scores",
    request_body = SubmitScoreRequest,
    responses(
        (status = 201, description = "Score stored", body = Score),
        (status = 400, description = "Validation error"),
        (status = 503, description = "Score store unavailable")
    ),
    tag = "scores"
)]
pub async fn submit_score(
    State(db): State<Database>,
    payload: Result<Json<SubmitScoreRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(request) = payload?;
    let score = services::submit_score(&db, request).await?;

    Ok((StatusCode::CREATED, Json(score)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/scores",
    params(RecentScoresParams),
    responses(
        (status = 200, description = "Most recent scores, newest first", body = Vec<Score>),
        (status = 503, description = "Score store unavailable")
    ),
    tag = "scores"
)]
pub async fn recent_scores(
    State(db): State<Database>,
    Query(params): Query<RecentScoresParams>,
) -> Result<Response, WebError> {
    let scores = services::recent_scores(&db, params.limit).await?;

    Ok(Json(scores).into_response())
}
