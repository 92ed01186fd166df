use storage::{
    Database, dto::score::SubmitScoreRequest, error::Result, models::Score,
};

/// Validate and store one submission
pub async fn submit_score(db: &Database, request: SubmitScoreRequest) -> Result<Score> {
    db.scores().create(request).await
}

/// Most recent submissions first
pub async fn recent_scores(db: &Database, limit: Option<i64>) -> Result<Vec<Score>> {
    db.scores().recent(limit).await
}
