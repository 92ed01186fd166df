use storage::{
    Database, error::Result, models::LeaderboardEntry, ranking::RankingPolicy,
};

/// Best result per user under the given policy
pub async fn get_leaderboard(
    db: &Database,
    limit: Option<i64>,
    policy: RankingPolicy,
) -> Result<Vec<LeaderboardEntry>> {
    db.scores().leaderboard(limit, policy).await
}
