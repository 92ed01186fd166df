use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};

use crate::config::ListLimits;
use crate::dto::score::{NewScore, SubmitScoreRequest};
use crate::error::{Result, StorageError};
use crate::models::{LeaderboardEntry, Score};
use crate::pool::{PooledConnection, ScorePool};
use crate::ranking::RankingPolicy;
use crate::schema::SchemaInitializer;

pub struct ScoreRepository<'a> {
    pool: &'a ScorePool,
    schema: &'a SchemaInitializer,
    limits: ListLimits,
}

impl<'a> ScoreRepository<'a> {
    pub fn new(pool: &'a ScorePool, schema: &'a SchemaInitializer, limits: ListLimits) -> Self {
        Self {
            pool,
            schema,
            limits,
        }
    }

    /// Validate and persist one result.
    pub async fn submit(&self, user_name: &str, result: i64) -> Result<Score> {
        self.create(SubmitScoreRequest::new(user_name, result)).await
    }

    /// Same as [`submit`](Self::submit) for an already deserialized request.
    /// Nothing touches the pool unless validation passes.
    pub async fn create(&self, request: SubmitScoreRequest) -> Result<Score> {
        let new_score = request.into_new_score()?;

        self.schema.ensure_ready(self.pool).await;
        let mut conn = self.pool.acquire().await?;

        match Self::insert(&mut conn, &new_score).await {
            Ok(score) => {
                conn.release();
                tracing::debug!(
                    "Stored score {} for '{}' ({})",
                    score.id,
                    score.user_name,
                    score.result
                );
                Ok(score)
            }
            Err(e) => Err(self.fail(conn, "submit", e).await),
        }
    }

    /// Most recently inserted scores first.
    pub async fn recent(&self, limit: Option<i64>) -> Result<Vec<Score>> {
        let limit = self.limits.recent(limit);

        self.schema.ensure_ready(self.pool).await;
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, Score>(
            r#"
            SELECT id, user_name, result, created_at
            FROM scores
            ORDER BY id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *conn)
        .await;

        match rows {
            Ok(scores) => {
                conn.release();
                Ok(scores)
            }
            Err(e) => Err(self.fail(conn, "recent", e).await),
        }
    }

    /// One entry per user, best first under `policy`, ties by user name.
    pub async fn leaderboard(
        &self,
        limit: Option<i64>,
        policy: RankingPolicy,
    ) -> Result<Vec<LeaderboardEntry>> {
        let limit = self.limits.leaderboard(limit);

        self.schema.ensure_ready(self.pool).await;
        let mut conn = self.pool.acquire().await?;

        match Self::fetch_leaderboard(&mut conn, limit, policy).await {
            Ok(entries) => {
                conn.release();
                Ok(entries)
            }
            Err(e) => Err(self.fail(conn, "leaderboard", e).await),
        }
    }

    async fn insert(conn: &mut PgConnection, new_score: &NewScore) -> sqlx::Result<Score> {
        let mut tx = conn.begin().await?;

        let score = sqlx::query_as::<_, Score>(
            r#"
            INSERT INTO scores (user_name, result)
            VALUES ($1, $2)
            RETURNING id, user_name, result, created_at
            "#,
        )
        .bind(&new_score.user_name)
        .bind(new_score.result)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(score)
    }

    async fn fetch_leaderboard(
        conn: &mut PgConnection,
        limit: i64,
        policy: RankingPolicy,
    ) -> sqlx::Result<Vec<LeaderboardEntry>> {
        // Only static SQL fragments from the policy are pushed unbound.
        let mut query = QueryBuilder::<Postgres>::new("SELECT user_name, ");
        query.push(policy.aggregate().as_sql());
        query.push(
            r#"(result) AS best
            FROM scores
            GROUP BY user_name
            ORDER BY best "#,
        );
        query.push(policy.direction().as_sql());
        query.push(r#", user_name COLLATE "C" ASC LIMIT "#);
        query.push_bind(limit);

        query.build_query_as().fetch_all(conn).await
    }

    async fn fail(
        &self,
        conn: PooledConnection,
        operation: &'static str,
        source: sqlx::Error,
    ) -> StorageError {
        let error = conn.fail(operation, source).await;
        if error.is_undefined_table() {
            tracing::warn!("Relation 'scores' is missing; schema will be recreated");
            self.schema.invalidate();
        }
        error
    }
}
