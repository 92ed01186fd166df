//! Idempotent bootstrap of the `scores` relation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use sqlx::Connection;

use crate::error::{Result, StorageError};
use crate::pool::ScorePool;

const CREATE_SCORES: &str = r#"
    CREATE TABLE IF NOT EXISTS scores (
        id BIGSERIAL PRIMARY KEY,
        user_name TEXT NOT NULL CHECK (btrim(user_name) <> ''),
        result INTEGER NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_USER_NAME_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS scores_user_name_idx ON scores (user_name, result)
"#;

/// Duplicate table, or a unique violation on the catalog when two sessions
/// race through `CREATE TABLE IF NOT EXISTS`.
const LOST_CREATE_RACE: [&str; 2] = ["42P07", "23505"];

#[derive(Debug, Default)]
struct SchemaState {
    ready: AtomicBool,
    last_error: RwLock<Option<String>>,
}

/// Tracks whether the `scores` relation is known to exist and (re)creates it
/// when it is not.
///
/// Cloning shares the readiness state.
#[derive(Debug, Clone, Default)]
pub struct SchemaInitializer {
    state: Arc<SchemaState>,
}

impl SchemaInitializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the relation and its index if absent.
    pub async fn ensure_schema(&self, pool: &ScorePool) -> Result<()> {
        match Self::create(pool).await {
            Ok(()) => {
                self.state.ready.store(true, Ordering::Release);
                self.set_last_error(None);
                tracing::debug!("Schema for 'scores' is in place");
                Ok(())
            }
            Err(e) => {
                self.state.ready.store(false, Ordering::Release);
                self.set_last_error(Some(e.to_string()));
                Err(StorageError::Schema(Box::new(e)))
            }
        }
    }

    /// Startup path: a failure is logged and left for the next operation to
    /// retry.
    pub async fn bootstrap(&self, pool: &ScorePool) -> bool {
        match self.ensure_schema(pool).await {
            Ok(()) => {
                tracing::info!("Schema bootstrap completed");
                true
            }
            Err(e) => {
                tracing::warn!("{}; will retry on next operation", e);
                false
            }
        }
    }

    /// Retry bootstrap if it has not succeeded yet. Failure is logged only;
    /// the caller's own statement reports whatever is wrong with the store.
    pub async fn ensure_ready(&self, pool: &ScorePool) {
        if self.is_ready() {
            return;
        }

        if let Err(e) = self.ensure_schema(pool).await {
            tracing::warn!("{}", e);
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state.ready.load(Ordering::Acquire)
    }

    /// Force the next operation to bootstrap again, e.g. after the relation
    /// was found missing.
    pub fn invalidate(&self) {
        self.state.ready.store(false, Ordering::Release);
    }

    pub fn last_error(&self) -> Option<String> {
        self.state
            .last_error
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn set_last_error(&self, error: Option<String>) {
        if let Ok(mut guard) = self.state.last_error.write() {
            *guard = error;
        }
    }

    async fn create(pool: &ScorePool) -> Result<()> {
        let mut conn = pool.acquire().await?;

        let outcome = async {
            let mut tx = conn.begin().await?;
            sqlx::query(CREATE_SCORES).execute(&mut *tx).await?;
            sqlx::query(CREATE_USER_NAME_INDEX).execute(&mut *tx).await?;
            tx.commit().await
        }
        .await;

        match outcome {
            Ok(()) => {
                conn.release();
                Ok(())
            }
            Err(sqlx::Error::Database(e))
                if e.code()
                    .is_some_and(|code| LOST_CREATE_RACE.iter().any(|race| *race == code)) =>
            {
                tracing::debug!("Concurrent schema bootstrap won the race: {}", e);
                conn.release();
                Ok(())
            }
            Err(e) => Err(conn.fail("ensure_schema", e).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sqlx::postgres::{PgConnectOptions, PgPool};

    use super::*;
    use crate::config::PoolConfig;

    #[tokio::test]
    async fn test_failed_bootstrap_is_recorded_not_raised() {
        let options = PgConnectOptions::new().host("127.0.0.1").port(1);
        let config = PoolConfig {
            min_connections: 0,
            max_connections: 1,
            acquire_timeout: Duration::from_millis(200),
        };
        let pool = ScorePool::new(&config, options).unwrap();
        let schema = SchemaInitializer::new();

        assert!(!schema.bootstrap(&pool).await);
        assert!(!schema.is_ready());
        assert!(schema.last_error().is_some());

        schema.ensure_ready(&pool).await;
        assert!(!schema.is_ready());
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires PostgreSQL (set DATABASE_URL)"]
    async fn test_bootstrap_twice_is_idempotent(pool: PgPool) -> sqlx::Result<()> {
        let pool = ScorePool::from_pool(pool);
        let schema = SchemaInitializer::new();

        schema.ensure_schema(&pool).await.unwrap();
        schema.ensure_schema(&pool).await.unwrap();
        assert!(schema.is_ready());
        assert_eq!(schema.last_error(), None);

        let mut conn = pool.acquire().await.unwrap();
        let relations: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pg_class WHERE relname = 'scores' AND relkind = 'r'",
        )
        .fetch_one(&mut *conn)
        .await?;
        assert_eq!(relations, 1);

        Ok(())
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires PostgreSQL (set DATABASE_URL)"]
    async fn test_concurrent_bootstrap_succeeds(pool: PgPool) -> sqlx::Result<()> {
        let pool = ScorePool::from_pool(pool);
        let first = SchemaInitializer::new();
        let second = SchemaInitializer::new();

        let (a, b) = tokio::join!(first.ensure_schema(&pool), second.ensure_schema(&pool));
        assert!(a.is_ok(), "{a:?}");
        assert!(b.is_ok(), "{b:?}");

        Ok(())
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires PostgreSQL (set DATABASE_URL)"]
    async fn test_invalidate_forces_rebootstrap(pool: PgPool) -> sqlx::Result<()> {
        let pool = ScorePool::from_pool(pool);
        let schema = SchemaInitializer::new();
        schema.ensure_schema(&pool).await.unwrap();

        schema.invalidate();
        assert!(!schema.is_ready());

        schema.ensure_ready(&pool).await;
        assert!(schema.is_ready());

        Ok(())
    }
}
