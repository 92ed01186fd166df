//! Score storage core: a bounded connection pool, idempotent schema
//! bootstrap, validated ingestion and policy-driven leaderboards over a
//! PostgreSQL `scores` relation.

pub mod config;
pub mod dto;
pub mod error;
pub mod health;
pub mod models;
pub mod pool;
pub mod ranking;
pub mod repository;
pub mod schema;

use config::{ListLimits, StoreConfig};
use error::Result;
use health::HealthStatus;
use pool::ScorePool;
use ranking::RankingPolicy;
use repository::score::ScoreRepository;
use schema::SchemaInitializer;

/// The storage core as one explicit, cloneable handle.
///
/// Built once at startup from a [`StoreConfig`]; clones share the pool and the
/// schema readiness state.
#[derive(Debug, Clone)]
pub struct Database {
    pool: ScorePool,
    schema: SchemaInitializer,
    limits: ListLimits,
    ranking: RankingPolicy,
}

impl Database {
    /// Build the store handle. No connection is opened here.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        config.limits.validate()?;
        let options = config.target.connect_options()?;
        let pool = ScorePool::new(&config.pool, options)?;

        Ok(Self::with_pool(pool, config.limits, config.ranking))
    }

    pub fn with_pool(pool: ScorePool, limits: ListLimits, ranking: RankingPolicy) -> Self {
        Self {
            pool,
            schema: SchemaInitializer::new(),
            limits,
            ranking,
        }
    }

    pub fn schema(&self) -> &SchemaInitializer {
        &self.schema
    }

    /// The deployment's configured ranking policy.
    pub fn ranking(&self) -> RankingPolicy {
        self.ranking
    }

    pub fn scores(&self) -> ScoreRepository<'_> {
        ScoreRepository::new(&self.pool, &self.schema, self.limits)
    }

    /// Best-effort startup bootstrap; see [`SchemaInitializer::bootstrap`].
    pub async fn bootstrap_schema(&self) -> bool {
        self.schema.bootstrap(&self.pool).await
    }

    pub async fn health_check(&self) -> HealthStatus {
        health::check(&self.pool, &self.schema).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
