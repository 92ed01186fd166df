use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use storage::config::{ConnectTarget, ListLimits, PoolConfig, StoreConfig};
use storage::ranking::{Aggregate, Direction, RankingPolicy};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let target_defaults = ConnectTarget::default();
        let target = ConnectTarget {
            url: var("DATABASE_URL"),
            host: var("DB_HOST").unwrap_or(target_defaults.host),
            port: parse_or(&var, "DB_PORT", target_defaults.port)?,
            database: var("DB_NAME").unwrap_or(target_defaults.database),
            user: var("DB_USER").unwrap_or(target_defaults.user),
            password: var("DB_PASSWORD").unwrap_or(target_defaults.password),
        };

        let pool_defaults = PoolConfig::default();
        let pool = PoolConfig {
            min_connections: parse_or(&var, "DB_POOL_MIN", pool_defaults.min_connections)?,
            max_connections: parse_or(&var, "DB_POOL_MAX", pool_defaults.max_connections)?,
            acquire_timeout: Duration::from_millis(parse_or(
                &var,
                "DB_POOL_ACQUIRE_TIMEOUT_MS",
                pool_defaults.acquire_timeout.as_millis() as u64,
            )?),
        };

        let limit_defaults = ListLimits::default();
        let limits = ListLimits {
            default_recent: parse_or(&var, "SCORES_DEFAULT_LIMIT", limit_defaults.default_recent)?,
            default_leaderboard: parse_or(
                &var,
                "LEADERBOARD_DEFAULT_LIMIT",
                limit_defaults.default_leaderboard,
            )?,
            max: parse_or(&var, "LIST_MAX_LIMIT", limit_defaults.max)?,
        };

        let aggregate: Aggregate = var("RANKING_AGGREGATE")
            .ok_or_else(|| anyhow!("RANKING_AGGREGATE must be set to 'max' or 'min'"))?
            .parse()
            .context("Cannot parse RANKING_AGGREGATE")?;
        let direction = var("RANKING_DIRECTION")
            .map(|value| value.parse::<Direction>())
            .transpose()
            .context("Cannot parse RANKING_DIRECTION")?;
        let ranking = RankingPolicy::from_parts(aggregate, direction)
            .context("Inconsistent ranking configuration")?;

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&var, "PORT", 8000)?,
            store: StoreConfig {
                target,
                pool,
                limits,
                ranking,
            },
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got '{value}'")),
        None => Ok(default),
    }
}
