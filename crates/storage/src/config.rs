use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

use crate::error::{Result, StorageError};
use crate::ranking::RankingPolicy;

/// Everything the storage core needs to run against one PostgreSQL database.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub target: ConnectTarget,
    pub pool: PoolConfig,
    pub limits: ListLimits,
    pub ranking: RankingPolicy,
}

/// Where the store lives. A full `DATABASE_URL` takes precedence over the
/// discrete fields when present.
#[derive(Clone)]
pub struct ConnectTarget {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl Default for ConnectTarget {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            database: "scoreboard".to_string(),
            user: "scoreboard".to_string(),
            password: "scoreboard".to_string(),
        }
    }
}

impl ConnectTarget {
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if let Some(ref url) = self.url {
            return PgConnectOptions::from_str(url)
                .map_err(|e| StorageError::Config(format!("invalid DATABASE_URL: {e}")));
        }

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password))
    }

    /// `host:port/database`, safe to log.
    pub fn redacted(&self) -> String {
        match self.url {
            Some(ref url) => url
                .split('@')
                .next_back()
                .unwrap_or("unknown")
                .to_string(),
            None => format!("{}:{}/{}", self.host, self.port, self.database),
        }
    }
}

impl fmt::Debug for ConnectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectTarget")
            .field("target", &self.redacted())
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(StorageError::Config(
                "pool maximum size must be at least 1".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(StorageError::Config(format!(
                "pool minimum size {} exceeds maximum size {}",
                self.min_connections, self.max_connections
            )));
        }
        if self.acquire_timeout.is_zero() {
            return Err(StorageError::Config(
                "pool acquire timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default and maximum lengths for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLimits {
    pub default_recent: i64,
    pub default_leaderboard: i64,
    pub max: i64,
}

impl Default for ListLimits {
    fn default() -> Self {
        Self {
            default_recent: 10,
            default_leaderboard: 10,
            max: 100,
        }
    }
}

impl ListLimits {
    pub fn validate(&self) -> Result<()> {
        if self.max < 1 {
            return Err(StorageError::Config(
                "maximum list limit must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("recent", self.default_recent),
            ("leaderboard", self.default_leaderboard),
        ] {
            if !(1..=self.max).contains(&value) {
                return Err(StorageError::Config(format!(
                    "default {name} limit {value} must be between 1 and {}",
                    self.max
                )));
            }
        }
        Ok(())
    }

    /// Out-of-range limits are clamped, never rejected.
    pub fn clamp(&self, limit: i64) -> i64 {
        limit.clamp(1, self.max)
    }

    pub fn recent(&self, limit: Option<i64>) -> i64 {
        self.clamp(limit.unwrap_or(self.default_recent))
    }

    pub fn leaderboard(&self, limit: Option<i64>) -> i64 {
        self.clamp(limit.unwrap_or(self.default_leaderboard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_are_clamped() {
        let limits = ListLimits::default();
        assert_eq!(limits.clamp(0), 1);
        assert_eq!(limits.clamp(-20), 1);
        assert_eq!(limits.clamp(42), 42);
        assert_eq!(limits.clamp(10_000), 100);
        assert_eq!(limits.clamp(i64::MAX), 100);
    }

    #[test]
    fn test_missing_limit_uses_default() {
        let limits = ListLimits {
            default_recent: 20,
            default_leaderboard: 50,
            max: 500,
        };
        assert_eq!(limits.recent(None), 20);
        assert_eq!(limits.leaderboard(None), 50);
        assert_eq!(limits.leaderboard(Some(501)), 500);
    }

    #[test]
    fn test_default_above_max_is_rejected() {
        let limits = ListLimits {
            default_recent: 200,
            default_leaderboard: 10,
            max: 100,
        };
        assert!(limits.validate().is_err());
        assert!(ListLimits::default().validate().is_ok());
    }

    #[test]
    fn test_pool_bounds_are_checked() {
        let inverted = PoolConfig {
            min_connections: 5,
            max_connections: 2,
            ..PoolConfig::default()
        };
        assert!(inverted.validate().is_err());

        let empty = PoolConfig {
            min_connections: 0,
            max_connections: 0,
            ..PoolConfig::default()
        };
        assert!(empty.validate().is_err());
        assert!(PoolConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_acquire_timeout_is_rejected() {
        let instant = PoolConfig {
            acquire_timeout: Duration::ZERO,
            ..PoolConfig::default()
        };
        assert!(matches!(instant.validate(), Err(StorageError::Config(_))));

        let short = PoolConfig {
            acquire_timeout: Duration::from_millis(1),
            ..PoolConfig::default()
        };
        assert!(short.validate().is_ok());
    }

    #[test]
    fn test_redacted_target_hides_credentials() {
        let target = ConnectTarget {
            url: Some("postgresql://mario:secret@db:5432/scores".to_string()),
            ..ConnectTarget::default()
        };
        assert_eq!(target.redacted(), "db:5432/scores");
        assert!(!format!("{target:?}").contains("secret"));

        let discrete = ConnectTarget::default();
        assert_eq!(discrete.redacted(), "localhost:5432/scoreboard");
        assert!(!format!("{discrete:?}").contains("password"));
    }

    #[test]
    fn test_bad_url_is_a_config_error() {
        let target = ConnectTarget {
            url: Some("not a url".to_string()),
            ..ConnectTarget::default()
        };
        assert!(matches!(
            target.connect_options(),
            Err(StorageError::Config(_))
        ));
    }
}
