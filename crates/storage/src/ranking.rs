use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{Result, StorageError};
use crate::models::LeaderboardEntry;

/// Which of a user's results counts as their best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    Max,
    Min,
}

impl Aggregate {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Max => "MAX",
            Self::Min => "MIN",
        }
    }

    /// The only ordering that puts the best entries first for this aggregate.
    pub fn paired_direction(&self) -> Direction {
        match self {
            Self::Max => Direction::Desc,
            Self::Min => Direction::Asc,
        }
    }
}

impl FromStr for Aggregate {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" => Ok(Self::Max),
            "min" => Ok(Self::Min),
            other => Err(StorageError::Config(format!(
                "unknown ranking aggregate '{other}', expected 'max' or 'min'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Desc,
    Asc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Desc => "DESC",
            Self::Asc => "ASC",
        }
    }
}

impl FromStr for Direction {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desc" => Ok(Self::Desc),
            "asc" => Ok(Self::Asc),
            other => Err(StorageError::Config(format!(
                "unknown ranking direction '{other}', expected 'desc' or 'asc'"
            ))),
        }
    }
}

/// Decides what "better" means for a leaderboard.
///
/// Point totals want `max`/`desc`, elapsed times want `min`/`asc`. The pair is
/// always supplied by the deployment; nothing in the storage layer guesses it.
/// Ties on `best` are broken by `user_name` ascending, whatever the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RankingPolicy {
    aggregate: Aggregate,
    direction: Direction,
}

impl RankingPolicy {
    pub const HIGHER_IS_BETTER: Self = Self {
        aggregate: Aggregate::Max,
        direction: Direction::Desc,
    };

    pub const LOWER_IS_BETTER: Self = Self {
        aggregate: Aggregate::Min,
        direction: Direction::Asc,
    };

    pub fn new(aggregate: Aggregate, direction: Direction) -> Result<Self> {
        if aggregate.paired_direction() != direction {
            return Err(StorageError::Config(format!(
                "ranking aggregate '{}' cannot be ordered '{}'",
                aggregate, direction
            )));
        }

        Ok(Self {
            aggregate,
            direction,
        })
    }

    /// Build from an aggregate and an optional direction, defaulting the
    /// direction to the one paired with the aggregate.
    pub fn from_parts(aggregate: Aggregate, direction: Option<Direction>) -> Result<Self> {
        Self::new(
            aggregate,
            direction.unwrap_or_else(|| aggregate.paired_direction()),
        )
    }

    pub fn aggregate(&self) -> Aggregate {
        self.aggregate
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether `candidate` would replace `current` as a user's best.
    pub fn improves(&self, candidate: i32, current: i32) -> bool {
        match self.aggregate {
            Aggregate::Max => candidate > current,
            Aggregate::Min => candidate < current,
        }
    }

    /// Leaderboard order: best first, then `user_name` ascending.
    pub fn compare(&self, a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
        let by_best = match self.direction {
            Direction::Desc => b.best.cmp(&a.best),
            Direction::Asc => a.best.cmp(&b.best),
        };
        by_best.then_with(|| a.user_name.cmp(&b.user_name))
    }

    /// Rank `(user_name, result)` pairs in memory with the same semantics the
    /// store applies in SQL.
    pub fn rank<'a, I>(&self, results: I, limit: usize) -> Vec<LeaderboardEntry>
    where
        I: IntoIterator<Item = (&'a str, i32)>,
    {
        let mut best: BTreeMap<&str, i32> = BTreeMap::new();
        for (user_name, result) in results {
            best.entry(user_name)
                .and_modify(|current| {
                    if self.improves(result, *current) {
                        *current = result;
                    }
                })
                .or_insert(result);
        }

        let mut entries: Vec<LeaderboardEntry> = best
            .into_iter()
            .map(|(user_name, best)| LeaderboardEntry {
                user_name: user_name.to_string(),
                best,
            })
            .collect();
        entries.sort_by(|a, b| self.compare(a, b));
        entries.truncate(limit);
        entries
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Max => "max",
            Self::Min => "min",
        })
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Desc => "desc",
            Self::Asc => "asc",
        })
    }
}

impl fmt::Display for RankingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.aggregate, self.direction)
    }
}
