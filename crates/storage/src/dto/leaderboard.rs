use serde::Deserialize;
use utoipa::IntoParams;

use crate::ranking::{Aggregate, Direction, RankingPolicy};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardParams {
    /// Number of entries to return; clamped to the configured range.
    pub limit: Option<i64>,
    /// Overrides the configured aggregate for this request.
    pub aggregate: Option<Aggregate>,
    /// Must agree with the aggregate when given.
    pub direction: Option<Direction>,
}

impl LeaderboardParams {
    /// Resolve the policy for this request, falling back to `default`.
    pub fn policy(&self, default: RankingPolicy) -> Result<RankingPolicy, String> {
        match (self.aggregate, self.direction) {
            (None, None) => Ok(default),
            (Some(aggregate), direction) => {
                RankingPolicy::from_parts(aggregate, direction).map_err(|e| e.to_string())
            }
            (None, Some(direction)) if direction == default.direction() => Ok(default),
            (None, Some(direction)) => Err(format!(
                "direction '{}' conflicts with the configured ranking '{}'; pass an aggregate as well",
                direction, default
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(aggregate: Option<Aggregate>, direction: Option<Direction>) -> LeaderboardParams {
        LeaderboardParams {
            limit: None,
            aggregate,
            direction,
        }
    }

    #[test]
    fn test_no_override_uses_default() {
        let policy = params(None, None)
            .policy(RankingPolicy::LOWER_IS_BETTER)
            .unwrap();
        assert_eq!(policy, RankingPolicy::LOWER_IS_BETTER);
    }

    #[test]
    fn test_aggregate_override_pairs_direction() {
        let policy = params(Some(Aggregate::Max), None)
            .policy(RankingPolicy::LOWER_IS_BETTER)
            .unwrap();
        assert_eq!(policy, RankingPolicy::HIGHER_IS_BETTER);
    }

    #[test]
    fn test_conflicting_override_is_rejected() {
        assert!(params(Some(Aggregate::Max), Some(Direction::Asc))
            .policy(RankingPolicy::HIGHER_IS_BETTER)
            .is_err());
        assert!(params(None, Some(Direction::Desc))
            .policy(RankingPolicy::LOWER_IS_BETTER)
            .is_err());
        assert!(params(None, Some(Direction::Asc))
            .policy(RankingPolicy::LOWER_IS_BETTER)
            .is_ok());
    }
}
