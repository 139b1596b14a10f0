//! Match function host: runs one matchmaking cycle.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::query::{QueryError, QueryService};
use crate::ticket::Ticket;

use super::traits::{MatchFunction, MmfError};
use super::types::{Match, MatchProfile};

/// Host configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MmfHostConfig {
    /// When set, proposals with more tickets than this are dropped.
    #[serde(default)]
    pub max_tickets_per_match: Option<usize>,
}

/// Runs a match function against a profile: one query stream per pool, all
/// drained before the function sees anything.
pub struct MatchFunctionHost {
    query: Arc<QueryService>,
    config: MmfHostConfig,
}

impl MatchFunctionHost {
    pub fn new(query: Arc<QueryService>, config: MmfHostConfig) -> Self {
        Self { query, config }
    }

    /// Run one cycle of `function` for `profile`.
    ///
    /// Pool queries proceed in parallel; the cycle waits for every stream to
    /// terminate before invoking the function. Query failures surface as
    /// `Internal` except for invalid pools, which are the caller's bug.
    /// Dropping the returned future cancels all in-flight queries.
    pub async fn run(
        &self,
        function: &dyn MatchFunction,
        profile: &MatchProfile,
    ) -> Result<Vec<Match>, MmfError> {
        if profile.pools.is_empty() {
            return Err(MmfError::InvalidArgument(format!(
                "profile {:?} has no pools",
                profile.name
            )));
        }

        let mut queries = JoinSet::new();
        for pool in profile.pools.clone() {
            let query = Arc::clone(&self.query);
            queries.spawn(async move {
                let mut rx = query.query_tickets(&pool).await?;
                let mut tickets = Vec::new();
                while let Some(page) = rx.recv().await {
                    tickets.extend(page?);
                }
                Ok::<_, QueryError>((pool.name, tickets))
            });
        }

        let mut pool_tickets: HashMap<String, Vec<Ticket>> = HashMap::new();
        while let Some(joined) = queries.join_next().await {
            let result = joined.map_err(|e| MmfError::Internal(e.to_string()))?;
            match result {
                Ok((name, tickets)) => {
                    debug!(pool = %name, tickets = tickets.len(), "pool query finished");
                    pool_tickets.insert(name, tickets);
                }
                Err(QueryError::InvalidArgument(msg)) => {
                    return Err(MmfError::InvalidArgument(msg));
                }
                Err(e) => return Err(MmfError::Internal(e.to_string())),
            }
        }

        let proposals = function.run(profile, pool_tickets).await?;
        Ok(self.enforce_ticket_limit(proposals))
    }

    fn enforce_ticket_limit(&self, proposals: Vec<Match>) -> Vec<Match> {
        let Some(limit) = self.config.max_tickets_per_match else {
            return proposals;
        };
        proposals
            .into_iter()
            .filter(|m| {
                if m.tickets.len() > limit {
                    warn!(
                        match_id = %m.match_id,
                        tickets = m.tickets.len(),
                        limit,
                        "dropping oversized proposal"
                    );
                    false
                } else {
                    true
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmf::pair::PairMatchFunction;
    use crate::mmf::types::Roster;
    use crate::query::{DoubleRangeFilter, Pool, QueryConfig};
    use crate::testing::{fixtures, MemoryStateStore};

    fn skill_pool(name: &str, min: f64, max: f64) -> Pool {
        Pool {
            name: name.to_string(),
            double_range_filters: vec![DoubleRangeFilter {
                double_arg: "skill".to_string(),
                min,
                max,
            }],
            ..Pool::default()
        }
    }

    fn host(store: Arc<MemoryStateStore>, config: MmfHostConfig) -> MatchFunctionHost {
        let query = Arc::new(QueryService::new(store, QueryConfig::default()));
        MatchFunctionHost::new(query, config)
    }

    #[tokio::test]
    async fn test_profile_without_pools_rejected() {
        let host = host(Arc::new(MemoryStateStore::new()), MmfHostConfig::default());
        let function = PairMatchFunction::new();
        let result = host.run(&function, &MatchProfile::default()).await;
        assert!(matches!(result, Err(MmfError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_pools_feed_the_function() {
        let store = Arc::new(MemoryStateStore::new());
        for skill in [1.0, 2.0, 11.0, 12.0] {
            store.seed_indexed(fixtures::skill_ticket(skill)).await;
        }

        let host = host(Arc::clone(&store), MmfHostConfig::default());
        let function = PairMatchFunction::new();
        let profile = MatchProfile {
            name: "bands".to_string(),
            pools: vec![
                skill_pool("low", 0.0, 10.0),
                skill_pool("high", 10.0, 20.0),
            ],
            rosters: vec![Roster {
                name: "pair".to_string(),
                ticket_slots: 2,
            }],
        };

        let proposals = host.run(&function, &profile).await.unwrap();
        assert_eq!(proposals.len(), 2);
        for proposal in &proposals {
            assert_eq!(proposal.tickets.len(), 2);
            assert_eq!(proposal.match_profile, "bands");
            assert_eq!(proposal.match_function, "pair");
        }
    }

    #[tokio::test]
    async fn test_oversized_proposals_dropped() {
        let store = Arc::new(MemoryStateStore::new());
        for skill in [1.0, 2.0, 3.0, 4.0] {
            store.seed_indexed(fixtures::skill_ticket(skill)).await;
        }

        let host = host(
            Arc::clone(&store),
            MmfHostConfig {
                max_tickets_per_match: Some(3),
            },
        );
        let function = PairMatchFunction::new();
        let profile = MatchProfile {
            name: "big".to_string(),
            pools: vec![skill_pool("everyone", 0.0, 100.0)],
            rosters: vec![Roster {
                name: "everyone".to_string(),
                ticket_slots: 4,
            }],
        };

        let proposals = host.run(&function, &profile).await.unwrap();
        assert!(proposals.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_pool_surfaces_as_invalid_argument() {
        let host = host(Arc::new(MemoryStateStore::new()), MmfHostConfig::default());
        let function = PairMatchFunction::new();
        let profile = MatchProfile {
            name: "bad".to_string(),
            pools: vec![Pool {
                name: "empty".to_string(),
                ..Pool::default()
            }],
            rosters: Vec::new(),
        };

        let result = host.run(&function, &profile).await;
        assert!(matches!(result, Err(MmfError::InvalidArgument(_))));
    }
}
