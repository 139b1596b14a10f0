//! A simple built-in match function that groups tickets within each pool.

use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::ticket::Ticket;

use super::traits::{MatchFunction, MmfError};
use super::types::{Match, MatchProfile};

/// Groups each pool's tickets, in arrival order, into matches of the
/// profile's roster size (default 2). Leftover tickets that cannot fill a
/// complete roster stay unmatched and will be seen again next cycle.
pub struct PairMatchFunction;

impl PairMatchFunction {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PairMatchFunction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MatchFunction for PairMatchFunction {
    fn name(&self) -> &str {
        "pair"
    }

    async fn run(
        &self,
        profile: &MatchProfile,
        pool_tickets: HashMap<String, Vec<Ticket>>,
    ) -> Result<Vec<Match>, MmfError> {
        let mut proposals = Vec::new();

        for (pool_name, tickets) in pool_tickets {
            let slots = profile.slots_for_pool(&pool_name).unwrap_or(2).max(1);

            for group in tickets.chunks(slots) {
                if group.len() < slots {
                    break;
                }
                proposals.push(Match {
                    match_id: Uuid::new_v4().to_string(),
                    match_profile: profile.name.clone(),
                    match_function: self.name().to_string(),
                    tickets: group.to_vec(),
                    payload: serde_json::Value::Null,
                });
            }
        }

        Ok(proposals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmf::types::Roster;
    use crate::testing::fixtures;

    fn profile(slots: usize) -> MatchProfile {
        MatchProfile {
            name: "test".to_string(),
            pools: Vec::new(),
            rosters: vec![Roster {
                name: "everyone".to_string(),
                ticket_slots: slots,
            }],
        }
    }

    fn pool_of(n: usize) -> HashMap<String, Vec<Ticket>> {
        let tickets = (0..n).map(|i| fixtures::skill_ticket(i as f64)).collect();
        HashMap::from([("everyone".to_string(), tickets)])
    }

    #[tokio::test]
    async fn test_pairs_up_even_pool() {
        let function = PairMatchFunction::new();
        let proposals = function.run(&profile(2), pool_of(6)).await.unwrap();
        assert_eq!(proposals.len(), 3);
        assert!(proposals.iter().all(|m| m.tickets.len() == 2));
    }

    #[tokio::test]
    async fn test_leftover_ticket_not_matched() {
        let function = PairMatchFunction::new();
        let proposals = function.run(&profile(2), pool_of(5)).await.unwrap();
        assert_eq!(proposals.len(), 2);

        let matched: Vec<String> = proposals.iter().flat_map(|m| m.ticket_ids()).collect();
        assert_eq!(matched.len(), 4);
    }

    #[tokio::test]
    async fn test_roster_size_respected() {
        let function = PairMatchFunction::new();
        let proposals = function.run(&profile(4), pool_of(9)).await.unwrap();
        assert_eq!(proposals.len(), 2);
        assert!(proposals.iter().all(|m| m.tickets.len() == 4));
    }

    #[tokio::test]
    async fn test_match_ids_are_unique() {
        let function = PairMatchFunction::new();
        let proposals = function.run(&profile(2), pool_of(8)).await.unwrap();
        let mut ids: Vec<_> = proposals.iter().map(|m| m.match_id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), proposals.len());
    }
}
