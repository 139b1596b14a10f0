//! Profile and match types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::Pool;
use crate::ticket::Ticket;

/// Desired roster shape for matches produced from a profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Roster {
    pub name: String,
    /// How many tickets fill this roster.
    pub ticket_slots: usize,
}

/// A named bundle of pools plus the roster shape of the desired match.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MatchProfile {
    pub name: String,
    pub pools: Vec<Pool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rosters: Vec<Roster>,
}

impl MatchProfile {
    /// Roster slot count for a pool: the roster sharing the pool's name, or
    /// the profile's first roster as a fallback.
    pub fn slots_for_pool(&self, pool_name: &str) -> Option<usize> {
        self.rosters
            .iter()
            .find(|r| r.name == pool_name)
            .or_else(|| self.rosters.first())
            .map(|r| r.ticket_slots)
    }
}

/// A group of tickets forming a legal game, either proposed by a match
/// function or accepted by the evaluator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Match {
    pub match_id: String,
    pub match_profile: String,
    pub match_function: String,
    pub tickets: Vec<Ticket>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl Match {
    /// Ids of every ticket in this match.
    pub fn ticket_ids(&self) -> Vec<String> {
        self.tickets.iter().map(|t| t.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_for_pool_prefers_matching_roster() {
        let profile = MatchProfile {
            name: "p".to_string(),
            pools: Vec::new(),
            rosters: vec![
                Roster {
                    name: "casual".to_string(),
                    ticket_slots: 8,
                },
                Roster {
                    name: "ranked".to_string(),
                    ticket_slots: 4,
                },
            ],
        };
        assert_eq!(profile.slots_for_pool("ranked"), Some(4));
        assert_eq!(profile.slots_for_pool("unknown"), Some(8));
    }

    #[test]
    fn test_slots_for_pool_without_rosters() {
        let profile = MatchProfile::default();
        assert_eq!(profile.slots_for_pool("anything"), None);
    }

    #[test]
    fn test_match_serialization_skips_null_payload() {
        let m = Match {
            match_id: "m-1".to_string(),
            match_profile: "p".to_string(),
            match_function: "pair".to_string(),
            tickets: Vec::new(),
            payload: Value::Null,
        };
        let json = serde_json::to_string(&m).unwrap();
        assert!(!json.contains("payload"));
    }
}
