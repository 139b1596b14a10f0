//! Ticket and profile fixtures.

use uuid::Uuid;

use crate::mmf::{MatchProfile, Roster};
use crate::query::{DoubleRangeFilter, Pool};
use crate::ticket::Ticket;

/// A stored-form ticket (with id) carrying one `skill` double argument.
pub fn skill_ticket(skill: f64) -> Ticket {
    let mut ticket = skill_ticket_draft(skill);
    ticket.id = format!("ticket-{}", Uuid::new_v4());
    ticket
}

/// A submission-form ticket (no id, no create time) carrying one `skill`
/// double argument.
pub fn skill_ticket_draft(skill: f64) -> Ticket {
    let mut ticket = Ticket::default();
    ticket
        .search_fields
        .double_args
        .insert("skill".to_string(), skill);
    ticket
        .properties
        .insert("skill".to_string(), serde_json::json!(skill));
    ticket
}

/// A ticket draft carrying the given tags.
pub fn tagged_ticket_draft(tags: &[&str]) -> Ticket {
    let mut ticket = Ticket::default();
    ticket.search_fields.tags = tags.iter().map(|t| t.to_string()).collect();
    ticket
}

/// A profile with one pool selecting `skill` within `[min, max]` and one
/// roster of `slots` tickets.
pub fn skill_profile(name: &str, min: f64, max: f64, slots: usize) -> MatchProfile {
    let pool_name = format!("{}-pool", name);
    MatchProfile {
        name: name.to_string(),
        pools: vec![Pool {
            name: pool_name.clone(),
            double_range_filters: vec![DoubleRangeFilter {
                double_arg: "skill".to_string(),
                min,
                max,
            }],
            ..Pool::default()
        }],
        rosters: vec![Roster {
            name: pool_name,
            ticket_slots: slots,
        }],
    }
}
