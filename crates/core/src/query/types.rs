//! Pool filter types.

use serde::{Deserialize, Serialize};

use crate::ticket::Ticket;

/// Inclusive numeric range over one double argument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoubleRangeFilter {
    /// Name of the search field to compare.
    pub double_arg: String,
    pub min: f64,
    pub max: f64,
}

/// Exact equality over one string argument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StringEqualsFilter {
    /// Name of the search field to compare.
    pub string_arg: String,
    pub value: String,
}

/// Requires a tag to be present on the ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagPresentFilter {
    pub tag: String,
}

/// A named conjunction of filters over ticket search fields.
///
/// A ticket passes the pool iff it passes every filter. A pool with no
/// filters at all is rejected by the query service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Pool {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub double_range_filters: Vec<DoubleRangeFilter>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub string_equals_filters: Vec<StringEqualsFilter>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_present_filters: Vec<TagPresentFilter>,
}

impl Pool {
    /// Total number of filters across all kinds.
    pub fn filter_count(&self) -> usize {
        self.double_range_filters.len()
            + self.string_equals_filters.len()
            + self.tag_present_filters.len()
    }

    /// Whether the ticket passes every filter of this pool.
    pub fn matches(&self, ticket: &Ticket) -> bool {
        let fields = &ticket.search_fields;

        for filter in &self.double_range_filters {
            match fields.double_args.get(&filter.double_arg) {
                Some(value) if *value >= filter.min && *value <= filter.max => {}
                _ => return false,
            }
        }

        for filter in &self.string_equals_filters {
            match fields.string_args.get(&filter.string_arg) {
                Some(value) if *value == filter.value => {}
                _ => return false,
            }
        }

        for filter in &self.tag_present_filters {
            if !fields.tags.iter().any(|t| *t == filter.tag) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill_ticket(skill: f64) -> Ticket {
        let mut ticket = Ticket::default();
        ticket.id = format!("skill-{}", skill);
        ticket
            .search_fields
            .double_args
            .insert("skill".to_string(), skill);
        ticket
    }

    fn range_pool(min: f64, max: f64) -> Pool {
        Pool {
            name: "skill-band".to_string(),
            double_range_filters: vec![DoubleRangeFilter {
                double_arg: "skill".to_string(),
                min,
                max,
            }],
            ..Pool::default()
        }
    }

    #[test]
    fn test_double_range_is_inclusive_both_ends() {
        let pool = range_pool(10.0, 20.0);
        assert!(pool.matches(&skill_ticket(10.0)));
        assert!(pool.matches(&skill_ticket(15.0)));
        assert!(pool.matches(&skill_ticket(20.0)));
        assert!(!pool.matches(&skill_ticket(9.999)));
        assert!(!pool.matches(&skill_ticket(20.001)));
    }

    #[test]
    fn test_missing_double_arg_fails_filter() {
        let pool = range_pool(0.0, 100.0);
        let ticket = Ticket::default();
        assert!(!pool.matches(&ticket));
    }

    #[test]
    fn test_string_equals() {
        let pool = Pool {
            name: "eu-only".to_string(),
            string_equals_filters: vec![StringEqualsFilter {
                string_arg: "region".to_string(),
                value: "eu-west".to_string(),
            }],
            ..Pool::default()
        };

        let mut ticket = Ticket::default();
        ticket
            .search_fields
            .string_args
            .insert("region".to_string(), "eu-west".to_string());
        assert!(pool.matches(&ticket));

        ticket
            .search_fields
            .string_args
            .insert("region".to_string(), "us-east".to_string());
        assert!(!pool.matches(&ticket));
    }

    #[test]
    fn test_tag_present() {
        let pool = Pool {
            name: "ranked".to_string(),
            tag_present_filters: vec![TagPresentFilter {
                tag: "ranked".to_string(),
            }],
            ..Pool::default()
        };

        let mut ticket = Ticket::default();
        assert!(!pool.matches(&ticket));
        ticket.search_fields.tags.push("ranked".to_string());
        assert!(pool.matches(&ticket));
    }

    #[test]
    fn test_conjunction_requires_every_filter() {
        let mut pool = range_pool(0.0, 50.0);
        pool.tag_present_filters.push(TagPresentFilter {
            tag: "crossplay".to_string(),
        });

        let mut ticket = skill_ticket(25.0);
        assert!(!pool.matches(&ticket));
        ticket.search_fields.tags.push("crossplay".to_string());
        assert!(pool.matches(&ticket));
    }

    #[test]
    fn test_filter_count() {
        let mut pool = range_pool(0.0, 1.0);
        assert_eq!(pool.filter_count(), 1);
        pool.string_equals_filters.push(StringEqualsFilter {
            string_arg: "region".to_string(),
            value: "eu".to_string(),
        });
        pool.tag_present_filters.push(TagPresentFilter {
            tag: "ranked".to_string(),
        });
        assert_eq!(pool.filter_count(), 3);
        assert_eq!(Pool::default().filter_count(), 0);
    }
}
