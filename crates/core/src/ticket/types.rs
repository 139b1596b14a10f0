//! Core ticket data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Named search field values that pool filters evaluate against.
///
/// These are the only parts of a ticket the query service inspects;
/// everything else rides along opaquely in `properties`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchFields {
    /// Numeric arguments, filterable by inclusive range.
    /// Example: {"skill": 42.0, "latency_ms": 35.0}
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub double_args: HashMap<String, f64>,

    /// String arguments, filterable by exact equality.
    /// Example: {"region": "eu-west", "platform": "pc"}
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub string_args: HashMap<String, String>,

    /// Tags, filterable by presence.
    /// Example: ["ranked", "crossplay"]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A server assignment attached to every ticket of an accepted match.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    /// Opaque connection string for the game server (e.g. "10.0.0.1:7777").
    pub connection: String,

    /// Opaque payload forwarded to the submitter alongside the connection.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,

    /// Populated when the assignment could not be fulfilled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Assignment {
    /// Assignment with just a connection string, no payload.
    pub fn new(connection: impl Into<String>) -> Self {
        Self {
            connection: connection.into(),
            payload: Value::Null,
            error: None,
        }
    }
}

/// A matchmaking request from a single client (player or party).
///
/// `id` and `create_time` are assigned by the frontend on creation and never
/// change afterwards. The only mutation a ticket ever sees is `AssignTickets`
/// writing its `assignment`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Ticket {
    /// Server-generated opaque id, unique for the lifetime of the deployment.
    /// Empty on submission; the frontend fills it in.
    pub id: String,

    /// Stamped by the frontend; requests carrying a preset value are rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,

    /// Arbitrary structured document supplied by the submitter.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,

    /// Values the query service filters on.
    #[serde(default)]
    pub search_fields: SearchFields,

    /// Set once the ticket lands in an accepted match; requests carrying a
    /// preset value are rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Assignment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_roundtrips_through_json() {
        let mut ticket = Ticket::default();
        ticket.id = "t-1".to_string();
        ticket.create_time = Some(Utc::now());
        ticket
            .properties
            .insert("mode".to_string(), Value::String("ranked".to_string()));
        ticket
            .search_fields
            .double_args
            .insert("skill".to_string(), 7.0);
        ticket.search_fields.tags.push("crossplay".to_string());

        let json = serde_json::to_string(&ticket).unwrap();
        let parsed: Ticket = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ticket);
    }

    #[test]
    fn test_minimal_ticket_deserializes() {
        let parsed: Ticket = serde_json::from_str(r#"{"id": "t-2"}"#).unwrap();
        assert_eq!(parsed.id, "t-2");
        assert!(parsed.create_time.is_none());
        assert!(parsed.assignment.is_none());
        assert!(parsed.search_fields.double_args.is_empty());
    }

    #[test]
    fn test_assignment_equality_is_deep() {
        let a = Assignment {
            connection: "host:1".to_string(),
            payload: serde_json::json!({"map": "dust"}),
            error: None,
        };
        let b = Assignment {
            connection: "host:1".to_string(),
            payload: serde_json::json!({"map": "dust"}),
            error: None,
        };
        let c = Assignment {
            connection: "host:1".to_string(),
            payload: serde_json::json!({"map": "mirage"}),
            error: None,
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_assignment_new_has_null_payload() {
        let a = Assignment::new("host:7777");
        assert_eq!(a.connection, "host:7777");
        assert!(a.payload.is_null());
        assert!(a.error.is_none());
    }
}
