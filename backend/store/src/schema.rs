//! Shape checks for records read back from the state directory.
//!
//! Malformed entries are not fatal. They are returned alongside the valid ones
//! so the caller decides how loudly to complain.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::models::{Node, Record, Suggestion};

#[derive(Clone, Debug, PartialEq)]
pub struct Rejection {
    /// Position in the source array, `None` when the whole document was rejected.
    pub index: Option<usize>,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Validated<T> {
    pub valid: Vec<T>,
    pub rejected: Vec<Rejection>,
}

impl<T> Validated<T> {
    fn empty() -> Self {
        Self {
            valid: Vec::new(),
            rejected: Vec::new(),
        }
    }

    pub fn warn_rejected(&self, label: &str) {
        for rejection in &self.rejected {
            match rejection.index {
                Some(index) => warn!("[schema] Ignored malformed {label} entry {index}: {}", rejection.reason),
                None => warn!("[schema] {}", rejection.reason),
            }
        }
    }
}

pub fn validate_nodes(raw: Value) -> Validated<Node> {
    validate_array(raw, "nodes")
}

pub fn validate_suggestions(raw: Value) -> Validated<Suggestion> {
    validate_array(raw, "suggestions")
}

pub fn validate_consents(raw: Value) -> Validated<Record> {
    validate_array(raw, "consents")
}

pub fn validate_array<T: DeserializeOwned>(raw: Value, label: &str) -> Validated<T> {
    let mut validated = Validated::empty();

    let entries = match raw {
        Value::Array(entries) => entries,
        Value::Null => return validated,
        other => {
            validated.rejected.push(Rejection {
                index: None,
                reason: format!("{label} expected array, received {}", kind(&other)),
            });
            return validated;
        }
    };

    for (index, entry) in entries.into_iter().enumerate() {
        if !entry.get("id").is_some_and(Value::is_string) {
            validated.rejected.push(Rejection {
                index: Some(index),
                reason: format!("expected object with string id, received {}", kind(&entry)),
            });
            continue;
        }

        match serde_json::from_value(entry) {
            Ok(item) => validated.valid.push(item),
            Err(e) => validated.rejected.push(Rejection {
                index: Some(index),
                reason: e.to_string(),
            }),
        }
    }

    validated
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_non_array_is_rejected_whole() {
        let validated = validate_consents(json!({"id": "c1"}));

        assert!(validated.valid.is_empty());
        assert_eq!(
            validated.rejected,
            vec![Rejection {
                index: None,
                reason: "consents expected array, received object".to_string(),
            }]
        );
    }

    #[test]
    fn test_null_is_empty_without_rejections() {
        let validated = validate_consents(Value::Null);
        assert!(validated.valid.is_empty());
        assert!(validated.rejected.is_empty());
    }

    #[test]
    fn test_entries_without_string_id_are_skipped() {
        let validated = validate_consents(json!([
            {"id": "c1", "userId": "u1"},
            {"id": 7},
            "c3",
            null,
            {"id": "c5"}
        ]));

        let ids: Vec<_> = validated.valid.iter().map(|record| record.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c5"]);
        assert_eq!(validated.valid[0].fields.get("userId"), Some(&json!("u1")));

        let indices: Vec<_> = validated.rejected.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![Some(1), Some(2), Some(3)]);
        assert!(validated.rejected[1].reason.contains("string"));
    }

    #[test]
    fn test_suggestions_require_pair_fields() {
        let validated = validate_suggestions(json!([
            {
                "id": "s1",
                "cohortId": "cohort-A",
                "a": "n1",
                "b": "n2",
                "state": "ghost",
                "score": 0.5,
                "rationale_public": "User 1 and User 2 show strong overlap on strengths/interests.",
                "createdAt": "2024-01-01T00:03:00.000Z"
            },
            {"id": "s2", "nodeId": "n1", "otherId": "n2"}
        ]));

        assert_eq!(validated.valid.len(), 1);
        assert_eq!(validated.valid[0].id, "s1");
        assert_eq!(validated.rejected.len(), 1);
        assert_eq!(validated.rejected[0].index, Some(1));
    }
}
