use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::timestamp;

/// A synthetic person. Facets are small ordered subsets of fixed vocabularies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub cohort_id: String,
    pub display_name: String,
    pub alias: String,
    pub email: Option<String>,
    pub strengths: Vec<String>,
    pub challenges: Vec<String>,
    pub projects: Vec<String>,
    pub interests: Vec<String>,
    pub values: Vec<String>,
    pub consent: ProfileConsent,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileConsent {
    pub share_profile: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionState {
    /// Proposed by the generator, not yet reviewed.
    Ghost,
    AdminApproved,
    /// Accepted by both sides.
    Solid,
    Declined,
}

impl SuggestionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionState::Ghost => "ghost",
            SuggestionState::AdminApproved => "admin_approved",
            SuggestionState::Solid => "solid",
            SuggestionState::Declined => "declined",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "ghost" => Some(SuggestionState::Ghost),
            "admin_approved" => Some(SuggestionState::AdminApproved),
            "solid" => Some(SuggestionState::Solid),
            "declined" => Some(SuggestionState::Declined),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SuggestionState::Solid | SuggestionState::Declined)
    }
}

/// Undirected candidate pairing. `a` is always the lexicographically smaller id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub cohort_id: String,
    pub a: String,
    pub b: String,
    pub state: SuggestionState,
    pub score: f64,
    #[serde(rename = "rationale_public")]
    pub rationale_public: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accepted_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declined_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consented: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub finalized_at: Option<DateTime<Utc>>,

    /// Fields this version does not know about, kept so rewrites are lossless.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Suggestion {
    pub fn pair_key(&self) -> (&str, &str) {
        (&self.a, &self.b)
    }
}

/// Any JSON object carrying a string `id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// One line of the append-only event log.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Event {
    #[serde(with = "timestamp")]
    pub ts: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Event {
    const RESERVED: [&str; 3] = ["ts", "actor", "action"];

    pub fn new(ts: DateTime<Utc>, actor: &str, action: &str) -> Self {
        Self {
            ts,
            actor: actor.to_string(),
            action: action.to_string(),
            payload: Map::new(),
        }
    }

    /// Adds a payload field. Keys that clash with `ts`, `actor` or `action`
    /// are stored as `payload_<key>` so every line keeps unique keys.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        let key = if Self::RESERVED.contains(&key) {
            format!("payload_{key}")
        } else {
            key.to_string()
        };
        self.payload.insert(key, value.into());
        self
    }
}
