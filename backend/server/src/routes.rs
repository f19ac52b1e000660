use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State as Extract, rejection::JsonRejection},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use store::{
    CONSENTS_FILE, EVENTS_FILE, NODES_FILE, SUGGESTIONS_FILE, StateDir,
    models::{Event, Suggestion},
    schema::{validate_consents, validate_nodes, validate_suggestions},
    timestamp,
};
use tracing::{debug, info};

use crate::{
    error::AppError,
    state::State,
    utils::{
        ConsentAction, UNKNOWN_USER, apply_consent, approve, filter_suggestions,
        non_empty_string, parse_states, split_list, string_array,
    },
};

const ADMIN: &str = "admin";

#[derive(Serialize, Debug)]
pub struct Health {
    pub ok: bool,
}

pub async fn healthz_handler() -> Json<Health> {
    Json(Health { ok: true })
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Counts {
    pub nodes: usize,
    pub suggestions: usize,
    pub consents: usize,
}

#[derive(Serialize, Debug)]
pub struct Files {
    pub nodes: String,
    pub suggestions: String,
    pub consents: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub healthy: bool,
    #[serde(with = "timestamp")]
    pub boot_ts: DateTime<Utc>,
    pub version: &'static str,
    pub state_dir: String,
    pub counts: Counts,
    pub files: Files,
}

pub async fn status_handler(Extract(state): Extract<Arc<State>>) -> Result<Json<Status>, AppError> {
    let dir = state.state_dir();

    let nodes = validate_nodes(dir.read_json(NODES_FILE));
    nodes.warn_rejected("node");
    let suggestions = validate_suggestions(dir.read_json(SUGGESTIONS_FILE));
    suggestions.warn_rejected("suggestion");
    let consents = validate_consents(dir.read_json(CONSENTS_FILE));
    consents.warn_rejected("consent");

    Ok(Json(Status {
        healthy: true,
        boot_ts: state.boot_ts,
        version: env!("CARGO_PKG_VERSION"),
        state_dir: dir.path().display().to_string(),
        counts: Counts {
            nodes: nodes.valid.len(),
            suggestions: suggestions.valid.len(),
            consents: consents.valid.len(),
        },
        files: Files {
            nodes: dir.resolve(NODES_FILE)?.display().to_string(),
            suggestions: dir.resolve(SUGGESTIONS_FILE)?.display().to_string(),
            consents: dir.resolve(CONSENTS_FILE)?.display().to_string(),
        },
    }))
}

#[derive(Deserialize, Debug, Default)]
pub struct PendingQuery {
    pub states: Option<String>,
    pub cohorts: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct Listing {
    pub ok: bool,
    pub data: Vec<Suggestion>,
}

pub async fn pending_handler(
    Extract(state): Extract<Arc<State>>,
    Query(query): Query<PendingQuery>,
) -> Json<Listing> {
    let states = parse_states(query.states.as_deref());
    let cohorts = query.cohorts.as_deref().map(split_list);

    let data = filter_suggestions(load_suggestions(state.state_dir()), &states, cohorts.as_deref());

    Json(Listing { ok: true, data })
}

#[derive(Debug, PartialEq, Eq)]
pub struct ApproveRequest {
    pub ids: Vec<String>,
}

impl ApproveRequest {
    pub fn from_body(body: &Value) -> Result<Self, AppError> {
        match string_array(body.get("ids")) {
            Some(ids) if !ids.is_empty() => Ok(Self { ids }),
            _ => Err(AppError::BadRequest("ids array is required")),
        }
    }
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Updated {
    pub ok: bool,
    pub count: usize,
}

pub async fn approve_handler(
    Extract(state): Extract<Arc<State>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Updated>, AppError> {
    let payload = ApproveRequest::from_body(&loose_body(body))?;

    let dir = state.state_dir();
    let now = Utc::now();

    let mut suggestions = load_suggestions(dir);
    let count = approve(&mut suggestions, &payload.ids, now);
    dir.write_json_atomic(SUGGESTIONS_FILE, &suggestions)?;

    append_event(
        dir,
        Event::new(now, ADMIN, "approve")
            .with("ids", payload.ids)
            .with("count", count),
    )?;

    info!("Approved {count} suggestions");
    Ok(Json(Updated { ok: true, count }))
}

/// `{ "id" | "ids", "action", "userId" }`. `ids` wins when it is an array.
#[derive(Debug, PartialEq, Eq)]
pub struct ConsentRequest {
    pub ids: Vec<String>,
    pub action: ConsentAction,
    pub user_id: String,
}

impl ConsentRequest {
    pub fn from_body(body: &Value) -> Result<Self, AppError> {
        let ids = string_array(body.get("ids"))
            .unwrap_or_else(|| non_empty_string(body.get("id")).into_iter().collect());
        if ids.is_empty() {
            return Err(AppError::BadRequest("id(s) required"));
        }

        let action = body
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .parse()?;
        let user_id =
            non_empty_string(body.get("userId")).unwrap_or_else(|| UNKNOWN_USER.to_string());

        Ok(Self {
            ids,
            action,
            user_id,
        })
    }
}

pub async fn consent_handler(
    Extract(state): Extract<Arc<State>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Updated>, AppError> {
    let ConsentRequest {
        ids,
        action,
        user_id,
    } = ConsentRequest::from_body(&loose_body(body))?;

    let dir = state.state_dir();
    let now = Utc::now();

    let mut suggestions = load_suggestions(dir);
    let count = apply_consent(&mut suggestions, &ids, action, &user_id, now);
    dir.write_json_atomic(SUGGESTIONS_FILE, &suggestions)?;

    append_event(
        dir,
        Event::new(now, ADMIN, "consent")
            .with("ids", ids)
            .with("decision", action.as_str())
            .with("count", count),
    )?;

    Ok(Json(Updated { ok: true, count }))
}

#[derive(Serialize, Debug)]
pub struct Reset {
    pub ok: bool,
    pub message: &'static str,
    pub summary: Summary,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Summary {
    pub nodes: usize,
    pub suggestions: usize,
}

pub async fn reset_handler(Extract(state): Extract<Arc<State>>) -> Result<Json<Reset>, AppError> {
    let dir = state.state_dir();

    let summary = Summary {
        nodes: dir.count_of(NODES_FILE),
        suggestions: dir.count_of(SUGGESTIONS_FILE),
    };

    dir.write_json_atomic(SUGGESTIONS_FILE, &Vec::<Value>::new())?;
    append_event(
        dir,
        Event::new(Utc::now(), ADMIN, "reset")
            .with("nodes", summary.nodes)
            .with("suggestions", summary.suggestions),
    )?;

    info!("Cleared {} suggestions", summary.suggestions);
    Ok(Json(Reset {
        ok: true,
        message: "suggestions cleared",
        summary,
    }))
}

// Unreadable bodies become `null` so each route answers with its own 400.
fn loose_body(body: Result<Json<Value>, JsonRejection>) -> Value {
    match body {
        Ok(Json(value)) => value,
        Err(rejection) => {
            debug!("Unreadable request body: {rejection}");
            Value::Null
        }
    }
}

fn load_suggestions(dir: &StateDir) -> Vec<Suggestion> {
    let validated = validate_suggestions(dir.read_json(SUGGESTIONS_FILE));
    validated.warn_rejected("suggestion");
    validated.valid
}

fn append_event(dir: &StateDir, event: Event) -> Result<(), AppError> {
    dir.append_json_line(EVENTS_FILE, &event)?;
    Ok(())
}
