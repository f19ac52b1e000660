use std::{collections::HashSet, str::FromStr};

use chrono::{DateTime, Utc};
use serde_json::Value;
use store::models::{Suggestion, SuggestionState};

use crate::error::AppError;

pub const DEFAULT_PENDING: [SuggestionState; 2] =
    [SuggestionState::Ghost, SuggestionState::AdminApproved];

pub const UNKNOWN_USER: &str = "unknown";

/// Distinct acceptances needed before a pairing becomes solid.
pub const ACCEPTANCES_TO_SOLIDIFY: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsentAction {
    Accept,
    Decline,
}

impl ConsentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentAction::Accept => "accept",
            ConsentAction::Decline => "decline",
        }
    }
}

impl FromStr for ConsentAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(ConsentAction::Accept),
            "decline" => Ok(ConsentAction::Decline),
            _ => Err(AppError::BadRequest("action must be accept or decline")),
        }
    }
}

/// Comma separated list, e.g. `ghost,admin_approved`. Unknown names are dropped.
pub fn parse_states(raw: Option<&str>) -> Vec<SuggestionState> {
    match raw {
        None => DEFAULT_PENDING.to_vec(),
        Some(raw) => raw.split(',').filter_map(SuggestionState::parse).collect(),
    }
}

pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// String entries of a JSON array; `None` when the value is not an array.
pub fn string_array(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

pub fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|raw| !raw.is_empty())
        .map(str::to_string)
}

pub fn filter_suggestions(
    suggestions: Vec<Suggestion>,
    states: &[SuggestionState],
    cohorts: Option<&[String]>,
) -> Vec<Suggestion> {
    suggestions
        .into_iter()
        .filter(|suggestion| states.contains(&suggestion.state))
        .filter(|suggestion| cohorts.is_none_or(|cohorts| cohorts.contains(&suggestion.cohort_id)))
        .collect()
}

/// Moves listed ghosts to `admin_approved`. Returns how many changed.
pub fn approve(suggestions: &mut [Suggestion], ids: &[String], now: DateTime<Utc>) -> usize {
    let mut updates = 0;

    for suggestion in suggestions.iter_mut() {
        if suggestion.state == SuggestionState::Ghost && ids.contains(&suggestion.id) {
            suggestion.state = SuggestionState::AdminApproved;
            suggestion.updated_at = Some(now);
            updates += 1;
        }
    }

    updates
}

/// Records one user's answer on every listed, still open suggestion.
///
/// A second distinct acceptance makes the pairing solid; a decline is final.
pub fn apply_consent(
    suggestions: &mut [Suggestion],
    ids: &[String],
    action: ConsentAction,
    user_id: &str,
    now: DateTime<Utc>,
) -> usize {
    let mut updates = 0;

    for suggestion in suggestions.iter_mut() {
        if !ids.contains(&suggestion.id) || suggestion.state.is_terminal() {
            continue;
        }

        updates += 1;

        match action {
            ConsentAction::Accept => {
                let mut seen: HashSet<String> = suggestion.accepted_by.iter().cloned().collect();
                if seen.insert(user_id.to_string()) {
                    suggestion.accepted_by.push(user_id.to_string());
                }

                if seen.len() >= ACCEPTANCES_TO_SOLIDIFY {
                    suggestion.state = SuggestionState::Solid;
                    suggestion.consented = Some(true);
                    suggestion.finalized_at = Some(now);
                } else {
                    suggestion.state = SuggestionState::AdminApproved;
                    suggestion.updated_at = Some(now);
                }
            }
            ConsentAction::Decline => {
                suggestion.state = SuggestionState::Declined;
                suggestion.declined_by = Some(user_id.to_string());
                suggestion.updated_at = Some(now);
            }
        }
    }

    updates
}
