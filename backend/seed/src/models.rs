use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::GenerateError;

pub const STRENGTHS: &[&str] = &[
    "systems",
    "ops",
    "facilitation",
    "design",
    "ml",
    "research",
    "growth",
    "product",
];
pub const CHALLENGES: &[&str] = &["focus", "handoffs", "messaging", "recruiting", "time"];
pub const INTERESTS: &[&str] = &["ml", "climate", "education", "health", "ops", "community"];
pub const VALUES: &[&str] = &["craft", "impact", "play", "clarity", "care"];
pub const PROJECTS: &[&str] = &["pilot", "atlas", "lab", "onboarding"];

/// Draws per entity before the pairing loop gives up, as a multiple of `n`.
pub const ATTEMPTS_PER_NODE: usize = 5;

pub const NODE_INCREMENT_MS: i64 = 60_000;
pub const SUGGESTION_INCREMENT_MS: i64 = 30_000;

/// Item lists the sampler draws facets from.
#[derive(Clone, Debug, PartialEq)]
pub struct Vocabulary {
    pub strengths: Vec<String>,
    pub challenges: Vec<String>,
    pub projects: Vec<String>,
    pub interests: Vec<String>,
    pub values: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            strengths: owned(STRENGTHS),
            challenges: owned(CHALLENGES),
            projects: owned(PROJECTS),
            interests: owned(INTERESTS),
            values: owned(VALUES),
        }
    }
}

/// Inclusive facet size bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FacetRange {
    pub min: usize,
    pub max: usize,
}

impl FacetRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FacetRanges {
    pub strengths: FacetRange,
    pub challenges: FacetRange,
    pub projects: FacetRange,
    pub interests: FacetRange,
    pub values: FacetRange,
}

impl FacetRanges {
    pub fn validate(&self) -> Result<(), GenerateError> {
        for (facet, range) in [
            ("strengths", self.strengths),
            ("challenges", self.challenges),
            ("projects", self.projects),
            ("interests", self.interests),
            ("values", self.values),
        ] {
            if range.min > range.max {
                return Err(GenerateError::InvalidFacetRange {
                    facet,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        Ok(())
    }
}

impl Default for FacetRanges {
    fn default() -> Self {
        Self {
            strengths: FacetRange::new(2, 3),
            challenges: FacetRange::new(1, 2),
            projects: FacetRange::new(1, 2),
            interests: FacetRange::new(1, 3),
            values: FacetRange::new(1, 2),
        }
    }
}

/// Everything about a run that is not one of the four generation parameters.
/// The default reproduces the reference output for every seed.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    pub vocabulary: Vocabulary,
    pub ranges: FacetRanges,
    pub attempts_per_node: usize,
    pub base_timestamp: DateTime<Utc>,
    pub node_increment: Duration,
    pub suggestion_increment: Duration,
}

impl GeneratorConfig {
    /// Checked before the first draw, so a bad config never yields partial output.
    pub fn validate(&self) -> Result<(), GenerateError> {
        self.ranges.validate()
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            vocabulary: Vocabulary::default(),
            ranges: FacetRanges::default(),
            attempts_per_node: ATTEMPTS_PER_NODE,
            base_timestamp: base_timestamp(),
            node_increment: Duration::milliseconds(NODE_INCREMENT_MS),
            suggestion_increment: Duration::milliseconds(SUGGESTION_INCREMENT_MS),
        }
    }
}

/// 2024-01-01T00:00:00Z
pub fn base_timestamp() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(1_704_067_200_000)
        .single()
        .unwrap_or_default()
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}
