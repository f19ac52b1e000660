//! Synthetic population and pairing.
//!
//! Every draw comes from one [`SeededRng`], so node order and the draw order
//! inside a node decide the output. Reordering either changes every
//! downstream id for the same seed.
use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use store::models::{Node, ProfileConsent, Suggestion, SuggestionState};
use tracing::debug;

use crate::{
    error::GenerateError,
    models::GeneratorConfig,
    rng::SeededRng,
    traits::{pick_set, public_rationale, score_overlap},
};

pub const DEFAULT_SEED: i64 = 1;

/// Validated generation parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Params {
    pub cohort: String,
    pub n: usize,
    pub k: usize,
    pub seed: i64,
}

impl Params {
    pub fn new(cohort: &str, n: i64, k: i64, seed: i64) -> Result<Self, GenerateError> {
        if n <= 0 {
            return Err(GenerateError::InvalidCount(n));
        }
        if k < 0 {
            return Err(GenerateError::InvalidDegree(k));
        }

        Ok(Self {
            cohort: cohort.to_string(),
            n: n as usize,
            k: k as usize,
            seed,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Population {
    pub nodes: Vec<Node>,
    pub suggestions: Vec<Suggestion>,
}

/// Builds `n` nodes and up to `k` suggestions initiated by each of them.
pub fn generate(cohort: &str, n: i64, k: i64, seed: i64) -> Result<Population, GenerateError> {
    let params = Params::new(cohort, n, k, seed)?;
    generate_with(&params, &GeneratorConfig::default())
}

pub fn generate_with(params: &Params, config: &GeneratorConfig) -> Result<Population, GenerateError> {
    config.validate()?;

    let mut rng = SeededRng::new(params.seed);

    let nodes = (0..params.n)
        .map(|index| build_node(index, &mut rng, &params.cohort, config))
        .collect::<Result<Vec<_>, _>>()?;
    let suggestions = build_suggestions(&nodes, params.k, &mut rng, config)?;

    debug!(
        "Generated {} nodes and {} suggestions for cohort {}",
        nodes.len(),
        suggestions.len(),
        params.cohort
    );

    Ok(Population { nodes, suggestions })
}

/// `base + step * count`, or an error when it leaves chrono's range.
fn offset(base: DateTime<Utc>, step: Duration, count: usize) -> Result<DateTime<Utc>, GenerateError> {
    i64::try_from(count)
        .ok()
        .and_then(|count| step.num_milliseconds().checked_mul(count))
        .and_then(Duration::try_milliseconds)
        .and_then(|delta| base.checked_add_signed(delta))
        .ok_or(GenerateError::TimestampOverflow(count))
}

pub fn build_node(
    index: usize,
    rng: &mut SeededRng,
    cohort: &str,
    config: &GeneratorConfig,
) -> Result<Node, GenerateError> {
    let vocab = &config.vocabulary;
    let ranges = &config.ranges;

    let id = rng.uuid().to_string();
    let strengths = pick_set(rng, &vocab.strengths, ranges.strengths.min, ranges.strengths.max)?;
    let challenges = pick_set(rng, &vocab.challenges, ranges.challenges.min, ranges.challenges.max)?;
    let projects = pick_set(rng, &vocab.projects, ranges.projects.min, ranges.projects.max)?;
    let interests = pick_set(rng, &vocab.interests, ranges.interests.min, ranges.interests.max)?;
    let values = pick_set(rng, &vocab.values, ranges.values.min, ranges.values.max)?;

    Ok(Node {
        id,
        cohort_id: cohort.to_string(),
        display_name: format!("User {}", index + 1),
        alias: format!("U{}", index + 1),
        email: None,
        strengths,
        challenges,
        projects,
        interests,
        values,
        consent: ProfileConsent {
            share_profile: true,
        },
        created_at: offset(config.base_timestamp, config.node_increment, index)?,
    })
}

/// Bounded-retry edge sampling.
///
/// Each node gets at most `attempts_per_node * n` draws to find `k` new
/// partners. When the draws run out the node simply ends up with fewer edges.
pub fn build_suggestions(
    nodes: &[Node],
    k: usize,
    rng: &mut SeededRng,
    config: &GeneratorConfig,
) -> Result<Vec<Suggestion>, GenerateError> {
    if k == 0 || nodes.len() < 2 {
        return Ok(Vec::new());
    }

    let n = nodes.len();
    let max_attempts = n.saturating_mul(config.attempts_per_node);
    let first_created = offset(config.base_timestamp, config.node_increment, n)?;

    let mut pairs: HashSet<(String, String)> = HashSet::new();
    let mut suggestions = Vec::new();

    for (i, node_a) in nodes.iter().enumerate() {
        let mut edges = 0;
        let mut attempts = 0;

        while edges < k && attempts < max_attempts {
            attempts += 1;

            let other = rng.below(n);
            if other == i {
                continue;
            }

            let node_b = &nodes[other];
            let key = pair_key(&node_a.id, &node_b.id);
            if pairs.contains(&key) {
                continue;
            }

            let score = score_overlap(node_a, node_b);
            let created_at = offset(first_created, config.suggestion_increment, suggestions.len())?;

            suggestions.push(Suggestion {
                id: rng.uuid().to_string(),
                cohort_id: node_a.cohort_id.clone(),
                a: key.0.clone(),
                b: key.1.clone(),
                state: SuggestionState::Ghost,
                score,
                rationale_public: public_rationale(node_a, node_b, score),
                created_at,
                accepted_by: Vec::new(),
                declined_by: None,
                consented: None,
                updated_at: None,
                finalized_at: None,
                extra: Default::default(),
            });

            pairs.insert(key);
            edges += 1;
        }

        if edges < k {
            debug!("{} settled for {edges} of {k} edges after {attempts} draws", node_a.alias);
        }
    }

    Ok(suggestions)
}

/// Canonical key of an unordered pair, smaller id first.
pub fn pair_key(a: &str, b: &str) -> (String, String) {
    if a < b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FacetRange, FacetRanges, Vocabulary, base_timestamp};

    fn assert_unique_pairs(suggestions: &[Suggestion]) {
        let mut seen = HashSet::new();
        for suggestion in suggestions {
            assert!(suggestion.a < suggestion.b);
            assert!(seen.insert(suggestion.pair_key()), "duplicate pair {:?}", suggestion.pair_key());
        }
    }

    #[test]
    fn test_small_cohort() {
        let population = generate("cohort-A", 3, 1, 1).unwrap();

        assert_eq!(population.nodes.len(), 3);
        for (index, node) in population.nodes.iter().enumerate() {
            assert_eq!(node.cohort_id, "cohort-A");
            assert_eq!(node.display_name, format!("User {}", index + 1));
            assert_eq!(node.alias, format!("U{}", index + 1));
            assert_eq!(node.created_at, base_timestamp() + Duration::minutes(index as i64));
        }

        assert!(population.suggestions.len() <= 3);
        for suggestion in &population.suggestions {
            assert!((0.0..=1.0).contains(&suggestion.score));
            assert_eq!(suggestion.score, (suggestion.score * 100.0).round() / 100.0);
            assert_eq!(suggestion.state, SuggestionState::Ghost);
        }
        assert_unique_pairs(&population.suggestions);
    }

    #[test]
    fn test_reference_population() {
        let population = generate("cohort-A", 3, 1, 1).unwrap();

        let ids: Vec<_> = population.nodes.iter().map(|node| node.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "a00087fb-f747-4cb8-adfe-747d23673f27",
                "9320430c-9fdd-4dfd-b766-4dadf3ecb1eb",
                "4de44a24-a78c-431e-a411-4daca61d8285",
            ]
        );
        assert_eq!(population.nodes[0].strengths, vec!["research", "growth"]);
        assert_eq!(population.nodes[0].challenges, vec!["messaging", "time"]);
        assert_eq!(population.nodes[0].projects, vec!["lab", "atlas"]);
        assert_eq!(population.nodes[0].interests, vec!["climate", "health"]);
        assert_eq!(population.nodes[0].values, vec!["care"]);
        assert_eq!(
            population.nodes[2].interests,
            vec!["health", "education", "community"]
        );

        let scores: Vec<_> = population.suggestions.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![0.17, 0.17, 0.07]);

        let first = &population.suggestions[0];
        assert_eq!(first.id, "ab3c624e-3443-4ef7-a854-1309c8633e25");
        assert_eq!(first.a, "9320430c-9fdd-4dfd-b766-4dadf3ecb1eb");
        assert_eq!(first.b, "a00087fb-f747-4cb8-adfe-747d23673f27");
        assert_eq!(
            first.rationale_public,
            "User 1 and User 2 show potential synergy on strengths/interests."
        );
        assert_eq!(
            population.suggestions[2].rationale_public,
            "User 3 and User 1 show potential synergy on strengths/interests."
        );
    }

    #[test]
    fn test_suggestion_timestamps_follow_nodes() {
        let population = generate("cohort-B", 6, 2, 9).unwrap();
        let after_nodes = base_timestamp() + Duration::minutes(6);

        for (j, suggestion) in population.suggestions.iter().enumerate() {
            assert_eq!(
                suggestion.created_at,
                after_nodes + Duration::seconds(30 * j as i64)
            );
        }
    }

    #[test]
    fn test_single_node_has_no_partner() {
        let population = generate("cohort-A", 1, 5, 7).unwrap();
        assert_eq!(population.nodes.len(), 1);
        assert!(population.suggestions.is_empty());
    }

    #[test]
    fn test_zero_degree() {
        let population = generate("cohort-A", 10, 0, 1).unwrap();
        assert_eq!(population.nodes.len(), 10);
        assert!(population.suggestions.is_empty());
    }

    #[test]
    fn test_invalid_arguments() {
        assert_eq!(generate("cohort-A", 0, 1, 1), Err(GenerateError::InvalidCount(0)));
        assert_eq!(generate("cohort-A", -2, 1, 1), Err(GenerateError::InvalidCount(-2)));
        assert_eq!(generate("cohort-A", 3, -1, 1), Err(GenerateError::InvalidDegree(-1)));
    }

    #[test]
    fn test_same_seed_same_population() {
        let left = generate("cohort-A", 25, 3, 42).unwrap();
        let right = generate("cohort-A", 25, 3, 42).unwrap();
        assert_eq!(left, right);

        let other = generate("cohort-A", 25, 3, 43).unwrap();
        assert_ne!(left.nodes[0].id, other.nodes[0].id);
    }

    #[test]
    fn test_pairs_unique_and_degree_capped() {
        for seed in 0..20 {
            let population = generate("cohort-A", 12, 4, seed).unwrap();
            assert_unique_pairs(&population.suggestions);
            assert!(population.suggestions.len() <= 12 * 4);
        }
    }

    #[test]
    fn test_saturation_is_silent() {
        // Three nodes hold at most three distinct pairs, far fewer than n * k.
        let population = generate("cohort-A", 3, 5, 2).unwrap();
        assert!(population.suggestions.len() <= 3);
        assert_unique_pairs(&population.suggestions);
    }

    #[test]
    fn test_no_attempts_means_no_edges() {
        let config = GeneratorConfig {
            attempts_per_node: 0,
            ..GeneratorConfig::default()
        };
        let params = Params::new("cohort-A", 5, 2, 1).unwrap();
        assert!(generate_with(&params, &config).unwrap().suggestions.is_empty());
    }

    #[test]
    fn test_facet_sizes_within_ranges() {
        let config = GeneratorConfig::default();
        let population = generate("cohort-A", 40, 1, 5).unwrap();

        for node in &population.nodes {
            let r = &config.ranges;
            for (items, range) in [
                (&node.strengths, r.strengths),
                (&node.challenges, r.challenges),
                (&node.projects, r.projects),
                (&node.interests, r.interests),
                (&node.values, r.values),
            ] {
                assert!(items.len() >= range.min && items.len() <= range.max);
                let unique: HashSet<_> = items.iter().collect();
                assert_eq!(unique.len(), items.len());
            }
        }
    }

    #[test]
    fn test_injected_vocabulary() {
        let tiny = vec!["x".to_string(), "y".to_string()];
        let config = GeneratorConfig {
            vocabulary: Vocabulary {
                strengths: tiny.clone(),
                challenges: tiny.clone(),
                projects: tiny.clone(),
                interests: tiny.clone(),
                values: tiny.clone(),
            },
            ranges: FacetRanges {
                strengths: FacetRange::new(2, 2),
                challenges: FacetRange::new(1, 1),
                projects: FacetRange::new(0, 0),
                interests: FacetRange::new(2, 5),
                values: FacetRange::new(1, 2),
            },
            ..GeneratorConfig::default()
        };
        let params = Params::new("cohort-T", 4, 3, 3).unwrap();
        let population = generate_with(&params, &config).unwrap();

        for node in &population.nodes {
            assert_eq!(node.strengths.len(), 2);
            assert_eq!(node.challenges.len(), 1);
            assert!(node.projects.is_empty());
            assert_eq!(node.interests.len(), 2);
            assert!(node.values.iter().all(|value| tiny.contains(value)));
        }
        // identical strengths and interests everywhere
        assert!(population.suggestions.iter().all(|s| s.score == 1.0));
    }

    #[test]
    fn test_pair_key_canonical() {
        assert_eq!(pair_key("b", "a"), pair_key("a", "b"));
        assert_eq!(pair_key("a", "b"), ("a".to_string(), "b".to_string()));
    }

    #[test]
    fn test_inverted_facet_range_is_rejected() {
        let mut config = GeneratorConfig::default();
        config.ranges.strengths = FacetRange::new(3, 1);
        let params = Params::new("cohort-A", 2, 1, 1).unwrap();

        assert_eq!(
            generate_with(&params, &config),
            Err(GenerateError::InvalidFacetRange {
                facet: "strengths",
                min: 3,
                max: 1
            })
        );
    }

    #[test]
    fn test_timestamp_overflow_is_an_error() {
        let config = GeneratorConfig {
            base_timestamp: DateTime::<Utc>::MAX_UTC,
            ..GeneratorConfig::default()
        };
        let params = Params::new("cohort-A", 2, 0, 1).unwrap();

        assert_eq!(
            generate_with(&params, &config),
            Err(GenerateError::TimestampOverflow(1))
        );
    }

    #[test]
    fn test_offset_steps() {
        let base = base_timestamp();
        assert_eq!(offset(base, Duration::seconds(30), 0).unwrap(), base);
        assert_eq!(
            offset(base, Duration::seconds(30), 5).unwrap(),
            base + Duration::seconds(150)
        );
        assert_eq!(
            offset(base, Duration::seconds(30), usize::MAX),
            Err(GenerateError::TimestampOverflow(usize::MAX))
        );
    }
}
