//! Facet sampling and overlap scoring.
//!
//! Scoring is fixed policy: 70% strengths overlap, 30% interests overlap. The
//! other facets are carried on each node but never scored.
use std::{collections::HashSet, hash::Hash};

use store::models::Node;

use crate::{error::GenerateError, rng::SeededRng};

const STRENGTHS_WEIGHT: f64 = 0.7;
const INTERESTS_WEIGHT: f64 = 0.3;
const STRONG_OVERLAP: f64 = 0.5;

/// Random-size subset of `items`, drawn without replacement.
///
/// Draws the target size first, then shuffles, so both advance `rng`.
pub fn pick_set<T: Clone>(
    rng: &mut SeededRng,
    items: &[T],
    min: usize,
    max: usize,
) -> Result<Vec<T>, GenerateError> {
    if min > max {
        return Err(GenerateError::InvalidRange { min, max });
    }

    let target = min + rng.next_int(max - min + 1)?;
    let mut shuffled = rng.shuffle(items);
    shuffled.truncate(target.min(items.len()));

    Ok(shuffled)
}

/// |A ∩ B| / |A ∪ B|, zero when both are empty.
pub fn jaccard<T: Eq + Hash>(a: &[T], b: &[T]) -> f64 {
    let a: HashSet<&T> = a.iter().collect();
    let b: HashSet<&T> = b.iter().collect();

    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }

    a.intersection(&b).count() as f64 / union as f64
}

pub fn score_overlap(a: &Node, b: &Node) -> f64 {
    let strengths = jaccard(&a.strengths, &b.strengths);
    let interests = jaccard(&a.interests, &b.interests);

    round_cents(strengths * STRENGTHS_WEIGHT + interests * INTERESTS_WEIGHT)
}

pub fn public_rationale(a: &Node, b: &Node, score: f64) -> String {
    let mention = if score >= STRONG_OVERLAP {
        "strong overlap"
    } else {
        "potential synergy"
    };

    format!(
        "{} and {} show {mention} on strengths/interests.",
        a.display_name, b.display_name
    )
}

/// Two decimal places, decided on the exact binary value: `0.175` is stored
/// just below the midpoint and becomes `0.17`. True midpoints round up.
pub fn round_cents(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.fract() == 0.5 && (value * 8.0).fract() == 0.0 {
        return scaled.ceil() / 100.0;
    }

    format!("{value:.2}").parse().unwrap_or(value)
}
