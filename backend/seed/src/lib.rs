//! # Demo Seeding
//!
//! Fabricates a cohort of synthetic people and the "suggested connections"
//! between them, then writes both into the state directory.
//!
//! ## Pipeline
//! 1. Validate `cohort`, `n`, `k`, `seed`. Nothing is drawn or written before this.
//!
//! 2. Refuse to run if `state.nodes.json` or `state.suggestions.json` already
//!    exist, unless `force` is set.
//!
//! 3. One [`SeededRng`](rng::SeededRng) drives everything:
//!    - per node, in index order: id, strengths, challenges, projects, interests, values
//!    - per node, in index order: up to `k` partner draws with `5 * n` attempts
//!
//! 4. Write nodes, then suggestions, each atomically.
//!
//! 5. Append `seed_nodes` and `seed_suggestions` to `events.log.jsonl`.
//!
//! ## Notes
//! - Same seed, same `n`, same `k`: byte-identical files apart from event timestamps.
//!
//! - A node can end up with fewer than `k` suggestions. Retrying until every
//!   node is saturated would change the output for every existing seed.
use std::path::PathBuf;

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use store::{
    EVENTS_FILE, NODES_FILE, SUGGESTIONS_FILE, StateDir, StoreError, models::Event,
};
use thiserror::Error;
use tracing::info;

pub mod error;
pub mod generate;
pub mod models;
pub mod rng;
pub mod traits;

use error::GenerateError;
use generate::{Params, Population, generate_with};
use models::GeneratorConfig;

pub const ACTOR: &str = "seed";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedOptions {
    pub cohort: String,
    pub n: i64,
    pub k: i64,
    pub seed: i64,
    pub force: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedReport {
    pub nodes: usize,
    pub suggestions: usize,
    pub nodes_file: PathBuf,
    pub suggestions_file: PathBuf,
}

#[derive(Error, Debug)]
pub enum SeedError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("State files already exist. Use --force to overwrite.")]
    AlreadySeeded,
}

pub fn seed_demo(state: &StateDir, options: &SeedOptions) -> Result<SeedReport, SeedError> {
    let params = Params::new(&options.cohort, options.n, options.k, options.seed)?;

    if !options.force && (state.exists(NODES_FILE)? || state.exists(SUGGESTIONS_FILE)?) {
        return Err(SeedError::AlreadySeeded);
    }

    let Population { nodes, suggestions } = generate_with(&params, &GeneratorConfig::default())?;
    info!(
        "Generated {} nodes, {} suggestions (seed {})",
        nodes.len(),
        suggestions.len(),
        params.seed
    );

    let pb = ProgressBar::new(4);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    ) {
        pb.set_style(style.progress_chars("=> "));
    }

    pb.set_message(format!("Writing {NODES_FILE}"));
    let nodes_file = state.write_json_atomic(NODES_FILE, &nodes)?;
    pb.inc(1);

    pb.set_message(format!("Writing {SUGGESTIONS_FILE}"));
    let suggestions_file = state.write_json_atomic(SUGGESTIONS_FILE, &suggestions)?;
    pb.inc(1);

    let now = Utc::now();
    pb.set_message("Recording events");
    state.append_json_line(
        EVENTS_FILE,
        &Event::new(now, ACTOR, "seed_nodes")
            .with("cohort", params.cohort.as_str())
            .with("count", nodes.len()),
    )?;
    pb.inc(1);

    state.append_json_line(
        EVENTS_FILE,
        &Event::new(now, ACTOR, "seed_suggestions")
            .with("cohort", params.cohort.as_str())
            .with("count", suggestions.len()),
    )?;
    pb.inc(1);

    pb.finish_with_message("Done");

    Ok(SeedReport {
        nodes: nodes.len(),
        suggestions: suggestions.len(),
        nodes_file,
        suggestions_file,
    })
}
