//! Documentation of the pilot backend: synthetic cohorts and suggested connections.
//!
//!
//!
//! # General Infrastructure
//! - One state directory (`NR_STATE_DIR`) holds every piece of pilot state as flat JSON
//! - `seed` fills it with a synthetic cohort
//! - `backend` serves status and moderation routes over it
//! - Both append to the same `events.log.jsonl`
//! - No database, no locking, one operator at a time
//!
//!
//!
//! # Crates
//! - `store`: record types, state directory handling, whole-file JSON reads and atomic writes, validation
//! - `seed`: seeded generator, facet sampler, overlap scorer, `seed` binary
//! - `server`: axum routes
//! - `backend`: binary that starts `server`
//!
//!
//!
//! # Notes
//!
//! ## Reproducibility
//! Every node id, facet and suggestion comes from one Mulberry32 stream. The same
//! `--seed`, `--n` and `--k` produce the same `state.nodes.json` and
//! `state.suggestions.json` byte for byte. Only event timestamps differ between runs.
//!
//! The generator is not a source of secrets. Ids look like UUID v4 but are fully
//! predictable from the seed.
//!
//! ## Under-filled degrees
//! Each node gets `5 * n` partner draws. Small cohorts with a large `k` run out
//! of fresh partners and end up with fewer suggestions than asked for. This is
//! kept as is: guaranteeing exactly `k` would change every existing seed.
//!
//!
//!
//! # Setup
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
//!
//! State directory.
//! ```sh
//! export NR_STATE_DIR=./state
//! export NR_ALLOW_INIT_DIR=true
//! ```
//!
//!
//!
//! # Commands
//!
//! Seed a cohort of 20 with up to 3 suggestions each.
//! ```sh
//! cargo run -p seed -- --cohort cohort-A --n 20 --k 3 --seed 7
//! ```
//!
//! Reseed over existing files.
//! ```sh
//! cargo run -p seed -- --cohort cohort-A --n 20 --k 3 --force
//! ```
//!
//! Start the service.
//! ```sh
//! RUST_LOG=info PORT=5000 cargo run -p backend
//! ```

pub mod operations;
