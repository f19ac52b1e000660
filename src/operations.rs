//! # Operator Guide
//!
//! How a cohort moves from seeded to connected.
//!
//! ## Records
//!
//! ### Nodes
//! - `id`: UUID v4 shaped, drawn from the seed
//! - `displayName` / `alias`: `User 1` / `U1` and so on, by position
//! - `strengths` (2-3), `challenges` (1-2), `projects` (1-2), `interests` (1-3), `values` (1-2)
//! - `createdAt`: `2024-01-01T00:00:00.000Z` plus one minute per position
//!
//! ### Suggestions
//! - `a`, `b`: node ids, smaller first, so a pair can only appear once
//! - `score`: 0.7 * strengths overlap + 0.3 * interests overlap, two decimals
//! - `rationale_public`: "strong overlap" from 0.5 up, "potential synergy" below
//! - `createdAt`: after the last node, 30 seconds apart
//!
//! Overlap is Jaccard: shared items over distinct items, 0 when both sides are empty.
//!
//!
//!
//! ## Lifecycle
//!
//! - `ghost`: fresh from the generator
//! - `admin_approved`: approved by an operator, or accepted by one side
//! - `solid`: accepted by two distinct users, sets `consented` and `finalizedAt`
//! - `declined`: either side said no, records `declinedBy`
//!
//! `solid` and `declined` never change again.
//!
//!
//!
//! ## Flow
//!
//! - Seed the cohort, check `GET /status` counts match the seed output
//! - Review `GET /admin/pending`
//! - Approve the ones worth surfacing with `POST /admin/approve`
//! - Each person answers through `POST /consent`
//! - Missing `userId` is recorded as `unknown`, so two anonymous accepts still count once
//! - `POST /admin/reset` clears suggestions only, reseed with `--force` to start over
