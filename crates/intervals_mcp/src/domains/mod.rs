//! Domain transforms and aggregation, one module per intervals.icu resource.
//!
//! These are pure functions over raw API JSON. Fetching and parameter
//! validation live in [`crate::services`]; everything here is deterministic
//! and unit-testable without a client.

pub mod activities;
pub mod wellness;
