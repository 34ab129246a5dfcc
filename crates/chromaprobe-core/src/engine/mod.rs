//! The belief engine.
//!
//! This module provides:
//! - **errors**: Error types for update, selection, and persistence failures
//! - **pair**: Color identifiers and canonical unordered pair keys
//! - **belief**: Beta beliefs and the simulation-derived prior
//! - **evidence**: Perceptual-distance evidence weighting
//! - **trial**: Trials, responses, and history records
//! - **model**: The per-user belief store and update engine
//! - **snapshot**: Whole-model export/import

pub mod belief;
pub mod errors;
pub mod evidence;
pub mod model;
pub mod pair;
pub mod snapshot;
pub mod trial;
