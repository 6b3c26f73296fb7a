//! Core domain library for subtrack (models, validation, view derivation, preferences).

/// Per-category spend totals for the analytics chart.
pub mod analytics;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across subtrack crates.
pub mod constants;
/// Application error types.
pub mod error;
/// Data models exchanged with the remote API.
pub mod models;
/// Persisted view preferences (page, search text, category filter).
pub mod preferences;
/// Local draft validation and payload normalization.
pub mod validation;
/// Pure filter + pagination over the subscription collection.
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::*;
pub use error::{AppError, ErrorKind};
pub use validation::{validate_draft, DraftField, ValidationErrors};
pub use view::{derive_view, PageView, ViewOutcome, ViewState};
