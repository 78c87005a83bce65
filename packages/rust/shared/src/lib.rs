//! Shared types, error model, and settings for benchtable.
//!
//! This crate is the foundation depended on by all other benchtable crates.
//! It provides:
//! - [`BenchTableError`] — the unified error type
//! - Domain types ([`Domain`], [`ExperimentConfig`], [`DomainScores`], [`ResultRow`])
//! - Settings ([`Settings`], [`LayoutSettings`], settings loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    DefaultsSettings, LayoutSettings, Settings, default_concurrency, load_settings,
    load_settings_from, settings_dir, settings_file_path,
};
pub use error::{BenchTableError, Result};
pub use types::{
    Domain, DomainScores, ExperimentConfig, ExperimentOutcome, ExperimentSet, REQUIRED_KEYS,
    ResultRow, UIA_BACKEND,
};
