//! Core pipeline and domain logic for benchtable.
//!
//! This crate ties together config validation, result reading, row building
//! and markdown output into the end-to-end `build_results_table` workflow.

pub mod output;
pub mod pipeline;
pub mod processor;
pub mod reader;
pub mod validate;
