//! Settings for benchtable.
//!
//! User settings live at `~/.benchtable/benchtable.toml`, or wherever
//! `--settings` points. CLI flags override settings, which override defaults.
//! The layout defaults describe the results tree written by the benchmark
//! runner and should rarely need changing.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BenchTableError, Result};

/// Default settings file name.
const SETTINGS_FILE_NAME: &str = "benchtable.toml";

/// Default settings directory name under the user's home.
const SETTINGS_DIR_NAME: &str = ".benchtable";

/// Upper bound on the automatic worker count.
const MAX_AUTO_WORKERS: usize = 32;

// ---------------------------------------------------------------------------
// Settings structs (matching benchtable.toml schema)
// ---------------------------------------------------------------------------

/// Top-level settings, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Results tree layout.
    #[serde(default)]
    pub layout: LayoutSettings,

    /// Run defaults.
    #[serde(default)]
    pub defaults: DefaultsSettings,
}

/// `[layout]` section: the fixed path segments between an experiment's
/// model directory and its domain directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// Action space label.
    #[serde(default = "default_action_space")]
    pub action_space: String,

    /// Observation type label.
    #[serde(default = "default_observation_type")]
    pub observation_type: String,

    /// Trial to read.
    #[serde(default = "default_trial_id")]
    pub trial_id: String,

    /// Per-task result file name.
    #[serde(default = "default_result_file")]
    pub result_file: String,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            action_space: default_action_space(),
            observation_type: default_observation_type(),
            trial_id: default_trial_id(),
            result_file: default_result_file(),
        }
    }
}

impl LayoutSettings {
    /// Directory holding one experiment's domain directories:
    /// `<root>/<experiment>/<action_space>/<observation_type>/<model>/<trial_id>`.
    pub fn experiment_dir(&self, results_root: &Path, experiment: &str, model: &str) -> PathBuf {
        results_root
            .join(experiment)
            .join(&self.action_space)
            .join(&self.observation_type)
            .join(model)
            .join(&self.trial_id)
    }
}

fn default_action_space() -> String {
    "pyautogui".into()
}
fn default_observation_type() -> String {
    "a11y_tree".into()
}
fn default_trial_id() -> String {
    "0".into()
}
fn default_result_file() -> String {
    "result.txt".into()
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsSettings {
    /// Markdown table destination when `--output_file` is not given.
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Worker pool size. `0` picks one from the available parallelism.
    #[serde(default)]
    pub concurrency: usize,
}

impl Default for DefaultsSettings {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
            concurrency: 0,
        }
    }
}

fn default_output_file() -> String {
    "results_table.md".into()
}

/// Worker count used when neither settings nor flags pick one:
/// available parallelism plus four, capped at 32.
pub fn default_concurrency() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus + 4).min(MAX_AUTO_WORKERS)
}

// ---------------------------------------------------------------------------
// Settings loading
// ---------------------------------------------------------------------------

/// Get the path to the settings directory (`~/.benchtable/`).
pub fn settings_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BenchTableError::config("could not determine home directory"))?;
    Ok(home.join(SETTINGS_DIR_NAME))
}

/// Get the path to the settings file (`~/.benchtable/benchtable.toml`).
pub fn settings_file_path() -> Result<PathBuf> {
    Ok(settings_dir()?.join(SETTINGS_FILE_NAME))
}

/// Load settings from the user's settings file. Returns defaults if the file
/// does not exist or the home directory cannot be determined.
pub fn load_settings() -> Result<Settings> {
    let path = match settings_file_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(error = %e, "no settings location, using defaults");
            return Ok(Settings::default());
        }
    };

    if !path.exists() {
        tracing::debug!(?path, "settings file not found, using defaults");
        return Ok(Settings::default());
    }

    load_settings_from(&path)
}

/// Load settings from a specific file path.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path).map_err(|e| BenchTableError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        BenchTableError::config(format!("failed to parse {}: {e}", path.display()))
    })
}
