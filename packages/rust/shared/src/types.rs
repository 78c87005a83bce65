//! Core domain types for benchtable result tables.

use serde::{Deserialize, Serialize};

/// Attributes every experiment entry must carry, in validation order.
pub const REQUIRED_KEYS: [&str; 4] = ["exp_name", "a11y_backend", "som_origin", "model_name"];

/// Accessibility backend value rendered as enabled in the `uia_value` column.
pub const UIA_BACKEND: &str = "uia";

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// An application under test. The snake_case name doubles as the domain's
/// directory name in the results tree and as its table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Chrome,
    LibreofficeCalc,
    LibreofficeWriter,
    Vlc,
    VsCode,
    Settings,
    WindowsCalc,
    Clock,
    Msedge,
    FileExplorer,
    MicrosoftPaint,
    Notepad,
}

impl Domain {
    /// All domains in table column order.
    pub const ALL: [Domain; 12] = [
        Domain::Chrome,
        Domain::LibreofficeCalc,
        Domain::LibreofficeWriter,
        Domain::Vlc,
        Domain::VsCode,
        Domain::Settings,
        Domain::WindowsCalc,
        Domain::Clock,
        Domain::Msedge,
        Domain::FileExplorer,
        Domain::MicrosoftPaint,
        Domain::Notepad,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Chrome => "chrome",
            Domain::LibreofficeCalc => "libreoffice_calc",
            Domain::LibreofficeWriter => "libreoffice_writer",
            Domain::Vlc => "vlc",
            Domain::VsCode => "vs_code",
            Domain::Settings => "settings",
            Domain::WindowsCalc => "windows_calc",
            Domain::Clock => "clock",
            Domain::Msedge => "msedge",
            Domain::FileExplorer => "file_explorer",
            Domain::MicrosoftPaint => "microsoft_paint",
            Domain::Notepad => "notepad",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Experiment configuration
// ---------------------------------------------------------------------------

/// One validated experiment entry from the JSON config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Display name.
    pub exp_name: String,
    /// Accessibility tree backend the agent ran with.
    pub a11y_backend: String,
    /// Origin of the set-of-marks annotations.
    pub som_origin: String,
    /// Model directory name in the results tree.
    pub model_name: String,
}

/// Validated experiments in the order they appear in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExperimentSet {
    entries: Vec<(String, ExperimentConfig)>,
}

impl ExperimentSet {
    pub fn new(entries: Vec<(String, ExperimentConfig)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(experiment id, config)` pairs in config order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExperimentConfig)> {
        self.entries.iter().map(|(id, cfg)| (id.as_str(), cfg))
    }

    pub fn into_entries(self) -> Vec<(String, ExperimentConfig)> {
        self.entries
    }
}

// ---------------------------------------------------------------------------
// Scores and rows
// ---------------------------------------------------------------------------

/// Per-domain success percentages (0–100). `None` means the domain was not
/// run or produced no valid task results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainScores {
    pub chrome: Option<f64>,
    pub libreoffice_calc: Option<f64>,
    pub libreoffice_writer: Option<f64>,
    pub vlc: Option<f64>,
    pub vs_code: Option<f64>,
    pub settings: Option<f64>,
    pub windows_calc: Option<f64>,
    pub clock: Option<f64>,
    pub msedge: Option<f64>,
    pub file_explorer: Option<f64>,
    pub microsoft_paint: Option<f64>,
    pub notepad: Option<f64>,
}

impl DomainScores {
    pub fn get(&self, domain: Domain) -> Option<f64> {
        *self.slot(domain)
    }

    pub fn set(&mut self, domain: Domain, score: Option<f64>) {
        *self.slot_mut(domain) = score;
    }

    /// Scores in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Domain, Option<f64>)> + '_ {
        Domain::ALL.iter().map(move |&d| (d, self.get(d)))
    }

    fn slot(&self, domain: Domain) -> &Option<f64> {
        match domain {
            Domain::Chrome => &self.chrome,
            Domain::LibreofficeCalc => &self.libreoffice_calc,
            Domain::LibreofficeWriter => &self.libreoffice_writer,
            Domain::Vlc => &self.vlc,
            Domain::VsCode => &self.vs_code,
            Domain::Settings => &self.settings,
            Domain::WindowsCalc => &self.windows_calc,
            Domain::Clock => &self.clock,
            Domain::Msedge => &self.msedge,
            Domain::FileExplorer => &self.file_explorer,
            Domain::MicrosoftPaint => &self.microsoft_paint,
            Domain::Notepad => &self.notepad,
        }
    }

    fn slot_mut(&mut self, domain: Domain) -> &mut Option<f64> {
        match domain {
            Domain::Chrome => &mut self.chrome,
            Domain::LibreofficeCalc => &mut self.libreoffice_calc,
            Domain::LibreofficeWriter => &mut self.libreoffice_writer,
            Domain::Vlc => &mut self.vlc,
            Domain::VsCode => &mut self.vs_code,
            Domain::Settings => &mut self.settings,
            Domain::WindowsCalc => &mut self.windows_calc,
            Domain::Clock => &mut self.clock,
            Domain::Msedge => &mut self.msedge,
            Domain::FileExplorer => &mut self.file_explorer,
            Domain::MicrosoftPaint => &mut self.microsoft_paint,
            Domain::Notepad => &mut self.notepad,
        }
    }
}

/// What the result reader found for one experiment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentOutcome {
    pub scores: DomainScores,
    /// Tasks (or domains) whose results could not be used.
    pub errors: usize,
}

/// One line of the results table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// Experiment identifier (the config key).
    pub exp_name: String,
    /// `✅` or `❌` depending on the accessibility backend.
    pub uia_value: &'static str,
    pub som_origin: String,
    pub model: String,
    pub scores: DomainScores,
    pub errors: usize,
}

impl ResultRow {
    /// Table header, in cell order.
    pub fn column_names() -> Vec<&'static str> {
        let mut cols = vec!["exp_name", "uia_value", "som_origin", "model"];
        cols.extend(Domain::ALL.iter().map(Domain::as_str));
        cols.push("*errors*");
        cols
    }
}
