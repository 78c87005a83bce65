//! Experiment processor: turns one experiment's config and results into a row.

use std::path::Path;

use benchtable_shared::{
    ExperimentConfig, ExperimentOutcome, LayoutSettings, ResultRow, UIA_BACKEND,
};

use crate::reader;

const BACKEND_ENABLED: &str = "✅";
const BACKEND_DISABLED: &str = "❌";

/// `✅` for the UIA backend, `❌` for anything else.
pub fn backend_glyph(a11y_backend: &str) -> &'static str {
    if a11y_backend == UIA_BACKEND {
        BACKEND_ENABLED
    } else {
        BACKEND_DISABLED
    }
}

/// Assemble the table row for one experiment. Origin and model are copied
/// as given, empty values included.
pub fn build_row(
    experiment: &str,
    config: &ExperimentConfig,
    outcome: ExperimentOutcome,
) -> ResultRow {
    ResultRow {
        exp_name: experiment.to_string(),
        uia_value: backend_glyph(&config.a11y_backend),
        som_origin: config.som_origin.clone(),
        model: config.model_name.clone(),
        scores: outcome.scores,
        errors: outcome.errors,
    }
}

/// Read one experiment's results tree and build its row.
pub fn process_experiment(
    layout: &LayoutSettings,
    results_root: &Path,
    experiment: &str,
    config: &ExperimentConfig,
) -> ResultRow {
    let outcome = reader::read_experiment(layout, results_root, experiment, &config.model_name);
    build_row(experiment, config, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchtable_shared::{Domain, DomainScores};

    fn config(backend: &str) -> ExperimentConfig {
        ExperimentConfig {
            exp_name: "display".into(),
            a11y_backend: backend.into(),
            som_origin: "oss".into(),
            model_name: "gpt-4".into(),
        }
    }

    #[test]
    fn glyph_only_for_uia() {
        assert_eq!(backend_glyph("uia"), "✅");
        assert_eq!(backend_glyph("win32"), "❌");
        assert_eq!(backend_glyph("UIA"), "❌");
        assert_eq!(backend_glyph(""), "❌");
    }

    #[test]
    fn row_uses_identifier_and_passes_fields_through() {
        let mut scores = DomainScores::default();
        scores.set(Domain::Clock, Some(40.0));
        let outcome = ExperimentOutcome { scores, errors: 3 };

        let row = build_row("exp-7", &config("uia"), outcome);
        assert_eq!(row.exp_name, "exp-7");
        assert_eq!(row.uia_value, "✅");
        assert_eq!(row.som_origin, "oss");
        assert_eq!(row.model, "gpt-4");
        assert_eq!(row.scores.clock, Some(40.0));
        assert_eq!(row.scores.chrome, None);
        assert_eq!(row.errors, 3);
    }

    #[test]
    fn empty_fields_stay_empty() {
        let mut cfg = config("win32");
        cfg.som_origin.clear();
        cfg.model_name.clear();

        let row = build_row("e", &cfg, ExperimentOutcome::default());
        assert_eq!(row.uia_value, "❌");
        assert_eq!(row.som_origin, "");
        assert_eq!(row.model, "");
    }

    #[test]
    fn process_experiment_reads_tree() {
        let tmp = std::env::temp_dir().join(format!("bt-processor-test-{}", uuid::Uuid::now_v7()));
        let layout = LayoutSettings::default();
        let task_dir = layout
            .experiment_dir(&tmp, "expA", "gpt-4")
            .join("file_explorer")
            .join("t1");
        std::fs::create_dir_all(&task_dir).unwrap();
        std::fs::write(task_dir.join("result.txt"), "0.5").unwrap();

        let row = process_experiment(&layout, &tmp, "expA", &config("uia"));
        assert_eq!(row.scores.file_explorer, Some(50.0));
        assert_eq!(row.errors, 0);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
