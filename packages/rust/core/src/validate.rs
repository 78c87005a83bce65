//! Experiment config loading and validation.
//!
//! The JSON config maps experiment identifiers to attribute records. Key
//! order is preserved (`serde_json` is built with `preserve_order`) because
//! it decides the row order of the final table.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use benchtable_shared::{
    BenchTableError, ExperimentConfig, ExperimentSet, REQUIRED_KEYS, Result,
};

/// Read a JSON experiment config. The top level must be an object.
pub fn load_experiments(path: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path).map_err(|e| BenchTableError::io(path, e))?;

    let value: Value = serde_json::from_str(&content).map_err(|e| {
        BenchTableError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(BenchTableError::config(format!(
            "{} must contain a JSON object of experiments, found {}",
            path.display(),
            json_type_name(&other)
        ))),
    }
}

/// Check every experiment carries the required attributes and turn the raw
/// map into typed entries, keeping config order.
///
/// Fails on the first experiment missing a key (keys checked in
/// [`REQUIRED_KEYS`] order). Display attributes of any JSON type are accepted
/// and turned into cell text; `model_name` names a results directory and must
/// be a string. Extra attributes are ignored.
#[instrument(skip_all, fields(experiments = config.len()))]
pub fn validate_experiments(config: &Map<String, Value>) -> Result<ExperimentSet> {
    let mut entries = Vec::with_capacity(config.len());

    for (exp_id, details) in config {
        let Some(attrs) = details.as_object() else {
            return Err(BenchTableError::missing(exp_id, REQUIRED_KEYS[0]));
        };

        if let Some(key) = REQUIRED_KEYS.iter().find(|key| !attrs.contains_key(**key)) {
            return Err(BenchTableError::missing(exp_id, *key));
        }

        let text = |key: &str| attrs.get(key).map(cell_text).unwrap_or_default();

        let model_name = match attrs.get("model_name") {
            Some(Value::String(model)) => model.clone(),
            other => {
                return Err(BenchTableError::InvalidField {
                    experiment: exp_id.clone(),
                    key: "model_name".to_string(),
                    found: other.map_or("nothing", json_type_name).to_string(),
                });
            }
        };

        let experiment = ExperimentConfig {
            exp_name: text("exp_name"),
            a11y_backend: text("a11y_backend"),
            som_origin: text("som_origin"),
            model_name,
        };
        entries.push((exp_id.clone(), experiment));
    }

    debug!(count = entries.len(), "experiment config valid");
    Ok(ExperimentSet::new(entries))
}

/// Table text for an attribute value: strings verbatim, `null` empty,
/// anything else its JSON text.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
