//! End-to-end table pipeline: config → validate → read (parallel) → render → write.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{Map, Value};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, info, info_span, instrument, warn};

use benchtable_shared::{
    BenchTableError, ExperimentSet, LayoutSettings, Result, ResultRow, default_concurrency,
};

use crate::{output, processor, validate};

/// Input for [`build_results_table`].
#[derive(Debug, Clone)]
pub struct TableRequest {
    /// Root of the results tree.
    pub results_root: PathBuf,
    /// Raw experiment config, in file order.
    pub experiments: Map<String, Value>,
    /// Markdown destination.
    pub output_path: PathBuf,
    /// Path segments between an experiment and its domains.
    pub layout: LayoutSettings,
    /// Worker pool size; `0` picks [`default_concurrency`].
    pub concurrency: usize,
}

/// Result of a successful table build.
#[derive(Debug, Clone)]
pub struct TableSummary {
    /// Where the table was written.
    pub output_path: PathBuf,
    /// Number of experiment rows.
    pub rows: usize,
    /// Sum of all rows' error counters.
    pub total_errors: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called as each experiment finishes, in completion order.
    fn experiment_done(&self, experiment: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, summary: &TableSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn experiment_done(&self, _experiment: &str, _current: usize, _total: usize) {}
    fn done(&self, _summary: &TableSummary) {}
}

/// Build the results table and write it to `request.output_path`.
///
/// 1. Validate the experiment config (before touching the results tree)
/// 2. Read every experiment on a bounded worker pool
/// 3. Render rows in config order as markdown
/// 4. Write the file atomically
#[instrument(skip_all, fields(
    results_root = %request.results_root.display(),
    output = %request.output_path.display(),
))]
pub async fn build_results_table(
    request: &TableRequest,
    progress: &dyn ProgressReporter,
) -> Result<TableSummary> {
    let start = Instant::now();

    progress.phase("Validating experiment config");
    let experiments = validate::validate_experiments(&request.experiments)?;

    if !request.results_root.is_dir() {
        warn!(
            path = %request.results_root.display(),
            "results directory not found, every domain will be empty"
        );
    }

    let concurrency = match request.concurrency {
        0 => default_concurrency(),
        n => n,
    };

    info!(
        experiments = experiments.len(),
        concurrency, "collecting experiment results"
    );

    progress.phase("Reading results");
    let rows = collect_rows(
        experiments,
        &request.results_root,
        &request.layout,
        concurrency,
        progress,
    )
    .await?;

    progress.phase("Writing table");
    let markdown = benchtable_markdown::render_results_table(&rows);
    output::write_atomic(&request.output_path, &markdown)?;

    info!(
        path = %request.output_path.display(),
        "Results table saved to {}",
        request.output_path.display()
    );

    let summary = TableSummary {
        output_path: request.output_path.clone(),
        rows: rows.len(),
        total_errors: rows.iter().map(|r| r.errors).sum(),
        elapsed: start.elapsed(),
    };
    progress.done(&summary);

    Ok(summary)
}

/// Process every experiment with at most `concurrency` running at once.
///
/// Jobs finish in any order; each carries its config index and lands in that
/// slot, so the returned rows follow config order.
pub async fn collect_rows(
    experiments: ExperimentSet,
    results_root: &Path,
    layout: &LayoutSettings,
    concurrency: usize,
    progress: &dyn ProgressReporter,
) -> Result<Vec<ResultRow>> {
    let total = experiments.len();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks: JoinSet<(usize, Result<ResultRow>)> = JoinSet::new();

    for (index, (experiment, config)) in experiments.into_entries().into_iter().enumerate() {
        let sem = semaphore.clone();
        let root = results_root.to_path_buf();
        let layout = layout.clone();
        let span = info_span!("experiment", experiment = %experiment, model = %config.model_name);

        tasks.spawn(
            async move {
                let permit = match sem.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return (index, Err(BenchTableError::Worker(e.to_string())));
                    }
                };

                // Filesystem walking blocks, so it runs on the blocking pool
                // under the same span.
                let span = tracing::Span::current();
                let row = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    let _entered = span.enter();
                    processor::process_experiment(&layout, &root, &experiment, &config)
                })
                .await
                .map_err(|e| BenchTableError::Worker(e.to_string()));

                (index, row)
            }
            .instrument(span),
        );
    }

    let mut slots: Vec<Option<ResultRow>> = vec![None; total];
    let mut completed = 0;

    while let Some(joined) = tasks.join_next().await {
        let (index, row) = joined.map_err(|e| BenchTableError::Worker(e.to_string()))?;
        let row = row?;
        completed += 1;
        progress.experiment_done(&row.exp_name, completed, total);
        slots[index] = Some(row);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            row.ok_or_else(|| {
                BenchTableError::Worker(format!("no row produced for experiment #{index}"))
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
