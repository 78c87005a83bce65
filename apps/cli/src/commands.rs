//! CLI definition, tracing setup, and the table command.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use benchtable_core::pipeline::{
    ProgressReporter, SilentProgress, TableRequest, TableSummary, build_results_table,
};
use benchtable_core::validate::load_experiments;
use benchtable_shared::{Settings, load_settings, load_settings_from};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::{error, info};
use tracing_subscriber::fmt::MakeWriter;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// benchtable — generate a markdown results table from benchmark runs.
#[derive(Parser)]
#[command(
    name = "benchtable",
    version,
    about = "Generate a markdown results table from a JSON experiment config.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Directory containing result files.
    #[arg(long = "result_dir", env = "BENCHTABLE_RESULT_DIR", value_name = "PATH")]
    pub result_dir: PathBuf,

    /// Path to JSON config file.
    #[arg(long = "json_config", env = "BENCHTABLE_JSON_CONFIG", value_name = "PATH")]
    pub json_config: PathBuf,

    /// Output markdown file [default: results_table.md].
    #[arg(long = "output_file", value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Number of experiments read in parallel (defaults to CPU count + 4, max 32).
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Settings file (defaults to ~/.benchtable/benchtable.toml when present).
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Disable the progress spinner.
    #[arg(long)]
    pub no_progress: bool,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so the table
/// summary on stdout stays clean. Every event is written while `spinner` is
/// suspended, so the spinner never overdraws a log line.
pub(crate) fn init_tracing(cli: &Cli, spinner: &ProgressBar) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "benchtable=info",
        1 => "benchtable=debug",
        _ => "benchtable=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    let writer = SuspendingWriter::new(spinner.clone(), std::io::stderr);

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .init();
        }
    }
}

/// `MakeWriter` that hides a progress bar around each log write.
#[derive(Clone)]
pub(crate) struct SuspendingWriter<M> {
    bar: ProgressBar,
    inner: M,
}

impl<M> SuspendingWriter<M> {
    pub(crate) fn new(bar: ProgressBar, inner: M) -> Self {
        Self { bar, inner }
    }
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for SuspendingWriter<M> {
    type Writer = SuspendedWrite<'a, M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SuspendedWrite {
            bar: &self.bar,
            inner: self.inner.make_writer(),
        }
    }
}

pub(crate) struct SuspendedWrite<'a, W> {
    bar: &'a ProgressBar,
    inner: W,
}

impl<W: Write> Write for SuspendedWrite<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Self { bar, inner } = self;
        bar.suspend(|| inner.write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let Self { bar, inner } = self;
        bar.suspend(|| inner.write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Run the table command. Config validation failures are logged and turn
/// into exit status 1; other failures propagate to `color-eyre`.
///
/// `spinner` is the bar the log writer suspends around; it stays hidden
/// unless progress display is enabled.
pub(crate) async fn run(cli: Cli, spinner: ProgressBar) -> Result<ExitCode> {
    let settings = match &cli.settings {
        Some(path) => load_settings_from(path)?,
        None => load_settings()?,
    };

    let experiments = load_experiments(&cli.json_config)
        .wrap_err_with(|| format!("cannot load {}", cli.json_config.display()))?;

    let request = build_request(&cli, &settings, experiments);

    info!(
        result_dir = %request.results_root.display(),
        config = %cli.json_config.display(),
        experiments = request.experiments.len(),
        "building results table"
    );

    let result = if cli.no_progress {
        build_results_table(&request, &SilentProgress).await
    } else {
        let reporter = CliProgress::new(spinner);
        build_results_table(&request, &reporter).await
    };

    let summary = match result {
        Ok(summary) => summary,
        Err(e) if e.is_validation() => {
            error!("Configuration error: {e}");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    println!();
    println!("  Results table written!");
    println!("  Path:    {}", summary.output_path.display());
    println!("  Rows:    {}", summary.rows);
    println!("  Errors:  {}", summary.total_errors);
    println!("  Time:    {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    Ok(ExitCode::SUCCESS)
}

/// Merge flags over settings: flags win, settings fill the gaps.
fn build_request(
    cli: &Cli,
    settings: &Settings,
    experiments: serde_json::Map<String, serde_json::Value>,
) -> TableRequest {
    TableRequest {
        results_root: cli.result_dir.clone(),
        experiments,
        output_path: cli
            .output_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(&settings.defaults.output_file)),
        layout: settings.layout.clone(),
        concurrency: cli.concurrency.unwrap_or(settings.defaults.concurrency),
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Bar shared by the progress reporter and the log writer. Hidden until a
/// [`CliProgress`] takes it over.
pub(crate) fn progress_bar() -> ProgressBar {
    ProgressBar::hidden()
}

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new(spinner: ProgressBar) -> Self {
        spinner.set_draw_target(ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn experiment_done(&self, experiment: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Reading results [{current}/{total}] {experiment}"));
    }

    fn done(&self, _summary: &TableSummary) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
