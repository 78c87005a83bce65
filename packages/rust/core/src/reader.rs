//! Result reader: walks one experiment's results tree and scores each domain.
//!
//! Layout consumed (segments after the model come from [`LayoutSettings`]):
//! ```text
//! <root>/<experiment>/pyautogui/a11y_tree/<model>/0/<domain>/<task>/result.txt
//! ```
//!
//! Bad data never fails the read. Missing, unreadable or malformed result
//! files and unlistable domain directories are logged and counted in
//! [`ExperimentOutcome::errors`]; the affected tasks are left out of the mean.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::{debug, error, instrument, warn};

use benchtable_shared::{Domain, DomainScores, ExperimentOutcome, LayoutSettings};

/// What a single task directory yielded.
#[derive(Debug)]
pub enum TaskOutcome {
    /// The result file parsed as a number.
    Valid(f64),
    /// No result file in the task directory.
    Missing,
    /// The result file content is not a number.
    Malformed(String),
    /// The result file exists but could not be read.
    Unreadable(io::Error),
}

/// Score and error count for one domain directory.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DomainRead {
    /// Percentage over valid tasks, `None` when there were none.
    pub score: Option<f64>,
    pub errors: usize,
}

/// Read every domain of one experiment.
#[instrument(skip(layout, results_root), fields(root = %results_root.display()))]
pub fn read_experiment(
    layout: &LayoutSettings,
    results_root: &Path,
    experiment: &str,
    model: &str,
) -> ExperimentOutcome {
    let base = layout.experiment_dir(results_root, experiment, model);
    debug!(path = %base.display(), "reading experiment results");

    let mut scores = DomainScores::default();
    let mut errors = 0;

    for domain in Domain::ALL {
        let domain_dir = base.join(domain.as_str());
        let read = read_domain(&domain_dir, &layout.result_file, experiment, domain);
        scores.set(domain, read.score);
        errors += read.errors;
    }

    ExperimentOutcome { scores, errors }
}

/// Score one domain directory. A directory that does not exist scores `None`
/// without counting an error.
pub fn read_domain(
    domain_dir: &Path,
    result_file: &str,
    experiment: &str,
    domain: Domain,
) -> DomainRead {
    if !domain_dir.is_dir() {
        debug!(experiment, %domain, "domain not run");
        return DomainRead::default();
    }

    score_domain(list_tasks(domain_dir), result_file, experiment, domain)
}

/// Task directories found in a domain directory.
#[derive(Debug, Default)]
pub struct TaskListing {
    /// Child directories, sorted.
    pub tasks: Vec<PathBuf>,
    /// Directory entries that could not be read.
    pub failed_entries: usize,
}

/// List the task directories of a domain. Plain files are not tasks.
pub fn list_tasks(domain_dir: &Path) -> io::Result<TaskListing> {
    let mut listing = TaskListing::default();

    for entry in std::fs::read_dir(domain_dir)? {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_dir() {
                    listing.tasks.push(path);
                } else {
                    debug!(path = %path.display(), "skipping non-directory entry");
                }
            }
            Err(e) => {
                error!(dir = %domain_dir.display(), error = %e, "cannot read domain directory entry");
                listing.failed_entries += 1;
            }
        }
    }
    listing.tasks.sort();

    Ok(listing)
}

/// Score a domain from its task listing. A listing that failed counts one
/// error and leaves the domain absent.
pub fn score_domain(
    listing: io::Result<TaskListing>,
    result_file: &str,
    experiment: &str,
    domain: Domain,
) -> DomainRead {
    let TaskListing {
        tasks,
        failed_entries,
    } = match listing {
        Ok(listing) => listing,
        Err(e) => {
            error!(experiment, %domain, error = %e, "cannot list domain directory");
            return DomainRead {
                score: None,
                errors: 1,
            };
        }
    };

    let mut errors = failed_entries;
    let mut values = Vec::with_capacity(tasks.len());
    for task_dir in &tasks {
        let task = task_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match read_task(task_dir, result_file) {
            TaskOutcome::Valid(value) => values.push(value),
            TaskOutcome::Missing => {
                warn!(experiment, %domain, %task, "Missing {result_file} in {experiment}, {domain}/{task}");
                errors += 1;
            }
            TaskOutcome::Malformed(content) => {
                error!(experiment, %domain, %task, %content, "Invalid {result_file} in {experiment}, {domain}/{task}");
                errors += 1;
            }
            TaskOutcome::Unreadable(e) => {
                error!(experiment, %domain, %task, error = %e, "Unreadable {result_file} in {experiment}, {domain}/{task}");
                errors += 1;
            }
        }
    }

    let score = mean_percentage(&values);
    debug!(experiment, %domain, tasks = tasks.len(), valid = values.len(), ?score, "domain scored");

    DomainRead { score, errors }
}

/// Read the result file of one task directory.
pub fn read_task(task_dir: &Path, result_file: &str) -> TaskOutcome {
    let path = task_dir.join(result_file);
    if !path.is_file() {
        return TaskOutcome::Missing;
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => parse_result(&content),
        Err(e) if e.kind() == ErrorKind::NotFound => TaskOutcome::Missing,
        Err(e) => TaskOutcome::Unreadable(e),
    }
}

/// Parse result file content: one number, surrounding whitespace ignored.
pub fn parse_result(content: &str) -> TaskOutcome {
    let trimmed = content.trim();
    match trimmed.parse::<f64>() {
        Ok(value) => TaskOutcome::Valid(value),
        Err(_) => TaskOutcome::Malformed(trimmed.to_string()),
    }
}

/// Mean of the non-NaN values scaled to a percentage. `None` when no value
/// is usable.
pub fn mean_percentage(values: &[f64]) -> Option<f64> {
    let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if valid.is_empty() {
        return None;
    }
    Some(valid.iter().sum::<f64>() / valid.len() as f64 * 100.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bt-reader-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_task(domain_dir: &Path, task: &str, content: Option<&str>) {
        let task_dir = domain_dir.join(task);
        std::fs::create_dir_all(&task_dir).unwrap();
        if let Some(content) = content {
            std::fs::write(task_dir.join("result.txt"), content).unwrap();
        }
    }

    #[test]
    fn mean_of_valid_values() {
        assert_eq!(mean_percentage(&[0.5, 1.0]), Some(75.0));
        assert_eq!(mean_percentage(&[1.0]), Some(100.0));
        assert_eq!(mean_percentage(&[0.0, 0.0]), Some(0.0));
        assert_eq!(mean_percentage(&[]), None);
        assert_eq!(mean_percentage(&[f64::NAN]), None);
        assert_eq!(mean_percentage(&[f64::NAN, 0.5]), Some(50.0));
    }

    #[test]
    fn parse_result_values() {
        assert!(matches!(parse_result("0.5"), TaskOutcome::Valid(v) if v == 0.5));
        assert!(matches!(parse_result("  1\n"), TaskOutcome::Valid(v) if v == 1.0));
        assert!(matches!(parse_result("abc"), TaskOutcome::Malformed(s) if s == "abc"));
        assert!(matches!(parse_result(""), TaskOutcome::Malformed(_)));
    }

    #[test]
    fn domain_mean_of_two_tasks() {
        let tmp = temp_dir();
        let domain_dir = tmp.join("chrome");
        write_task(&domain_dir, "t1", Some("0.5"));
        write_task(&domain_dir, "t2", Some("1.0"));

        let read = read_domain(&domain_dir, "result.txt", "exp", Domain::Chrome);
        assert_eq!(read, DomainRead { score: Some(75.0), errors: 0 });

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn malformed_value_counted_and_excluded() {
        let tmp = temp_dir();
        let domain_dir = tmp.join("vlc");
        write_task(&domain_dir, "t1", Some("0.5"));
        write_task(&domain_dir, "t2", Some("abc"));

        let read = read_domain(&domain_dir, "result.txt", "exp", Domain::Vlc);
        assert_eq!(read, DomainRead { score: Some(50.0), errors: 1 });

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_file_counted_and_excluded() {
        let tmp = temp_dir();
        let domain_dir = tmp.join("chrome");
        write_task(&domain_dir, "t1", Some("1.0"));
        write_task(&domain_dir, "t2", None);

        let read = read_domain(&domain_dir, "result.txt", "exp", Domain::Chrome);
        assert_eq!(read, DomainRead { score: Some(100.0), errors: 1 });

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn no_valid_tasks_is_absent_not_zero() {
        let tmp = temp_dir();
        let domain_dir = tmp.join("clock");
        write_task(&domain_dir, "t1", None);
        write_task(&domain_dir, "t2", Some("n/a"));

        let read = read_domain(&domain_dir, "result.txt", "exp", Domain::Clock);
        assert_eq!(read, DomainRead { score: None, errors: 2 });

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_domain_is_absent_without_error() {
        let tmp = temp_dir();
        let read = read_domain(&tmp.join("notepad"), "result.txt", "exp", Domain::Notepad);
        assert_eq!(read, DomainRead::default());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn empty_domain_is_absent_without_error() {
        let tmp = temp_dir();
        let domain_dir = tmp.join("msedge");
        std::fs::create_dir_all(&domain_dir).unwrap();

        let read = read_domain(&domain_dir, "result.txt", "exp", Domain::Msedge);
        assert_eq!(read, DomainRead::default());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn stray_files_in_domain_are_not_tasks() {
        let tmp = temp_dir();
        let domain_dir = tmp.join("settings");
        write_task(&domain_dir, "t1", Some("0.0"));
        std::fs::write(domain_dir.join("notes.log"), "x").unwrap();

        let read = read_domain(&domain_dir, "result.txt", "exp", Domain::Settings);
        assert_eq!(read, DomainRead { score: Some(0.0), errors: 0 });

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unreadable_result_counted_and_excluded() {
        let tmp = temp_dir();
        let domain_dir = tmp.join("windows_calc");
        write_task(&domain_dir, "t1", Some("1.0"));
        let bad = domain_dir.join("t2");
        std::fs::create_dir_all(&bad).unwrap();
        std::fs::write(bad.join("result.txt"), [0xff, 0xfe, 0x00]).unwrap();

        assert!(matches!(read_task(&bad, "result.txt"), TaskOutcome::Unreadable(_)));

        let read = read_domain(&domain_dir, "result.txt", "exp", Domain::WindowsCalc);
        assert_eq!(read, DomainRead { score: Some(100.0), errors: 1 });

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn failed_listing_is_one_error_and_absent() {
        let listing = Err(io::Error::from(ErrorKind::PermissionDenied));
        let read = score_domain(listing, "result.txt", "exp", Domain::Vlc);
        assert_eq!(read, DomainRead { score: None, errors: 1 });
    }

    #[test]
    fn failed_entries_are_counted() {
        let tmp = temp_dir();
        write_task(&tmp, "t1", Some("0.5"));

        let listing = TaskListing {
            tasks: vec![tmp.join("t1")],
            failed_entries: 2,
        };
        let read = score_domain(Ok(listing), "result.txt", "exp", Domain::Clock);
        assert_eq!(read, DomainRead { score: Some(50.0), errors: 2 });

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn listing_keeps_only_sorted_directories() {
        let tmp = temp_dir();
        write_task(&tmp, "t2", None);
        write_task(&tmp, "t1", None);
        std::fs::write(tmp.join("readme.txt"), "x").unwrap();

        let listing = list_tasks(&tmp).unwrap();
        assert_eq!(listing.tasks, vec![tmp.join("t1"), tmp.join("t2")]);
        assert_eq!(listing.failed_entries, 0);

        assert!(list_tasks(&tmp.join("readme.txt")).is_err());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[cfg(unix)]
    #[test]
    fn unlistable_domain_is_one_error() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = temp_dir();
        let domain_dir = tmp.join("msedge");
        write_task(&domain_dir, "t1", Some("1.0"));
        std::fs::set_permissions(&domain_dir, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can still list the directory; nothing to check then.
        if std::fs::read_dir(&domain_dir).is_err() {
            let read = read_domain(&domain_dir, "result.txt", "exp", Domain::Msedge);
            assert_eq!(read, DomainRead { score: None, errors: 1 });
        }

        std::fs::set_permissions(&domain_dir, std::fs::Permissions::from_mode(0o755)).unwrap();
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn read_experiment_walks_layout() {
        let tmp = temp_dir();
        let layout = LayoutSettings::default();
        let base = layout.experiment_dir(&tmp, "expA", "gpt-4");

        write_task(&base.join("chrome"), "t1", Some("1.0"));
        write_task(&base.join("chrome"), "t2", None);
        write_task(&base.join("vs_code"), "t1", Some("0.25"));
        std::fs::create_dir_all(base.join("notepad")).unwrap();

        let outcome = read_experiment(&layout, &tmp, "expA", "gpt-4");
        assert_eq!(outcome.scores.chrome, Some(100.0));
        assert_eq!(outcome.scores.vs_code, Some(25.0));
        assert_eq!(outcome.scores.notepad, None);
        assert_eq!(outcome.scores.vlc, None);
        assert_eq!(outcome.errors, 1);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn read_experiment_with_no_tree() {
        let tmp = temp_dir();
        let outcome = read_experiment(&LayoutSettings::default(), &tmp, "ghost", "m");
        assert_eq!(outcome, ExperimentOutcome::default());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn custom_result_file_name() {
        let tmp = temp_dir();
        let task_dir = tmp.join("t1");
        std::fs::create_dir_all(&task_dir).unwrap();
        std::fs::write(task_dir.join("score.txt"), "0.75").unwrap();

        assert!(matches!(read_task(&task_dir, "score.txt"), TaskOutcome::Valid(v) if v == 0.75));
        assert!(matches!(read_task(&task_dir, "result.txt"), TaskOutcome::Missing));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
