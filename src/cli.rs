//! Command-line interface module for datetidy.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing and validation
//! - Merging command-line flags with the configuration file
//! - Running the organizer and rendering its progress
//! - Dry runs and JSON reports

use crate::config::OrganizerConfig;
use crate::grouping::GroupingMode;
use crate::organizer::{
    ConflictPolicy, OrganizeOutcome, Organizer, PlannedMove, ScanOrder, is_valid_directory,
};
use crate::output::OutputFormatter;
use clap::Parser;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Move files into folders named after their modification year or month.
#[derive(Debug, Clone, Parser)]
#[command(name = "datetidy", version, about)]
pub struct Args {
    /// Directory whose files should be organized
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub directory: PathBuf,

    /// Group by month (YYYY-MM) or year (YYYY)
    #[arg(short, long, value_enum)]
    pub mode: Option<GroupingMode>,

    /// What to do when the destination already has a file with the same name
    #[arg(long, value_enum)]
    pub on_conflict: Option<ConflictPolicy>,

    /// Processing order
    #[arg(long, value_enum)]
    pub order: Option<ScanOrder>,

    /// Only print what would be moved
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to a configuration file
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print debug logging to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Final settings for one run, from command-line flags and the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub mode: GroupingMode,
    pub on_conflict: ConflictPolicy,
    pub order: ScanOrder,
    pub dry_run: bool,
    pub json: bool,
}

impl RunSettings {
    /// Command-line flags take precedence over configuration values.
    pub fn resolve(args: &Args, config: &OrganizerConfig) -> Self {
        Self {
            mode: args.mode.unwrap_or(config.organize.mode),
            on_conflict: args.on_conflict.unwrap_or(config.organize.on_conflict),
            order: args.order.unwrap_or(config.organize.order),
            dry_run: args.dry_run,
            json: args.json,
        }
    }
}

/// Runs the CLI application with parsed arguments.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use datetidy::cli::{run_cli, Args};
///
/// let args = Args::parse_from(["datetidy", "/path/to/photos", "--mode", "year"]);
/// if let Err(e) = run_cli(&args) {
///     eprintln!("{}", e);
/// }
/// ```
pub fn run_cli(args: &Args) -> Result<(), String> {
    let config = OrganizerConfig::load(args.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let filters = config
        .compile_filters()
        .map_err(|e| format!("Error compiling filters: {}", e))?;
    let settings = RunSettings::resolve(args, &config);

    if !is_valid_directory(&args.directory) {
        return Err(format!(
            "Please select a valid folder: {}",
            args.directory.display()
        ));
    }

    let organizer = Organizer::new(settings.mode)
        .with_conflict_policy(settings.on_conflict)
        .with_scan_order(settings.order)
        .with_filters(filters);

    if settings.dry_run {
        organize_directory_dry_run(&organizer, &args.directory, settings.json)
    } else {
        organize_directory(&organizer, &args.directory, settings.json)
    }
}

/// Organizes files in a directory into date folders, rendering progress.
pub fn organize_directory(
    organizer: &Organizer,
    base_path: &Path,
    as_json: bool,
) -> Result<(), String> {
    if as_json {
        let outcome = organizer
            .run(base_path, |_, _| {})
            .map_err(|e| json_failure(format!("Error occurred: {}", e)))?;
        let text = serde_json::to_string_pretty(&outcome)
            .map_err(|e| format!("Error serializing report: {}", e))?;
        OutputFormatter::plain(&text);
        return Ok(());
    }

    OutputFormatter::info(&format!(
        "Organizing files in {} by {}...",
        base_path.display(),
        organizer.mode().label().to_lowercase()
    ));

    let pb = OutputFormatter::create_progress_bar();
    let result = organizer.run(base_path, |completed, total| {
        OutputFormatter::update_progress(&pb, completed, total)
    });
    pb.finish_and_clear();

    match result.map_err(|e| format!("Error occurred: {}", e))? {
        OrganizeOutcome::NothingToDo => {
            OutputFormatter::warning("No supported files found.");
        }
        OrganizeOutcome::Organized(report) => {
            OutputFormatter::success("Files organized successfully!");
            OutputFormatter::summary_table(&report.folder_counts(), report.completed());
        }
        OrganizeOutcome::Cancelled(report) => {
            OutputFormatter::warning(&format!(
                "Organization cancelled: {} moved, {} remaining.",
                report.completed(),
                report.remaining()
            ));
            OutputFormatter::summary_table(&report.folder_counts(), report.completed());
        }
    }

    Ok(())
}

/// Shows what a run would do without moving or creating anything.
pub fn organize_directory_dry_run(
    organizer: &Organizer,
    base_path: &Path,
    as_json: bool,
) -> Result<(), String> {
    let plan = organizer.plan(base_path).map_err(|e| {
        let message = format!("Error occurred: {}", e);
        if as_json {
            json_failure(message)
        } else {
            message
        }
    })?;

    if as_json {
        let report = json!({
            "status": "dry_run",
            "total": plan.len(),
            "planned": plan,
        });
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Error serializing report: {}", e))?;
        OutputFormatter::plain(&text);
        return Ok(());
    }

    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", base_path.display()));

    if plan.is_empty() {
        OutputFormatter::warning("No supported files found.");
        return Ok(());
    }

    OutputFormatter::header("Files would be organized as follows:");
    for planned in &plan {
        OutputFormatter::plain(&format!(
            " - {}  →  {}/",
            planned.file_name, planned.folder_name
        ));
    }

    OutputFormatter::summary_table(&planned_folder_counts(&plan), plan.len());
    OutputFormatter::dry_run_notice("No files were modified.");
    OutputFormatter::plain(&format!(
        "Run 'datetidy {}' (without --dry-run) to move the files.",
        base_path.display()
    ));

    Ok(())
}

/// JSON document printed in place of a report when a `--json` run fails.
fn error_report(message: &str) -> serde_json::Value {
    json!({
        "status": "error",
        "message": message,
    })
}

/// Prints `message` as a JSON error report and hands it back for the exit path.
fn json_failure(message: String) -> String {
    match serde_json::to_string_pretty(&error_report(&message)) {
        Ok(text) => OutputFormatter::plain(&text),
        Err(e) => OutputFormatter::warning(&format!("Error serializing report: {}", e)),
    }
    message
}

fn planned_folder_counts(plan: &[PlannedMove]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for planned in plan {
        *counts.entry(planned.folder_name.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_args() {
        let args = Args::try_parse_from(["datetidy", "/tmp/photos"]).unwrap();
        assert_eq!(args.directory, PathBuf::from("/tmp/photos"));
        assert_eq!(args.mode, None);
        assert!(!args.dry_run);
        assert!(!args.json);
    }

    #[test]
    fn test_parse_all_flags() {
        let args = Args::try_parse_from([
            "datetidy",
            "/tmp/photos",
            "--mode",
            "year",
            "--on-conflict",
            "reject",
            "--order",
            "filesystem",
            "--dry-run",
            "--json",
            "--config",
            "/tmp/datetidy.toml",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.mode, Some(GroupingMode::ByYear));
        assert_eq!(args.on_conflict, Some(ConflictPolicy::Reject));
        assert_eq!(args.order, Some(ScanOrder::Filesystem));
        assert!(args.dry_run);
        assert!(args.json);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/datetidy.toml")));
        assert!(args.verbose);
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        let result = Args::try_parse_from(["datetidy", "/tmp", "--mode", "week"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_requires_directory() {
        assert!(Args::try_parse_from(["datetidy"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = OrganizerConfig::default();
        config.organize.mode = GroupingMode::ByYear;
        config.organize.on_conflict = ConflictPolicy::Reject;

        let args = Args::try_parse_from(["datetidy", "/tmp", "--mode", "month"]).unwrap();
        let settings = RunSettings::resolve(&args, &config);

        assert_eq!(settings.mode, GroupingMode::ByMonth);
        assert_eq!(settings.on_conflict, ConflictPolicy::Reject);
        assert_eq!(settings.order, ScanOrder::Name);
    }

    #[test]
    fn test_planned_folder_counts() {
        let plan = vec![
            PlannedMove {
                source: PathBuf::from("a.jpg"),
                file_name: "a.jpg".to_string(),
                folder_name: "2023-05".to_string(),
                destination: PathBuf::from("2023-05/a.jpg"),
            },
            PlannedMove {
                source: PathBuf::from("b.txt"),
                file_name: "b.txt".to_string(),
                folder_name: "2023-05".to_string(),
                destination: PathBuf::from("2023-05/b.txt"),
            },
        ];

        let counts = planned_folder_counts(&plan);
        assert_eq!(counts.get("2023-05"), Some(&2));
    }

    #[test]
    fn test_error_report_has_error_status_and_message() {
        let report = error_report("Error occurred: Failed to move a.jpg");
        assert_eq!(report["status"], "error");
        assert_eq!(report["message"], "Error occurred: Failed to move a.jpg");
    }

    #[test]
    fn test_json_failure_returns_message_unchanged() {
        let message = json_failure("Error occurred: boom".to_string());
        assert_eq!(message, "Error occurred: boom");
    }

    #[test]
    fn test_run_cli_rejects_missing_directory() {
        let args = Args::try_parse_from(["datetidy", "/non/existent/path"]).unwrap();
        let config_dir = tempfile::TempDir::new().unwrap();
        let config_path = config_dir.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();

        let args = Args {
            config: Some(config_path),
            ..args
        };
        let result = run_cli(&args);
        assert!(result.unwrap_err().contains("Please select a valid folder"));
    }
}
