//! datetidy - date-based directory organization
//!
//! This library moves the files of a directory into subfolders named after
//! their last-modified year (`2024`) or year-month (`2024-06`), reporting
//! progress after each move. It also provides the command-line front end,
//! TOML configuration for exclusion filters and run defaults, and terminal
//! output helpers.

pub mod cli;
pub mod config;
pub mod file_filter;
pub mod grouping;
pub mod organizer;
pub mod output;

pub use config::{CompiledFilters, ConfigError, OrganizerConfig};
pub use file_filter::{SUPPORTED_EXTENSIONS, is_supported_name};
pub use grouping::GroupingMode;
pub use organizer::{
    ConflictPolicy, MoveRecord, MoveStage, OrganizeError, OrganizeOutcome, OrganizeReport,
    OrganizeResult, Organizer, PlannedMove, ScanOrder, is_valid_directory, organize,
};

pub use cli::{Args, run_cli};
