/// Date-based file organization.
///
/// This module scans the immediate children of a directory, keeps the regular
/// files with a recognized extension, and moves each one into a subfolder
/// named after its last-modified year or year-month. Progress is reported
/// through a callback after every move.
///
/// There is no rollback: when a move fails the run stops, files already moved
/// stay where they are, and the error names the file that failed.
use crate::config::CompiledFilters;
use crate::file_filter::is_supported_name;
use crate::grouping::GroupingMode;
use filetime::FileTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// What to do when the destination folder already holds a file of the same name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Replace the existing file.
    #[default]
    Overwrite,
    /// Stop with a [`OrganizeError::MoveFailed`] and leave both files alone.
    Reject,
}

/// Order in which eligible files are processed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ScanOrder {
    /// Sorted by file name.
    #[default]
    Name,
    /// Whatever order the directory listing yields.
    Filesystem,
}

/// The step of a single-file move that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStage {
    ReadTimestamp,
    CreateFolder,
    Rename,
}

impl std::fmt::Display for MoveStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            MoveStage::ReadTimestamp => "reading modification time",
            MoveStage::CreateFolder => "creating destination folder",
            MoveStage::Rename => "moving file",
        };
        f.write_str(text)
    }
}

/// Errors that can occur while organizing a directory.
#[derive(Debug)]
pub enum OrganizeError {
    /// The target path does not exist or is not a directory.
    InvalidDirectory { path: PathBuf, source: io::Error },
    /// The target directory could not be listed.
    ScanFailed { path: PathBuf, source: io::Error },
    /// A file could not be moved into its destination folder.
    ///
    /// `destination` is `None` when the failure happened before one was chosen.
    MoveFailed {
        file: PathBuf,
        destination: Option<PathBuf>,
        stage: MoveStage,
        source: io::Error,
    },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDirectory { path, source } => {
                write!(f, "Invalid directory {}: {}", path.display(), source)
            }
            Self::ScanFailed { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
            Self::MoveFailed {
                file,
                destination,
                stage,
                source,
            } => match destination {
                Some(destination) => write!(
                    f,
                    "Failed to move {} to {} ({}): {}",
                    file.display(),
                    destination.display(),
                    stage,
                    source
                ),
                None => write!(f, "Failed to move {} ({}): {}", file.display(), stage, source),
            },
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidDirectory { source, .. }
            | Self::ScanFailed { source, .. }
            | Self::MoveFailed { source, .. } => Some(source),
        }
    }
}

/// Result type for organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// A move that a run would perform, computed without touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub file_name: String,
    /// Destination folder name, e.g. `2024-06`.
    pub folder_name: String,
    pub destination: PathBuf,
}

/// A completed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub folder: String,
}

/// Files moved during a run, out of the total found at the start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrganizeReport {
    pub total: usize,
    pub moved: Vec<MoveRecord>,
}

impl OrganizeReport {
    fn new(total: usize) -> Self {
        Self {
            total,
            moved: Vec::with_capacity(total),
        }
    }

    pub fn completed(&self) -> usize {
        self.moved.len()
    }

    pub fn remaining(&self) -> usize {
        self.total - self.moved.len()
    }

    /// Number of files moved into each folder, sorted by folder name.
    pub fn folder_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.moved {
            *counts.entry(record.folder.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Terminal state of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OrganizeOutcome {
    /// Every eligible file was moved.
    Organized(OrganizeReport),
    /// No eligible files; nothing was created or moved.
    NothingToDo,
    /// The cancel flag was raised between two files.
    Cancelled(OrganizeReport),
}

/// Returns true if `path` names an existing directory.
///
/// Front ends call this on demand to decide whether organizing is possible.
pub fn is_valid_directory(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.is_dir()
}

/// Organizes `directory` with default settings.
///
/// `on_progress` receives `(completed, total)` after each move.
///
/// # Examples
///
/// ```no_run
/// use datetidy::grouping::GroupingMode;
/// use datetidy::organizer::{organize, OrganizeOutcome};
/// use std::path::Path;
///
/// let mut report = |done: usize, total: usize| println!("{done}/{total}");
/// match organize(Path::new("/path/to/photos"), GroupingMode::ByYear, Some(&mut report)) {
///     Ok(OrganizeOutcome::NothingToDo) => println!("No supported files found."),
///     Ok(_) => println!("Files organized successfully!"),
///     Err(e) => eprintln!("{}", e),
/// }
/// ```
pub fn organize(
    directory: &Path,
    mode: GroupingMode,
    on_progress: Option<&mut dyn FnMut(usize, usize)>,
) -> OrganizeResult<OrganizeOutcome> {
    let organizer = Organizer::new(mode);
    match on_progress {
        Some(callback) => organizer.run(directory, callback),
        None => organizer.run(directory, |_, _| {}),
    }
}

/// Moves files into date-named subfolders of a base directory.
#[derive(Debug, Clone)]
pub struct Organizer {
    mode: GroupingMode,
    conflict_policy: ConflictPolicy,
    scan_order: ScanOrder,
    filters: CompiledFilters,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl Organizer {
    pub fn new(mode: GroupingMode) -> Self {
        Self {
            mode,
            conflict_policy: ConflictPolicy::default(),
            scan_order: ScanOrder::default(),
            filters: CompiledFilters::default(),
            cancel_flag: None,
        }
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    pub fn with_scan_order(mut self, order: ScanOrder) -> Self {
        self.scan_order = order;
        self
    }

    /// Narrows eligible files further with exclusion filters.
    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Checked before each file; once set, the run stops and returns
    /// [`OrganizeOutcome::Cancelled`].
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    pub fn mode(&self) -> GroupingMode {
        self.mode
    }

    /// Lists the eligible files of `directory` in processing order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDirectory` if the path is not an existing directory and
    /// `ScanFailed` if it cannot be listed.
    pub fn scan(&self, directory: &Path) -> OrganizeResult<Vec<PathBuf>> {
        validate_directory(directory)?;

        let scan_error = |source| OrganizeError::ScanFailed {
            path: directory.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(directory).map_err(scan_error)? {
            let entry = entry.map_err(scan_error)?;
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if is_supported_name(&name) && self.filters.should_include(&name) && path.is_file() {
                files.push(path);
            }
        }

        if self.scan_order == ScanOrder::Name {
            files.sort();
        }

        Ok(files)
    }

    /// Computes every move a run would make, without side effects.
    pub fn plan(&self, directory: &Path) -> OrganizeResult<Vec<PlannedMove>> {
        self.scan(directory)?
            .iter()
            .map(|file| self.plan_file(directory, file))
            .collect()
    }

    /// Organizes `directory`, calling `on_progress(completed, total)` after
    /// each successful move.
    ///
    /// # Errors
    ///
    /// Fails before any side effect with `InvalidDirectory` or `ScanFailed`.
    /// Fails mid-run with `MoveFailed`; files moved before the failure stay moved.
    pub fn run<F>(&self, directory: &Path, mut on_progress: F) -> OrganizeResult<OrganizeOutcome>
    where
        F: FnMut(usize, usize),
    {
        let files = self.scan(directory)?;
        let total = files.len();

        if total == 0 {
            info!(directory = %directory.display(), "no supported files found");
            return Ok(OrganizeOutcome::NothingToDo);
        }

        info!(
            directory = %directory.display(),
            mode = %self.mode,
            total,
            "organizing files"
        );

        let mut report = OrganizeReport::new(total);
        for (index, file) in files.iter().enumerate() {
            if self.is_cancelled() {
                warn!(
                    completed = report.completed(),
                    remaining = report.remaining(),
                    "organization cancelled"
                );
                return Ok(OrganizeOutcome::Cancelled(report));
            }

            let planned = self.plan_file(directory, file)?;
            report.moved.push(self.apply(directory, planned)?);
            on_progress(index + 1, total);
        }

        info!(moved = report.completed(), "organization complete");
        Ok(OrganizeOutcome::Organized(report))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Acquire))
    }

    fn plan_file(&self, directory: &Path, file: &Path) -> OrganizeResult<PlannedMove> {
        let timestamp_error = |source| OrganizeError::MoveFailed {
            file: file.to_path_buf(),
            destination: None,
            stage: MoveStage::ReadTimestamp,
            source,
        };

        let modified = fs::metadata(file)
            .and_then(|metadata| metadata.modified())
            .map_err(timestamp_error)?;
        let folder_name = self.mode.folder_name_for(modified).ok_or_else(|| {
            timestamp_error(io::Error::new(
                io::ErrorKind::InvalidData,
                "modification time out of range",
            ))
        })?;
        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let destination = match file.file_name() {
            Some(name) => directory.join(&folder_name).join(name),
            None => directory.join(&folder_name),
        };

        Ok(PlannedMove {
            source: file.to_path_buf(),
            file_name,
            folder_name,
            destination,
        })
    }

    fn apply(&self, directory: &Path, planned: PlannedMove) -> OrganizeResult<MoveRecord> {
        let folder_path = directory.join(&planned.folder_name);
        let fail = |stage, source| OrganizeError::MoveFailed {
            file: planned.source.clone(),
            destination: Some(planned.destination.clone()),
            stage,
            source,
        };

        fs::create_dir_all(&folder_path).map_err(|e| fail(MoveStage::CreateFolder, e))?;

        if self.conflict_policy == ConflictPolicy::Reject
            && fs::symlink_metadata(&planned.destination).is_ok()
        {
            return Err(fail(
                MoveStage::Rename,
                io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "destination file already exists",
                ),
            ));
        }

        move_file(&planned.source, &planned.destination).map_err(|e| fail(MoveStage::Rename, e))?;

        debug!(
            from = %planned.source.display(),
            to = %planned.destination.display(),
            "moved file"
        );

        Ok(MoveRecord {
            source: planned.source,
            destination: planned.destination,
            folder: planned.folder_name,
        })
    }
}

fn validate_directory(path: &Path) -> OrganizeResult<()> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(OrganizeError::InvalidDirectory {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotADirectory, "path is not a directory"),
        }),
        Err(source) => Err(OrganizeError::InvalidDirectory {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Renames `source` to `destination`, replacing an existing file.
///
/// Falls back to copy-then-delete when the rename crosses filesystems, keeping
/// the original access and modification times.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            warn!(
                from = %source.display(),
                to = %destination.display(),
                "rename crosses devices, copying instead"
            );
            copy_then_remove(source, destination)
        }
        Err(e) => Err(e),
    }
}

fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    fs::copy(source, destination)?;

    let mtime = FileTime::from_last_modification_time(&metadata);
    let atime = FileTime::from_last_access_time(&metadata);
    if let Err(e) = filetime::set_file_times(destination, atime, mtime) {
        warn!(path = %destination.display(), "failed to restore timestamps: {}", e);
    }

    fs::remove_file(source)
}
