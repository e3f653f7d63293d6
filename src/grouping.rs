/// Grouping modes and destination folder naming.
///
/// A file's destination folder is derived from its last-modified timestamp,
/// interpreted in the local time zone. Two schemes exist: year-month
/// (`2024-06`) and year only (`2024`).
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use datetidy::grouping::GroupingMode;
///
/// let when = Local.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap();
/// assert_eq!(GroupingMode::ByMonth.folder_name(&when), "2024-06");
/// assert_eq!(GroupingMode::ByYear.folder_name(&when), "2024");
/// ```
use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Selects the destination folder naming scheme.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum GroupingMode {
    /// `YYYY-MM` folders.
    #[default]
    #[serde(rename = "month")]
    #[value(name = "month")]
    ByMonth,
    /// `YYYY` folders.
    #[serde(rename = "year")]
    #[value(name = "year")]
    ByYear,
}

impl GroupingMode {
    /// Returns the folder name for a local date-time.
    ///
    /// The year is always zero-padded to four digits and the month to two.
    pub fn folder_name(&self, timestamp: &DateTime<Local>) -> String {
        match self {
            GroupingMode::ByMonth => {
                format!("{:04}-{:02}", timestamp.year(), timestamp.month())
            }
            GroupingMode::ByYear => format!("{:04}", timestamp.year()),
        }
    }

    /// Returns the folder name for a filesystem modification time, or `None`
    /// if the time lies outside the range chrono can represent.
    pub fn folder_name_for(&self, modified: SystemTime) -> Option<String> {
        local_time(modified).map(|timestamp| self.folder_name(&timestamp))
    }

    /// Human-readable label, as shown next to the mode selector.
    pub fn label(&self) -> &'static str {
        match self {
            GroupingMode::ByMonth => "Month",
            GroupingMode::ByYear => "Year",
        }
    }
}

/// Converts a `SystemTime` to local time without panicking on extreme values.
fn local_time(time: SystemTime) -> Option<DateTime<Local>> {
    let (secs, nanos) = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => (i64::try_from(after.as_secs()).ok()?, after.subsec_nanos()),
        Err(e) => {
            let before = e.duration();
            let secs = i64::try_from(before.as_secs()).ok()?;
            match before.subsec_nanos() {
                0 => (secs.checked_neg()?, 0),
                nanos => (secs.checked_neg()?.checked_sub(1)?, 1_000_000_000 - nanos),
            }
        }
    };
    DateTime::from_timestamp(secs, nanos).map(|utc| utc.with_timezone(&Local))
}

impl std::fmt::Display for GroupingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
