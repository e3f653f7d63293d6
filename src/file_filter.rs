//! Recognized file extensions.
//!
//! Only files whose lowercased name ends with one of these suffixes are
//! eligible for organization. The list is fixed; it covers images, documents,
//! spreadsheets, plain text, video, audio and archives.
//!
//! # Examples
//!
//! ```
//! use datetidy::file_filter::is_supported_name;
//!
//! assert!(is_supported_name("Holiday.JPG"));
//! assert!(is_supported_name("clip.livephoto"));
//! assert!(!is_supported_name("settings.ini"));
//! ```

/// Suffixes (with the leading dot) of every recognized file type.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    // Images
    ".jpg",
    ".jpeg",
    ".png",
    ".gif",
    ".bmp",
    ".heic",
    ".heif",
    ".aae",
    ".livephoto",
    // Documents and spreadsheets
    ".pdf",
    ".docx",
    ".doc",
    ".xlsx",
    ".xls",
    ".txt",
    // Video
    ".mov",
    ".mp4",
    ".avi",
    ".mkv",
    ".wmv",
    ".flv",
    ".webm",
    // Audio
    ".mp3",
    ".wav",
    ".aac",
    ".ogg",
    ".opus",
    ".wma",
    ".m4a",
    // Archives
    ".zip",
    ".rar",
];

/// Returns true if `file_name`, lowercased, ends with a recognized extension.
///
/// This is a plain suffix test on the whole name, so `photo.tar.jpg` is
/// eligible and a file literally named `.jpg` is too.
pub fn is_supported_name(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    SUPPORTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
