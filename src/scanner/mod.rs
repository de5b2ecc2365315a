//! File discovery: directory walking, candidate records, content digests.
//!
//! The scanner is divided into submodules:
//! - [`walker`]: bounded directory traversal built on `walkdir`
//! - [`record`]: per-file candidate state ([`FileRecord`]) with lazily
//!   populated signatures
//! - [`digest`]: streaming BLAKE3 content digests
//!
//! The accept filters (extension sets, skipped directory names) live here
//! because every pipeline shares them.

pub mod digest;
pub mod record;
pub mod walker;

use std::path::{Path, PathBuf};

pub use record::{FileRecord, Signature, HEAD_BYTES_LEN};
pub use walker::{Walker, MAX_WALK_DEPTH};

/// Directory names never descended into by the accept filters, matched
/// against every component of a candidate path.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    ".config",
    ".cache",
    ".vscode",
    ".local",
    ".venv",
    ".mozilla",
    ".thunderbird",
];

/// Image extensions accepted by the similar-image pipeline (lowercased
/// before matching).
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "bmp", "tiff", "tif", "gif", "webp",
];

/// Video container extensions accepted by the similar-video pipeline.
/// Matched case-sensitively.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "flv", "wmv", "webm"];

/// Check whether any component of `path` names a skipped directory.
///
/// `extra` supplies additional names from the configuration file.
#[must_use]
pub fn is_in_skipped_dir(path: &Path, extra: &[String]) -> bool {
    path.components().any(|component| {
        let name = component.as_os_str().to_string_lossy();
        SKIP_DIRS.iter().any(|skip| name == *skip)
            || extra.iter().any(|skip| name == skip.as_str())
    })
}

/// Check whether `path` carries a recognized image extension.
#[must_use]
pub fn is_image_file(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            let lower = ext.to_lowercase();
            IMAGE_EXTENSIONS.contains(&lower.as_str())
        }
        None => false,
    }
}

/// Check whether `path` carries a recognized video extension.
#[must_use]
pub fn is_video_file(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => VIDEO_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A symlink cycle was detected while following links.
    #[error("Filesystem loop detected at: {0}")]
    Cycle(PathBuf),

    /// An I/O error occurred while walking.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
