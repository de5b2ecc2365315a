//! Bounded directory traversal built on `walkdir`.
//!
//! The walker yields every regular file under a root as a stream of
//! `Result<PathBuf, ScanError>`. Policy:
//!
//! - symlinks are followed only when requested; `walkdir`'s ancestor check
//!   turns symlink cycles into [`ScanError::Cycle`] instead of looping
//! - recursion is capped at [`MAX_WALK_DEPTH`] levels
//! - unreadable entries become error items; traversal continues
//! - children are visited in file-name order so repeated scans of an
//!   unchanged tree produce identical output

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::ScanError;

/// Maximum directory recursion depth.
pub const MAX_WALK_DEPTH: usize = 50;

/// Directory walker yielding regular files.
#[derive(Debug)]
pub struct Walker {
    root: PathBuf,
    follow_symlinks: bool,
}

impl Walker {
    /// Create a walker rooted at `root`.
    #[must_use]
    pub fn new(root: &Path, follow_symlinks: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            follow_symlinks,
        }
    }

    /// Walk the tree, yielding one item per regular file.
    ///
    /// Directories and (when not following) symlinks are silently skipped;
    /// traversal errors are yielded as [`ScanError`] values so the caller
    /// can log them and keep scanning.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        WalkDir::new(&self.root)
            .max_depth(MAX_WALK_DEPTH)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        Some(Ok(entry.into_path()))
                    } else {
                        None
                    }
                }
                Err(e) => Some(Err(convert_error(&self.root, e))),
            })
    }
}

/// Map a `walkdir` error onto our error taxonomy.
fn convert_error(root: &Path, error: walkdir::Error) -> ScanError {
    let path = error
        .path()
        .map_or_else(|| root.to_path_buf(), Path::to_path_buf);

    if error.loop_ancestor().is_some() {
        return ScanError::Cycle(path);
    }

    match error.io_error() {
        Some(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
            ScanError::PermissionDenied(path)
        }
        _ => ScanError::Io {
            path,
            source: std::io::Error::other(error.to_string()),
        },
    }
}
