//! Candidate file records with lazily populated signatures.
//!
//! A [`FileRecord`] is created per accepted file and owned by the candidate
//! list for the duration of one pipeline run. Each elimination stage
//! populates exactly the signature it needs; a signature, once populated,
//! is never recomputed or mutated.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use super::digest;

/// Length of the head-bytes signature buffer.
pub const HEAD_BYTES_LEN: usize = 4096;

/// A lazily populated per-file signature.
///
/// `Failed` marks a file whose signature could not be computed (unreadable,
/// undecodable); such records are flagged and dropped at the next cleanup
/// rather than aborting the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature<T> {
    /// Not computed yet.
    Unset,
    /// Computed successfully.
    Ready(T),
    /// Computation failed; the record is due for removal.
    Failed,
}

impl<T> Signature<T> {
    /// Get the populated value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Signature::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// True if the computation was attempted and failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Signature::Failed)
    }

    /// True if the signature holds a value.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Signature::Ready(_))
    }
}

/// One candidate file moving through an elimination pipeline.
///
/// The path is the record's identity and is immutable after construction.
/// Everything else starts unset and is filled in stage by stage.
#[derive(Debug, Clone)]
pub struct FileRecord {
    path: PathBuf,
    size: u64,
    head_bytes: Signature<Box<[u8; HEAD_BYTES_LEN]>>,
    content_digest: Signature<String>,
    image_phash: Signature<u64>,
    video_phashes: Signature<Vec<u64>>,
    duration_seconds: u64,
    removed: bool,
}

impl FileRecord {
    /// Create a record for `path` with all signatures unset.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            size: 0,
            head_bytes: Signature::Unset,
            content_digest: Signature::Unset,
            image_phash: Signature::Unset,
            video_phashes: Signature::Unset,
            duration_seconds: 0,
            removed: false,
        }
    }

    /// The file path (record identity).
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File size in bytes; 0 until [`populate_size`](Self::populate_size)
    /// succeeds.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The head-bytes buffer, if populated.
    pub fn head_bytes(&self) -> Option<&[u8; HEAD_BYTES_LEN]> {
        self.head_bytes.value().map(|boxed| boxed.as_ref())
    }

    /// The BLAKE3 content digest as lowercase hex, if populated.
    pub fn content_digest(&self) -> Option<&str> {
        self.content_digest.value().map(String::as_str)
    }

    /// The image perceptual hash, if populated.
    pub fn image_phash(&self) -> Option<u64> {
        self.image_phash.value().copied()
    }

    /// The sampled video frame hashes, if populated.
    pub fn video_phashes(&self) -> Option<&[u64]> {
        self.video_phashes.value().map(Vec::as_slice)
    }

    /// Video duration in whole seconds (`floor(frame_count / fps)`).
    #[must_use]
    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    /// Set the video duration. Video mode only.
    pub fn set_duration_seconds(&mut self, seconds: u64) {
        self.duration_seconds = seconds;
    }

    /// True when an elimination pass has flagged this record; the next
    /// cleanup drops it.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Flag this record for removal at the next cleanup.
    pub fn mark_removed(&mut self) {
        self.removed = true;
    }

    /// True if any attempted signature computation failed.
    #[must_use]
    pub fn any_signature_failed(&self) -> bool {
        self.head_bytes.is_failed()
            || self.content_digest.is_failed()
            || self.image_phash.is_failed()
            || self.video_phashes.is_failed()
    }

    /// Stat the file and store its size.
    ///
    /// Returns `false` (leaving `size = 0`) when the metadata cannot be
    /// read, e.g. on permission errors or a racing deletion.
    pub fn populate_size(&mut self) -> bool {
        match fs::metadata(&self.path) {
            Ok(meta) => {
                self.size = meta.len();
                true
            }
            Err(e) => {
                log::warn!("Failed to stat {}: {}", self.path.display(), e);
                false
            }
        }
    }

    /// Read the first [`HEAD_BYTES_LEN`] bytes of the file, zero-padding
    /// on short reads.
    ///
    /// On open or read failure the signature becomes `Failed` and `false`
    /// is returned.
    pub fn populate_head_bytes(&mut self) -> bool {
        if self.head_bytes.is_ready() {
            return true;
        }
        match read_head_bytes(&self.path) {
            Ok(buffer) => {
                self.head_bytes = Signature::Ready(buffer);
                true
            }
            Err(e) => {
                log::warn!("Failed to read head of {}: {}", self.path.display(), e);
                self.head_bytes = Signature::Failed;
                false
            }
        }
    }

    /// Stream the file through BLAKE3 and store the hex digest.
    ///
    /// On failure the signature becomes `Failed`, which flags the record
    /// for removal at the next cleanup.
    pub fn populate_digest(&mut self) -> bool {
        if self.content_digest.is_ready() {
            return true;
        }
        match digest::compute(&self.path) {
            Ok(hex) => {
                self.content_digest = Signature::Ready(hex);
                true
            }
            Err(e) => {
                log::warn!("Failed to hash {}: {}", self.path.display(), e);
                self.content_digest = Signature::Failed;
                false
            }
        }
    }

    /// Store a computed image perceptual hash.
    pub fn set_image_phash(&mut self, signature: Signature<u64>) {
        self.image_phash = signature;
    }

    /// Store computed video frame hashes.
    pub fn set_video_phashes(&mut self, signature: Signature<Vec<u64>>) {
        self.video_phashes = signature;
    }
}

fn read_head_bytes(path: &Path) -> std::io::Result<Box<[u8; HEAD_BYTES_LEN]>> {
    let mut file = File::open(path)?;
    let mut buffer = Box::new([0u8; HEAD_BYTES_LEN]);
    let mut filled = 0;
    // Loop until EOF or the buffer is full; a single read may come up short.
    while filled < HEAD_BYTES_LEN {
        let n = file.read(&mut buffer[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(buffer)
}
