//! Video metadata and frame access.
//!
//! Decoding is delegated to an external tool (see [`ffmpeg`]); the rest of
//! the crate only sees the [`MediaOpener`] / [`FrameSource`] seam, which is
//! also what the video pipeline tests stub out.

pub mod ffmpeg;

use image::GrayImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::phash;
use crate::scanner::Signature;

/// Number of frames sampled per video.
pub const SAMPLE_FRAMES: u64 = 10;

/// Container-level metadata for one video stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMeta {
    /// Total number of frames in the stream.
    pub frame_count: u64,
    /// Frames per second.
    pub fps: f64,
}

impl VideoMeta {
    /// A stream is usable only with positive frame count and rate.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.frame_count > 0 && self.fps > 0.0
    }

    /// Duration in whole seconds: `floor(frame_count / fps)`.
    #[must_use]
    pub fn duration_seconds(&self) -> u64 {
        (self.frame_count as f64 / self.fps) as u64
    }
}

/// Errors raised by a media backend.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The container could not be opened or probed.
    #[error("Failed to probe {path}: {reason}")]
    Probe {
        /// The video path
        path: PathBuf,
        /// Backend-specific explanation
        reason: String,
    },

    /// A single frame could not be decoded.
    #[error("Failed to decode frame {index} of {path}: {reason}")]
    Frame {
        /// The video path
        path: PathBuf,
        /// Zero-based frame index
        index: u64,
        /// Backend-specific explanation
        reason: String,
    },

    /// The backend process could not be spawned at all.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// The video path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Random access to the grayscale frames of one opened video.
pub trait FrameSource {
    /// Stream metadata captured at open time.
    fn metadata(&self) -> VideoMeta;

    /// Decode the frame at `index` as 8-bit grayscale.
    fn read_gray_frame(&mut self, index: u64) -> Result<GrayImage, MediaError>;
}

/// Opens videos. The production implementation shells out to ffmpeg;
/// tests substitute synthetic sources.
pub trait MediaOpener {
    /// Open `path` and probe its metadata.
    ///
    /// Implementations should fail (rather than return a zeroed
    /// [`VideoMeta`]) when the file has no usable video stream.
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>, MediaError>;
}

/// Sample up to [`SAMPLE_FRAMES`] evenly spaced frames and hash each one.
///
/// Frame `k` is taken at index `k * frame_count / SAMPLE_FRAMES`. When the
/// very first frame cannot be decoded the whole signature is `Failed`; a
/// later failure keeps the prefix collected so far.
pub fn sample_phashes(source: &mut dyn FrameSource) -> Signature<Vec<u64>> {
    let meta = source.metadata();
    let mut hashes = Vec::with_capacity(SAMPLE_FRAMES as usize);

    for k in 0..SAMPLE_FRAMES {
        let index = k * meta.frame_count / SAMPLE_FRAMES;
        match source.read_gray_frame(index) {
            Ok(frame) => hashes.push(phash::hash_gray_image(&frame)),
            Err(e) => {
                log::warn!("{e}");
                if k == 0 {
                    return Signature::Failed;
                }
                return Signature::Ready(hashes);
            }
        }
    }

    Signature::Ready(hashes)
}
