//! Frame access through the `ffprobe`/`ffmpeg` executables.
//!
//! Metadata comes from one `ffprobe` run in JSON mode; each sampled frame
//! is a short-lived `ffmpeg` invocation that seeks by timestamp and emits
//! a single PNG on stdout, decoded with the `image` crate. A machine
//! without ffmpeg installed degrades per the pipeline error policy: every
//! video fails to open and is reported as unreadable, never a crash.

use image::GrayImage;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{FrameSource, MediaError, MediaOpener, VideoMeta};

/// Opener backed by the ffmpeg command-line tools.
#[derive(Debug, Clone)]
pub struct FfmpegOpener {
    ffprobe_bin: PathBuf,
    ffmpeg_bin: PathBuf,
}

impl Default for FfmpegOpener {
    fn default() -> Self {
        Self {
            ffprobe_bin: PathBuf::from("ffprobe"),
            ffmpeg_bin: PathBuf::from("ffmpeg"),
        }
    }
}

impl FfmpegOpener {
    /// Opener using `ffprobe`/`ffmpeg` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MediaOpener for FfmpegOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>, MediaError> {
        let output = Command::new(&self.ffprobe_bin)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=nb_frames,avg_frame_rate,r_frame_rate,duration",
                "-of",
                "json",
            ])
            .arg(path)
            .output()
            .map_err(|e| MediaError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(MediaError::Probe {
                path: path.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let meta = meta_from_probe_json(path, &String::from_utf8_lossy(&output.stdout))?;
        Ok(Box::new(FfmpegFrames {
            ffmpeg_bin: self.ffmpeg_bin.clone(),
            path: path.to_path_buf(),
            meta,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    nb_frames: Option<String>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

/// Parse the ffprobe JSON for the first video stream.
fn meta_from_probe_json(path: &Path, json: &str) -> Result<VideoMeta, MediaError> {
    let probe: ProbeOutput = serde_json::from_str(json).map_err(|e| MediaError::Probe {
        path: path.to_path_buf(),
        reason: format!("unparseable ffprobe output: {e}"),
    })?;

    let stream = probe.streams.first().ok_or_else(|| MediaError::Probe {
        path: path.to_path_buf(),
        reason: "no video stream".to_string(),
    })?;

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rational)
        .filter(|&fps| fps > 0.0)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_rational))
        .unwrap_or(0.0);

    // Some containers omit nb_frames; fall back to duration * fps.
    let frame_count = stream
        .nb_frames
        .as_deref()
        .and_then(|s| s.parse::<u64>().ok())
        .or_else(|| {
            let duration: f64 = stream.duration.as_deref()?.parse().ok()?;
            if duration > 0.0 && fps > 0.0 {
                Some((duration * fps) as u64)
            } else {
                None
            }
        })
        .unwrap_or(0);

    Ok(VideoMeta { frame_count, fps })
}

/// Parse ffprobe's `num/den` rational syntax (also accepts a bare number).
fn parse_rational(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => s.trim().parse().ok(),
    }
}

/// One opened video; every frame read is a fresh ffmpeg process.
struct FfmpegFrames {
    ffmpeg_bin: PathBuf,
    path: PathBuf,
    meta: VideoMeta,
}

impl FrameSource for FfmpegFrames {
    fn metadata(&self) -> VideoMeta {
        self.meta
    }

    fn read_gray_frame(&mut self, index: u64) -> Result<GrayImage, MediaError> {
        let timestamp = index as f64 / self.meta.fps;
        let output = Command::new(&self.ffmpeg_bin)
            .args(["-v", "error", "-ss", &format!("{timestamp:.6}"), "-i"])
            .arg(&self.path)
            .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "-"])
            .output()
            .map_err(|e| MediaError::Io {
                path: self.path.clone(),
                source: e,
            })?;

        if !output.status.success() || output.stdout.is_empty() {
            return Err(MediaError::Frame {
                path: self.path.clone(),
                index,
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let decoded =
            image::load_from_memory(&output.stdout).map_err(|e| MediaError::Frame {
                path: self.path.clone(),
                index,
                reason: e.to_string(),
            })?;
        Ok(decoded.to_luma8())
    }
}
