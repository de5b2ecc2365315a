//! End-to-end tests for the similar-video pipeline, driven through a
//! synthetic media backend so no real decoder is needed.

use dupescan::config::Config;
use dupescan::media::{FrameSource, MediaError, MediaOpener, VideoMeta};
use dupescan::pipeline::video as video_pipeline;
use dupescan::pipeline::SimilarGroup;
use image::{GrayImage, Luma};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// What the fake backend should pretend a file contains.
#[derive(Debug, Clone)]
struct FakeVideo {
    meta: VideoMeta,
    /// Per-frame brightness offset ("re-encoding" noise stays under the
    /// hash's radar because the DC coefficient is dropped).
    brightness: u8,
    /// Checkerboard instead of gradient frames.
    alternate_content: bool,
    /// Fail to open entirely.
    unopenable: bool,
    /// Fail every frame read at or past this index.
    fail_from: Option<u64>,
}

impl FakeVideo {
    fn clip(seconds: u64) -> Self {
        Self {
            meta: VideoMeta {
                frame_count: seconds * 30,
                fps: 30.0,
            },
            brightness: 0,
            alternate_content: false,
            unopenable: false,
            fail_from: None,
        }
    }

    fn with_brightness(mut self, b: u8) -> Self {
        self.brightness = b;
        self
    }

    fn with_alternate_content(mut self) -> Self {
        self.alternate_content = true;
        self
    }

    fn unopenable(mut self) -> Self {
        self.unopenable = true;
        self
    }

    fn failing_from(mut self, index: u64) -> Self {
        self.fail_from = Some(index);
        self
    }
}

/// Media backend answering from a canned table keyed by file name.
struct FakeOpener {
    videos: HashMap<String, FakeVideo>,
}

impl FakeOpener {
    fn new(videos: &[(&str, FakeVideo)]) -> Self {
        Self {
            videos: videos
                .iter()
                .map(|(name, fixture)| ((*name).to_string(), fixture.clone()))
                .collect(),
        }
    }
}

impl MediaOpener for FakeOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>, MediaError> {
        let name = path.file_name().unwrap().to_str().unwrap();
        let fixture = self.videos.get(name).ok_or_else(|| MediaError::Probe {
            path: path.to_path_buf(),
            reason: "unknown fixture".to_string(),
        })?;
        if fixture.unopenable {
            return Err(MediaError::Probe {
                path: path.to_path_buf(),
                reason: "synthetic open failure".to_string(),
            });
        }
        Ok(Box::new(FakeFrames {
            path: path.to_path_buf(),
            fixture: fixture.clone(),
        }))
    }
}

struct FakeFrames {
    path: PathBuf,
    fixture: FakeVideo,
}

impl FrameSource for FakeFrames {
    fn metadata(&self) -> VideoMeta {
        self.fixture.meta
    }

    fn read_gray_frame(&mut self, index: u64) -> Result<GrayImage, MediaError> {
        if self.fixture.fail_from.is_some_and(|from| index >= from) {
            return Err(MediaError::Frame {
                path: self.path.clone(),
                index,
                reason: "synthetic decode failure".to_string(),
            });
        }

        let offset = self.fixture.brightness;
        let phase = (index / 30) as u32; // content changes once per second
        if self.fixture.alternate_content {
            Ok(GrayImage::from_fn(64, 64, move |x, y| {
                if (x / 4 + y / 4 + phase) % 2 == 0 {
                    Luma([220u8.saturating_add(offset)])
                } else {
                    Luma([30u8.saturating_add(offset)])
                }
            }))
        } else {
            Ok(GrayImage::from_fn(64, 64, move |x, y| {
                let dx = x as f32 - 32.0 - phase as f32;
                let dy = y as f32 - 32.0;
                let d = (dx * dx + dy * dy).sqrt() / 64.0;
                let v = (255.0 * (1.0 - d).clamp(0.0, 1.0)) as u8;
                Luma([v.saturating_add(offset)])
            }))
        }
    }
}

fn touch_videos(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), b"container bytes").unwrap();
    }
}

fn run(root: &Path, opener: &FakeOpener) -> (Vec<SimilarGroup>, String) {
    let mut out = Vec::new();
    let groups =
        video_pipeline::run(root, false, &Config::default(), opener, &mut out).unwrap();
    (groups, String::from_utf8(out).unwrap())
}

#[test]
fn test_reencoded_clips_group_together() {
    let dir = TempDir::new().unwrap();
    touch_videos(dir.path(), &["a.mp4", "b.mkv", "c.avi"]);
    let opener = FakeOpener::new(&[
        ("a.mp4", FakeVideo::clip(30)),
        ("b.mkv", FakeVideo::clip(30).with_brightness(6)),
        // Same duration, different footage.
        ("c.avi", FakeVideo::clip(30).with_alternate_content()),
    ]);

    let (groups, output) = run(dir.path(), &opener);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id, 1);
    assert_eq!(groups[0].paths.len(), 2);
    let names: Vec<_> = groups[0]
        .paths
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert!(names.contains(&"a.mp4".to_string()));
    assert!(names.contains(&"b.mkv".to_string()));

    assert!(output.contains("Found 3 video files"));
    assert!(output.contains("Group 1"));
    assert!(output.contains(" - "));
}

#[test]
fn test_unique_durations_are_removed() {
    let dir = TempDir::new().unwrap();
    touch_videos(dir.path(), &["x.mp4", "y.mp4"]);
    let opener = FakeOpener::new(&[
        ("x.mp4", FakeVideo::clip(10)),
        ("y.mp4", FakeVideo::clip(20)),
    ]);

    let (groups, output) = run(dir.path(), &opener);

    assert!(groups.is_empty());
    assert!(output.contains("Removed 2 files with unique duration."));
}

#[test]
fn test_unopenable_video_is_skipped_at_accept() {
    let dir = TempDir::new().unwrap();
    touch_videos(dir.path(), &["good1.mp4", "good2.mp4", "bad.mp4"]);
    let opener = FakeOpener::new(&[
        ("good1.mp4", FakeVideo::clip(15)),
        ("good2.mp4", FakeVideo::clip(15).with_brightness(3)),
        ("bad.mp4", FakeVideo::clip(15).unopenable()),
    ]);

    let (groups, output) = run(dir.path(), &opener);

    assert!(output.contains("Found 2 video files"));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths.len(), 2);
}

#[test]
fn test_first_frame_failure_counts_as_unreadable() {
    let dir = TempDir::new().unwrap();
    touch_videos(dir.path(), &["ok1.mp4", "ok2.mp4", "broken.mp4"]);
    let opener = FakeOpener::new(&[
        ("ok1.mp4", FakeVideo::clip(12)),
        ("ok2.mp4", FakeVideo::clip(12).with_brightness(2)),
        ("broken.mp4", FakeVideo::clip(12).failing_from(0)),
    ]);

    let (groups, output) = run(dir.path(), &opener);

    assert!(output.contains("1 video files couldn't be read"));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths.len(), 2);
}

#[test]
fn test_partial_frame_failure_keeps_prefix_and_still_groups() {
    let dir = TempDir::new().unwrap();
    touch_videos(dir.path(), &["full.mp4", "partial.mp4"]);
    let opener = FakeOpener::new(&[
        ("full.mp4", FakeVideo::clip(20)),
        // Frames decode up to the 5th sample, then fail; the prefix is
        // compared over the common length.
        ("partial.mp4", FakeVideo::clip(20).failing_from(300)),
    ]);

    let (groups, output) = run(dir.path(), &opener);

    assert!(output.contains("0 video files couldn't be read"));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths.len(), 2);
}

#[test]
fn test_non_video_extensions_ignored() {
    let dir = TempDir::new().unwrap();
    touch_videos(dir.path(), &["clip.mp4"]);
    std::fs::write(dir.path().join("notes.txt"), b"text").unwrap();
    // Uppercase extension is not accepted in video mode.
    std::fs::write(dir.path().join("loud.MP4"), b"bytes").unwrap();
    let opener = FakeOpener::new(&[("clip.mp4", FakeVideo::clip(9))]);

    let (_, output) = run(dir.path(), &opener);
    assert!(output.contains("Found 1 video files"));
}

#[test]
fn test_groups_numbered_globally_across_duration_buckets() {
    let dir = TempDir::new().unwrap();
    touch_videos(
        dir.path(),
        &["a1.mp4", "a2.mp4", "b1.mp4", "b2.mp4"],
    );
    let opener = FakeOpener::new(&[
        ("a1.mp4", FakeVideo::clip(10)),
        ("a2.mp4", FakeVideo::clip(10).with_brightness(4)),
        ("b1.mp4", FakeVideo::clip(25)),
        ("b2.mp4", FakeVideo::clip(25).with_brightness(4)),
    ]);

    let (groups, output) = run(dir.path(), &opener);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].id, 1);
    assert_eq!(groups[1].id, 2);
    assert!(output.contains("Group 1"));
    assert!(output.contains("Group 2"));
}

#[test]
fn test_empty_root_reports_empty_list() {
    let dir = TempDir::new().unwrap();
    let opener = FakeOpener::new(&[]);
    let (groups, output) = run(dir.path(), &opener);

    assert!(groups.is_empty());
    assert!(output.contains("File List is empty"));
}
