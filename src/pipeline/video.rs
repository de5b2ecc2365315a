//! Similar-video pipeline: duration buckets, then per-bucket BK-trees over
//! sampled frame hashes.
//!
//! Two re-encodings of the same clip keep their duration, so bucketing by
//! whole seconds first keeps each tree small; the frame-hash metric then
//! separates genuinely different footage. Group numbering is global across
//! buckets.

use std::io::Write;
use std::path::Path;

use crate::bktree::BkTree;
use crate::config::Config;
use crate::engine::{by_duration, Eliminator};
use crate::media::{sample_phashes, MediaOpener};
use crate::scanner::{is_in_skipped_dir, is_video_file, FileRecord, Signature, Walker};

use super::{
    root_is_searchable, scan_groups, write_similar_groups, FrameHashEntry, MeanHammingMetric,
    SimilarGroup,
};

/// Run the similar-video scan, writing the report to `out`.
///
/// `opener` supplies the media backend; the binary passes the ffmpeg
/// subprocess implementation.
pub fn run(
    root: &Path,
    follow_symlinks: bool,
    config: &Config,
    opener: &dyn MediaOpener,
    out: &mut impl Write,
) -> std::io::Result<Vec<SimilarGroup>> {
    if !root_is_searchable(root, out)? {
        return Ok(Vec::new());
    }

    writeln!(out, "Searching for files in directory: {}", root.display())?;

    let mut records = collect_candidates(root, follow_symlinks, config, opener);
    if records.is_empty() {
        writeln!(out, "File List is empty")?;
        return Ok(Vec::new());
    }

    writeln!(
        out,
        "Found {} video files in {} directory",
        records.len(),
        root.display()
    )?;

    for record in records.iter_mut() {
        let signature = match opener.open(record.path()) {
            Ok(mut source) => sample_phashes(source.as_mut()),
            Err(e) => {
                log::warn!("{e}");
                Signature::Failed
            }
        };
        record.set_video_phashes(signature);
    }

    let unreadable = Eliminator::new(&mut records).remove_failed();
    writeln!(out, "{unreadable} video files couldn't be read")?;

    // Also leaves the survivors sorted by duration.
    let (removed, remaining) = {
        let mut engine = Eliminator::new(&mut records);
        (engine.remove_unique_by(by_duration), engine.len())
    };
    writeln!(out, "Removed {removed} files with unique duration.")?;
    writeln!(out, "Files remaining: {remaining}")?;
    writeln!(out)?;
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let groups = group_duration_buckets(&records, config.similarity_threshold);
    write_similar_groups(&groups, out)?;

    Ok(groups)
}

/// Walk the tree and accept videos with a usable stream.
fn collect_candidates(
    root: &Path,
    follow_symlinks: bool,
    config: &Config,
    opener: &dyn MediaOpener,
) -> Vec<FileRecord> {
    let walker = Walker::new(root, follow_symlinks);
    let mut records = Vec::new();

    for item in walker.walk() {
        match item {
            Ok(path) => {
                if is_in_skipped_dir(&path, &config.extra_skip_dirs) || !is_video_file(&path) {
                    continue;
                }
                let meta = match opener.open(&path) {
                    Ok(source) => source.metadata(),
                    Err(e) => {
                        log::debug!("Skipping unopenable video: {e}");
                        continue;
                    }
                };
                if !meta.is_usable() {
                    log::debug!(
                        "Skipping video with no usable stream: {}",
                        path.display()
                    );
                    continue;
                }
                let mut record = FileRecord::new(path);
                record.set_duration_seconds(meta.duration_seconds());
                records.push(record);
            }
            Err(e) => log::warn!("{e}"),
        }
    }

    records
}

/// Scan each maximal equal-duration run with its own BK-tree.
fn group_duration_buckets(records: &[FileRecord], radius: u32) -> Vec<SimilarGroup> {
    let mut groups = Vec::new();
    let mut next_id = 0;

    let mut start = 0;
    while start < records.len() {
        let duration = records[start].duration_seconds();
        let mut end = start + 1;
        while end < records.len() && records[end].duration_seconds() == duration {
            end += 1;
        }

        let entries: Vec<FrameHashEntry> = records[start..end]
            .iter()
            .filter_map(|record| {
                record.video_phashes().map(|hashes| FrameHashEntry {
                    path: record.path().to_path_buf(),
                    hashes: hashes.to_vec(),
                })
            })
            .collect();

        let mut tree = BkTree::new(MeanHammingMetric);
        for entry in &entries {
            tree.insert(entry.clone());
        }
        groups.extend(scan_groups(
            &entries,
            &tree,
            radius,
            |entry| &entry.path,
            &mut next_id,
        ));

        start = end;
    }

    groups
}
