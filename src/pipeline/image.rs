//! Similar-image pipeline: perceptual hashes indexed in a BK-tree.

use std::io::Write;
use std::path::Path;

use crate::bktree::BkTree;
use crate::config::Config;
use crate::engine::Eliminator;
use crate::phash;
use crate::scanner::{is_image_file, is_in_skipped_dir, FileRecord, Signature, Walker};

use super::{root_is_searchable, scan_groups, write_similar_groups, HammingMetric, PhashEntry, SimilarGroup};

/// Run the similar-image scan, writing the report to `out`.
pub fn run(
    root: &Path,
    follow_symlinks: bool,
    config: &Config,
    out: &mut impl Write,
) -> std::io::Result<Vec<SimilarGroup>> {
    if !root_is_searchable(root, out)? {
        return Ok(Vec::new());
    }

    writeln!(out, "Searching for files in directory: {}", root.display())?;

    let mut records = collect_candidates(root, follow_symlinks, config);
    if records.is_empty() {
        writeln!(out, "File List is empty")?;
        return Ok(Vec::new());
    }

    for record in records.iter_mut() {
        let signature = match phash::hash_image_file(record.path()) {
            Ok(hash) => Signature::Ready(hash),
            Err(e) => {
                log::warn!("{e}");
                Signature::Failed
            }
        };
        record.set_image_phash(signature);
    }
    Eliminator::new(&mut records).remove_failed();

    let entries: Vec<PhashEntry> = records
        .iter()
        .filter_map(|record| {
            record.image_phash().map(|hash| PhashEntry {
                path: record.path().to_path_buf(),
                hash,
            })
        })
        .collect();

    let mut tree = BkTree::new(HammingMetric);
    for entry in &entries {
        tree.insert(entry.clone());
    }

    let mut next_id = 0;
    let groups = scan_groups(
        &entries,
        &tree,
        config.similarity_threshold,
        |entry| &entry.path,
        &mut next_id,
    );
    write_similar_groups(&groups, out)?;

    Ok(groups)
}

/// Walk the tree and accept decodable images.
fn collect_candidates(root: &Path, follow_symlinks: bool, config: &Config) -> Vec<FileRecord> {
    let walker = Walker::new(root, follow_symlinks);
    let mut records = Vec::new();

    for item in walker.walk() {
        match item {
            Ok(path) => {
                if is_in_skipped_dir(&path, &config.extra_skip_dirs) || !is_image_file(&path) {
                    continue;
                }
                // Accept only what actually decodes; a .png full of text
                // never enters the candidate list.
                if let Err(e) = image::open(&path) {
                    log::debug!("Skipping undecodable image {}: {}", path.display(), e);
                    continue;
                }
                records.push(FileRecord::new(path));
            }
            Err(e) => log::warn!("{e}"),
        }
    }

    records
}
