//! The three scan pipelines and their shared grouping machinery.
//!
//! Each pipeline drives the walker over a root directory, narrows the
//! candidate list through elimination passes, and writes its report to a
//! caller-supplied stream (stdout in the binary, a buffer in tests).

pub mod exact;
pub mod image;
pub mod video;

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::bktree::{BkTree, Metric};
use crate::phash;

/// A group of byte-identical files found by the exact pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Size shared by every file in the group.
    pub size: u64,
    /// Member paths in final sort order.
    pub paths: Vec<PathBuf>,
}

/// A group of perceptually similar files (images or videos).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarGroup {
    /// 1-based group number, global across the whole scan.
    pub id: usize,
    /// Member paths in index order.
    pub paths: Vec<PathBuf>,
}

/// A perceptual-hash entry indexed by the BK-tree in image mode.
#[derive(Debug, Clone)]
pub struct PhashEntry {
    pub(crate) path: PathBuf,
    pub(crate) hash: u64,
}

/// Hamming distance over [`PhashEntry`] values.
pub struct HammingMetric;

impl Metric<PhashEntry> for HammingMetric {
    fn distance(&self, a: &PhashEntry, b: &PhashEntry) -> u32 {
        phash::hamming(a.hash, b.hash)
    }
}

/// A frame-hash-sequence entry indexed by the BK-tree in video mode.
#[derive(Debug, Clone)]
pub struct FrameHashEntry {
    pub(crate) path: PathBuf,
    pub(crate) hashes: Vec<u64>,
}

/// Mean per-frame Hamming distance over [`FrameHashEntry`] values.
pub struct MeanHammingMetric;

impl Metric<FrameHashEntry> for MeanHammingMetric {
    fn distance(&self, a: &FrameHashEntry, b: &FrameHashEntry) -> u32 {
        phash::mean_frame_distance(&a.hashes, &b.hashes)
    }
}

/// Bail out early when the scan root is a plain file.
///
/// Returns `false` (after reporting) when there is nothing to search;
/// mirrors the `exit 0` contract for file arguments.
pub(crate) fn root_is_searchable(root: &Path, out: &mut impl Write) -> std::io::Result<bool> {
    if root.is_file() {
        writeln!(out, "You passed a file as the argument. No duplicates to check")?;
        return Ok(false);
    }
    Ok(true)
}

/// Probe every entry against the tree and carve out non-overlapping
/// groups of at least two members.
///
/// Entries are visited in list order. A probe whose result has fewer than
/// two members only marks itself visited; a real group marks every member
/// so later probes cannot re-emit them. `next_id` carries the global group
/// counter across calls (the video pipeline scans one duration bucket at a
/// time).
pub(crate) fn scan_groups<V, M, P>(
    entries: &[V],
    tree: &BkTree<V, M>,
    radius: u32,
    path_of: P,
    next_id: &mut usize,
) -> Vec<SimilarGroup>
where
    M: Metric<V>,
    P: Fn(&V) -> &Path,
{
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut groups = Vec::new();

    for entry in entries {
        let probe_path = path_of(entry);
        if visited.contains(probe_path) {
            continue;
        }

        let members = tree.query(entry, radius, |v| visited.contains(path_of(v)));
        if members.len() >= 2 {
            *next_id += 1;
            let paths: Vec<PathBuf> = members
                .iter()
                .map(|v| path_of(v).to_path_buf())
                .collect();
            for path in &paths {
                visited.insert(path.clone());
            }
            groups.push(SimilarGroup {
                id: *next_id,
                paths,
            });
        } else {
            visited.insert(probe_path.to_path_buf());
        }
    }

    groups
}

/// Write similarity groups in the `Group <k>` stanza format.
pub(crate) fn write_similar_groups(
    groups: &[SimilarGroup],
    out: &mut impl Write,
) -> std::io::Result<()> {
    for group in groups {
        writeln!(out, "Group {}", group.id)?;
        for path in &group.paths {
            writeln!(out, " - {}", path.display())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, hash: u64) -> PhashEntry {
        PhashEntry {
            path: PathBuf::from(path),
            hash,
        }
    }

    fn tree_of(entries: &[PhashEntry]) -> BkTree<PhashEntry, HammingMetric> {
        let mut tree = BkTree::new(HammingMetric);
        for e in entries {
            tree.insert(e.clone());
        }
        tree
    }

    #[test]
    fn test_scan_groups_non_overlapping() {
        // a,b,c mutually close; d far away.
        let entries = vec![
            entry("/a", 0b0000),
            entry("/b", 0b0001),
            entry("/c", 0b0011),
            entry("/d", u64::MAX >> 1),
        ];
        let tree = tree_of(&entries);

        let mut next_id = 0;
        let groups = scan_groups(&entries, &tree, 10, |e| &e.path, &mut next_id);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, 1);
        assert_eq!(groups[0].paths.len(), 3);
        assert!(!groups[0].paths.contains(&PathBuf::from("/d")));
    }

    #[test]
    fn test_scan_groups_singleton_marks_probe_visited() {
        let entries = vec![entry("/a", 0), entry("/b", u64::MAX >> 1)];
        let tree = tree_of(&entries);

        let mut next_id = 0;
        let groups = scan_groups(&entries, &tree, 3, |e| &e.path, &mut next_id);
        assert!(groups.is_empty());
        assert_eq!(next_id, 0);
    }

    #[test]
    fn test_scan_groups_counter_spans_calls() {
        let bucket_a = vec![entry("/a1", 0), entry("/a2", 1)];
        let bucket_b = vec![entry("/b1", 0), entry("/b2", 2)];
        let mut next_id = 0;

        let first = scan_groups(&bucket_a, &tree_of(&bucket_a), 10, |e| &e.path, &mut next_id);
        let second = scan_groups(&bucket_b, &tree_of(&bucket_b), 10, |e| &e.path, &mut next_id);

        assert_eq!(first[0].id, 1);
        assert_eq!(second[0].id, 2);
    }

    #[test]
    fn test_scan_groups_two_disjoint_groups() {
        let near = u64::MAX >> 1;
        let entries = vec![
            entry("/a", 0),
            entry("/b", 1),
            entry("/c", near),
            entry("/d", near ^ 1),
        ];
        let tree = tree_of(&entries);

        let mut next_id = 0;
        let groups = scan_groups(&entries, &tree, 5, |e| &e.path, &mut next_id);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].paths.len(), 2);
        assert_eq!(groups[1].paths.len(), 2);
    }

    #[test]
    fn test_write_similar_groups_format() {
        let groups = vec![SimilarGroup {
            id: 1,
            paths: vec![PathBuf::from("/x/a.png"), PathBuf::from("/x/b.jpg")],
        }];
        let mut buf = Vec::new();
        write_similar_groups(&groups, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "Group 1\n - /x/a.png\n - /x/b.jpg\n\n");
    }

    #[test]
    fn test_root_is_searchable() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, b"x").unwrap();

        let mut buf = Vec::new();
        assert!(root_is_searchable(dir.path(), &mut buf).unwrap());
        assert!(buf.is_empty());

        assert!(!root_is_searchable(&file, &mut buf).unwrap());
        assert!(String::from_utf8(buf).unwrap().contains("No duplicates to check"));
    }
}
