//! Exact-duplicate pipeline: size → head bytes → BLAKE3 digest.
//!
//! Each stage is strictly narrowing, and equality under a stronger key
//! implies equality under every earlier one, so no true duplicate is ever
//! discarded. Files that become unreadable mid-scan are dropped at the
//! next cleanup instead of aborting the run.

use std::io::Write;
use std::path::Path;

use crate::config::Config;
use crate::engine::{by_digest, by_head_bytes, by_size, Eliminator};
use crate::report::human_size;
use crate::scanner::{is_in_skipped_dir, FileRecord, Walker};

use super::{root_is_searchable, DuplicateGroup};

/// Run the exact-duplicate scan, writing the report to `out`.
///
/// Returns the duplicate groups (possibly empty). Only failures writing
/// to `out` are errors; per-file problems are handled by removal.
pub fn run(
    root: &Path,
    follow_symlinks: bool,
    config: &Config,
    out: &mut impl Write,
) -> std::io::Result<Vec<DuplicateGroup>> {
    if !root_is_searchable(root, out)? {
        return Ok(Vec::new());
    }

    writeln!(out, "Searching for files in directory: {}", root.display())?;

    let mut records = collect_candidates(root, follow_symlinks, config);
    if records.is_empty() {
        writeln!(out, "File List is empty")?;
        return Ok(Vec::new());
    }

    writeln!(out, "Total files before filtering: {}", records.len())?;

    // Stage 1: unique sizes cannot have a duplicate.
    let (removed, remaining) = {
        let mut engine = Eliminator::new(&mut records);
        (engine.remove_unique_by(by_size), engine.len())
    };
    writeln!(out, "Removed {removed} files with unique sizes.")?;
    writeln!(out, "Files remaining: {remaining}")?;
    writeln!(out)?;
    if records.is_empty() {
        return Ok(Vec::new());
    }

    // Stage 2: cheap content pre-filter on the first 4 KiB.
    for record in records.iter_mut() {
        record.populate_head_bytes();
    }
    let (removed, remaining) = {
        let mut engine = Eliminator::new(&mut records);
        engine.remove_failed();
        (engine.remove_unique_by(by_head_bytes), engine.len())
    };
    writeln!(out, "Removed {removed} files with unique first bytes.")?;
    writeln!(out, "Files remaining: {remaining}")?;
    writeln!(out)?;
    if records.is_empty() {
        return Ok(Vec::new());
    }

    // Stage 3: full content digest settles it.
    for record in records.iter_mut() {
        record.populate_digest();
    }
    let (removed, remaining) = {
        let mut engine = Eliminator::new(&mut records);
        engine.remove_failed();
        (engine.remove_unique_by(by_digest), engine.len())
    };
    writeln!(out, "Removed {removed} files with unique hashes.")?;
    writeln!(out, "Files remaining: {remaining}")?;
    writeln!(out)?;
    if records.is_empty() {
        return Ok(Vec::new());
    }

    Eliminator::new(&mut records).sort_by_size();
    let groups = group_by_size_runs(&records);
    write_groups(&groups, out)?;

    Ok(groups)
}

/// Walk the tree and build records for every acceptable file.
fn collect_candidates(root: &Path, follow_symlinks: bool, config: &Config) -> Vec<FileRecord> {
    let walker = Walker::new(root, follow_symlinks);
    let mut records = Vec::new();

    for item in walker.walk() {
        match item {
            Ok(path) => {
                if is_in_skipped_dir(&path, &config.extra_skip_dirs) {
                    continue;
                }
                let mut record = FileRecord::new(path);
                if record.populate_size() && record.size() >= config.min_file_size {
                    records.push(record);
                }
            }
            Err(e) => log::warn!("{e}"),
        }
    }

    records
}

/// Split the size-sorted survivor list into maximal equal-size runs.
fn group_by_size_runs(records: &[FileRecord]) -> Vec<DuplicateGroup> {
    let mut groups = Vec::new();
    let mut start = 0;
    while start < records.len() {
        let size = records[start].size();
        let mut end = start + 1;
        while end < records.len() && records[end].size() == size {
            end += 1;
        }
        if end - start >= 2 {
            groups.push(DuplicateGroup {
                size,
                paths: records[start..end]
                    .iter()
                    .map(|r| r.path().to_path_buf())
                    .collect(),
            });
        }
        start = end;
    }
    groups
}

fn write_groups(groups: &[DuplicateGroup], out: &mut impl Write) -> std::io::Result<()> {
    for group in groups {
        writeln!(
            out,
            "Found {} files of size {}",
            group.paths.len(),
            human_size(group.size)
        )?;
        for path in &group.paths {
            writeln!(out, "{}", path.display())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_group_by_size_runs() {
        let make = |path: &str, contents: &[u8], dir: &tempfile::TempDir| {
            let p = dir.path().join(path);
            std::fs::write(&p, contents).unwrap();
            let mut r = FileRecord::new(p);
            r.populate_size();
            r
        };
        let dir = tempfile::tempdir().unwrap();

        let records = vec![
            make("a", &[0; 100], &dir),
            make("b", &[1; 100], &dir),
            make("c", &[2; 200], &dir),
            make("d", &[3; 300], &dir),
            make("e", &[4; 300], &dir),
            make("f", &[5; 300], &dir),
        ];

        let groups = group_by_size_runs(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].size, 100);
        assert_eq!(groups[0].paths.len(), 2);
        assert_eq!(groups[1].size, 300);
        assert_eq!(groups[1].paths.len(), 3);
    }

    #[test]
    fn test_group_by_size_runs_empty() {
        assert!(group_by_size_runs(&[]).is_empty());
    }

    #[test]
    fn test_write_groups_format() {
        let groups = vec![DuplicateGroup {
            size: 2048,
            paths: vec![PathBuf::from("/r/a.bin"), PathBuf::from("/r/b.bin")],
        }];
        let mut buf = Vec::new();
        write_groups(&groups, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Found 2 files of size 2.00 KB\n/r/a.bin\n/r/b.bin\n\n"
        );
    }
}
