//! Group-and-prune elimination over the candidate list.
//!
//! Each pass sorts the list under a comparator, flags every record whose
//! key is unique (a run of length one), and physically drops the flagged
//! records. Passes only ever delete, and a stronger key (content digest)
//! implies equality under every weaker key (head bytes, size), so pruning
//! uniques under a weak key can never discard a true duplicate.

use std::cmp::Ordering;

use crate::scanner::FileRecord;

/// Compare candidates by file size.
pub fn by_size(a: &FileRecord, b: &FileRecord) -> Ordering {
    a.size().cmp(&b.size())
}

/// Compare candidates lexicographically by their head-bytes buffer.
///
/// Records without a populated buffer order first; the pipelines drop
/// failed records before this comparator runs.
pub fn by_head_bytes(a: &FileRecord, b: &FileRecord) -> Ordering {
    a.head_bytes().cmp(&b.head_bytes())
}

/// Compare candidates lexicographically by their hex content digest.
pub fn by_digest(a: &FileRecord, b: &FileRecord) -> Ordering {
    a.content_digest().cmp(&b.content_digest())
}

/// Compare candidates by video duration in whole seconds.
pub fn by_duration(a: &FileRecord, b: &FileRecord) -> Ordering {
    a.duration_seconds().cmp(&b.duration_seconds())
}

/// Elimination engine holding a mutable borrow of the candidate list.
///
/// The list is owned by the pipeline orchestrator; the engine only narrows
/// it. Relative order of surviving records is preserved across
/// [`cleanup`](Eliminator::cleanup), and sort order within a pass is a
/// transient detail nothing outside the pass may rely on.
pub struct Eliminator<'a> {
    records: &'a mut Vec<FileRecord>,
}

impl<'a> Eliminator<'a> {
    /// Borrow the candidate list.
    pub fn new(records: &'a mut Vec<FileRecord>) -> Self {
        Self { records }
    }

    /// Number of surviving candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no candidates remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sort by `cmp`, flag every record that is alone under its key, and
    /// clean up. Returns the number of records removed.
    ///
    /// Calling this twice with the same comparator removes nothing on the
    /// second call: every survivor shares its key with at least one other.
    pub fn remove_unique_by<F>(&mut self, cmp: F) -> usize
    where
        F: Fn(&FileRecord, &FileRecord) -> Ordering,
    {
        self.records.sort_by(|a, b| cmp(a, b));

        let len = self.records.len();
        let mut start = 0;
        while start < len {
            let mut end = start + 1;
            while end < len && cmp(&self.records[start], &self.records[end]) == Ordering::Equal {
                end += 1;
            }
            if end - start == 1 {
                self.records[start].mark_removed();
            }
            start = end;
        }

        self.cleanup()
    }

    /// Flag every record with a failed signature, then clean up.
    /// Returns the number of records removed.
    pub fn remove_failed(&mut self) -> usize {
        for record in self.records.iter_mut() {
            if record.any_signature_failed() {
                record.mark_removed();
            }
        }
        self.cleanup()
    }

    /// Drop all flagged records, preserving the relative order of the
    /// rest. Returns `old_len - new_len`.
    pub fn cleanup(&mut self) -> usize {
        let old_len = self.records.len();
        self.records.retain(|record| !record.is_removed());
        old_len - self.records.len()
    }

    /// Sort the surviving list by size, for the final grouping stage.
    pub fn sort_by_size(&mut self) {
        self.records.sort_by(by_size);
    }
}
