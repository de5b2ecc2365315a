//! dupescan - duplicate and near-duplicate file finder.
//!
//! Three read-only scan modes over a directory tree:
//!
//! - **dedup**: byte-identical files, found by a cascading elimination
//!   pipeline (size, then head bytes, then BLAKE3 digest) that prunes every
//!   file with a unique key before paying for the next, stronger signature.
//! - **img**: visually similar images, via a 63-bit DCT perceptual hash
//!   indexed in a BK-tree and grouped by bounded-radius Hamming queries.
//! - **vid**: re-encodings of the same footage, via per-duration buckets of
//!   sampled frame hashes under the mean per-frame Hamming distance.

pub mod bktree;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod media;
pub mod phash;
pub mod pipeline;
pub mod report;
pub mod scanner;
