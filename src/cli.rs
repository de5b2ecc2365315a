//! Command-line interface definitions using the clap derive API.
//!
//! The surface is deliberately small and positional:
//!
//! ```bash
//! dupescan dedup <directory> [follow_symlinks]
//! dupescan img   <directory> [follow_symlinks]
//! dupescan vid   <directory> [follow_symlinks]
//! ```
//!
//! `follow_symlinks` is the literal token `true` or `false` (default
//! `false`); any other token is a usage error. Verbosity flags are global
//! and only affect stderr diagnostics.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Duplicate and near-duplicate file finder.
///
/// Finds byte-identical files via a size / head-bytes / BLAKE3 cascade,
/// and visually similar images and videos via DCT perceptual hashes
/// indexed in a BK-tree. Read-only: nothing is ever modified or deleted.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Scan modes.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find byte-identical files (size, head bytes, BLAKE3 digest)
    Dedup(ScanArgs),
    /// Find perceptually similar images
    Img(ScanArgs),
    /// Find similar videos (same duration, similar sampled frames)
    Vid(ScanArgs),
}

/// Arguments shared by all three modes.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan (a plain file reports and exits 0)
    pub directory: PathBuf,

    /// Follow symbolic links: literal `true` or `false`
    #[arg(value_parser = parse_follow_symlinks, default_value = "false", action = clap::ArgAction::Set)]
    pub follow_symlinks: bool,
}

/// Strict parser for the `follow_symlinks` token.
///
/// Only the exact literals are accepted; `1`, `yes` and friends are usage
/// errors by contract.
pub fn parse_follow_symlinks(token: &str) -> Result<bool, String> {
    match token {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(format!("expected literal 'true' or 'false', got '{other}'")),
    }
}
