//! Streaming BLAKE3 content digests.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Chunk size for streaming reads.
const CHUNK_LEN: usize = 16 * 1024;

/// Compute the BLAKE3 digest of a file, returned as 64 lowercase hex
/// characters.
///
/// The file is streamed in [`CHUNK_LEN`] chunks so arbitrarily large files
/// hash in constant memory. The handle is dropped before returning.
pub fn compute(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; CHUNK_LEN];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}
