use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub const HEAD_READ_BYTES: usize = 256 * 1024;
pub const TITLE_SCAN_BYTES: usize = 1024 * 1024;
pub const INDEX_CHECK_BYTES: usize = 16 * 1024;

/// Reads at most `max_bytes` from the start of the file.
pub fn read_head(path: &Path, max_bytes: usize) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut buf = Vec::new();
    file.take(max_bytes as u64).read_to_end(&mut buf)?;
    Ok(buf)
}
