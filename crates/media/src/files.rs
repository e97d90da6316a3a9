//! File system helpers: hashing, length, size-checked copies.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::{Context, Error, Result};

const HASH_CHUNK: usize = 64 * 1024;

/// Lowercase hex MD5 of an in-memory buffer.
#[must_use]
pub fn md5_hex(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

fn file_md5_blocking(path: &Path) -> Result<String> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut ctx = md5::Context::new();
    let mut buf = vec![0u8; HASH_CHUNK];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        ctx.consume(&buf[..n]);
    }
    Ok(format!("{:x}", ctx.compute()))
}

/// Lowercase hex MD5 of a file, computed on the blocking pool.
pub async fn file_md5(path: &Path) -> Result<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || file_md5_blocking(&path))
        .await
        .context("hash task failed")?
}

/// Byte length of a file, `None` if it does not exist.
pub async fn file_len(path: &Path) -> Option<u64> {
    tokio::fs::metadata(path)
        .await
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.len())
}

/// Copy `src` to `dst` unless `dst` already exists with the same length.
///
/// Returns `true` when a copy was made.
pub async fn copy_if_stale(src: &Path, dst: &Path) -> Result<bool> {
    let src_len = file_len(src)
        .await
        .ok_or_else(|| Error::file_not_found(src.display().to_string()))?;
    if file_len(dst).await == Some(src_len) {
        return Ok(false);
    }
    if let Some(parent) = dst.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(src, dst)
        .await
        .with_context(|| format!("copy {} -> {}", src.display(), dst.display()))?;
    debug!(src = %src.display(), dst = %dst.display(), bytes = src_len, "copied to staging");
    Ok(true)
}

/// Resolve a path against the current directory.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("absolute path of {}", path.display()))
}
