//! Shared helpers for the command-line media tools (ffmpeg, ffprobe, SILK encoder).

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::Stdio,
};

use {tokio::process::Command, tracing::debug};

use crate::error::{Error, Result};

/// Find a binary in PATH or at a specific path.
///
/// If `config_path` is Some, it's checked first. If None or not found,
/// searches the system PATH.
pub fn find_binary(name: &str, config_path: Option<&str>) -> Option<PathBuf> {
    if let Some(path_str) = config_path {
        let path = expand_tilde(path_str);
        if path.is_file() {
            return Some(path);
        }
    }

    which::which(name).ok()
}

/// Expand `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(dirs) = directories::BaseDirs::new()
    {
        return dirs.home_dir().join(stripped);
    }
    PathBuf::from(path)
}

/// Locate a tool or fail with a [`Error::Tool`] naming it.
pub fn require_binary(tool: &'static str, config_path: Option<&str>) -> Result<PathBuf> {
    find_binary(tool, config_path).ok_or_else(|| Error::tool(tool, "binary not found"))
}

/// Run a tool to completion and return its stdout.
///
/// A non-zero exit status becomes a [`Error::Tool`] carrying stderr.
pub async fn run_tool(tool: &'static str, binary: &Path, args: &[&OsStr]) -> Result<Vec<u8>> {
    debug!(tool, binary = %binary.display(), "running media tool");

    let output = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| Error::tool(tool, format!("failed to execute: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool(tool, stderr.trim().to_string()));
    }

    Ok(output.stdout)
}
