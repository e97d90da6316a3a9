//! Video helpers backed by ffmpeg/ffprobe.

use std::{ffi::OsStr, path::Path};

use {async_trait::async_trait, tracing::debug};

use crate::{
    error::{Error, Result},
    tools::{require_binary, run_tool},
};

#[async_trait]
pub trait VideoTools: Send + Sync {
    /// Write the first frame of `video` to `dst` as a JPEG.
    async fn extract_cover(&self, video: &Path, dst: &Path) -> Result<()>;

    /// Container duration in whole seconds.
    async fn duration_secs(&self, video: &Path) -> Result<u32>;
}

#[derive(Debug, Clone, Default)]
pub struct FfmpegVideoTools {
    ffmpeg_path: Option<String>,
    ffprobe_path: Option<String>,
}

impl FfmpegVideoTools {
    pub fn new(ffmpeg_path: Option<String>, ffprobe_path: Option<String>) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
        }
    }
}

/// Parse `ffprobe -show_entries format=duration` output (`"12.48\n"`).
pub fn parse_ffprobe_duration(output: &str) -> Result<u32> {
    let trimmed = output.trim();
    let secs: f64 = trimmed
        .parse()
        .map_err(|_| Error::tool("ffprobe", format!("unexpected duration output: {trimmed:?}")))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(Error::tool("ffprobe", format!("invalid duration: {secs}")));
    }
    Ok(secs.round() as u32)
}

#[async_trait]
impl VideoTools for FfmpegVideoTools {
    async fn extract_cover(&self, video: &Path, dst: &Path) -> Result<()> {
        let ffmpeg = require_binary("ffmpeg", self.ffmpeg_path.as_deref())?;
        if let Some(parent) = dst.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let args = [
            OsStr::new("-y"),
            OsStr::new("-loglevel"),
            OsStr::new("error"),
            OsStr::new("-i"),
            video.as_os_str(),
            OsStr::new("-frames:v"),
            OsStr::new("1"),
            OsStr::new("-f"),
            OsStr::new("image2"),
            OsStr::new("-q:v"),
            OsStr::new("2"),
            dst.as_os_str(),
        ];
        run_tool("ffmpeg", &ffmpeg, &args).await?;
        debug!(video = %video.display(), cover = %dst.display(), "extracted video cover");
        Ok(())
    }

    async fn duration_secs(&self, video: &Path) -> Result<u32> {
        let ffprobe = require_binary("ffprobe", self.ffprobe_path.as_deref())?;
        let stdout = run_tool("ffprobe", &ffprobe, &[
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-show_entries"),
            OsStr::new("format=duration"),
            OsStr::new("-of"),
            OsStr::new("default=noprint_wrappers=1:nokey=1"),
            video.as_os_str(),
        ])
        .await?;
        parse_ffprobe_duration(&String::from_utf8_lossy(&stdout))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ffprobe_duration() {
        assert_eq!(parse_ffprobe_duration("12.48\n").unwrap(), 12);
        assert_eq!(parse_ffprobe_duration("12.5").unwrap(), 13);
        assert_eq!(parse_ffprobe_duration("0.000000").unwrap(), 0);
        assert!(parse_ffprobe_duration("N/A").is_err());
        assert!(parse_ffprobe_duration("-3").is_err());
    }
}
