//! Audio conversion backends.

use std::{ffi::OsStr, path::Path};

use {
    async_trait::async_trait,
    tessera_media::tools::{require_binary, run_tool},
    tracing::debug,
};

use crate::error::{Context, Result};

pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;
pub const DEFAULT_BIT_RATE: u32 = 24_000;

const SILK_ENCODER: &str = "silk_v3_encoder";

/// Conversions the voice pipeline needs. Intermediate PCM is always s16le
/// mono at the codec's sample rate.
#[async_trait]
pub trait AudioCodec: Send + Sync {
    /// Encode PCM at `pcm` into SILK at `out`. Returns the audio length in
    /// milliseconds.
    async fn pcm_to_silk(&self, pcm: &Path, out: &Path) -> Result<u64>;

    /// Decode any supported container into PCM at `out`. Returns the audio
    /// length in whole seconds.
    async fn decode_to_pcm(&self, input: &Path, out: &Path) -> Result<u32>;
}

/// [`AudioCodec`] backed by `ffmpeg` and a SILK v3 encoder binary.
#[derive(Debug, Clone)]
pub struct CliAudioCodec {
    ffmpeg_path: Option<String>,
    silk_encoder_path: Option<String>,
    sample_rate: u32,
    bit_rate: u32,
}

impl Default for CliAudioCodec {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            silk_encoder_path: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            bit_rate: DEFAULT_BIT_RATE,
        }
    }
}

impl CliAudioCodec {
    pub fn new(
        ffmpeg_path: Option<String>,
        silk_encoder_path: Option<String>,
        sample_rate: u32,
        bit_rate: u32,
    ) -> Self {
        Self {
            ffmpeg_path,
            silk_encoder_path,
            sample_rate: sample_rate.max(1),
            bit_rate,
        }
    }

    /// Length of `bytes` of s16le mono PCM in milliseconds.
    #[must_use]
    pub fn pcm_millis(&self, bytes: u64) -> u64 {
        bytes * 1000 / (2 * u64::from(self.sample_rate))
    }
}

async fn len_of(path: &Path) -> Result<u64> {
    let meta = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("stat {}", path.display()))?;
    Ok(meta.len())
}

#[async_trait]
impl AudioCodec for CliAudioCodec {
    async fn pcm_to_silk(&self, pcm: &Path, out: &Path) -> Result<u64> {
        let encoder = require_binary(SILK_ENCODER, self.silk_encoder_path.as_deref())?;
        let rate = self.sample_rate.to_string();
        let bit_rate = self.bit_rate.to_string();
        run_tool(SILK_ENCODER, &encoder, &[
            pcm.as_os_str(),
            out.as_os_str(),
            OsStr::new("-Fs_API"),
            OsStr::new(&rate),
            OsStr::new("-rate"),
            OsStr::new(&bit_rate),
            OsStr::new("-tencent"),
            OsStr::new("-quiet"),
        ])
        .await?;

        let millis = self.pcm_millis(len_of(pcm).await?);
        debug!(pcm = %pcm.display(), millis, "encoded silk");
        Ok(millis)
    }

    async fn decode_to_pcm(&self, input: &Path, out: &Path) -> Result<u32> {
        let ffmpeg = require_binary("ffmpeg", self.ffmpeg_path.as_deref())?;
        let rate = self.sample_rate.to_string();
        run_tool("ffmpeg", &ffmpeg, &[
            OsStr::new("-y"),
            OsStr::new("-loglevel"),
            OsStr::new("error"),
            OsStr::new("-i"),
            input.as_os_str(),
            OsStr::new("-f"),
            OsStr::new("s16le"),
            OsStr::new("-ac"),
            OsStr::new("1"),
            OsStr::new("-ar"),
            OsStr::new(&rate),
            out.as_os_str(),
        ])
        .await?;

        let millis = self.pcm_millis(len_of(out).await?);
        let secs = u32::try_from((millis + 500) / 1000).unwrap_or(u32::MAX).max(1);
        debug!(input = %input.display(), secs, "decoded to pcm");
        Ok(secs)
    }
}
