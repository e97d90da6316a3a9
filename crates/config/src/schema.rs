/// Config schema types (cache, staging, fetch, media tools).
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseraConfig {
    pub cache: CacheConfig,
    pub staging: StagingConfig,
    pub fetch: FetchConfig,
    pub media: MediaConfig,
}

impl TesseraConfig {
    /// Root of the content-addressed media store.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache
            .dir
            .clone()
            .unwrap_or_else(|| crate::loader::data_dir().join("cache"))
    }

    /// Root of the local send-staging area.
    #[must_use]
    pub fn staging_dir(&self) -> PathBuf {
        self.staging
            .dir
            .clone()
            .unwrap_or_else(|| crate::loader::data_dir().join("staging"))
    }
}

/// Content-addressed cache settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Store directory. Defaults to `<data_dir>/cache`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Send-staging settings used when no host client provides staging paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Remote media download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

/// External media tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to `ffmpeg` (searched in PATH if unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg_path: Option<String>,

    /// Path to `ffprobe` (searched in PATH if unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffprobe_path: Option<String>,

    /// Path to the SILK v3 encoder (searched in PATH if unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silk_encoder_path: Option<String>,

    /// Sample rate of intermediate PCM, in Hz.
    pub pcm_sample_rate: u32,

    /// Target SILK bit rate, in bits per second.
    pub silk_bit_rate: u32,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            silk_encoder_path: None,
            pcm_sample_rate: 24_000,
            silk_bit_rate: 24_000,
        }
    }
}
