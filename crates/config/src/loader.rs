use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::TesseraConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "tessera.toml",
    "tessera.yaml",
    "tessera.yml",
    "tessera.json",
];

const CACHE_DIR_ENV: &str = "TESSERA_CACHE_DIR";
const STAGING_DIR_ENV: &str = "TESSERA_STAGING_DIR";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<TesseraConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./tessera.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/tessera/tessera.{toml,yaml,yml,json}` (user-global)
///
/// Returns `TesseraConfig::default()` if no config file is found.
pub fn discover_and_load() -> TesseraConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    TesseraConfig::default()
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let config_dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| config_dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/tessera/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "tessera").map(|d| d.config_dir().to_path_buf())
}

/// Returns the data directory holding the media cache and staging area.
///
/// Falls back to `./.tessera` when no home directory can be determined.
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "tessera")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".tessera"))
}

/// Apply `TESSERA_*` environment overrides on top of a loaded config.
pub fn apply_env_overrides(config: TesseraConfig) -> TesseraConfig {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    mut config: TesseraConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> TesseraConfig {
    if let Some(dir) = lookup(CACHE_DIR_ENV).filter(|v| !v.is_empty()) {
        config.cache.dir = Some(PathBuf::from(dir));
    }
    if let Some(dir) = lookup(STAGING_DIR_ENV).filter(|v| !v.is_empty()) {
        config.staging.dir = Some(PathBuf::from(dir));
    }
    config
}

/// Render the effective config as TOML.
pub fn to_toml_string(config: &TesseraConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

fn parse_config(raw: &str, path: &Path) -> Result<TesseraConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => toml::from_str(raw).context("invalid TOML config"),
        "yaml" | "yml" => serde_yaml::from_str(raw).context("invalid YAML config"),
        "json" => serde_json::from_str(raw).context("invalid JSON config"),
        _ => Err(Error::UnsupportedFormat {
            ext: ext.to_string(),
        }),
    }
}
