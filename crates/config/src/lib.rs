//! Configuration loading and env substitution.
//!
//! Config files: `tessera.toml`, `tessera.yaml`, or `tessera.json`
//! Searched in `./` then `~/.config/tessera/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-fallback}` substitution in all
//! string values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{
        apply_env_overrides, config_dir, data_dir, discover_and_load, load_config, to_toml_string,
    },
    schema::{CacheConfig, FetchConfig, MediaConfig, StagingConfig, TesseraConfig},
};
