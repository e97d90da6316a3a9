use std::path::PathBuf;

use {thiserror::Error, tessera_common::FromMessage};

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported config format: .{ext}")]
    UnsupportedFormat { ext: String },

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Invalid(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

tessera_common::impl_context!();
