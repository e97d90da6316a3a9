use std::error::Error as StdError;

use {tessera_common::ChatType, tessera_service_traits::ServiceError};

/// Why a segment could not be compiled.
///
/// Request errors (`MissingField`, `InvalidParameter`, `UnknownSegmentType`,
/// `UnsupportedDestination`, `FileNotFound`) mean the caller sent something
/// malformed. `Lookup` and `Transcode` come from collaborators and are
/// [degradable](Error::is_degradable).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing required field: {name}")]
    MissingField { name: String },

    #[error("invalid parameter: {name}")]
    InvalidParameter { name: String },

    #[error("file not found: {reference}")]
    FileNotFound { reference: String },

    #[error("unsupported destination: {chat_type}")]
    UnsupportedDestination { chat_type: ChatType },

    #[error("unknown segment type: {tag}")]
    UnknownSegmentType { tag: String },

    #[error("{context}: {source}")]
    Lookup {
        context: String,
        #[source]
        source: ServiceError,
    },

    #[error("{context}: {source}")]
    Transcode {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error(transparent)]
    Media(tessera_media::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn missing_field(name: impl Into<String>) -> Self {
        Self::MissingField { name: name.into() }
    }

    #[must_use]
    pub fn invalid_parameter(name: impl Into<String>) -> Self {
        Self::InvalidParameter { name: name.into() }
    }

    #[must_use]
    pub fn lookup(context: impl Into<String>, source: impl Into<ServiceError>) -> Self {
        Self::Lookup {
            context: context.into(),
            source: source.into(),
        }
    }

    #[must_use]
    pub fn transcode(
        context: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Transcode {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Collaborator failures that skip the segment instead of failing the
    /// whole message.
    #[must_use]
    pub fn is_degradable(&self) -> bool {
        matches!(self, Self::Lookup { .. } | Self::Transcode { .. })
    }
}

impl From<tessera_media::Error> for Error {
    fn from(err: tessera_media::Error) -> Self {
        match err {
            tessera_media::Error::FileNotFound { reference } => Self::FileNotFound { reference },
            other => Self::Media(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_collaborator_failures_degrade() {
        assert!(Error::lookup("member", "offline").is_degradable());
        assert!(
            Error::transcode("voice", tessera_voice::Error::message("bad wav")).is_degradable()
        );
        assert!(!Error::missing_field("file").is_degradable());
        assert!(!Error::invalid_parameter("strength").is_degradable());
        assert!(
            !Error::UnsupportedDestination {
                chat_type: ChatType::Other(9)
            }
            .is_degradable()
        );
    }

    #[test]
    fn media_not_found_maps_to_file_not_found() {
        let err: Error = tessera_media::Error::file_not_found("cat.png").into();
        assert!(matches!(err, Error::FileNotFound { ref reference } if reference == "cat.png"));
        assert_eq!(err.to_string(), "file not found: cat.png");

        let err: Error = tessera_media::Error::invalid_input("bad base64").into();
        assert!(matches!(err, Error::Media(_)));
    }

    #[test]
    fn messages_name_the_field() {
        assert_eq!(
            Error::missing_field("qq").to_string(),
            "missing required field: qq"
        );
        assert_eq!(
            Error::UnknownSegmentType { tag: "nope".into() }.to_string(),
            "unknown segment type: nope"
        );
    }
}
