use std::path::Path;

use {
    serde::Serialize,
    tessera_media::mime::{self, MediaFormat},
};

use crate::error::Result;

/// How a voice file has to be treated before it can be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioKind {
    /// Already SILK; sent as is.
    Silk,
    /// AMR; sent as is.
    Amr,
    /// Headerless samples, assumed s16le mono.
    Pcm,
    /// A recognised container that has to be decoded first.
    Other,
}

/// Classify from the leading bytes of a file.
#[must_use]
pub fn classify_header(header: &[u8]) -> AudioKind {
    match mime::sniff(header) {
        Some(MediaFormat::Silk) => AudioKind::Silk,
        Some(MediaFormat::Amr) => AudioKind::Amr,
        Some(_) => AudioKind::Other,
        None => AudioKind::Pcm,
    }
}

pub async fn classify(path: &Path) -> Result<AudioKind> {
    let header = mime::read_header(path).await?;
    Ok(classify_header(&header))
}
