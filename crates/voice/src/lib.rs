//! Voice preparation: classify an audio file and bring it into a codec the
//! host client accepts (SILK, or AMR passed through), reporting its duration.

pub mod amr;
pub mod classify;
pub mod codec;
pub mod error;
pub mod transcode;

pub use {
    classify::{AudioKind, classify},
    codec::{AudioCodec, CliAudioCodec},
    error::{Error, Result},
    transcode::{PreparedVoice, VoiceFormat, VoiceTranscoder},
};
