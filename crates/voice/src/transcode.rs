use std::{path::Path, sync::Arc};

use {
    serde::Serialize,
    tessera_media::{ContentStore, MediaResource},
    tracing::{debug, info},
};

use crate::{
    amr,
    classify::{AudioKind, classify},
    codec::AudioCodec,
    error::Result,
};

/// Codec of a voice file as sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceFormat {
    Amr,
    Silk,
}

impl VoiceFormat {
    /// Format code carried by voice elements.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Amr => 0,
            Self::Silk => 1,
        }
    }
}

/// A voice file ready to be attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedVoice {
    pub resource: MediaResource,
    pub duration_secs: u32,
    pub format: VoiceFormat,
}

/// Placeholder duration for SILK input, which carries its own length.
const SILK_PASSTHROUGH_SECS: u32 = 1;

pub struct VoiceTranscoder {
    store: Arc<ContentStore>,
    codec: Arc<dyn AudioCodec>,
}

impl VoiceTranscoder {
    pub fn new(store: Arc<ContentStore>, codec: Arc<dyn AudioCodec>) -> Self {
        Self { store, codec }
    }

    pub async fn prepare_voice(&self, resource: &MediaResource) -> Result<PreparedVoice> {
        let kind = classify(&resource.path).await?;
        debug!(md5 = %resource.md5, ?kind, "classified voice");

        let prepared = match kind {
            AudioKind::Silk => PreparedVoice {
                resource: resource.clone(),
                duration_secs: SILK_PASSTHROUGH_SECS,
                format: VoiceFormat::Silk,
            },
            AudioKind::Amr => PreparedVoice {
                resource: resource.clone(),
                duration_secs: amr::file_duration_secs(&resource.path).await?,
                format: VoiceFormat::Amr,
            },
            AudioKind::Pcm => {
                let (silk, millis) = self.encode_silk(&resource.path).await?;
                PreparedVoice {
                    resource: silk,
                    duration_secs: (millis as f64 * 0.001).round() as u32,
                    format: VoiceFormat::Silk,
                }
            },
            AudioKind::Other => {
                let pcm = self.store.scratch_path(Some("pcm"));
                let encoded = match self.codec.decode_to_pcm(&resource.path, &pcm).await {
                    Ok(secs) => self.encode_silk(&pcm).await.map(|(silk, _)| (silk, secs)),
                    Err(e) => Err(e),
                };
                let _ = tokio::fs::remove_file(&pcm).await;
                let (silk, secs) = encoded?;
                PreparedVoice {
                    resource: silk,
                    duration_secs: secs,
                    format: VoiceFormat::Silk,
                }
            },
        };

        info!(
            input = %resource.md5,
            output = %prepared.resource.md5,
            duration = prepared.duration_secs,
            format = ?prepared.format,
            "voice prepared"
        );
        Ok(prepared)
    }

    async fn encode_silk(&self, pcm: &Path) -> Result<(MediaResource, u64)> {
        let out = self.store.scratch_path(Some("silk"));
        match self.codec.pcm_to_silk(pcm, &out).await {
            Ok(millis) => Ok((self.store.ingest(&out).await?, millis)),
            Err(e) => {
                let _ = tokio::fs::remove_file(&out).await;
                Err(e)
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::error::Error,
        async_trait::async_trait,
        std::sync::atomic::{AtomicUsize, Ordering},
    };

    /// Codec that writes canned output and reports fixed lengths.
    struct FakeCodec {
        millis: u64,
        decoded_secs: u32,
        fail_decode: bool,
        encodes: AtomicUsize,
        decodes: AtomicUsize,
    }

    impl FakeCodec {
        fn new(millis: u64, decoded_secs: u32) -> Self {
            Self {
                millis,
                decoded_secs,
                fail_decode: false,
                encodes: AtomicUsize::new(0),
                decodes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AudioCodec for FakeCodec {
        async fn pcm_to_silk(&self, pcm: &Path, out: &Path) -> Result<u64> {
            self.encodes.fetch_add(1, Ordering::SeqCst);
            let mut data = b"#!SILK_V3".to_vec();
            data.extend(tokio::fs::read(pcm).await?);
            tokio::fs::write(out, data).await?;
            Ok(self.millis)
        }

        async fn decode_to_pcm(&self, input: &Path, out: &Path) -> Result<u32> {
            self.decodes.fetch_add(1, Ordering::SeqCst);
            if self.fail_decode {
                return Err(Error::message(format!("cannot decode {}", input.display())));
            }
            tokio::fs::write(out, [1u8, 0, 2, 0]).await?;
            Ok(self.decoded_secs)
        }
    }

    fn setup(codec: FakeCodec) -> (tempfile::TempDir, Arc<ContentStore>, Arc<FakeCodec>, VoiceTranscoder) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ContentStore::open(dir.path()).unwrap());
        let codec = Arc::new(codec);
        let transcoder = VoiceTranscoder::new(Arc::clone(&store), codec.clone());
        (dir, store, codec, transcoder)
    }

    #[tokio::test]
    async fn test_silk_passes_through() {
        let (_dir, store, codec, transcoder) = setup(FakeCodec::new(0, 0));
        let input = store.put_bytes(b"#!SILK_V3 frames").await.unwrap();

        let voice = transcoder.prepare_voice(&input).await.unwrap();
        assert_eq!(voice.resource, input);
        assert_eq!(voice.duration_secs, 1);
        assert_eq!(voice.format, VoiceFormat::Silk);
        assert_eq!(codec.encodes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_amr_passes_through_with_frame_duration() {
        let (_dir, store, codec, transcoder) = setup(FakeCodec::new(0, 0));
        let mut data = b"#!AMR\n".to_vec();
        for _ in 0..150 {
            data.push(0x3C);
            data.extend_from_slice(&[0u8; 31]);
        }
        let input = store.put_bytes(&data).await.unwrap();

        let voice = transcoder.prepare_voice(&input).await.unwrap();
        assert_eq!(voice.resource, input);
        assert_eq!(voice.duration_secs, 3);
        assert_eq!(voice.format, VoiceFormat::Amr);
        assert_eq!(voice.format.code(), 0);
        assert_eq!(codec.encodes.load(Ordering::SeqCst), 0);
    }

    #[rstest::rstest]
    #[case(2_499, 2)]
    #[case(2_500, 3)]
    #[case(400, 0)]
    #[case(61_000, 61)]
    #[tokio::test]
    async fn test_pcm_is_encoded_to_silk(#[case] millis: u64, #[case] expected_secs: u32) {
        let (_dir, store, codec, transcoder) = setup(FakeCodec::new(millis, 0));
        let input = store.put_bytes(&[0x10, 0x00, 0x20, 0x00]).await.unwrap();

        let voice = transcoder.prepare_voice(&input).await.unwrap();
        assert_eq!(voice.format, VoiceFormat::Silk);
        assert_eq!(voice.duration_secs, expected_secs);
        assert_ne!(voice.resource.md5, input.md5);
        assert!(std::fs::read(&voice.resource.path).unwrap().starts_with(b"#!SILK_V3"));
        assert_eq!(codec.encodes.load(Ordering::SeqCst), 1);
        assert_eq!(codec.decodes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_other_is_decoded_then_encoded() {
        let (_dir, store, codec, transcoder) = setup(FakeCodec::new(99_999, 7));
        let input = store.put_bytes(b"RIFF\0\0\0\0WAVEfmt ").await.unwrap();

        let voice = transcoder.prepare_voice(&input).await.unwrap();
        assert_eq!(voice.format, VoiceFormat::Silk);
        assert_eq!(voice.duration_secs, 7);
        assert_eq!(codec.decodes.load(Ordering::SeqCst), 1);
        assert_eq!(codec.encodes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_decode_failure_surfaces() {
        let mut codec = FakeCodec::new(0, 0);
        codec.fail_decode = true;
        let (_dir, store, codec, transcoder) = setup(codec);
        let input = store.put_bytes(b"OggS\0\x02garbage").await.unwrap();

        let err = transcoder.prepare_voice(&input).await.unwrap_err();
        assert!(err.to_string().contains("cannot decode"));
        assert_eq!(codec.encodes.load(Ordering::SeqCst), 0);
        assert_eq!(
            std::fs::read_dir(store.root().join(".tmp")).unwrap().count(),
            0
        );
    }
}
