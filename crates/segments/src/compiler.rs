//! Entry points: compile one segment or a whole message.

use std::{sync::Arc, time::Duration};

use {
    serde::{Deserialize, Serialize},
    tessera_common::ChatType,
    tessera_config::TesseraConfig,
    tessera_media::{
        CachedResolver, ContentStore, FetchOptions, FfmpegVideoTools, ResourceResolver,
        SourceFetcher, VideoTools,
    },
    tessera_service_traits::{
        ContactService, GroupService, LbsService, LocalStaging, MusicService, NoopContactService,
        NoopGroupService, NoopLbsService, NoopMusicService, NoopTransferService,
        NoopTransportService, NoopWeatherService, RichMediaService, TransferService,
        TransportService, WeatherService,
    },
    tessera_voice::{CliAudioCodec, VoiceTranscoder},
    tracing::{debug, info, warn},
};

use crate::{
    builders::{self, BuildContext, BuildOutcome, SegmentRequest},
    element::MsgElement,
    error::{Error, Result},
    params::Params,
    registry::SegmentKind,
    transfer::TransferOrchestrator,
};

/// A OneBot-style segment: `{"type": "image", "data": {"file": "..."}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Params,
}

impl Segment {
    pub fn new(kind: impl Into<String>, data: Params) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }
}

/// Collaborators the builders call.
#[derive(Clone)]
pub struct Services {
    pub resolver: Arc<dyn ResourceResolver>,
    pub voice: Arc<VoiceTranscoder>,
    pub video: Arc<dyn VideoTools>,
    pub rich_media: Arc<dyn RichMediaService>,
    pub transfer: Arc<dyn TransferService>,
    pub transport: Arc<dyn TransportService>,
    pub groups: Arc<dyn GroupService>,
    pub contacts: Arc<dyn ContactService>,
    pub lbs: Arc<dyn LbsService>,
    pub music: Arc<dyn MusicService>,
    pub weather: Arc<dyn WeatherService>,
}

impl Services {
    /// Local media pipeline from config, with host lookups and sends left
    /// unconfigured.
    pub fn from_config(config: &TesseraConfig) -> Result<Self> {
        let store = Arc::new(ContentStore::open(config.cache_dir())?);
        let fetch = FetchOptions {
            timeout: Duration::from_secs(config.fetch.timeout_secs),
            user_agent: config.fetch.user_agent.clone(),
        };
        let fetcher = SourceFetcher::new(Arc::clone(&store), &fetch)?;
        let media = &config.media;
        let codec = CliAudioCodec::new(
            media.ffmpeg_path.clone(),
            media.silk_encoder_path.clone(),
            media.pcm_sample_rate,
            media.silk_bit_rate,
        );
        info!(
            cache_dir = %store.root().display(),
            staging_dir = %config.staging_dir().display(),
            "media pipeline ready"
        );

        Ok(Self {
            resolver: Arc::new(CachedResolver::new(Arc::clone(&store), Arc::new(fetcher))),
            voice: Arc::new(VoiceTranscoder::new(store, Arc::new(codec))),
            video: Arc::new(FfmpegVideoTools::new(
                media.ffmpeg_path.clone(),
                media.ffprobe_path.clone(),
            )),
            rich_media: Arc::new(LocalStaging::new(config.staging_dir())),
            transfer: Arc::new(NoopTransferService),
            transport: Arc::new(NoopTransportService),
            groups: Arc::new(NoopGroupService),
            contacts: Arc::new(NoopContactService),
            lbs: Arc::new(NoopLbsService),
            music: Arc::new(NoopMusicService),
            weather: Arc::new(NoopWeatherService),
        })
    }
}

/// Turns segments into message elements.
pub struct SegmentCompiler {
    ctx: BuildContext,
}

impl SegmentCompiler {
    pub fn new(services: Services) -> Self {
        let transfer = TransferOrchestrator::new(Arc::clone(&services.transfer));
        Self {
            ctx: BuildContext { services, transfer },
        }
    }

    pub fn from_config(config: &TesseraConfig) -> Result<Self> {
        Ok(Self::new(Services::from_config(config)?))
    }

    pub fn services(&self) -> &Services {
        &self.ctx.services
    }

    /// Compile a single segment. Unknown tags fail before anything else runs.
    pub async fn compile(
        &self,
        tag: &str,
        chat_type: ChatType,
        msg_id: i64,
        peer_id: &str,
        params: Params,
    ) -> Result<BuildOutcome> {
        let kind = SegmentKind::from_tag(tag).ok_or_else(|| Error::UnknownSegmentType {
            tag: tag.to_string(),
        })?;
        let request = SegmentRequest {
            kind,
            chat_type,
            msg_id,
            peer_id: peer_id.to_string(),
            params,
        };

        let outcome = builders::build(&self.ctx, &request).await;
        match &outcome {
            Ok(BuildOutcome::Element(el)) => {
                debug!(tag, %chat_type, peer_id, element = el.kind(), "segment compiled")
            },
            Ok(BuildOutcome::ActionPerformed) => {
                debug!(tag, %chat_type, peer_id, "segment performed as action")
            },
            Err(e) => debug!(tag, %chat_type, peer_id, error = %e, "segment failed"),
        }
        outcome
    }

    /// Compile a message in order. Actions contribute no element, and
    /// segments whose collaborators failed are skipped; any other error
    /// aborts the message.
    pub async fn compile_all(
        &self,
        chat_type: ChatType,
        msg_id: i64,
        peer_id: &str,
        segments: &[Segment],
    ) -> Result<Vec<MsgElement>> {
        let mut elements = Vec::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            match self
                .compile(
                    &segment.kind,
                    chat_type,
                    msg_id,
                    peer_id,
                    segment.data.clone(),
                )
                .await
            {
                Ok(outcome) => elements.extend(outcome.into_element()),
                Err(e) if e.is_degradable() => {
                    warn!(index, tag = %segment.kind, error = %e, "segment skipped");
                },
                Err(e) => return Err(e),
            }
        }
        info!(
            segments = segments.len(),
            elements = elements.len(),
            peer_id,
            "message compiled"
        );
        Ok(elements)
    }
}
