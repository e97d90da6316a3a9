//! Interfaces of the host-client collaborators the segment engine talks to.
//!
//! Each trait has a `Noop` implementation that fails with a "not configured"
//! error, allowing the engine to run standalone before a host client is wired
//! in. [`LocalStaging`] provides directory-backed send-staging paths.

use std::path::{Path, PathBuf};

use {
    async_trait::async_trait,
    bytes::Bytes,
    serde::{Deserialize, Serialize},
    serde_json::Value,
    tessera_common::{ChatType, Destination},
    tracing::{debug, warn},
};

/// Error type returned by service methods.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{message}")]
    Message { message: String },
    #[error("{0}")]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    #[must_use]
    pub fn message(message: impl std::fmt::Display) -> Self {
        Self::Message {
            message: message.to_string(),
        }
    }
}

impl From<String> for ServiceError {
    fn from(value: String) -> Self {
        Self::message(value)
    }
}

impl From<&str> for ServiceError {
    fn from(value: &str) -> Self {
        Self::message(value)
    }
}

pub type ServiceResult<T = Value> = Result<T, ServiceError>;

fn not_configured(service: &'static str, operation: &'static str) -> ServiceError {
    warn!(service, operation, "service not configured");
    format!("{service} service not configured").into()
}

// ── Transport ───────────────────────────────────────────────────────────────

/// A request handed to the host client's service channel. The engine builds
/// the body and routing fields; delivery and retries belong to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ServicePacket {
    /// Service command name, e.g. `OidbSvc.0xdc2_34`.
    pub command: String,
    pub oidb_command: u32,
    pub service_type: u32,
    pub body: Bytes,
}

#[async_trait]
pub trait TransportService: Send + Sync {
    async fn send_to_service(&self, packet: ServicePacket) -> ServiceResult<()>;
}

pub struct NoopTransportService;

#[async_trait]
impl TransportService for NoopTransportService {
    async fn send_to_service(&self, _packet: ServicePacket) -> ServiceResult<()> {
        Err(not_configured("transport", "send_to_service"))
    }
}

// ── Groups ──────────────────────────────────────────────────────────────────

/// Group member profile as far as mentions need it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub uin: String,
    /// Card name inside the group.
    pub group_nick: Option<String>,
    /// Global nickname.
    pub friend_nick: Option<String>,
}

impl MemberInfo {
    /// Group card, then nickname, then the raw uin.
    #[must_use]
    pub fn display_name(&self) -> &str {
        [self.group_nick.as_deref(), self.friend_nick.as_deref()]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .unwrap_or(self.uin.as_str())
    }
}

#[async_trait]
pub trait GroupService: Send + Sync {
    async fn member_info(&self, group_id: &str, uin: &str) -> ServiceResult<MemberInfo>;
    /// Ark JSON of a group business card.
    async fn share_group_card(&self, group_id: u64) -> ServiceResult<String>;
    /// Poke `target` inside the conversation `peer_id`.
    async fn poke(&self, peer_id: &str, target: &str) -> ServiceResult<()>;
}

pub struct NoopGroupService;

#[async_trait]
impl GroupService for NoopGroupService {
    async fn member_info(&self, _group_id: &str, _uin: &str) -> ServiceResult<MemberInfo> {
        Err(not_configured("group", "member_info"))
    }

    async fn share_group_card(&self, _group_id: u64) -> ServiceResult<String> {
        Err(not_configured("group", "share_group_card"))
    }

    async fn poke(&self, _peer_id: &str, _target: &str) -> ServiceResult<()> {
        Err(not_configured("group", "poke"))
    }
}

// ── Contacts ────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ContactService: Send + Sync {
    /// Resolve a numeric account to the client's internal uid.
    async fn uid_by_uin(&self, uin: u64) -> ServiceResult<String>;
    /// Ark JSON of a personal business card.
    async fn share_private_card(&self, uin: u64) -> ServiceResult<String>;
}

pub struct NoopContactService;

#[async_trait]
impl ContactService for NoopContactService {
    async fn uid_by_uin(&self, _uin: u64) -> ServiceResult<String> {
        Err(not_configured("contact", "uid_by_uin"))
    }

    async fn share_private_card(&self, _uin: u64) -> ServiceResult<String> {
        Err(not_configured("contact", "share_private_card"))
    }
}

// ── Location ────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LbsService: Send + Sync {
    async fn share_location(
        &self,
        chat_type: ChatType,
        peer: u64,
        lat: f64,
        lon: f64,
    ) -> ServiceResult<()>;
}

pub struct NoopLbsService;

#[async_trait]
impl LbsService for NoopLbsService {
    async fn share_location(
        &self,
        _chat_type: ChatType,
        _peer: u64,
        _lat: f64,
        _lon: f64,
    ) -> ServiceResult<()> {
        Err(not_configured("lbs", "share_location"))
    }
}

// ── Music ───────────────────────────────────────────────────────────────────

/// A free-form music card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMusic {
    pub title: String,
    pub singer: String,
    /// Page opened when the card is tapped.
    pub jump_url: String,
    pub image_url: String,
    pub audio_url: String,
}

/// Identifies the conversation and message a share belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareTarget {
    pub chat_type: ChatType,
    pub peer: u64,
    pub msg_id: i64,
}

#[async_trait]
pub trait MusicService: Send + Sync {
    async fn share_qq(&self, target: ShareTarget, song_id: &str) -> ServiceResult<()>;
    async fn share_163(&self, target: ShareTarget, song_id: &str) -> ServiceResult<()>;
    async fn share_custom(&self, target: ShareTarget, music: &CustomMusic) -> ServiceResult<()>;
}

pub struct NoopMusicService;

#[async_trait]
impl MusicService for NoopMusicService {
    async fn share_qq(&self, _target: ShareTarget, _song_id: &str) -> ServiceResult<()> {
        Err(not_configured("music", "share_qq"))
    }

    async fn share_163(&self, _target: ShareTarget, _song_id: &str) -> ServiceResult<()> {
        Err(not_configured("music", "share_163"))
    }

    async fn share_custom(&self, _target: ShareTarget, _music: &CustomMusic) -> ServiceResult<()> {
        Err(not_configured("music", "share_custom"))
    }
}

// ── Weather ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityInfo {
    pub name: String,
    /// Administrative division code used by the weather card service.
    pub adcode: i64,
}

#[async_trait]
pub trait WeatherService: Send + Sync {
    async fn search_city(&self, name: &str) -> ServiceResult<Vec<CityInfo>>;
    /// Raw weather card document for an adcode.
    async fn fetch_weather_card(&self, adcode: i64) -> ServiceResult<Value>;
}

pub struct NoopWeatherService;

#[async_trait]
impl WeatherService for NoopWeatherService {
    async fn search_city(&self, _name: &str) -> ServiceResult<Vec<CityInfo>> {
        Err(not_configured("weather", "search_city"))
    }

    async fn fetch_weather_card(&self, _adcode: i64) -> ServiceResult<Value> {
        Err(not_configured("weather", "fetch_weather_card"))
    }
}

// ── Rich media staging ──────────────────────────────────────────────────────

/// Query for the path a media file must occupy before the client sends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichMediaPathRequest {
    pub elem_type: u32,
    pub elem_sub_type: u32,
    pub md5: String,
    pub file_name: String,
    pub file_type: u32,
    pub thumb_size: u32,
}

impl RichMediaPathRequest {
    pub const ELEM_PICTURE: u32 = 2;
    pub const ELEM_VIDEO: u32 = 5;
    pub const FILE_ORIGINAL: u32 = 1;
    pub const FILE_THUMB: u32 = 2;
}

#[async_trait]
pub trait RichMediaService: Send + Sync {
    async fn send_path(&self, request: &RichMediaPathRequest) -> ServiceResult<PathBuf>;
}

pub struct NoopRichMediaService;

#[async_trait]
impl RichMediaService for NoopRichMediaService {
    async fn send_path(&self, _request: &RichMediaPathRequest) -> ServiceResult<PathBuf> {
        Err(not_configured("rich media", "send_path"))
    }
}

/// Staging paths laid out under a local directory:
/// `<root>/<pic|video|media>/<md5>_<file_type>_<sub_type>_<thumb_size>[.ext]`.
pub struct LocalStaging {
    root: PathBuf,
}

impl LocalStaging {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, request: &RichMediaPathRequest) -> PathBuf {
        let dir = match request.elem_type {
            RichMediaPathRequest::ELEM_PICTURE => "pic",
            RichMediaPathRequest::ELEM_VIDEO => "video",
            _ => "media",
        };
        let mut name = format!(
            "{}_{}_{}_{}",
            request.md5, request.file_type, request.elem_sub_type, request.thumb_size
        );
        if request.file_type == RichMediaPathRequest::FILE_THUMB
            && request.elem_type == RichMediaPathRequest::ELEM_VIDEO
        {
            name.push_str(".jpg");
        } else if let Some(ext) = Path::new(&request.file_name)
            .extension()
            .and_then(|e| e.to_str())
        {
            name.push('.');
            name.push_str(ext);
        }
        self.root.join(dir).join(name)
    }
}

#[async_trait]
impl RichMediaService for LocalStaging {
    async fn send_path(&self, request: &RichMediaPathRequest) -> ServiceResult<PathBuf> {
        let path = self.path_for(request);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!(path = %path.display(), md5 = %request.md5, "staging path");
        Ok(path)
    }
}

// ── Transfer ────────────────────────────────────────────────────────────────

/// Media the transport must upload before the element referencing it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferResource {
    Picture(PathBuf),
    Voice(PathBuf),
    Video { video: PathBuf, thumb: PathBuf },
}

impl TransferResource {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Picture(_) => "picture",
            Self::Voice(_) => "voice",
            Self::Video { .. } => "video",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub destination: Destination,
    pub resource: TransferResource,
}

#[async_trait]
pub trait TransferService: Send + Sync {
    /// Upload the resource for the destination. `Ok(false)` means the
    /// transport declined the upload without a hard error.
    async fn upload(&self, request: TransferRequest) -> ServiceResult<bool>;
}

pub struct NoopTransferService;

#[async_trait]
impl TransferService for NoopTransferService {
    async fn upload(&self, request: TransferRequest) -> ServiceResult<bool> {
        debug!(
            kind = request.resource.kind(),
            peer_id = request.destination.peer_id(),
            "transfer service not configured, skipping upload"
        );
        Ok(false)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_display_name_falls_back() {
        let mut info = MemberInfo {
            uin: "10001".into(),
            group_nick: Some(String::new()),
            friend_nick: Some("alice".into()),
        };
        assert_eq!(info.display_name(), "alice");
        info.group_nick = Some("card".into());
        assert_eq!(info.display_name(), "card");
        info.group_nick = None;
        info.friend_nick = None;
        assert_eq!(info.display_name(), "10001");
    }

    #[tokio::test]
    async fn noop_services_report_not_configured() {
        let err = NoopGroupService.poke("1", "2").await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
        let err = NoopWeatherService.search_city("Beijing").await.unwrap_err();
        assert!(err.to_string().contains("weather"));
    }

    #[tokio::test]
    async fn noop_transfer_declines() {
        let request = TransferRequest {
            destination: Destination::Direct("1000".into()),
            resource: TransferResource::Voice(PathBuf::from("/tmp/a.silk")),
        };
        assert!(!NoopTransferService.upload(request).await.unwrap());
    }

    #[tokio::test]
    async fn local_staging_builds_stable_paths() {
        let dir = tempfile::tempdir().unwrap();
        let staging = LocalStaging::new(dir.path());
        let request = RichMediaPathRequest {
            elem_type: RichMediaPathRequest::ELEM_PICTURE,
            elem_sub_type: 0,
            md5: "0123456789abcdef0123456789abcdef".into(),
            file_name: "cat.png".into(),
            file_type: RichMediaPathRequest::FILE_ORIGINAL,
            thumb_size: 0,
        };
        let path = staging.send_path(&request).await.unwrap();
        assert_eq!(
            path,
            dir.path()
                .join("pic")
                .join("0123456789abcdef0123456789abcdef_1_0_0.png")
        );
        assert!(path.parent().unwrap().is_dir());

        let thumb = RichMediaPathRequest {
            elem_type: RichMediaPathRequest::ELEM_VIDEO,
            file_type: RichMediaPathRequest::FILE_THUMB,
            elem_sub_type: 1,
            file_name: "clip.mp4".into(),
            ..request
        };
        let path = staging.send_path(&thumb).await.unwrap();
        assert!(path.to_string_lossy().ends_with("_2_1_0.jpg"));
    }
}
