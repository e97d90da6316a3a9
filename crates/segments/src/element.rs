//! Typed message elements handed to the host client.

use std::path::PathBuf;

use {serde::Serialize, tessera_voice::VoiceFormat};

/// One attachable piece of an outgoing message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MsgElement {
    Text(TextElement),
    Face(FaceElement),
    Image(ImageElement),
    Voice(VoiceElement),
    Video(VideoElement),
    Markdown(MarkdownElement),
    MarketFace(MarketFaceElement),
    Ark(ArkElement),
    Reply(ReplyElement),
    At(AtElement),
}

impl MsgElement {
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(TextElement {
            content: content.into(),
        })
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Face(_) => "face",
            Self::Image(_) => "image",
            Self::Voice(_) => "voice",
            Self::Video(_) => "video",
            Self::Markdown(_) => "markdown",
            Self::MarketFace(_) => "market_face",
            Self::Ark(_) => "ark",
            Self::Reply(_) => "reply",
            Self::At(_) => "at",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextElement {
    pub content: String,
}

/// Face type of system emoji.
pub const FACE_TYPE_SYSTEM: i32 = 0;
/// Face type of a poke ("vas poke").
pub const FACE_TYPE_POKE: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaceElement {
    pub face_index: i32,
    pub face_text: String,
    pub face_type: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poke: Option<PokeDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PokeDetails {
    pub poke_type: i32,
    pub vaspoke_id: i32,
    /// 0..=3
    pub strength: i32,
    /// Shown by clients too old to render the poke.
    pub fallback_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageElement {
    pub md5: String,
    pub file_name: String,
    pub path: PathBuf,
    pub size: u64,
    pub width: u32,
    pub height: u32,
    pub original: bool,
    pub flash: bool,
    pub pic_type: i32,
    pub sub_type: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceType {
    SoundRecord,
    VoiceChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceChange {
    None,
    Echo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceElement {
    pub md5: String,
    pub file_name: String,
    pub path: PathBuf,
    pub size: u64,
    /// Whole seconds.
    pub duration: u32,
    pub format: VoiceFormat,
    pub voice_type: VoiceType,
    pub voice_change: VoiceChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoFormat {
    Mp4,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoElement {
    pub md5: String,
    pub file_name: String,
    pub path: PathBuf,
    pub size: u64,
    pub duration: u32,
    pub format: VideoFormat,
    pub thumb_md5: String,
    pub thumb_path: PathBuf,
    pub thumb_size: u64,
    pub thumb_width: u32,
    pub thumb_height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkdownElement {
    pub content: String,
}

/// Sticker from a "market" face package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketFaceElement {
    pub item_type: i32,
    pub face_info: i32,
    pub package_id: i32,
    pub sub_type: i32,
    pub media_type: i32,
    pub width: u32,
    pub height: u32,
    pub face_name: String,
    pub emoji_id: String,
    pub key: String,
    pub emoji_type: i32,
    pub support_size: Vec<(u32, u32)>,
}

/// Rich card carrying a JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArkElement {
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyElement {
    pub msg_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtElement {
    pub content: String,
    pub target: AtTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AtTarget {
    All,
    Online,
    Role { role_id: u32 },
    One { uin: u64, uid: String },
}
