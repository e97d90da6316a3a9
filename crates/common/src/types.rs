//! Conversation routing types.

use {
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Kind of conversation a message is addressed to, as reported by the host
/// client (`1` direct, `2` group). Unknown raw values are preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ChatType {
    Direct,
    Group,
    Other(i32),
}

impl ChatType {
    pub const DIRECT_RAW: i32 = 1;
    pub const GROUP_RAW: i32 = 2;

    #[must_use]
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            Self::DIRECT_RAW => Self::Direct,
            Self::GROUP_RAW => Self::Group,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub fn raw(self) -> i32 {
        match self {
            Self::Direct => Self::DIRECT_RAW,
            Self::Group => Self::GROUP_RAW,
            Self::Other(raw) => raw,
        }
    }
}

impl From<i32> for ChatType {
    fn from(raw: i32) -> Self {
        Self::from_raw(raw)
    }
}

impl From<ChatType> for i32 {
    fn from(chat_type: ChatType) -> Self {
        chat_type.raw()
    }
}

impl fmt::Display for ChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct"),
            Self::Group => f.write_str("group"),
            Self::Other(raw) => write!(f, "chat type {raw}"),
        }
    }
}

/// Routing target of an outgoing message. Only group and direct
/// conversations can carry media.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "peer_id", rename_all = "snake_case")]
pub enum Destination {
    Group(String),
    Direct(String),
}

impl Destination {
    /// Build a destination from the raw chat type. Returns `None` for chat
    /// types outside the two supported kinds.
    pub fn new(chat_type: ChatType, peer_id: impl Into<String>) -> Option<Self> {
        match chat_type {
            ChatType::Group => Some(Self::Group(peer_id.into())),
            ChatType::Direct => Some(Self::Direct(peer_id.into())),
            ChatType::Other(_) => None,
        }
    }

    #[must_use]
    pub fn peer_id(&self) -> &str {
        match self {
            Self::Group(id) | Self::Direct(id) => id,
        }
    }

    #[must_use]
    pub fn chat_type(&self) -> ChatType {
        match self {
            Self::Group(_) => ChatType::Group,
            Self::Direct(_) => ChatType::Direct,
        }
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_round_trip() {
        assert_eq!(ChatType::from_raw(1), ChatType::Direct);
        assert_eq!(ChatType::from_raw(2), ChatType::Group);
        assert_eq!(ChatType::from_raw(4), ChatType::Other(4));
        assert_eq!(ChatType::Other(100).raw(), 100);
    }

    #[test]
    fn serializes_as_raw_integer() {
        assert_eq!(serde_json::to_string(&ChatType::Group).unwrap(), "2");
        let parsed: ChatType = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, ChatType::Direct);
    }

    #[test]
    fn destination_rejects_unknown_chat_type() {
        assert!(Destination::new(ChatType::Other(3), "1000").is_none());
        let dest = Destination::new(ChatType::Group, "2000").unwrap();
        assert_eq!(dest.peer_id(), "2000");
        assert!(dest.is_group());
        assert_eq!(dest.chat_type(), ChatType::Group);
    }
}
