//! Segment type tags and their builders.

use std::fmt;

/// Every segment kind the compiler knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Text,
    Face,
    Image,
    Voice,
    At,
    Video,
    Markdown,
    Dice,
    Rps,
    Poke,
    Anonymous,
    Share,
    Contact,
    Location,
    Music,
    Reply,
    Touch,
    Weather,
}

impl SegmentKind {
    pub const ALL: [Self; 18] = [
        Self::Text,
        Self::Face,
        Self::Image,
        Self::Voice,
        Self::At,
        Self::Video,
        Self::Markdown,
        Self::Dice,
        Self::Rps,
        Self::Poke,
        Self::Anonymous,
        Self::Share,
        Self::Contact,
        Self::Location,
        Self::Music,
        Self::Reply,
        Self::Touch,
        Self::Weather,
    ];

    /// Look up a tag. `pic` and `record` are aliases of `image` and `voice`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "text" => Self::Text,
            "face" => Self::Face,
            "pic" | "image" => Self::Image,
            "voice" | "record" => Self::Voice,
            "at" => Self::At,
            "video" => Self::Video,
            "markdown" => Self::Markdown,
            "dice" => Self::Dice,
            "rps" => Self::Rps,
            "poke" => Self::Poke,
            "anonymous" => Self::Anonymous,
            "share" => Self::Share,
            "contact" => Self::Contact,
            "location" => Self::Location,
            "music" => Self::Music,
            "reply" => Self::Reply,
            "touch" => Self::Touch,
            "weather" => Self::Weather,
            _ => return None,
        };
        Some(kind)
    }

    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Face => "face",
            Self::Image => "image",
            Self::Voice => "voice",
            Self::At => "at",
            Self::Video => "video",
            Self::Markdown => "markdown",
            Self::Dice => "dice",
            Self::Rps => "rps",
            Self::Poke => "poke",
            Self::Anonymous => "anonymous",
            Self::Share => "share",
            Self::Contact => "contact",
            Self::Location => "location",
            Self::Music => "music",
            Self::Reply => "reply",
            Self::Touch => "touch",
            Self::Weather => "weather",
        }
    }

    /// Kinds that upload media and therefore need a group or direct chat.
    #[must_use]
    pub fn needs_transfer(self) -> bool {
        matches!(self, Self::Image | Self::Voice | Self::Video)
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("pic", SegmentKind::Image)]
    #[case("image", SegmentKind::Image)]
    #[case("record", SegmentKind::Voice)]
    #[case("voice", SegmentKind::Voice)]
    #[case("weather", SegmentKind::Weather)]
    fn aliases_resolve(#[case] tag: &str, #[case] kind: SegmentKind) {
        assert_eq!(SegmentKind::from_tag(tag), Some(kind));
    }

    #[test]
    fn canonical_tags_round_trip() {
        for kind in SegmentKind::ALL {
            assert_eq!(SegmentKind::from_tag(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn unknown_and_differently_cased_tags_are_rejected() {
        assert_eq!(SegmentKind::from_tag("json"), None);
        assert_eq!(SegmentKind::from_tag("Text"), None);
        assert_eq!(SegmentKind::from_tag(""), None);
    }
}
