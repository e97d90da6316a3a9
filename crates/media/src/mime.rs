//! Magic-number sniffing for the media formats the engine handles.
//!
//! Still images are recognised by the `image` crate; audio and video
//! containers it cannot see are matched here.

use std::path::Path;

use {image::ImageFormat, tokio::io::AsyncReadExt};

use crate::error::{Context, Result};

/// Number of leading bytes [`sniff`] looks at.
pub const HEADER_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Image(ImageFormat),
    Silk,
    Amr,
    Wav,
    Mp3,
    Aac,
    Ogg,
    Flac,
    Mp4,
    Webm,
}

impl MediaFormat {
    #[must_use]
    pub fn is_image(self) -> bool {
        matches!(self, Self::Image(_))
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Image(format) => format.extensions_str().first().copied().unwrap_or("img"),
            Self::Silk => "silk",
            Self::Amr => "amr",
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Aac => "aac",
            Self::Ogg => "ogg",
            Self::Flac => "flac",
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Image(format) => format.to_mime_type(),
            Self::Silk => "audio/silk",
            Self::Amr => "audio/amr",
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::Aac => "audio/aac",
            Self::Ogg => "audio/ogg",
            Self::Flac => "audio/flac",
            Self::Mp4 => "video/mp4",
            Self::Webm => "video/webm",
        }
    }
}

/// Image formats a message can carry. Other `image` signatures are too weak
/// to trust on arbitrary data (ICO starts with `00 00 01 00`).
fn sendable_image(header: &[u8]) -> Option<ImageFormat> {
    match image::guess_format(header).ok()? {
        format @ (ImageFormat::Jpeg
        | ImageFormat::Png
        | ImageFormat::Gif
        | ImageFormat::WebP
        | ImageFormat::Bmp) => Some(format),
        _ => None,
    }
}

/// MPEG audio frame header: sync, a defined version, a real layer, a
/// bitrate other than free/bad and a defined sample rate.
fn is_mpeg_frame(h: &[u8]) -> bool {
    let &[0xFF, b1, b2, ..] = h else {
        return false;
    };
    let version = (b1 >> 3) & 0b11;
    let layer = (b1 >> 1) & 0b11;
    let bitrate = b2 >> 4;
    let sample_rate = (b2 >> 2) & 0b11;
    b1 & 0xE0 == 0xE0
        && version != 0b01
        && layer != 0b00
        && bitrate != 0x0
        && bitrate != 0xF
        && sample_rate != 0b11
}

/// ADTS header: sync with layer 00, a defined sampling-frequency index, an
/// explicit channel layout and a frame long enough to hold its own header.
fn is_adts_frame(h: &[u8]) -> bool {
    let &[0xFF, b1, b2, b3, b4, b5, _, ..] = h else {
        return false;
    };
    let sampling_index = (b2 >> 2) & 0x0F;
    let channels = ((b2 & 0b1) << 2) | (b3 >> 6);
    let frame_len =
        (u16::from(b3 & 0b11) << 11) | (u16::from(b4) << 3) | (u16::from(b5) >> 5);
    b1 & 0xF6 == 0xF0 && sampling_index <= 12 && channels != 0 && frame_len >= 7
}

/// Identify a format from the leading bytes of a file.
#[must_use]
pub fn sniff(header: &[u8]) -> Option<MediaFormat> {
    let h = header;
    let format = if let Some(image) = sendable_image(h) {
        MediaFormat::Image(image)
    } else if h.starts_with(b"RIFF") && h.get(8..12) == Some(&b"WAVE"[..]) {
        MediaFormat::Wav
    } else if h.starts_with(b"#!SILK") || h.get(1..7) == Some(&b"#!SILK"[..]) {
        MediaFormat::Silk
    } else if h.starts_with(b"#!AMR") {
        MediaFormat::Amr
    } else if h.starts_with(b"ID3") {
        MediaFormat::Mp3
    } else if h.starts_with(b"OggS") {
        MediaFormat::Ogg
    } else if h.starts_with(b"fLaC") {
        MediaFormat::Flac
    } else if h.get(4..8) == Some(&b"ftyp"[..]) {
        MediaFormat::Mp4
    } else if h.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        MediaFormat::Webm
    } else if is_adts_frame(h) {
        MediaFormat::Aac
    } else if is_mpeg_frame(h) {
        MediaFormat::Mp3
    } else {
        return None;
    };
    Some(format)
}

/// Read up to [`HEADER_LEN`] leading bytes of a file.
pub async fn read_header(path: &Path) -> Result<Vec<u8>> {
    let mut file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("open {}", path.display()))?;
    let mut buf = vec![0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        let n = file.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buf.truncate(filled);
    Ok(buf)
}

/// Sniff a file on disk.
pub async fn sniff_file(path: &Path) -> Result<Option<MediaFormat>> {
    Ok(sniff(&read_header(path).await?))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case::jpeg(&[0xFF, 0xD8, 0xFF, 0xE0], Some(MediaFormat::Image(ImageFormat::Jpeg)))]
    #[case::png(b"\x89PNG\r\n\x1a\n\0\0", Some(MediaFormat::Image(ImageFormat::Png)))]
    #[case::gif(b"GIF89a\x01\x00", Some(MediaFormat::Image(ImageFormat::Gif)))]
    #[case::webp(b"RIFF\0\0\0\0WEBPVP8 ", Some(MediaFormat::Image(ImageFormat::WebP)))]
    #[case::wav(b"RIFF\0\0\0\0WAVEfmt ", Some(MediaFormat::Wav))]
    #[case::bmp(b"BM\x36\0\0\0", Some(MediaFormat::Image(ImageFormat::Bmp)))]
    #[case::silk(b"#!SILK_V3", Some(MediaFormat::Silk))]
    #[case::tencent_silk(b"\x02#!SILK_V3", Some(MediaFormat::Silk))]
    #[case::amr(b"#!AMR\n", Some(MediaFormat::Amr))]
    #[case::mp3_id3(b"ID3\x04\0", Some(MediaFormat::Mp3))]
    #[case::mp3_frame(&[0xFF, 0xFB, 0x90, 0x64], Some(MediaFormat::Mp3))]
    #[case::aac(&[0xFF, 0xF1, 0x50, 0x80, 0x02, 0x1F, 0xFC], Some(MediaFormat::Aac))]
    #[case::ogg(b"OggS\0\x02", Some(MediaFormat::Ogg))]
    #[case::flac(b"fLaC\0\0", Some(MediaFormat::Flac))]
    #[case::mp4(b"\0\0\0\x20ftypisom", Some(MediaFormat::Mp4))]
    #[case::webm(&[0x1A, 0x45, 0xDF, 0xA3, 0x01], Some(MediaFormat::Webm))]
    #[case::pcm(&[0x01, 0x00, 0x02, 0x00, 0xFE, 0xFF], None)]
    #[case::pcm_minus_one(&[0xFF, 0xFF, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00], None)]
    #[case::pcm_adts_like(&[0xFF, 0xF1, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00], None)]
    #[case::pcm_adts_long_frame(&[0xFF, 0xF1, 0x00, 0x00, 0xFE, 0xFF, 0x02, 0x00], None)]
    #[case::pcm_bad_bitrate(&[0xFF, 0xFB, 0xF0, 0x00], None)]
    #[case::pcm_bad_sample_rate(&[0xFF, 0xFB, 0x9C, 0x00], None)]
    #[case::pcm_reserved_layer(&[0xFF, 0xF9, 0x90, 0x00], None)]
    #[case::pcm_ico_like(&[0x00, 0x00, 0x01, 0x00, 0x02, 0x00], None)]
    #[case::truncated_adts(&[0xFF, 0xF1, 0x50], None)]
    #[case::empty(b"", None)]
    fn test_sniff(#[case] header: &[u8], #[case] expected: Option<MediaFormat>) {
        assert_eq!(sniff(header), expected);
    }

    #[test]
    fn test_format_helpers() {
        assert!(MediaFormat::Image(ImageFormat::Png).is_image());
        assert!(!MediaFormat::Silk.is_image());
        assert_eq!(MediaFormat::Image(ImageFormat::Jpeg).extension(), "jpg");
        assert_eq!(MediaFormat::Image(ImageFormat::WebP).mime_type(), "image/webp");
        assert_eq!(MediaFormat::Mp3.mime_type(), "audio/mpeg");
    }

    #[tokio::test]
    async fn test_sniff_file_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a");
        std::fs::write(&path, b"#!AMR\n").unwrap();
        assert_eq!(sniff_file(&path).await.unwrap(), Some(MediaFormat::Amr));
        assert_eq!(read_header(&path).await.unwrap().len(), 6);
    }
}
