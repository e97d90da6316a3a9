//! Image probing: pixel size (EXIF orientation aware), format and picture type.

use std::path::{Path, PathBuf};

use {
    image::{ImageDecoder, ImageFormat, ImageReader, metadata::Orientation},
    tracing::debug,
};

use crate::{
    error::{Context, Result},
    mime,
};

/// Picture type code carried by image elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PicType {
    Jpg,
    Png,
    Webp,
    Bmp,
    Gif,
    Unknown,
}

impl PicType {
    #[must_use]
    pub fn from_format(format: Option<ImageFormat>) -> Self {
        match format {
            Some(ImageFormat::Jpeg) => Self::Jpg,
            Some(ImageFormat::Png) => Self::Png,
            Some(ImageFormat::WebP) => Self::Webp,
            Some(ImageFormat::Bmp) => Self::Bmp,
            Some(ImageFormat::Gif) => Self::Gif,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Jpg => 1000,
            Self::Png => 1001,
            Self::Webp => 1002,
            Self::Bmp => 1005,
            Self::Gif => 2000,
            Self::Unknown => 0,
        }
    }
}

/// What an image element needs to know about its file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    /// Display width, after applying EXIF orientation.
    pub width: u32,
    pub height: u32,
    pub format: Option<ImageFormat>,
    pub orientation: Orientation,
}

impl Default for ImageInfo {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            format: None,
            orientation: Orientation::NoTransforms,
        }
    }
}

impl ImageInfo {
    #[must_use]
    pub fn pic_type(&self) -> PicType {
        PicType::from_format(self.format)
    }
}

/// Stored dimensions turned into display dimensions.
///
/// Only the plain quarter-turn rotations swap width and height; mirrored
/// variants keep the stored size.
#[must_use]
pub fn oriented_dimensions(width: u32, height: u32, orientation: Orientation) -> (u32, u32) {
    match orientation {
        Orientation::Rotate90 | Orientation::Rotate270 => (height, width),
        _ => (width, height),
    }
}

fn probe_blocking(path: &Path) -> Result<ImageInfo> {
    let reader = ImageReader::open(path)
        .with_context(|| format!("open {}", path.display()))?
        .with_guessed_format()
        .context("failed to guess image format")?;
    let format = reader.format();
    let mut decoder = reader.into_decoder()?;

    let (raw_w, raw_h) = decoder.dimensions();
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let (width, height) = oriented_dimensions(raw_w, raw_h, orientation);

    Ok(ImageInfo {
        width,
        height,
        format,
        orientation,
    })
}

/// Image format from the file's signature alone.
///
/// Works on files whose body the decoder rejects.
pub async fn guess_format(path: &Path) -> Result<Option<ImageFormat>> {
    let header = mime::read_header(path).await?;
    Ok(image::guess_format(&header).ok())
}

/// Read an image's display size and format without decoding pixels.
pub async fn probe_image(path: &Path) -> Result<ImageInfo> {
    let owned: PathBuf = path.to_path_buf();
    let info = tokio::task::spawn_blocking(move || probe_blocking(&owned))
        .await
        .context("image probe task failed")??;
    debug!(
        path = %path.display(),
        width = info.width,
        height = info.height,
        orientation = ?info.orientation,
        "probed image"
    );
    Ok(info)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 red pixel JPEG
    const TINY_JPEG: &[u8] = &[
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00,
        0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xDB, 0x00, 0x43, 0x00, 0x08, 0x06, 0x06, 0x07, 0x06,
        0x05, 0x08, 0x07, 0x07, 0x07, 0x09, 0x09, 0x08, 0x0A, 0x0C, 0x14, 0x0D, 0x0C, 0x0B, 0x0B,
        0x0C, 0x19, 0x12, 0x13, 0x0F, 0x14, 0x1D, 0x1A, 0x1F, 0x1E, 0x1D, 0x1A, 0x1C, 0x1C, 0x20,
        0x24, 0x2E, 0x27, 0x20, 0x22, 0x2C, 0x23, 0x1C, 0x1C, 0x28, 0x37, 0x29, 0x2C, 0x30, 0x31,
        0x34, 0x34, 0x34, 0x1F, 0x27, 0x39, 0x3D, 0x38, 0x32, 0x3C, 0x2E, 0x33, 0x34, 0x32, 0xFF,
        0xC0, 0x00, 0x0B, 0x08, 0x00, 0x01, 0x00, 0x01, 0x01, 0x01, 0x11, 0x00, 0xFF, 0xC4, 0x00,
        0x1F, 0x00, 0x00, 0x01, 0x05, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B,
        0xFF, 0xC4, 0x00, 0xB5, 0x10, 0x00, 0x02, 0x01, 0x03, 0x03, 0x02, 0x04, 0x03, 0x05, 0x05,
        0x04, 0x04, 0x00, 0x00, 0x01, 0x7D, 0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21,
        0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07, 0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xA1, 0x08,
        0x23, 0x42, 0xB1, 0xC1, 0x15, 0x52, 0xD1, 0xF0, 0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0A,
        0x16, 0x17, 0x18, 0x19, 0x1A, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2A, 0x34, 0x35, 0x36, 0x37,
        0x38, 0x39, 0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0x4A, 0x53, 0x54, 0x55, 0x56,
        0x57, 0x58, 0x59, 0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6A, 0x73, 0x74, 0x75,
        0x76, 0x77, 0x78, 0x79, 0x7A, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8A, 0x92, 0x93,
        0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8, 0xA9,
        0xAA, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6,
        0xC7, 0xC8, 0xC9, 0xCA, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA, 0xE1, 0xE2,
        0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0xEA, 0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7,
        0xF8, 0xF9, 0xFA, 0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00, 0xFB, 0xD5,
        0xDB, 0x20, 0xA8, 0xBA, 0xA3, 0xE8, 0xEB, 0xEC, 0x00, 0x3C, 0xF4, 0x76, 0x19, 0xE8, 0x78,
        0xAD, 0x99, 0xA0, 0x19, 0xE0, 0xD0, 0x6A, 0x40, 0x23, 0x9C, 0xD0, 0x07, 0xFF, 0xD9,
    ];

    #[tokio::test]
    async fn test_probe_tiny_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red");
        std::fs::write(&path, TINY_JPEG).unwrap();

        let info = probe_image(&path).await.unwrap();
        assert_eq!((info.width, info.height), (1, 1));
        assert_eq!(info.format, Some(ImageFormat::Jpeg));
        assert_eq!(info.orientation, Orientation::NoTransforms);
        assert_eq!(info.pic_type().code(), 1000);
    }

    #[tokio::test]
    async fn test_probe_png_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        image::RgbImage::new(3, 2).save(&path).unwrap();

        let info = probe_image(&path).await.unwrap();
        assert_eq!((info.width, info.height), (3, 2));
        assert_eq!(info.pic_type(), PicType::Png);
    }

    #[tokio::test]
    async fn test_probe_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(probe_image(&path).await.is_err());
    }

    #[test]
    fn test_oriented_dimensions() {
        assert_eq!(oriented_dimensions(4, 3, Orientation::NoTransforms), (4, 3));
        assert_eq!(oriented_dimensions(4, 3, Orientation::Rotate180), (4, 3));
        assert_eq!(oriented_dimensions(4, 3, Orientation::FlipHorizontal), (4, 3));
        assert_eq!(oriented_dimensions(4, 3, Orientation::Rotate90), (3, 4));
        assert_eq!(oriented_dimensions(4, 3, Orientation::Rotate270), (3, 4));
        assert_eq!(oriented_dimensions(4, 3, Orientation::Rotate90FlipH), (4, 3));
    }

    #[tokio::test]
    async fn test_guess_format_survives_corrupt_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\ntruncated").unwrap();

        assert!(probe_image(&path).await.is_err());
        let format = guess_format(&path).await.unwrap();
        assert_eq!(format, Some(ImageFormat::Png));
        assert_eq!(PicType::from_format(format).code(), 1001);
    }

    #[test]
    fn test_pic_type_codes() {
        assert_eq!(PicType::from_format(Some(ImageFormat::Jpeg)).code(), 1000);
        assert_eq!(PicType::from_format(Some(ImageFormat::Png)).code(), 1001);
        assert_eq!(PicType::from_format(Some(ImageFormat::WebP)).code(), 1002);
        assert_eq!(PicType::from_format(Some(ImageFormat::Bmp)).code(), 1005);
        assert_eq!(PicType::from_format(Some(ImageFormat::Gif)).code(), 2000);
        assert_eq!(PicType::from_format(Some(ImageFormat::Tiff)).code(), 0);
        assert_eq!(PicType::from_format(None), PicType::Unknown);
    }
}
