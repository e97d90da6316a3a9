//! AMR storage-format duration.
//!
//! Frames are 20 ms each. Every frame starts with a TOC byte whose frame
//! type selects the payload size.

use std::path::Path;

use crate::error::{Context, Result};

const NB_MAGIC: &[u8] = b"#!AMR\n";
const WB_MAGIC: &[u8] = b"#!AMR-WB\n";
const FRAME_MS: u64 = 20;

/// Payload bytes per frame type, narrow band.
const NB_SIZES: [usize; 16] = [12, 13, 15, 17, 19, 20, 26, 31, 5, 0, 0, 0, 0, 0, 0, 0];
/// Payload bytes per frame type, wide band.
const WB_SIZES: [usize; 16] = [17, 23, 32, 36, 40, 46, 50, 58, 60, 5, 0, 0, 0, 0, 0, 0];

/// Number of complete frames, or `None` when the magic is missing.
#[must_use]
pub fn frame_count(data: &[u8]) -> Option<u64> {
    let (mut pos, sizes) = if data.starts_with(WB_MAGIC) {
        (WB_MAGIC.len(), &WB_SIZES)
    } else if data.starts_with(NB_MAGIC) {
        (NB_MAGIC.len(), &NB_SIZES)
    } else {
        return None;
    };

    let mut frames = 0;
    while pos < data.len() {
        let frame_type = usize::from((data[pos] >> 3) & 0x0F);
        let next = pos + 1 + sizes[frame_type];
        if next > data.len() {
            break;
        }
        frames += 1;
        pos = next;
    }
    Some(frames)
}

/// Duration in whole seconds, rounded, never below one.
#[must_use]
pub fn duration_secs(data: &[u8]) -> Option<u32> {
    let ms = frame_count(data)? * FRAME_MS;
    let secs = (ms + 500) / 1000;
    Some(u32::try_from(secs).unwrap_or(u32::MAX).max(1))
}

pub async fn file_duration_secs(path: &Path) -> Result<u32> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    duration_secs(&data).context("not an AMR file")
}
