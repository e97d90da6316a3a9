//! Image, voice and video segments.
//!
//! Each builder resolves the referenced file through the content store,
//! prepares it for sending (staging copies, cover frames, SILK transcoding),
//! hands it to the transfer orchestrator and finally describes it as an
//! element.

use std::path::{Path, PathBuf};

use {
    tessera_media::{
        MediaResource,
        files::{copy_if_stale, file_len, file_md5},
        image_ops::{ImageInfo, guess_format, probe_image},
    },
    tessera_service_traits::{RichMediaPathRequest, TransferResource},
    tracing::{debug, warn},
};

use crate::{
    builders::{BuildContext, BuildOutcome, SegmentRequest},
    element::{
        ImageElement, MsgElement, VideoElement, VideoFormat, VoiceChange, VoiceElement, VoiceType,
    },
    error::{Error, Result},
};

/// Longest edge of the picture thumbnail the client expects.
const PICTURE_THUMB_SIZE: u32 = 720;
const VIDEO_SUB_ORIGINAL: u32 = 2;
const VIDEO_SUB_THUMB: u32 = 1;

async fn resolve(
    ctx: &BuildContext,
    reference: &str,
    fallback_url: Option<&str>,
) -> Result<MediaResource> {
    let resource = ctx
        .services
        .resolver
        .resolve(reference, fallback_url)
        .await?;
    debug!(reference, md5 = %resource.md5, size = resource.size, "resolved media");
    Ok(resource)
}

async fn staging_path(ctx: &BuildContext, request: RichMediaPathRequest) -> Result<PathBuf> {
    ctx.services
        .rich_media
        .send_path(&request)
        .await
        .map_err(|e| Error::lookup("staging path", e))
}

/// A failed size probe still keeps the format read from the signature.
async fn probe_or_default(path: &Path) -> ImageInfo {
    match probe_image(path).await {
        Ok(info) => info,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to probe image");
            ImageInfo {
                format: guess_format(path).await.ok().flatten(),
                ..ImageInfo::default()
            }
        },
    }
}

pub(super) async fn image(ctx: &BuildContext, req: &SegmentRequest) -> Result<BuildOutcome> {
    let params = &req.params;
    params.require(&["file"])?;
    let reference = params.str("file")?;
    let fallback = params.opt_str("url")?;
    let original = params.opt_bool("original")?.unwrap_or(true);
    let flash = params.opt_bool("flash")?.unwrap_or(false);
    let sub_type = params.opt_i64("subType")?.unwrap_or(0);
    let sub_type = i32::try_from(sub_type).map_err(|_| Error::invalid_parameter("subType"))?;
    let destination = req.destination()?;

    let file = resolve(ctx, &reference, fallback.as_deref()).await?;

    ctx.transfer
        .stage_to(destination, TransferResource::Picture(file.path.clone()))
        .await;

    let request = |file_type, thumb_size| RichMediaPathRequest {
        elem_type: RichMediaPathRequest::ELEM_PICTURE,
        elem_sub_type: 0,
        md5: file.md5.clone(),
        file_name: file.file_name(),
        file_type,
        thumb_size,
    };
    let original_path = staging_path(ctx, request(RichMediaPathRequest::FILE_ORIGINAL, 0)).await?;
    if copy_if_stale(&file.path, &original_path).await? {
        let thumb_path = staging_path(
            ctx,
            request(RichMediaPathRequest::FILE_THUMB, PICTURE_THUMB_SIZE),
        )
        .await?;
        tokio::fs::copy(&file.path, &thumb_path).await?;
    }

    let info = probe_or_default(&file.path).await;
    Ok(MsgElement::Image(ImageElement {
        md5: file.md5.clone(),
        file_name: file.file_name(),
        path: file.path.clone(),
        size: file.size,
        width: info.width,
        height: info.height,
        original,
        flash,
        pic_type: info.pic_type().code(),
        sub_type,
    })
    .into())
}

/// `magic` turns on the echo voice changer.
fn voice_effect(req: &SegmentRequest) -> Result<(VoiceType, VoiceChange)> {
    let magic = match req.params.opt_str("magic")?.as_deref() {
        Some("1" | "true") => true,
        Some(_) | None => false,
    };
    Ok(if magic {
        (VoiceType::VoiceChange, VoiceChange::Echo)
    } else {
        (VoiceType::SoundRecord, VoiceChange::None)
    })
}

pub(super) async fn voice(ctx: &BuildContext, req: &SegmentRequest) -> Result<BuildOutcome> {
    let params = &req.params;
    params.require(&["file"])?;
    let reference = params.str("file")?;
    let fallback = params.opt_str("url")?;
    let (voice_type, voice_change) = voice_effect(req)?;
    let destination = req.destination()?;

    let file = resolve(ctx, &reference, fallback.as_deref()).await?;
    let prepared = ctx
        .services
        .voice
        .prepare_voice(&file)
        .await
        .map_err(|e| Error::transcode(format!("prepare voice {}", file.md5), e))?;
    let resource = prepared.resource;

    ctx.transfer
        .stage_to(destination, TransferResource::Voice(resource.path.clone()))
        .await;

    Ok(MsgElement::Voice(VoiceElement {
        md5: resource.md5.clone(),
        file_name: resource.file_name(),
        path: resource.path.clone(),
        size: resource.size,
        duration: prepared.duration_secs,
        format: prepared.format,
        voice_type,
        voice_change,
    })
    .into())
}

pub(super) async fn video(ctx: &BuildContext, req: &SegmentRequest) -> Result<BuildOutcome> {
    let params = &req.params;
    let field = params.require_any(&["file", "url"])?;
    let reference = params.str(field)?;
    let fallback = match field {
        "file" => params.opt_str("url")?,
        _ => None,
    };
    let destination = req.destination()?;

    let file = resolve(ctx, &reference, fallback.as_deref()).await?;

    let request = |elem_sub_type, file_type| RichMediaPathRequest {
        elem_type: RichMediaPathRequest::ELEM_VIDEO,
        elem_sub_type,
        md5: file.md5.clone(),
        file_name: file.file_name(),
        file_type,
        thumb_size: 0,
    };
    let original_path = staging_path(
        ctx,
        request(VIDEO_SUB_ORIGINAL, RichMediaPathRequest::FILE_ORIGINAL),
    )
    .await?;
    let thumb_path = staging_path(
        ctx,
        request(VIDEO_SUB_THUMB, RichMediaPathRequest::FILE_THUMB),
    )
    .await?;

    let copied = copy_if_stale(&file.path, &original_path).await?;
    if copied || file_len(&thumb_path).await.is_none() {
        ctx.services
            .video
            .extract_cover(&file.path, &thumb_path)
            .await
            .map_err(|e| Error::transcode(format!("extract cover of {}", file.md5), e))?;
    }

    ctx.transfer
        .stage_to(destination, TransferResource::Video {
            video: file.path.clone(),
            thumb: thumb_path.clone(),
        })
        .await;

    let duration = match ctx.services.video.duration_secs(&file.path).await {
        Ok(secs) => secs,
        Err(e) => {
            warn!(md5 = %file.md5, error = %e, "failed to read video duration");
            0
        },
    };
    let thumb = probe_or_default(&thumb_path).await;
    let thumb_md5 = file_md5(&thumb_path).await?;
    let thumb_size = file_len(&thumb_path).await.unwrap_or(0);

    Ok(MsgElement::Video(VideoElement {
        md5: file.md5.clone(),
        file_name: file.file_name(),
        path: file.path.clone(),
        size: file.size,
        duration,
        format: VideoFormat::Mp4,
        thumb_md5,
        thumb_path,
        thumb_size,
        thumb_width: thumb.width,
        thumb_height: thumb.height,
    })
    .into())
}
