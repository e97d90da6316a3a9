//! Segments carried out directly through a service instead of becoming an
//! element. Delivery failures are logged; the segment still counts as done.

use {
    tessera_service_traits::{CustomMusic, ShareTarget},
    tracing::{debug, warn},
};

use crate::{
    builders::{BuildContext, BuildOutcome, SegmentRequest},
    error::Result,
};

pub(super) async fn location(ctx: &BuildContext, req: &SegmentRequest) -> Result<BuildOutcome> {
    let params = &req.params;
    params.require(&["lat", "lon"])?;
    let lat = params.f64("lat")?;
    let lon = params.f64("lon")?;
    let peer = req.peer()?;

    match ctx
        .services
        .lbs
        .share_location(req.chat_type, peer, lat, lon)
        .await
    {
        Ok(()) => debug!(peer, lat, lon, "location shared"),
        Err(e) => warn!(peer, error = %e, "failed to share location"),
    }
    Ok(BuildOutcome::ActionPerformed)
}

pub(super) async fn music(ctx: &BuildContext, req: &SegmentRequest) -> Result<BuildOutcome> {
    let params = &req.params;
    params.require(&["type"])?;
    let kind = params.str("type")?;
    let target = ShareTarget {
        chat_type: req.chat_type,
        peer: req.peer()?,
        msg_id: req.msg_id,
    };

    let music = &ctx.services.music;
    let sent = match kind.as_str() {
        "qq" => {
            params.require(&["id"])?;
            music.share_qq(target, &params.str("id")?).await
        },
        "163" => {
            params.require(&["id"])?;
            music.share_163(target, &params.str("id")?).await
        },
        "custom" => {
            params.require(&["url", "audio", "title"])?;
            let custom = CustomMusic {
                title: params.str("title")?,
                singer: params.opt_str("singer")?.unwrap_or_default(),
                jump_url: params.str("url")?,
                image_url: params.opt_str("image")?.unwrap_or_default(),
                audio_url: params.str("audio")?,
            };
            music.share_custom(target, &custom).await
        },
        other => {
            warn!(kind = other, "unsupported music share type");
            return Ok(BuildOutcome::ActionPerformed);
        },
    };

    match sent {
        Ok(()) => debug!(kind = %kind, peer = target.peer, "music shared"),
        Err(e) => warn!(kind = %kind, peer = target.peer, error = %e, "failed to share music"),
    }
    Ok(BuildOutcome::ActionPerformed)
}

pub(super) async fn touch(ctx: &BuildContext, req: &SegmentRequest) -> Result<BuildOutcome> {
    req.params.require(&["id"])?;
    let target = req.params.str("id")?;

    match ctx.services.groups.poke(&req.peer_id, &target).await {
        Ok(()) => debug!(peer_id = %req.peer_id, uin = %target, "poked"),
        Err(e) => warn!(peer_id = %req.peer_id, uin = %target, error = %e, "failed to poke"),
    }
    Ok(BuildOutcome::ActionPerformed)
}
