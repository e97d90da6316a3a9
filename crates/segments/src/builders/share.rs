//! Link share cards, sent directly through the service channel.

use {
    bytes::Bytes,
    serde::Serialize,
    tessera_common::ChatType,
    tessera_service_traits::ServicePacket,
    tracing::{debug, warn},
};

use crate::{
    builders::{BuildContext, BuildOutcome, SegmentRequest},
    element::MsgElement,
    error::Result,
};

const SHARE_COMMAND: &str = "OidbSvc.0xdc2_34";
const SHARE_OIDB_COMMAND: u32 = 0xdc2;
const SHARE_SERVICE_TYPE: u32 = 34;
const SHARE_APP_ID: u64 = 100_446_242;

#[derive(Debug, Serialize)]
struct ShareRequest {
    msg_body: ShareBody,
    batch_send_req: Vec<BatchSend>,
}

#[derive(Debug, Serialize)]
struct ShareBody {
    appid: u64,
    app_type: u32,
    msg_style: u32,
    recv_uin: u64,
    client_info: ClientInfo,
    rich_msg_body: RichMsgBody,
    ext_info: ExtInfo,
}

#[derive(Debug, Serialize)]
struct ClientInfo {
    platform: u32,
}

#[derive(Debug, Serialize)]
struct RichMsgBody {
    using_ark: bool,
    title: String,
    summary: String,
    brief: String,
    url: String,
    picture_url: String,
}

#[derive(Debug, Serialize)]
struct ExtInfo {
    msg_seq: i64,
}

#[derive(Debug, Serialize)]
struct BatchSend {
    send_type: u32,
    recv_uin: u64,
}

/// `favicon.ico` of the link's host.
fn favicon_url(url: &str) -> String {
    let has_scheme = url.starts_with("http://") || url.starts_with("https://");
    let host = url
        .split('/')
        .nth(if has_scheme { 2 } else { 0 })
        .unwrap_or_default();
    let sep = if url.starts_with('/') { "" } else { "/" };
    format!("http://{host}{sep}favicon.ico")
}

pub(super) async fn share(ctx: &BuildContext, req: &SegmentRequest) -> Result<BuildOutcome> {
    let params = &req.params;
    params.require(&["title", "url"])?;
    let title = params.str("title")?;
    let url = params.str("url")?;
    let image = match params.opt_str("image")? {
        Some(image) => image,
        None => favicon_url(&url),
    };
    let summary = params.opt_str("content")?.unwrap_or_else(|| url.clone());

    let send_type = match req.chat_type {
        ChatType::Group => 1,
        ChatType::Direct => 0,
        ChatType::Other(_) => {
            return Ok(MsgElement::text(format!("[分享] {title}\n地址: {url}")).into());
        },
    };
    let peer = req.peer()?;

    let request = ShareRequest {
        msg_body: ShareBody {
            appid: SHARE_APP_ID,
            app_type: 1,
            msg_style: 0,
            recv_uin: peer,
            client_info: ClientInfo { platform: 1 },
            rich_msg_body: RichMsgBody {
                using_ark: true,
                brief: format!("[分享] {title}"),
                title,
                summary,
                url,
                picture_url: image,
            },
            ext_info: ExtInfo {
                msg_seq: req.msg_id,
            },
        },
        batch_send_req: vec![BatchSend {
            send_type,
            recv_uin: peer,
        }],
    };
    let body = serde_json::to_vec(&request).map_err(std::io::Error::other)?;

    let packet = ServicePacket {
        command: SHARE_COMMAND.to_string(),
        oidb_command: SHARE_OIDB_COMMAND,
        service_type: SHARE_SERVICE_TYPE,
        body: Bytes::from(body),
    };
    match ctx.services.transport.send_to_service(packet).await {
        Ok(()) => debug!(peer, send_type, "share card sent"),
        Err(e) => warn!(peer, error = %e, "failed to send share card"),
    }
    Ok(BuildOutcome::ActionPerformed)
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("https://example.com/a/b", "http://example.com/favicon.ico")]
    #[case("http://example.com", "http://example.com/favicon.ico")]
    #[case("example.com/page", "http://example.com/favicon.ico")]
    #[case("/relative/path", "http://favicon.ico")]
    fn favicon_from_url(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(favicon_url(url), expected);
    }
}
