use {tessera_common::ChatType, tracing::debug};

use crate::{
    builders::{BuildContext, BuildOutcome, SegmentRequest},
    element::{AtElement, AtTarget, MsgElement},
    error::{Error, Result},
};

const ADMIN_ROLE_ID: u32 = 1;

/// Mentions only render in groups; elsewhere the segment is dropped.
pub(super) async fn at(ctx: &BuildContext, req: &SegmentRequest) -> Result<BuildOutcome> {
    req.params.require(&["qq"])?;
    let qq = req.params.str("qq")?;
    if req.chat_type != ChatType::Group {
        debug!(chat_type = %req.chat_type, "mention outside a group ignored");
        return Ok(BuildOutcome::ActionPerformed);
    }

    let (content, target) = match qq.as_str() {
        "0" | "all" => ("@全体成员".to_string(), AtTarget::All),
        "online" => ("@在线成员".to_string(), AtTarget::Online),
        "admin" => ("@管理员".to_string(), AtTarget::Role {
            role_id: ADMIN_ROLE_ID,
        }),
        _ => {
            let uin: u64 = qq
                .trim()
                .parse()
                .map_err(|_| Error::invalid_parameter("qq"))?;
            let member = ctx
                .services
                .groups
                .member_info(&req.peer_id, &qq)
                .await
                .map_err(|e| Error::lookup(format!("member {qq} of group {}", req.peer_id), e))?;
            let uid = ctx
                .services
                .contacts
                .uid_by_uin(uin)
                .await
                .map_err(|e| Error::lookup(format!("uid of {uin}"), e))?;
            let name = match member.display_name() {
                "" => qq.as_str(),
                name => name,
            };
            (format!("@{name}"), AtTarget::One { uin, uid })
        },
    };

    Ok(MsgElement::At(AtElement { content, target }).into())
}
