use crate::{
    builders::{BuildOutcome, SegmentRequest},
    element::{MsgElement, ReplyElement},
    error::Result,
};

/// Quote of an earlier message. A quote with `text` must also say who sent
/// it and when.
pub(super) fn reply(req: &SegmentRequest) -> Result<BuildOutcome> {
    let params = &req.params;
    params.require(&["id"])?;
    let msg_id = params.i64("id")?;

    let mut element = ReplyElement {
        msg_id,
        seq: None,
        text: None,
        time: None,
        sender: None,
    };
    if params.contains("text") {
        params.require(&["qq", "time", "seq"])?;
        element.seq = Some(params.i64("seq")?);
        element.text = Some(params.str("text")?);
        element.time = Some(params.i64("time")?);
        element.sender = Some(params.u64("qq")?);
    }
    Ok(MsgElement::Reply(element).into())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{error::Error, params::Params, registry::SegmentKind},
        serde_json::{Value, json},
        tessera_common::ChatType,
    };

    fn request(data: Value) -> SegmentRequest {
        SegmentRequest {
            kind: SegmentKind::Reply,
            chat_type: ChatType::Group,
            msg_id: 0,
            peer_id: "1".into(),
            params: Params::from_value(data),
        }
    }

    #[test]
    fn bare_reply_needs_only_id() {
        let out = reply(&request(json!({"id": "42"}))).unwrap();
        let BuildOutcome::Element(MsgElement::Reply(el)) = out else {
            panic!("expected reply");
        };
        assert_eq!(el.msg_id, 42);
        assert_eq!(el.text, None);
    }

    #[test]
    fn quoted_text_requires_sender_details() {
        let err = reply(&request(json!({"id": 1, "text": "hi", "qq": 10001}))).unwrap_err();
        assert!(matches!(err, Error::MissingField { ref name } if name == "time"));

        let out = reply(&request(
            json!({"id": 1, "text": "hi", "qq": "10001", "time": 1700000000, "seq": 9}),
        ))
        .unwrap();
        let BuildOutcome::Element(MsgElement::Reply(el)) = out else {
            panic!("expected reply");
        };
        assert_eq!(el.sender, Some(10001));
        assert_eq!(el.seq, Some(9));
        assert_eq!(el.text.as_deref(), Some("hi"));
    }
}
