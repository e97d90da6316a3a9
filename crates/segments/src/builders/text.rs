use crate::{
    builders::{BuildOutcome, SegmentRequest},
    element::{MarkdownElement, MsgElement},
    error::Result,
};

pub(super) fn text(req: &SegmentRequest) -> Result<BuildOutcome> {
    req.params.require(&["text"])?;
    Ok(MsgElement::text(req.params.str("text")?).into())
}

pub(super) fn markdown(req: &SegmentRequest) -> Result<BuildOutcome> {
    req.params.require(&["text"])?;
    Ok(MsgElement::Markdown(MarkdownElement {
        content: req.params.str("text")?,
    })
    .into())
}
