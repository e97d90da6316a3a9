//! One builder per segment kind.
//!
//! Every builder validates its parameters before touching a collaborator, so a
//! malformed segment never triggers a download, a transcode or a send.

mod action;
mod at;
mod card;
mod face;
mod media;
mod reply;
mod share;
mod text;

use {
    serde::Serialize,
    tessera_common::{ChatType, Destination},
};

use crate::{
    compiler::Services,
    element::MsgElement,
    error::{Error, Result},
    params::Params,
    registry::SegmentKind,
    transfer::{TransferOrchestrator, destination_for},
};

/// Collaborators shared by all builders of one compiler.
pub(crate) struct BuildContext {
    pub services: Services,
    pub transfer: TransferOrchestrator,
}

/// A single segment addressed to one conversation.
#[derive(Debug, Clone)]
pub struct SegmentRequest {
    pub kind: SegmentKind,
    pub chat_type: ChatType,
    pub msg_id: i64,
    pub peer_id: String,
    pub params: Params,
}

impl SegmentRequest {
    /// Numeric peer id, required by share and lookup services.
    pub fn peer(&self) -> Result<u64> {
        self.peer_id
            .trim()
            .parse()
            .map_err(|_| Error::invalid_parameter("peer_id"))
    }

    /// Media destination; fails for chat types that cannot carry media.
    pub fn destination(&self) -> Result<Destination> {
        destination_for(self.chat_type, &self.peer_id)
    }
}

/// What compiling one segment produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "element", rename_all = "snake_case")]
pub enum BuildOutcome {
    /// An element to attach to the outgoing message.
    Element(MsgElement),
    /// The segment was carried out directly (a poke, a shared card) and adds
    /// nothing to the message.
    ActionPerformed,
}

impl BuildOutcome {
    #[must_use]
    pub fn into_element(self) -> Option<MsgElement> {
        match self {
            Self::Element(el) => Some(el),
            Self::ActionPerformed => None,
        }
    }
}

impl From<MsgElement> for BuildOutcome {
    fn from(element: MsgElement) -> Self {
        Self::Element(element)
    }
}

pub(crate) async fn build(ctx: &BuildContext, req: &SegmentRequest) -> Result<BuildOutcome> {
    match req.kind {
        SegmentKind::Text => text::text(req),
        SegmentKind::Markdown => text::markdown(req),
        SegmentKind::Face => face::face(req),
        SegmentKind::Poke => face::poke(req),
        SegmentKind::Dice => Ok(face::dice().into()),
        SegmentKind::Rps => Ok(face::rps().into()),
        SegmentKind::Image => media::image(ctx, req).await,
        SegmentKind::Voice => media::voice(ctx, req).await,
        SegmentKind::Video => media::video(ctx, req).await,
        SegmentKind::At => at::at(ctx, req).await,
        SegmentKind::Share => share::share(ctx, req).await,
        SegmentKind::Contact => card::contact(ctx, req).await,
        SegmentKind::Weather => card::weather(ctx, req).await,
        SegmentKind::Location => action::location(ctx, req).await,
        SegmentKind::Music => action::music(ctx, req).await,
        SegmentKind::Touch => action::touch(ctx, req).await,
        SegmentKind::Anonymous => Ok(BuildOutcome::ActionPerformed),
        SegmentKind::Reply => reply::reply(req),
    }
}
