use std::sync::Arc;

use {
    tessera_common::{ChatType, Destination},
    tessera_service_traits::{TransferRequest, TransferResource, TransferService},
    tracing::{debug, warn},
};

use crate::error::{Error, Result};

/// Destination for media uploads. Only group and direct chats carry media.
pub fn destination_for(chat_type: ChatType, peer_id: &str) -> Result<Destination> {
    Destination::new(chat_type, peer_id).ok_or(Error::UnsupportedDestination { chat_type })
}

/// Hands prepared media to the transport ahead of the element that
/// references it.
pub struct TransferOrchestrator {
    transfer: Arc<dyn TransferService>,
}

impl TransferOrchestrator {
    pub fn new(transfer: Arc<dyn TransferService>) -> Self {
        Self { transfer }
    }

    /// Upload `resource` for the conversation. A failed or declined upload is
    /// logged and the element is still built; only an unsupported chat type
    /// is an error.
    pub async fn stage(
        &self,
        chat_type: ChatType,
        peer_id: &str,
        resource: TransferResource,
    ) -> Result<()> {
        let destination = destination_for(chat_type, peer_id)?;
        self.stage_to(destination, resource).await;
        Ok(())
    }

    pub(crate) async fn stage_to(&self, destination: Destination, resource: TransferResource) {
        let kind = resource.kind();
        let peer_id = destination.peer_id().to_string();
        match self
            .transfer
            .upload(TransferRequest {
                destination,
                resource,
            })
            .await
        {
            Ok(true) => debug!(kind, peer_id, "media uploaded"),
            Ok(false) => warn!(kind, peer_id, "media upload declined"),
            Err(e) => warn!(kind, peer_id, error = %e, "media upload failed"),
        }
    }
}
