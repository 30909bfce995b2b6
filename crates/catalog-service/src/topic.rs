use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use service_registry::{PeerBinding, PeerRequest};
use tracing::{debug, instrument};

use crate::envelope::{EnvelopeOutcome, decode_envelope};
use crate::error::CatalogError;
use crate::model::EntityRef;

/// Fetches topics owned by another service.
///
/// `Ok(None)` means the topic is genuinely absent; `Err` means the lookup
/// itself failed. Callers that degrade on failure rely on the distinction.
#[async_trait]
pub trait TopicLookup: Send + Sync {
    async fn fetch(&self, id: &str, credential: Option<&str>) -> Result<Option<EntityRef>, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct TopicData {
    #[serde(default)]
    id: String,
    #[serde(default)]
    topic_name: String,
    #[serde(default)]
    name: String,
}

impl TopicData {
    fn into_entity(self) -> EntityRef {
        let name = if self.topic_name.is_empty() { self.name } else { self.topic_name };
        EntityRef::new(self.id, name)
    }
}

pub struct RemoteTopicLookup {
    peer: Arc<PeerBinding>,
}

impl RemoteTopicLookup {
    pub fn new(peer: Arc<PeerBinding>) -> Self {
        Self { peer }
    }

    fn path(id: &str) -> String {
        format!("/api/v2/gateway/topics/{}", id)
    }
}

#[async_trait]
impl TopicLookup for RemoteTopicLookup {
    #[instrument(skip(self, credential), fields(peer = %self.peer.service_name()))]
    async fn fetch(&self, id: &str, credential: Option<&str>) -> Result<Option<EntityRef>, CatalogError> {
        let token = credential
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(CatalogError::MissingCredential)?;

        let body = self.peer.call(PeerRequest::get(Self::path(id)).bearer(token)).await?;

        match decode_envelope::<TopicData>(&body)? {
            EnvelopeOutcome::NotFound => {
                debug!("topic {} not found on peer", id);
                Ok(None)
            }
            EnvelopeOutcome::Empty => Ok(None),
            EnvelopeOutcome::Found(data) if data.id.trim().is_empty() => Ok(None),
            EnvelopeOutcome::Found(data) => Ok(Some(data.into_entity())),
        }
    }
}
