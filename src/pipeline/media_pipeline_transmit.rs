use std::sync::Arc;

use tokio::sync::Mutex;

use super::media_pipeline::{MediaPipeline, MediaPipelineParams};
use crate::error::Result;
use crate::media_stream::{MediaSource, Principal};
use crate::rtp_transceiver::track_pair::TrackDirection;

/// SinkIdentity is the privacy context media is sent under. With a peer
/// identity set, media may only be rendered by that peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkIdentity {
    pub principal: Principal,
    pub peer_identity: Option<String>,
}

impl SinkIdentity {
    pub fn is_isolated(&self) -> bool {
        self.peer_identity.is_some()
    }
}

/// MediaPipelineTransmit feeds a local source into a sending conduit.
pub struct MediaPipelineTransmit {
    pipeline: Arc<MediaPipeline>,
    source: Arc<dyn MediaSource>,
    sink_identity: Mutex<Option<SinkIdentity>>,
}

impl MediaPipelineTransmit {
    pub fn new(params: MediaPipelineParams, source: Arc<dyn MediaSource>) -> Self {
        MediaPipelineTransmit {
            pipeline: MediaPipeline::new(params, TrackDirection::Sending),
            source,
            sink_identity: Mutex::new(None),
        }
    }

    pub fn pipeline(&self) -> &Arc<MediaPipeline> {
        &self.pipeline
    }

    pub fn source(&self) -> &Arc<dyn MediaSource> {
        &self.source
    }

    /// update_sink_identity records which principal owns the media and the
    /// peer it is restricted to.
    pub async fn update_sink_identity(&self, principal: Principal, peer_identity: Option<String>) {
        log::debug!(
            "{}: sink identity {} for peer {:?}",
            self.pipeline.description(),
            principal.origin(),
            peer_identity
        );
        *self.sink_identity.lock().await = Some(SinkIdentity {
            principal,
            peer_identity,
        });
    }

    pub async fn sink_identity(&self) -> Option<SinkIdentity> {
        self.sink_identity.lock().await.clone()
    }

    pub async fn init(&self) -> Result<()> {
        self.pipeline.init().await
    }

    pub async fn teardown(&self) {
        self.pipeline.teardown().await
    }
}
