use std::sync::Arc;

use super::session_media::SessionMedia;
use crate::conduit::MediaConduit;
use crate::error::{Error, Result};
use crate::pipeline::{
    MediaPipelineParams, MediaPipelineReceive, MediaPipelineTransmit, PipelineTransport,
};
use crate::rtp_transceiver::track_pair::{TrackDirection, TrackPair};
use crate::transport::TransportFlow;

// TODO: pick the bucket from the track's msid once sessions carry several streams.
const STREAM_INDEX: usize = 0;

/// MediaPipelineFactory builds the media pipeline of each negotiated track.
pub struct MediaPipelineFactory {
    session: Arc<SessionMedia>,
}

impl MediaPipelineFactory {
    pub fn new(session: Arc<SessionMedia>) -> Self {
        MediaPipelineFactory { session }
    }

    /// create_media_pipeline resolves the track's transport flows and
    /// conduit, then builds, initializes and stores its pipeline. On error
    /// nothing is stored; flows and conduits already created stay registered
    /// for sibling tracks and renegotiation. A closed session builds nothing.
    pub async fn create_media_pipeline(&self, pair: &TrackPair) -> Result<()> {
        self.session.check_open()?;
        let handle = self.session.handle();
        log::debug!(
            "{handle}: creating {} {} pipeline for level {}",
            pair.media_type,
            pair.direction,
            pair.level
        );

        let rtp_flow = self
            .session
            .transport_flows()
            .get_or_create(pair.level, false, &pair.rtp_transport)
            .await?;

        let rtcp_flow = match &pair.rtcp_transport {
            Some(rtcp_transport) if !pair.rtcp_mux => Some(
                self.session
                    .transport_flows()
                    .get_or_create(pair.level, true, rtcp_transport)
                    .await?,
            ),
            _ => None,
        };

        let conduit = self
            .session
            .conduits()
            .get_or_create_conduit(pair.level, pair.media_type, pair.direction)
            .await;
        self.session
            .conduits()
            .configure(&conduit, &pair.codecs, pair.direction)
            .await?;

        match pair.direction {
            TrackDirection::Receiving => {
                self.create_receive_pipeline(pair, conduit, rtp_flow, rtcp_flow)
                    .await
            }
            TrackDirection::Sending => {
                self.create_transmit_pipeline(pair, conduit, rtp_flow, rtcp_flow)
                    .await
            }
        }
    }

    fn params(
        &self,
        pair: &TrackPair,
        conduit: MediaConduit,
        rtp_flow: Arc<TransportFlow>,
        rtcp_flow: Option<Arc<TransportFlow>>,
    ) -> MediaPipelineParams {
        MediaPipelineParams {
            handle: self.session.handle().to_owned(),
            level: pair.level,
            track_id: pair.track_id(),
            media_type: pair.media_type,
            conduit,
            transport: PipelineTransport::new(rtp_flow, rtcp_flow),
            network: Arc::clone(self.session.network()),
        }
    }

    async fn create_receive_pipeline(
        &self,
        pair: &TrackPair,
        conduit: MediaConduit,
        rtp_flow: Arc<TransportFlow>,
        rtcp_flow: Option<Arc<TransportFlow>>,
    ) -> Result<()> {
        let stream = match self.session.get_remote_stream(STREAM_INDEX).await {
            Some(stream) => stream,
            None => {
                log::error!(
                    "{}: no remote stream {STREAM_INDEX} for level {}",
                    self.session.handle(),
                    pair.level
                );
                return Err(Error::ErrRemoteStreamNotFound(STREAM_INDEX));
            }
        };

        let pipeline = Arc::new(MediaPipelineReceive::new(
            self.params(pair, conduit, rtp_flow, rtcp_flow),
            Arc::clone(stream.sink()),
            None,
        ));
        if let Err(err) = pipeline.init().await {
            log::error!("{}: init failed: {err}", pipeline.pipeline().description());
            return Err(err);
        }

        log::info!("{}: created", pipeline.pipeline().description());
        stream.store_pipeline(pair.track_id() - 1, pipeline).await;
        Ok(())
    }

    async fn create_transmit_pipeline(
        &self,
        pair: &TrackPair,
        conduit: MediaConduit,
        rtp_flow: Arc<TransportFlow>,
        rtcp_flow: Option<Arc<TransportFlow>>,
    ) -> Result<()> {
        let stream = match self.session.get_local_stream(STREAM_INDEX).await {
            Some(stream) => stream,
            None => {
                log::error!(
                    "{}: no local stream {STREAM_INDEX} for level {}",
                    self.session.handle(),
                    pair.level
                );
                return Err(Error::ErrLocalStreamNotFound(STREAM_INDEX));
            }
        };

        let pipeline = Arc::new(MediaPipelineTransmit::new(
            self.params(pair, conduit, rtp_flow, rtcp_flow),
            Arc::clone(stream.source()),
        ));
        self.apply_sink_identity(&pipeline).await?;

        if let Err(err) = pipeline.init().await {
            log::error!("{}: init failed: {err}", pipeline.pipeline().description());
            return Err(err);
        }

        log::info!("{}: created", pipeline.pipeline().description());
        stream.store_pipeline(pair.track_id() - 1, pipeline).await;
        Ok(())
    }

    /// apply_sink_identity attaches the document principal to a send
    /// pipeline. Peer-identity gated sessions must not send without one.
    async fn apply_sink_identity(&self, pipeline: &MediaPipelineTransmit) -> Result<()> {
        let peer_identity = self.session.peer_identity().map(str::to_owned);

        match self.session.document_principal().await? {
            Some(principal) => {
                pipeline
                    .update_sink_identity(principal, peer_identity)
                    .await;
                Ok(())
            }
            None if peer_identity.is_some() => {
                log::error!(
                    "{}: peer identity is required but no document is attached",
                    pipeline.pipeline().description()
                );
                Err(Error::ErrMissingDocumentContext)
            }
            None => {
                log::debug!(
                    "{}: no document attached, media is not isolated",
                    pipeline.pipeline().description()
                );
                Ok(())
            }
        }
    }
}
