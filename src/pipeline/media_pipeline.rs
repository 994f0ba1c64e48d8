use std::sync::Arc;

use portable_atomic::{AtomicU8, Ordering};
use tokio::sync::{oneshot, watch, Mutex};

use super::pipeline_state::MediaPipelineState;
use crate::conduit::MediaConduit;
use crate::error::{Error, Result};
use crate::rtp_transceiver::rtp_codec::RTPCodecType;
use crate::rtp_transceiver::track_pair::TrackDirection;
use crate::runtime::ContextThread;
use crate::transport::{TransportFlow, TransportFlowState};

/// PipelineTransport is the set of flows a pipeline sends or receives on.
/// Bundle flows are shared with other levels.
#[derive(Debug, Clone)]
pub struct PipelineTransport {
    pub rtp: Arc<TransportFlow>,
    pub rtcp: Option<Arc<TransportFlow>>,
    pub bundle_rtp: Option<Arc<TransportFlow>>,
    pub bundle_rtcp: Option<Arc<TransportFlow>>,
}

impl PipelineTransport {
    pub fn new(rtp: Arc<TransportFlow>, rtcp: Option<Arc<TransportFlow>>) -> Self {
        PipelineTransport {
            rtp,
            rtcp,
            bundle_rtp: None,
            bundle_rtcp: None,
        }
    }

    fn flows(&self) -> impl Iterator<Item = &Arc<TransportFlow>> {
        std::iter::once(&self.rtp)
            .chain(self.rtcp.iter())
            .chain(self.bundle_rtp.iter())
            .chain(self.bundle_rtcp.iter())
    }
}

/// MediaPipelineParams is everything a pipeline is bound to at construction.
pub struct MediaPipelineParams {
    pub handle: String,
    pub level: usize,
    pub track_id: usize,
    pub media_type: RTPCodecType,
    pub conduit: MediaConduit,
    pub transport: PipelineTransport,
    pub network: Arc<ContextThread>,
}

/// MediaPipeline is the part send and receive pipelines share: the binding
/// of a conduit to its transport flows and the pipeline lifecycle.
pub struct MediaPipeline {
    handle: String,
    level: usize,
    track_id: usize,
    media_type: RTPCodecType,
    direction: TrackDirection,
    conduit: MediaConduit,
    transport: Mutex<Option<PipelineTransport>>,
    state: AtomicU8,
    network: Arc<ContextThread>,
}

impl MediaPipeline {
    pub(crate) fn new(params: MediaPipelineParams, direction: TrackDirection) -> Arc<Self> {
        Arc::new(MediaPipeline {
            handle: params.handle,
            level: params.level,
            track_id: params.track_id,
            media_type: params.media_type,
            direction,
            conduit: params.conduit,
            transport: Mutex::new(Some(params.transport)),
            state: AtomicU8::new(MediaPipelineState::Constructed as u8),
            network: params.network,
        })
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn track_id(&self) -> usize {
        self.track_id
    }

    pub fn media_type(&self) -> RTPCodecType {
        self.media_type
    }

    pub fn direction(&self) -> TrackDirection {
        self.direction
    }

    pub fn conduit(&self) -> &MediaConduit {
        &self.conduit
    }

    pub fn state(&self) -> MediaPipelineState {
        self.state.load(Ordering::SeqCst).into()
    }

    pub fn description(&self) -> String {
        format!(
            "{}[{}] {} {} pipeline",
            self.handle, self.track_id, self.media_type, self.direction
        )
    }

    /// transport returns the bound flows, or None once torn down.
    pub async fn transport(&self) -> Option<PipelineTransport> {
        self.transport.lock().await.clone()
    }

    pub(crate) fn set_state(&self, next: MediaPipelineState) -> Result<()> {
        let mut current = self.state.load(Ordering::SeqCst);
        loop {
            let from = MediaPipelineState::from(current);
            if !from.can_transition_to(next) {
                return Err(Error::ErrInvalidPipelineStateTransition {
                    from: from.to_string(),
                    to: next.to_string(),
                });
            }
            match self.state.compare_exchange(
                current,
                next as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        log::debug!("{}: {next}", self.description());
        Ok(())
    }

    /// init checks that conduit and flows fit this pipeline and moves it to
    /// Initialized. The flows need not be established yet; the pipeline
    /// becomes Active on its own once the RTP flow is.
    pub async fn init(self: &Arc<Self>) -> Result<()> {
        let state = self.state();
        if state != MediaPipelineState::Constructed {
            return Err(Error::ErrInvalidPipelineStateTransition {
                from: state.to_string(),
                to: MediaPipelineState::Initialized.to_string(),
            });
        }

        self.check_conduit()?;

        let rtp_state = {
            let transport = self.transport.lock().await;
            let transport = transport
                .as_ref()
                .ok_or_else(|| Error::ErrTransportNotReady(self.description()))?;
            if let Some(flow) = transport.flows().find(|f| f.state().is_terminal()) {
                log::error!(
                    "{}: transport flow {} is {}",
                    self.description(),
                    flow.id(),
                    flow.state()
                );
                return Err(Error::ErrTransportNotReady(flow.id().to_owned()));
            }
            transport.rtp.state_changes()
        };

        let armed = self.watch_transport(rtp_state)?;
        self.set_state(MediaPipelineState::Initialized)?;
        let _ = armed.send(());
        Ok(())
    }

    fn check_conduit(&self) -> Result<()> {
        let conduit = &self.conduit;
        if conduit.is_shutdown() {
            return Err(Error::ErrConduitShutdown);
        }
        if conduit.media_type() != self.media_type
            || conduit.direction() != self.direction
            || conduit.level() != self.level
        {
            let reason = format!(
                "{} {} conduit of level {} bound to {}",
                conduit.media_type(),
                conduit.direction(),
                conduit.level(),
                self.description()
            );
            log::error!("{reason}");
            return Err(Error::ErrConduitMismatch(reason));
        }
        Ok(())
    }

    /// watch_transport follows the RTP flow on the network context once the
    /// returned sender fires. Dropping the sender cancels the watcher, which
    /// holds neither the pipeline nor the flow alive.
    fn watch_transport(
        self: &Arc<Self>,
        mut rtp_state: watch::Receiver<TransportFlowState>,
    ) -> Result<oneshot::Sender<()>> {
        let pipeline = Arc::downgrade(self);
        let description = self.description();
        let (armed_tx, armed_rx) = oneshot::channel::<()>();

        self.network.dispatch(move || async move {
            if armed_rx.await.is_err() {
                return;
            }
            loop {
                let state = *rtp_state.borrow_and_update();
                match state {
                    TransportFlowState::Established => {
                        if let Some(pipeline) = pipeline.upgrade() {
                            let _ = pipeline.set_state(MediaPipelineState::Active);
                        }
                        return;
                    }
                    TransportFlowState::Failed | TransportFlowState::Closed => {
                        log::warn!("{description}: rtp transport {state}, no media will flow");
                        return;
                    }
                    _ => {}
                }
                if rtp_state.changed().await.is_err() {
                    return;
                }
            }
        })?;

        Ok(armed_tx)
    }

    /// teardown releases the flows. Calling it again does nothing.
    pub async fn teardown(&self) {
        if self.set_state(MediaPipelineState::TornDown).is_err() {
            return;
        }
        let transport = self.transport.lock().await.take();
        drop(transport);
    }
}
