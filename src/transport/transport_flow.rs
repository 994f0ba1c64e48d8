use std::sync::{Arc, OnceLock};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::transport_flow_state::TransportFlowState;
use super::transport_layer_stack::TransportLayerStack;
use crate::dtls_transport::srtp_protection_profile::SrtpProtectionProfile;
use crate::error::{Error, Result};
use crate::runtime::{ensure_context, ExecutionContext};

/// TransportFlow is one secured channel for one (level, rtcp) pair. It is
/// shared by the registry and by every pipeline bound to it, and stops its
/// handshake driver once the last reference goes away.
pub struct TransportFlow {
    id: String,
    level: usize,
    rtcp: bool,
    state_tx: watch::Sender<TransportFlowState>,
    layers: OnceLock<Arc<TransportLayerStack>>,
    driver: OnceLock<JoinHandle<()>>,
}

impl std::fmt::Debug for TransportFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportFlow")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}

impl TransportFlow {
    pub fn new(id: String, level: usize, rtcp: bool) -> Self {
        let (state_tx, _) = watch::channel(TransportFlowState::Created);
        TransportFlow {
            id,
            level,
            rtcp,
            state_tx,
            layers: OnceLock::new(),
            driver: OnceLock::new(),
        }
    }

    /// id is "{session handle}:{level},{rtp|rtcp}" and only used for diagnostics.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn is_rtcp(&self) -> bool {
        self.rtcp
    }

    pub fn state(&self) -> TransportFlowState {
        *self.state_tx.borrow()
    }

    /// state_changes subscribes to state updates. The receiver starts out
    /// holding the current state.
    pub fn state_changes(&self) -> watch::Receiver<TransportFlowState> {
        self.state_tx.subscribe()
    }

    pub fn layer_ids(&self) -> Vec<&'static str> {
        self.layers.get().map(|l| l.ids()).unwrap_or_default()
    }

    pub fn srtp_protection_profile(&self) -> Option<SrtpProtectionProfile> {
        self.layers.get().and_then(|l| l.srtp_protection_profile())
    }

    pub(crate) fn set_state(&self, next: TransportFlowState) -> bool {
        let changed = self.state_tx.send_if_modified(|state| {
            if state.can_transition_to(next) {
                *state = next;
                true
            } else {
                false
            }
        });
        if changed {
            log::debug!("{}: transport flow state changed to {next}", self.id);
        }
        changed
    }

    /// push_layers installs the layer chain and starts driving it. Must be
    /// called on the network context; the handshake proceeds in the
    /// background and the flow becomes Established or Failed when it ends.
    pub fn push_layers(self: &Arc<Self>, stack: TransportLayerStack) -> Result<()> {
        ensure_context(ExecutionContext::Network)?;

        if !stack.is_complete() {
            return Err(Error::ErrTransportLayerOrder);
        }
        if self.state().is_terminal() {
            return Err(Error::ErrFlowClosed);
        }

        let stack = Arc::new(stack);
        self.layers
            .set(Arc::clone(&stack))
            .map_err(|_| Error::ErrTransportLayersAlreadyPushed)?;
        self.set_state(TransportFlowState::LayersPushed);

        let flow = Arc::downgrade(self);
        let flow_id = self.id.clone();
        let driver = tokio::spawn(async move {
            let result = stack.start(&flow_id).await;

            let flow = match flow.upgrade() {
                Some(flow) => flow,
                None => return,
            };
            match result {
                Ok(()) => {
                    log::info!("{flow_id}: transport flow established");
                    flow.set_state(TransportFlowState::Established);
                }
                Err(err) => {
                    log::warn!("{flow_id}: transport flow failed: {err}");
                    flow.set_state(TransportFlowState::Failed);
                }
            }
        });
        let _ = self.driver.set(driver);

        Ok(())
    }

    /// wait_established resolves once the handshake completed, or errors
    /// when the flow failed or was closed first.
    pub async fn wait_established(&self) -> Result<()> {
        let mut state_rx = self.state_tx.subscribe();
        loop {
            let state = *state_rx.borrow_and_update();
            match state {
                TransportFlowState::Established => return Ok(()),
                TransportFlowState::Failed => return Err(Error::ErrFlowFailed),
                TransportFlowState::Closed => return Err(Error::ErrFlowClosed),
                _ => {}
            }
            state_rx
                .changed()
                .await
                .map_err(|_| Error::ErrFlowClosed)?;
        }
    }

    pub(crate) fn fail(&self, reason: &str) {
        log::error!("{}: {reason}", self.id);
        self.set_state(TransportFlowState::Failed);
        self.stop_driver();
    }

    /// close stops any pending handshake and moves the flow to Closed.
    pub fn close(&self) {
        self.set_state(TransportFlowState::Closed);
        self.stop_driver();
    }

    fn stop_driver(&self) {
        if let Some(driver) = self.driver.get() {
            driver.abort();
        }
    }
}

impl Drop for TransportFlow {
    fn drop(&mut self) {
        self.stop_driver();
    }
}
