use std::collections::HashMap;
use std::sync::Arc;

use portable_atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use super::transport_flow::TransportFlow;
use super::transport_layer::{DtlsLayer, IceLayer};
use super::transport_layer_stack::TransportLayerStack;
use super::SecurityContext;
use crate::dtls_transport::dtls_fingerprint::MAX_DIGEST_LENGTH;
use crate::error::{Error, Result};
use crate::ice_transport::{component_for, IceContext};
use crate::rtp_transceiver::track_pair::TransportAssociation;
use crate::runtime::ContextThread;

/// flow_id builds the diagnostic id of the flow for a level.
pub fn flow_id(session_handle: &str, level: usize, rtcp: bool) -> String {
    format!(
        "{session_handle}:{level},{}",
        if rtcp { "rtcp" } else { "rtp" }
    )
}

/// TransportFlowRegistry holds at most one transport flow per (level, rtcp)
/// key for a session. Lookups and creation are serialized by one lock so
/// concurrent setups of the same level share the flow.
pub struct TransportFlowRegistry {
    session_handle: String,
    ice_context: Arc<dyn IceContext>,
    security: SecurityContext,
    network: Arc<ContextThread>,
    flows: Mutex<HashMap<(usize, bool), Arc<TransportFlow>>>,
    is_closed: AtomicBool,
}

impl TransportFlowRegistry {
    pub fn new(
        session_handle: impl Into<String>,
        ice_context: Arc<dyn IceContext>,
        security: SecurityContext,
        network: Arc<ContextThread>,
    ) -> Self {
        TransportFlowRegistry {
            session_handle: session_handle.into(),
            ice_context,
            security,
            network,
            flows: Mutex::new(HashMap::new()),
            is_closed: AtomicBool::new(false),
        }
    }

    pub fn session_handle(&self) -> &str {
        &self.session_handle
    }

    pub async fn get(&self, level: usize, rtcp: bool) -> Option<Arc<TransportFlow>> {
        let flows = self.flows.lock().await;
        flows.get(&(level, rtcp)).cloned()
    }

    /// get_or_create returns the flow registered for (level, rtcp), building
    /// it from `association` when there is none. A new flow is registered
    /// right away and finalized later on the network context, so it is
    /// returned before it is established. Configuration errors leave nothing
    /// registered, and a closed registry creates no flows.
    pub async fn get_or_create(
        &self,
        level: usize,
        rtcp: bool,
        association: &TransportAssociation,
    ) -> Result<Arc<TransportFlow>> {
        let mut flows = self.flows.lock().await;
        if self.is_closed.load(Ordering::SeqCst) {
            return Err(Error::ErrSessionClosed);
        }
        if let Some(flow) = flows.get(&(level, rtcp)) {
            log::trace!("reusing transport flow {}", flow.id());
            return Ok(Arc::clone(flow));
        }

        let id = flow_id(&self.session_handle, level, rtcp);
        let ice = IceLayer::new(
            self.session_handle.clone(),
            association.ice_parameters.clone(),
        );
        let dtls = self.build_dtls_layer(&id, association)?;

        let flow = Arc::new(TransportFlow::new(id, level, rtcp));
        let ice_context = Arc::clone(&self.ice_context);
        let pending = Arc::clone(&flow);
        // The ICE media streams live on the network thread, so the layers
        // can only be bound and pushed there.
        self.network.dispatch(move || async move {
            finalize_transport_flow(ice_context, pending, ice, dtls);
        })?;

        log::debug!("created transport flow {}", flow.id());
        flows.insert((level, rtcp), Arc::clone(&flow));
        Ok(flow)
    }

    fn build_dtls_layer(
        &self,
        flow_id: &str,
        association: &TransportAssociation,
    ) -> Result<DtlsLayer> {
        let mut dtls = DtlsLayer::new(Arc::clone(&self.security.dtls_engine));
        dtls.set_role(association.role);

        let identity = match self.security.identity_provider.identity() {
            Some(identity) => identity,
            None => {
                log::error!("{flow_id}: no local identity to authenticate with");
                return Err(Error::ErrMissingIdentity);
            }
        };
        dtls.set_identity(identity);

        for fingerprint in &association.fingerprints {
            let digest = self
                .security
                .fingerprint_decoder
                .decode(&fingerprint.value, MAX_DIGEST_LENGTH)
                .map_err(|err| {
                    log::error!("{flow_id}: could not convert fingerprint: {err}");
                    err
                })?;
            dtls.set_verification_digest(&fingerprint.algorithm, &digest)
                .map_err(|err| {
                    log::error!("{flow_id}: could not set fingerprint: {err}");
                    err
                })?;
        }

        dtls.set_srtp_ciphers(self.security.srtp_protection_profiles.clone())
            .map_err(|err| {
                log::error!("{flow_id}: couldn't set SRTP ciphers: {err}");
                err
            })?;

        Ok(dtls)
    }

    /// remove drops the registry's reference. Pipelines still holding the
    /// flow keep it alive.
    pub async fn remove(&self, level: usize, rtcp: bool) -> Option<Arc<TransportFlow>> {
        let mut flows = self.flows.lock().await;
        flows.remove(&(level, rtcp))
    }

    /// close_all closes and forgets every registered flow. The registry
    /// refuses new flows afterwards.
    pub async fn close_all(&self) {
        let drained: Vec<Arc<TransportFlow>> = {
            let mut flows = self.flows.lock().await;
            self.is_closed.store(true, Ordering::SeqCst);
            flows.drain().map(|(_, flow)| flow).collect()
        };
        for flow in drained {
            flow.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.flows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.flows.lock().await.is_empty()
    }

    /// flows returns the registered flows ordered by level, RTP before RTCP.
    pub async fn flows(&self) -> Vec<Arc<TransportFlow>> {
        let flows = self.flows.lock().await;
        let mut keys: Vec<&(usize, bool)> = flows.keys().collect();
        keys.sort();
        keys.into_iter()
            .filter_map(|key| flows.get(key).cloned())
            .collect()
    }
}

/// finalize_transport_flow runs on the network context: it binds the ICE
/// layer to the session's media stream and pushes the layer chain.
fn finalize_transport_flow(
    ice_context: Arc<dyn IceContext>,
    flow: Arc<TransportFlow>,
    mut ice: IceLayer,
    dtls: DtlsLayer,
) {
    let media_stream = match ice_context.media_stream(flow.level()) {
        Some(media_stream) => media_stream,
        None => {
            flow.fail(&Error::ErrIceMediaStreamNotFound(flow.level()).to_string());
            return;
        }
    };
    ice.set_parameters(ice_context, media_stream, component_for(flow.is_rtcp()));

    if let Err(err) = push_transport_layers(&flow, ice, dtls) {
        flow.fail(&format!("couldn't push transport layers: {err}"));
    }
}

fn push_transport_layers(flow: &Arc<TransportFlow>, ice: IceLayer, dtls: DtlsLayer) -> Result<()> {
    let mut stack = TransportLayerStack::new();
    stack.push(Box::new(ice))?;
    stack.push(Box::new(dtls))?;
    flow.push_layers(stack)
}
