//! Layered transport flows
//!
//! A [`TransportFlow`] turns one ICE component into an authenticated,
//! encrypted channel by stacking an [`IceLayer`] and a [`DtlsLayer`]. The
//! [`TransportFlowRegistry`] makes sure each (level, rtcp) pair of a session
//! gets exactly one of them.

#[cfg(test)]
mod transport_test;

pub mod transport_flow;
pub mod transport_flow_registry;
pub mod transport_flow_state;
pub mod transport_layer;
pub mod transport_layer_stack;

use std::sync::Arc;

pub use transport_flow::TransportFlow;
pub use transport_flow_registry::TransportFlowRegistry;
pub use transport_flow_state::TransportFlowState;
pub use transport_layer::{DtlsLayer, IceLayer, TransportLayer, TransportLayerKind};
pub use transport_layer_stack::TransportLayerStack;

use crate::dtls_transport::dtls_fingerprint::FingerprintDecoder;
use crate::dtls_transport::identity::IdentityProvider;
use crate::dtls_transport::srtp_protection_profile::SrtpProtectionProfile;
use crate::dtls_transport::DtlsEngine;

/// SecurityContext is what a session's security layers are configured from.
#[derive(Clone)]
pub struct SecurityContext {
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub fingerprint_decoder: Arc<dyn FingerprintDecoder>,
    pub dtls_engine: Arc<dyn DtlsEngine>,
    pub srtp_protection_profiles: Vec<SrtpProtectionProfile>,
}
