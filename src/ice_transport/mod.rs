pub mod ice_parameters;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use ice_parameters::RTCIceParameters;

/// ICE component carrying RTP.
pub const ICE_COMPONENT_RTP: u16 = 1;
/// ICE component carrying RTCP when it is not multiplexed.
pub const ICE_COMPONENT_RTCP: u16 = 2;

/// component_for returns the ICE component id of an RTP or RTCP flow.
pub fn component_for(rtcp: bool) -> u16 {
    if rtcp {
        ICE_COMPONENT_RTCP
    } else {
        ICE_COMPONENT_RTP
    }
}

/// IceContext is the session's candidate gathering and connectivity check
/// machinery. It is only driven from the network context.
pub trait IceContext: Send + Sync {
    fn name(&self) -> &str;

    /// media_stream returns the ICE stream negotiated for an m-line level.
    fn media_stream(&self, level: usize) -> Option<Arc<dyn IceMediaStream>>;
}

/// IceMediaStream is the per-level ICE stream with one component per flow.
#[async_trait]
pub trait IceMediaStream: Send + Sync {
    fn level(&self) -> usize;

    /// connect resolves once a candidate pair was selected for the component,
    /// or fails terminally.
    async fn connect(&self, component: u16, remote: &RTCIceParameters) -> Result<()>;
}
