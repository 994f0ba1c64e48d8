use super::transport_layer::{TransportLayer, TransportLayerKind};
use crate::dtls_transport::srtp_protection_profile::SrtpProtectionProfile;
use crate::error::{Error, Result};

const LAYER_ORDER: [TransportLayerKind; 2] = [TransportLayerKind::Ice, TransportLayerKind::Dtls];

/// TransportLayerStack owns the layer chain of one flow: a connectivity
/// layer with a security layer on top of it.
#[derive(Default)]
pub struct TransportLayerStack {
    layers: Vec<Box<dyn TransportLayer>>,
}

impl TransportLayerStack {
    pub fn new() -> Self {
        TransportLayerStack::default()
    }

    /// push appends the next layer. Layers must arrive as ice then dtls.
    pub fn push(&mut self, layer: Box<dyn TransportLayer>) -> Result<()> {
        match LAYER_ORDER.get(self.layers.len()) {
            Some(expected) if *expected == layer.kind() => {
                self.layers.push(layer);
                Ok(())
            }
            _ => Err(Error::ErrTransportLayerOrder),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.layers.len() == LAYER_ORDER.len()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.layers.iter().map(|l| l.id()).collect()
    }

    /// start brings every layer up from the bottom, stopping at the first
    /// failure.
    pub async fn start(&self, flow_id: &str) -> Result<()> {
        for layer in &self.layers {
            log::trace!("{flow_id}: starting {} layer", layer.id());
            layer.start(flow_id).await?;
        }
        Ok(())
    }

    pub fn srtp_protection_profile(&self) -> Option<SrtpProtectionProfile> {
        self.layers
            .iter()
            .find_map(|layer| layer.srtp_protection_profile())
    }
}
