use std::sync::Arc;

/// VideoEncoder is an encoder implementation living outside the media engine.
pub trait VideoEncoder: Send + Sync {
    fn implementation_name(&self) -> &str;
}

/// VideoDecoder is a decoder implementation living outside the media engine.
pub trait VideoDecoder: Send + Sync {
    fn implementation_name(&self) -> &str;
}

/// ExternalCodecProvider builds external codec implementations by codec name.
/// Returning None means the provider doesn't handle that codec.
pub trait ExternalCodecProvider: Send + Sync {
    fn name(&self) -> &str;

    fn create_encoder(&self, codec_name: &str) -> Option<Arc<dyn VideoEncoder>>;

    fn create_decoder(&self, codec_name: &str) -> Option<Arc<dyn VideoDecoder>>;
}

/// ExternalCodecResolver asks its providers in registration order and
/// returns the first implementation offered, e.g. a hardware provider
/// registered ahead of a software one.
#[derive(Default, Clone)]
pub struct ExternalCodecResolver {
    providers: Vec<Arc<dyn ExternalCodecProvider>>,
}

impl ExternalCodecResolver {
    pub fn new(providers: Vec<Arc<dyn ExternalCodecProvider>>) -> Self {
        ExternalCodecResolver { providers }
    }

    pub fn add_provider(&mut self, provider: Arc<dyn ExternalCodecProvider>) {
        self.providers.push(provider);
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn resolve_encoder(&self, codec_name: &str) -> Option<Arc<dyn VideoEncoder>> {
        self.providers.iter().find_map(|p| {
            let encoder = p.create_encoder(codec_name)?;
            log::debug!("{} provides the {codec_name} encoder", p.name());
            Some(encoder)
        })
    }

    pub fn resolve_decoder(&self, codec_name: &str) -> Option<Arc<dyn VideoDecoder>> {
        self.providers.iter().find_map(|p| {
            let decoder = p.create_decoder(codec_name)?;
            log::debug!("{} provides the {codec_name} decoder", p.name());
            Some(decoder)
        })
    }
}
