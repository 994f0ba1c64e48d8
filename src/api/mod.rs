
pub mod setting_engine;

use std::sync::Arc;

use setting_engine::*;

use crate::conduit::{ConduitFactory, ExternalCodecProvider, ExternalCodecResolver};
use crate::dtls_transport::dtls_fingerprint::{FingerprintDecoder, HexFingerprintDecoder};
use crate::dtls_transport::identity::{DtlsIdentity, IdentityProvider, StaticIdentityProvider};
use crate::dtls_transport::DtlsEngine;
use crate::error::{Error, Result};
use crate::ice_transport::IceContext;
use crate::media_stream::PresentationContext;
use crate::peer_connection::SessionMedia;
use crate::runtime::{ContextThread, ExecutionContext};
use crate::transport::{SecurityContext, TransportFlowRegistry};

/// SessionMediaOptions carries the per-session inputs that aren't shared
/// through the API.
#[derive(Default, Clone)]
pub struct SessionMediaOptions {
    /// Document the session belongs to. Its principal is attached to every
    /// send pipeline.
    pub presentation_context: Option<Arc<dyn PresentationContext>>,
    /// Remote identity media is restricted to, when the session is
    /// peer-identity gated.
    pub peer_identity: Option<String>,
}

/// API bundles the collaborators and settings every media session of an
/// application shares.
pub struct API {
    pub(crate) setting_engine: Arc<SettingEngine>,
    pub(crate) identity_provider: Option<Arc<dyn IdentityProvider>>,
    pub(crate) fingerprint_decoder: Arc<dyn FingerprintDecoder>,
    pub(crate) external_codecs: ExternalCodecResolver,
    pub(crate) dtls_engine: Option<Arc<dyn DtlsEngine>>,
}

impl API {
    /// new_session_media creates the session-scoped transport registry,
    /// conduit factory and stream buckets, and starts the session's network
    /// thread (plus a presentation thread when a document is attached).
    pub fn new_session_media(
        &self,
        handle: impl Into<String>,
        ice_context: Arc<dyn IceContext>,
        options: SessionMediaOptions,
    ) -> Result<Arc<SessionMedia>> {
        let handle = handle.into();

        let dtls_engine = match &self.dtls_engine {
            Some(engine) => Arc::clone(engine),
            None => {
                log::error!("{handle}: no DTLS engine configured");
                return Err(Error::new("no DTLS engine configured".to_owned()));
            }
        };

        let identity_provider = match &self.identity_provider {
            Some(provider) => Arc::clone(provider),
            None => {
                let identity = DtlsIdentity::generate()?;
                log::debug!(
                    "{handle}: generated identity {}",
                    identity.fingerprint().value
                );
                Arc::new(StaticIdentityProvider::new(Some(Arc::new(identity))))
            }
        };

        let network = Arc::new(ContextThread::spawn(
            ExecutionContext::Network,
            format!("{}-{handle}", self.setting_engine.thread_names.network),
        )?);

        let presentation = match options.presentation_context {
            Some(context) => {
                let thread = ContextThread::spawn(
                    ExecutionContext::Presentation,
                    format!("{}-{handle}", self.setting_engine.thread_names.presentation),
                )?;
                Some((Arc::new(thread), context))
            }
            None => None,
        };

        let security = SecurityContext {
            identity_provider,
            fingerprint_decoder: Arc::clone(&self.fingerprint_decoder),
            dtls_engine,
            srtp_protection_profiles: self.setting_engine.srtp_protection_profiles.clone(),
        };

        let registry =
            TransportFlowRegistry::new(handle.clone(), ice_context, security, Arc::clone(&network));
        let conduits = ConduitFactory::new(
            self.setting_engine.native_video_codecs.clone(),
            self.external_codecs.clone(),
        );

        log::debug!("{handle}: new session media");

        Ok(Arc::new(SessionMedia::new(
            handle,
            registry,
            conduits,
            network,
            presentation,
            options.peer_identity,
        )))
    }
}

#[derive(Default)]
pub struct APIBuilder {
    setting_engine: Option<Arc<SettingEngine>>,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
    fingerprint_decoder: Option<Arc<dyn FingerprintDecoder>>,
    external_codecs: ExternalCodecResolver,
    dtls_engine: Option<Arc<dyn DtlsEngine>>,
}

impl APIBuilder {
    pub fn new() -> Self {
        APIBuilder::default()
    }

    pub fn build(mut self) -> API {
        API {
            setting_engine: if let Some(setting_engine) = self.setting_engine.take() {
                setting_engine
            } else {
                Arc::new(SettingEngine::default())
            },
            identity_provider: self.identity_provider.take(),
            fingerprint_decoder: if let Some(decoder) = self.fingerprint_decoder.take() {
                decoder
            } else {
                Arc::new(HexFingerprintDecoder)
            },
            external_codecs: self.external_codecs,
            dtls_engine: self.dtls_engine.take(),
        }
    }

    /// WithSettingEngine allows providing a SettingEngine to the API.
    /// Settings should not be changed after passing the engine to an API.
    pub fn with_setting_engine(mut self, setting_engine: SettingEngine) -> Self {
        self.setting_engine = Some(Arc::new(setting_engine));
        self
    }

    /// with_identity_provider sets where sessions take their local DTLS
    /// identity from. Without one, every session generates a self-signed
    /// certificate.
    pub fn with_identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(provider);
        self
    }

    pub fn with_fingerprint_decoder(mut self, decoder: Arc<dyn FingerprintDecoder>) -> Self {
        self.fingerprint_decoder = Some(decoder);
        self
    }

    /// with_external_codec_provider registers a provider of external video
    /// codecs. Providers are asked in the order they were registered.
    pub fn with_external_codec_provider(mut self, provider: Arc<dyn ExternalCodecProvider>) -> Self {
        self.external_codecs.add_provider(provider);
        self
    }

    pub fn with_dtls_engine(mut self, engine: Arc<dyn DtlsEngine>) -> Self {
        self.dtls_engine = Some(engine);
        self
    }
}
