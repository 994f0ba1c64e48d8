use std::fmt;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;

use crate::dtls_transport::dtls_fingerprint::{digest_length, MAX_DIGEST_LENGTH};
use crate::dtls_transport::dtls_role::DTLSRole;
use crate::dtls_transport::identity::DtlsIdentity;
use crate::dtls_transport::srtp_protection_profile::SrtpProtectionProfile;
use crate::dtls_transport::{DTLSParameters, DtlsEngine, VerificationDigest};
use crate::error::{Error, Result};
use crate::ice_transport::ice_parameters::RTCIceParameters;
use crate::ice_transport::{IceContext, IceMediaStream};

/// TransportLayerKind tells connectivity and security layers apart.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportLayerKind {
    Ice,
    Dtls,
}

impl fmt::Display for TransportLayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            TransportLayerKind::Ice => IceLayer::ID,
            TransportLayerKind::Dtls => DtlsLayer::ID,
        };
        write!(f, "{s}")
    }
}

/// TransportLayer is one link of a transport flow's layer chain. Layers are
/// started bottom up once the chain has been pushed into a flow.
#[async_trait]
pub trait TransportLayer: Send + Sync {
    fn id(&self) -> &'static str;

    fn kind(&self) -> TransportLayerKind;

    /// start brings the layer up. It resolves when the layer is usable by the
    /// layer above it, or fails terminally.
    async fn start(&self, flow_id: &str) -> Result<()>;

    /// srtp_protection_profile returns the profile negotiated by a security
    /// layer after it started.
    fn srtp_protection_profile(&self) -> Option<SrtpProtectionProfile> {
        None
    }
}

/// IceLayer binds a flow to one component of the session's ICE media stream.
pub struct IceLayer {
    session_handle: String,
    remote_parameters: RTCIceParameters,
    ice_context: Option<Arc<dyn IceContext>>,
    media_stream: Option<Arc<dyn IceMediaStream>>,
    component: u16,
}

impl IceLayer {
    pub const ID: &'static str = "ice";

    pub fn new(session_handle: impl Into<String>, remote_parameters: RTCIceParameters) -> Self {
        IceLayer {
            session_handle: session_handle.into(),
            remote_parameters,
            ice_context: None,
            media_stream: None,
            component: 0,
        }
    }

    /// set_parameters attaches the layer to the connectivity machinery. The
    /// ICE context is only safe to touch from the network context.
    pub fn set_parameters(
        &mut self,
        ice_context: Arc<dyn IceContext>,
        media_stream: Arc<dyn IceMediaStream>,
        component: u16,
    ) {
        self.ice_context = Some(ice_context);
        self.media_stream = Some(media_stream);
        self.component = component;
    }

    pub fn session_handle(&self) -> &str {
        &self.session_handle
    }

    pub fn component(&self) -> u16 {
        self.component
    }
}

#[async_trait]
impl TransportLayer for IceLayer {
    fn id(&self) -> &'static str {
        IceLayer::ID
    }

    fn kind(&self) -> TransportLayerKind {
        TransportLayerKind::Ice
    }

    async fn start(&self, flow_id: &str) -> Result<()> {
        let (ice_context, media_stream) = match (&self.ice_context, &self.media_stream) {
            (Some(ctx), Some(stream)) => (ctx, stream),
            _ => {
                return Err(Error::ErrIceConnectivity(format!(
                    "{flow_id}: ice parameters were never set"
                )))
            }
        };

        log::debug!(
            "{flow_id}: connecting ice component {} of level {} in {}",
            self.component,
            media_stream.level(),
            ice_context.name()
        );
        media_stream
            .connect(self.component, &self.remote_parameters)
            .await
    }
}

/// DtlsLayer authenticates the peer over the ICE component below it and
/// derives the SRTP keying material.
pub struct DtlsLayer {
    engine: Arc<dyn DtlsEngine>,
    role: DTLSRole,
    identity: Option<Arc<DtlsIdentity>>,
    verification_digests: Vec<VerificationDigest>,
    srtp_protection_profiles: Vec<SrtpProtectionProfile>,
    negotiated: OnceLock<SrtpProtectionProfile>,
}

impl DtlsLayer {
    pub const ID: &'static str = "dtls";

    pub fn new(engine: Arc<dyn DtlsEngine>) -> Self {
        DtlsLayer {
            engine,
            role: DTLSRole::Server,
            identity: None,
            verification_digests: vec![],
            srtp_protection_profiles: vec![],
            negotiated: OnceLock::new(),
        }
    }

    pub fn set_role(&mut self, role: DTLSRole) {
        self.role = role.layer_role();
    }

    pub fn role(&self) -> DTLSRole {
        self.role
    }

    pub fn set_identity(&mut self, identity: Arc<DtlsIdentity>) {
        self.identity = Some(identity);
    }

    /// set_verification_digest adds a digest the remote certificate may match.
    pub fn set_verification_digest(&mut self, algorithm: &str, digest: &[u8]) -> Result<()> {
        let expected = digest_length(algorithm)
            .ok_or_else(|| Error::ErrUnsupportedHashAlgorithm(algorithm.to_owned()))?;
        if digest.len() != expected || digest.len() > MAX_DIGEST_LENGTH {
            return Err(Error::ErrInvalidVerificationDigest {
                algorithm: algorithm.to_owned(),
                expected,
                actual: digest.len(),
            });
        }

        self.verification_digests.push(VerificationDigest {
            algorithm: algorithm.to_ascii_lowercase(),
            digest: digest.to_vec(),
        });
        Ok(())
    }

    pub fn verification_digests(&self) -> &[VerificationDigest] {
        &self.verification_digests
    }

    /// set_srtp_ciphers sets the protection profiles offered in the use_srtp
    /// extension, in preference order.
    pub fn set_srtp_ciphers(&mut self, profiles: Vec<SrtpProtectionProfile>) -> Result<()> {
        if profiles.is_empty() {
            return Err(Error::ErrInvalidSrtpCiphers(
                "no protection profiles offered".to_owned(),
            ));
        }
        for (i, profile) in profiles.iter().enumerate() {
            if profiles[..i].contains(profile) {
                return Err(Error::ErrInvalidSrtpCiphers(format!(
                    "{profile} offered twice"
                )));
            }
        }

        self.srtp_protection_profiles = profiles;
        Ok(())
    }

    pub fn srtp_ciphers(&self) -> &[SrtpProtectionProfile] {
        &self.srtp_protection_profiles
    }
}

#[async_trait]
impl TransportLayer for DtlsLayer {
    fn id(&self) -> &'static str {
        DtlsLayer::ID
    }

    fn kind(&self) -> TransportLayerKind {
        TransportLayerKind::Dtls
    }

    async fn start(&self, flow_id: &str) -> Result<()> {
        let identity = self.identity.clone().ok_or(Error::ErrMissingIdentity)?;
        let params = DTLSParameters {
            role: self.role,
            identity,
            verification_digests: self.verification_digests.clone(),
            srtp_protection_profiles: self.srtp_protection_profiles.clone(),
        };

        log::debug!("{flow_id}: starting dtls handshake as {}", self.role);
        let profile = self.engine.handshake(flow_id, &params).await?;
        if !self.srtp_protection_profiles.contains(&profile) {
            return Err(Error::ErrHandshakeFailed(format!(
                "peer selected {profile} which was not offered"
            )));
        }

        let _ = self.negotiated.set(profile);
        log::debug!("{flow_id}: dtls established with {profile}");
        Ok(())
    }

    fn srtp_protection_profile(&self) -> Option<SrtpProtectionProfile> {
        self.negotiated.get().copied()
    }
}
