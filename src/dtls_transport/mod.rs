pub mod dtls_fingerprint;
pub mod dtls_role;
pub mod identity;
pub mod srtp_protection_profile;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use dtls_role::DTLSRole;
use identity::DtlsIdentity;
use srtp_protection_profile::SrtpProtectionProfile;

/// VerificationDigest is a decoded remote fingerprint the handshake must
/// match the peer certificate against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationDigest {
    pub algorithm: String,
    pub digest: Vec<u8>,
}

/// DTLSParameters is everything a security layer hands to the handshake engine.
#[derive(Debug, Clone)]
pub struct DTLSParameters {
    pub role: DTLSRole,
    pub identity: Arc<DtlsIdentity>,
    pub verification_digests: Vec<VerificationDigest>,
    pub srtp_protection_profiles: Vec<SrtpProtectionProfile>,
}

/// DtlsEngine runs the DTLS handshake over an established connectivity
/// component and derives the SRTP keys. Retries and timeouts belong to the
/// engine; only terminal failures surface here.
#[async_trait]
pub trait DtlsEngine: Send + Sync {
    /// handshake resolves with the negotiated SRTP protection profile once
    /// the remote certificate has been verified and keys are derived.
    async fn handshake(
        &self,
        flow_id: &str,
        params: &DTLSParameters,
    ) -> Result<SrtpProtectionProfile>;
}
