use std::sync::Arc;

use rand::Rng;
use sha2::{Digest, Sha256};

use super::dtls_fingerprint::RTCDtlsFingerprint;
use crate::error::Result;

const RUNES_ALPHA: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// math_rand_alpha generates a mathmatical random alphabet sequence of the requested length.
pub(crate) fn math_rand_alpha(n: usize) -> String {
    let mut rng = rand::rng();

    (0..n)
        .map(|_| {
            let idx = rng.random_range(0..RUNES_ALPHA.len());
            RUNES_ALPHA[idx] as char
        })
        .collect()
}

/// DtlsIdentity is the local credential material a DTLS layer authenticates
/// with: a DER certificate and its PKCS#8 private key.
#[derive(Clone)]
pub struct DtlsIdentity {
    certificate: Vec<u8>,
    private_key: Vec<u8>,
}

impl std::fmt::Debug for DtlsIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DtlsIdentity")
            .field("fingerprint", &self.fingerprint().value)
            .finish()
    }
}

impl PartialEq for DtlsIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.certificate == other.certificate
    }
}

impl DtlsIdentity {
    pub fn new(certificate: Vec<u8>, private_key: Vec<u8>) -> Self {
        DtlsIdentity {
            certificate,
            private_key,
        }
    }

    /// generate creates a self-signed identity with a random subject name.
    pub fn generate() -> Result<Self> {
        let certified = rcgen::generate_simple_self_signed(vec![math_rand_alpha(16)])?;

        Ok(DtlsIdentity {
            certificate: certified.cert.der().to_vec(),
            private_key: certified.key_pair.serialize_der(),
        })
    }

    pub fn certificate(&self) -> &[u8] {
        &self.certificate
    }

    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    /// fingerprint returns the sha-256 fingerprint of the certificate, the
    /// value a remote peer verifies against.
    pub fn fingerprint(&self) -> RTCDtlsFingerprint {
        let mut h = Sha256::new();
        h.update(&self.certificate);
        let hashed = h.finalize();
        let values: Vec<String> = hashed.iter().map(|x| format!("{x:02x}")).collect();

        RTCDtlsFingerprint {
            algorithm: "sha-256".to_owned(),
            value: values.join(":"),
        }
    }
}

/// IdentityProvider supplies the local key material of a session.
pub trait IdentityProvider: Send + Sync {
    fn identity(&self) -> Option<Arc<DtlsIdentity>>;
}

/// StaticIdentityProvider always hands out the identity it was built with.
pub struct StaticIdentityProvider {
    identity: Option<Arc<DtlsIdentity>>,
}

impl StaticIdentityProvider {
    pub fn new(identity: Option<Arc<DtlsIdentity>>) -> Self {
        StaticIdentityProvider { identity }
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn identity(&self) -> Option<Arc<DtlsIdentity>> {
        self.identity.clone()
    }
}
