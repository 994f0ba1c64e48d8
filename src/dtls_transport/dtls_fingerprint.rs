use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest digest a verification target may carry (sha-512).
pub const MAX_DIGEST_LENGTH: usize = 64;

/// DTLSFingerprint specifies the hash function algorithm and certificate
/// fingerprint as described in [RFC 4572].
///
/// ## Specifications
///
/// * [W3C]
///
/// [W3C]: https://w3c.github.io/webrtc-pc/#rtcdtlsfingerprint
/// [RFC 4572]: https://tools.ietf.org/html/rfc4572
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCDtlsFingerprint {
    /// Algorithm specifies one of the the hash function algorithms defined in
    /// the 'Hash function Textual Names' registry.
    pub algorithm: String,

    /// Value specifies the value of the certificate fingerprint in lowercase
    /// hex string as expressed utilizing the syntax of 'fingerprint' in
    /// <https://tools.ietf.org/html/rfc4572#section-5>.
    pub value: String,
}

/// digest_length returns the output size of a registered hash function.
pub fn digest_length(algorithm: &str) -> Option<usize> {
    match algorithm.to_ascii_lowercase().as_str() {
        "sha-1" => Some(20),
        "sha-224" => Some(28),
        "sha-256" => Some(32),
        "sha-384" => Some(48),
        "sha-512" => Some(64),
        _ => None,
    }
}

/// FingerprintDecoder turns the textual digest of a fingerprint into raw bytes.
pub trait FingerprintDecoder: Send + Sync {
    /// decode returns at most `max_len` bytes or ErrFingerprintDecode.
    fn decode(&self, fingerprint: &str, max_len: usize) -> Result<Vec<u8>>;
}

/// HexFingerprintDecoder decodes the colon separated hex pairs of RFC 4572,
/// e.g. `AB:CD:01`. Case is ignored.
#[derive(Default, Debug, Clone, Copy)]
pub struct HexFingerprintDecoder;

impl FingerprintDecoder for HexFingerprintDecoder {
    fn decode(&self, fingerprint: &str, max_len: usize) -> Result<Vec<u8>> {
        if fingerprint.is_empty() {
            return Err(Error::ErrFingerprintDecode("empty fingerprint".to_owned()));
        }

        let mut digest = Vec::with_capacity(max_len);
        for pair in fingerprint.split(':') {
            if pair.len() != 2 {
                return Err(Error::ErrFingerprintDecode(format!(
                    "malformed octet {pair:?} in {fingerprint}"
                )));
            }
            if digest.len() == max_len {
                return Err(Error::ErrFingerprintDecode(format!(
                    "fingerprint longer than {max_len} bytes"
                )));
            }
            let octet =
                hex::decode(pair).map_err(|e| Error::ErrFingerprintDecode(e.to_string()))?;
            digest.extend(octet);
        }

        Ok(digest)
    }
}
