use std::fmt;

use thiserror::Error;

use crate::runtime::ExecutionContext;

pub type Result<T> = std::result::Result<T, Error>;

/// ErrorKind groups errors by how the caller is expected to react to them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or missing transport parameters. Not retried, the track's setup is aborted.
    Configuration,
    /// Codec list could not be mapped onto a conduit. Sibling tracks are unaffected.
    CodecNegotiation,
    /// A referenced stream bucket does not exist.
    ResourceUnavailable,
    /// A required precondition of the caller was not met.
    PreconditionViolation,
    /// Terminal connectivity or handshake failure reported by the transport.
    Transport,
    /// Execution context failures (thread gone, wrong thread).
    Runtime,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::CodecNegotiation => "codec-negotiation",
            ErrorKind::ResourceUnavailable => "resource-unavailable",
            ErrorKind::PreconditionViolation => "precondition-violation",
            ErrorKind::Transport => "transport",
            ErrorKind::Runtime => "runtime",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// ErrMissingIdentity indicates that no local DTLS identity was available
    /// when a transport flow was being built.
    #[error("no local DTLS identity available")]
    ErrMissingIdentity,

    /// ErrFingerprintDecode indicates that a remote fingerprint could not be
    /// converted from its textual form.
    #[error("could not convert fingerprint: {0}")]
    ErrFingerprintDecode(String),

    /// ErrUnsupportedHashAlgorithm indicates that a remote fingerprint uses a
    /// hash function which is not in the 'Hash function Textual Names' registry.
    #[error("unsupported fingerprint hash algorithm: {0}")]
    ErrUnsupportedHashAlgorithm(String),

    /// ErrInvalidVerificationDigest indicates that a decoded digest does not
    /// have the length its hash algorithm produces.
    #[error("verification digest for {algorithm} must be {expected} bytes, got {actual}")]
    ErrInvalidVerificationDigest {
        algorithm: String,
        expected: usize,
        actual: usize,
    },

    /// ErrInvalidSrtpCiphers indicates that the offered SRTP protection profile
    /// list is empty or malformed.
    #[error("couldn't set SRTP ciphers: {0}")]
    ErrInvalidSrtpCiphers(String),

    /// ErrNoCodecs is returned when a conduit is configured with an empty codec list.
    #[error("can't set up a conduit with 0 codecs")]
    ErrNoCodecs,

    /// ErrInvalidReceiveCodec indicates a receive codec the conduit can not handle.
    #[error("invalid receive codec: {0}")]
    ErrInvalidReceiveCodec(String),

    /// ErrInvalidSendCodec indicates a send codec the conduit can not handle.
    #[error("invalid send codec: {0}")]
    ErrInvalidSendCodec(String),

    /// ErrCodecMediaTypeMismatch is returned when a codec description is
    /// translated into the config variant of another media type.
    #[error("codec {name} is {actual}, expected {expected}")]
    ErrCodecMediaTypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// ErrLocalStreamNotFound indicates the local stream bucket does not exist.
    #[error("local stream {0} not found")]
    ErrLocalStreamNotFound(usize),

    /// ErrRemoteStreamNotFound indicates the remote stream bucket does not exist.
    #[error("remote stream {0} not found")]
    ErrRemoteStreamNotFound(usize),

    /// ErrMissingDocumentContext is returned when peer-identity gated media is
    /// set up without a privacy principal to attach to the pipeline.
    #[error("initializing sending pipeline without attached document context")]
    ErrMissingDocumentContext,

    /// ErrConduitMismatch indicates a conduit whose media type or direction
    /// does not match the pipeline it is bound to.
    #[error("conduit mismatch: {0}")]
    ErrConduitMismatch(String),

    /// ErrConduitShutdown indicates a conduit that was used after shutdown.
    #[error("conduit was shut down")]
    ErrConduitShutdown,

    /// ErrTransportNotReady indicates a flow that was closed or failed before
    /// the pipeline bound to it could be initialized.
    #[error("transport flow {0} is not ready")]
    ErrTransportNotReady(String),

    /// ErrTransportLayerOrder indicates that layers were pushed in an order
    /// other than connectivity then security.
    #[error("transport layers must be pushed as ice then dtls")]
    ErrTransportLayerOrder,

    /// ErrTransportLayersAlreadyPushed indicates a second push on the same flow.
    #[error("transport layers were already pushed")]
    ErrTransportLayersAlreadyPushed,

    /// ErrIceMediaStreamNotFound indicates that the ICE context has no media
    /// stream for the requested level.
    #[error("ICE media stream for level {0} not found")]
    ErrIceMediaStreamNotFound(usize),

    /// ErrIceConnectivity indicates the connectivity checks failed terminally.
    #[error("ICE connectivity failed: {0}")]
    ErrIceConnectivity(String),

    /// ErrHandshakeFailed indicates the DTLS handshake failed terminally.
    #[error("DTLS handshake failed: {0}")]
    ErrHandshakeFailed(String),

    /// ErrFlowClosed indicates an operation on a transport flow that was closed.
    #[error("transport flow closed")]
    ErrFlowClosed,

    /// ErrFlowFailed indicates that a transport flow reached the failed state.
    #[error("transport flow failed")]
    ErrFlowFailed,

    /// ErrInvalidPipelineStateTransition indicates a non-monotonic state change.
    #[error("invalid pipeline state transition from {from} to {to}")]
    ErrInvalidPipelineStateTransition { from: String, to: String },

    /// ErrWrongExecutionContext indicates a call made on the wrong thread.
    #[error("must be called on {expected} context, called on {actual}")]
    ErrWrongExecutionContext {
        expected: ExecutionContext,
        actual: ExecutionContext,
    },

    /// ErrSessionClosed indicates an operation executed after the session
    /// has already been closed.
    #[error("session closed")]
    ErrSessionClosed,

    /// ErrContextThreadShutdown indicates a dispatch to a thread which has
    /// already been shut down, or a task dropped before completion.
    #[error("execution context thread has shut down")]
    ErrContextThreadShutdown,

    #[error("certificate error: {0}")]
    ErrCertificate(String),

    #[error("IoError: {0}")]
    ErrIoError(String),

    #[error("Other errors: {0}")]
    ErrOthers(String),
}

impl Error {
    pub fn new(msg: String) -> Self {
        Error::ErrOthers(msg)
    }

    /// kind classifies the error for callers deciding whether to abort a
    /// track's setup or the whole session.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ErrMissingIdentity
            | Error::ErrFingerprintDecode(_)
            | Error::ErrUnsupportedHashAlgorithm(_)
            | Error::ErrInvalidVerificationDigest { .. }
            | Error::ErrInvalidSrtpCiphers(_)
            | Error::ErrCertificate(_) => ErrorKind::Configuration,

            Error::ErrNoCodecs
            | Error::ErrInvalidReceiveCodec(_)
            | Error::ErrInvalidSendCodec(_)
            | Error::ErrCodecMediaTypeMismatch { .. } => ErrorKind::CodecNegotiation,

            Error::ErrLocalStreamNotFound(_) | Error::ErrRemoteStreamNotFound(_) => {
                ErrorKind::ResourceUnavailable
            }

            Error::ErrMissingDocumentContext
            | Error::ErrConduitMismatch(_)
            | Error::ErrConduitShutdown
            | Error::ErrSessionClosed
            | Error::ErrInvalidPipelineStateTransition { .. } => ErrorKind::PreconditionViolation,

            Error::ErrTransportNotReady(_)
            | Error::ErrTransportLayerOrder
            | Error::ErrTransportLayersAlreadyPushed
            | Error::ErrIceMediaStreamNotFound(_)
            | Error::ErrIceConnectivity(_)
            | Error::ErrHandshakeFailed(_)
            | Error::ErrFlowClosed
            | Error::ErrFlowFailed => ErrorKind::Transport,

            Error::ErrWrongExecutionContext { .. }
            | Error::ErrContextThreadShutdown
            | Error::ErrIoError(_)
            | Error::ErrOthers(_) => ErrorKind::Runtime,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::ErrIoError(e.to_string())
    }
}

impl From<rcgen::Error> for Error {
    fn from(e: rcgen::Error) -> Self {
        Error::ErrCertificate(e.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_kind() {
        let tests = vec![
            (Error::ErrMissingIdentity, ErrorKind::Configuration),
            (
                Error::ErrFingerprintDecode("zz".to_owned()),
                ErrorKind::Configuration,
            ),
            (Error::ErrNoCodecs, ErrorKind::CodecNegotiation),
            (
                Error::ErrInvalidReceiveCodec("H264".to_owned()),
                ErrorKind::CodecNegotiation,
            ),
            (
                Error::ErrRemoteStreamNotFound(0),
                ErrorKind::ResourceUnavailable,
            ),
            (
                Error::ErrMissingDocumentContext,
                ErrorKind::PreconditionViolation,
            ),
            (Error::ErrSessionClosed, ErrorKind::PreconditionViolation),
            (Error::ErrFlowFailed, ErrorKind::Transport),
            (Error::ErrContextThreadShutdown, ErrorKind::Runtime),
        ];

        for (err, expected_kind) in tests {
            assert_eq!(err.kind(), expected_kind, "testCase: {err}");
        }
    }

    #[test]
    fn test_error_from_io() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert_eq!(err, Error::ErrIoError("boom".to_owned()));
        assert_eq!(err.kind(), ErrorKind::Runtime);
    }
}
