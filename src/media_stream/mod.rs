//! Local and remote media stream buckets
//!
//! The session's streams own the pipelines built for them, keyed by track
//! slot. Sources, sinks and the presentation context are supplied by the
//! embedder.


pub mod stream_info;

pub use stream_info::{LocalSourceStreamInfo, RemoteSourceStreamInfo};

use serde::{Deserialize, Serialize};

/// MediaSource is captured local media, e.g. a microphone or a camera.
pub trait MediaSource: Send + Sync {
    fn id(&self) -> &str;
}

/// MediaSink renders remote media.
pub trait MediaSink: Send + Sync {
    fn id(&self) -> &str;
}

/// Principal is the security origin owning a document and its media.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    origin: String,
}

impl Principal {
    pub fn new(origin: impl Into<String>) -> Self {
        Principal {
            origin: origin.into(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }
}

/// PresentationContext gives access to the document the session belongs to.
/// It must only be queried from the presentation context thread.
pub trait PresentationContext: Send + Sync {
    /// principal returns the document principal, or None when the session
    /// has no attached document.
    fn principal(&self) -> Option<Principal>;
}
