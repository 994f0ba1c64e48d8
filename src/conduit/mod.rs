//! Codec processing sessions
//!
//! A conduit is the media engine session of one media type bound to one
//! direction of one level. Send and receive conduits of a level are linked
//! to each other without keeping each other alive.


pub mod audio_conduit;
pub mod conduit_factory;
pub mod external_codec;
pub mod video_conduit;

use std::collections::HashSet;
use std::sync::Arc;

pub use audio_conduit::AudioSessionConduit;
pub use conduit_factory::ConduitFactory;
pub use external_codec::{
    ExternalCodecProvider, ExternalCodecResolver, VideoDecoder, VideoEncoder,
};
pub use video_conduit::VideoSessionConduit;

use crate::codec::{AudioCodecConfig, VideoCodecConfig};
use crate::error::{Error, Result};
use crate::rtp_transceiver::rtp_codec::RTPCodecType;
use crate::rtp_transceiver::track_pair::TrackDirection;
use crate::rtp_transceiver::PayloadType;

/// MediaConduit is a shared handle on an audio or a video conduit.
#[derive(Debug, Clone)]
pub enum MediaConduit {
    Audio(Arc<AudioSessionConduit>),
    Video(Arc<VideoSessionConduit>),
}

impl MediaConduit {
    pub fn media_type(&self) -> RTPCodecType {
        match self {
            MediaConduit::Audio(_) => RTPCodecType::Audio,
            MediaConduit::Video(_) => RTPCodecType::Video,
        }
    }

    pub fn level(&self) -> usize {
        match self {
            MediaConduit::Audio(c) => c.level(),
            MediaConduit::Video(c) => c.level(),
        }
    }

    pub fn direction(&self) -> TrackDirection {
        match self {
            MediaConduit::Audio(c) => c.direction(),
            MediaConduit::Video(c) => c.direction(),
        }
    }

    pub fn is_shutdown(&self) -> bool {
        match self {
            MediaConduit::Audio(c) => c.is_shutdown(),
            MediaConduit::Video(c) => c.is_shutdown(),
        }
    }

    pub async fn is_linked(&self) -> bool {
        match self {
            MediaConduit::Audio(c) => c.other().await.is_some(),
            MediaConduit::Video(c) => c.other().await.is_some(),
        }
    }

    pub async fn shutdown(&self) {
        match self {
            MediaConduit::Audio(c) => c.shutdown().await,
            MediaConduit::Video(c) => c.shutdown().await,
        }
    }

    /// same_conduit reports whether both handles point at one conduit.
    pub fn same_conduit(&self, other: &MediaConduit) -> bool {
        match (self, other) {
            (MediaConduit::Audio(a), MediaConduit::Audio(b)) => Arc::ptr_eq(a, b),
            (MediaConduit::Video(a), MediaConduit::Video(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_audio(&self) -> Option<&Arc<AudioSessionConduit>> {
        match self {
            MediaConduit::Audio(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_video(&self) -> Option<&Arc<VideoSessionConduit>> {
        match self {
            MediaConduit::Video(c) => Some(c),
            _ => None,
        }
    }
}

/// ConduitCodec is the part of a codec config a conduit validates.
pub(crate) trait ConduitCodec {
    fn payload_type(&self) -> PayloadType;
    fn name(&self) -> &str;
    /// defect describes why the media engine can't use this config.
    fn defect(&self) -> Option<String>;
}

impl ConduitCodec for AudioCodecConfig {
    fn payload_type(&self) -> PayloadType {
        self.payload_type
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn defect(&self) -> Option<String> {
        if self.name.is_empty() {
            Some(format!("payload type {} has no name", self.payload_type))
        } else if self.clock_rate == 0 {
            Some(format!("{} has no clock rate", self.name))
        } else if self.channels == 0 {
            Some(format!("{} has no channels", self.name))
        } else {
            None
        }
    }
}

impl ConduitCodec for VideoCodecConfig {
    fn payload_type(&self) -> PayloadType {
        self.payload_type
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn defect(&self) -> Option<String> {
        if self.name.is_empty() {
            Some(format!("payload type {} has no name", self.payload_type))
        } else {
            None
        }
    }
}

pub(crate) fn validate_recv_codecs<C: ConduitCodec>(codecs: &[C]) -> Result<()> {
    if codecs.is_empty() {
        return Err(Error::ErrNoCodecs);
    }

    let mut payload_types = HashSet::new();
    for codec in codecs {
        if let Some(defect) = codec.defect() {
            return Err(Error::ErrInvalidReceiveCodec(defect));
        }
        if !payload_types.insert(codec.payload_type()) {
            return Err(Error::ErrInvalidReceiveCodec(format!(
                "payload type {} used by more than one codec",
                codec.payload_type()
            )));
        }
    }
    Ok(())
}

pub(crate) fn validate_send_codec<C: ConduitCodec>(codec: &C) -> Result<()> {
    match codec.defect() {
        Some(defect) => Err(Error::ErrInvalidSendCodec(defect)),
        None => Ok(()),
    }
}

pub(crate) fn ensure_direction(
    actual: TrackDirection,
    expected: TrackDirection,
    what: &str,
) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(Error::ErrConduitMismatch(format!(
            "can't {what} on a {actual} conduit"
        )))
    }
}
