use std::fmt;

use serde::{Deserialize, Serialize};

use super::{PayloadType, RTCPFeedback};

/// RTPCodecType determines the type of a codec
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RTPCodecType {
    #[default]
    Unspecified = 0,

    /// RTPCodecTypeAudio indicates this is an audio codec
    Audio = 1,

    /// RTPCodecTypeVideo indicates this is a video codec
    Video = 2,
}

impl From<&str> for RTPCodecType {
    fn from(raw: &str) -> Self {
        match raw {
            "audio" => RTPCodecType::Audio,
            "video" => RTPCodecType::Video,
            _ => RTPCodecType::Unspecified,
        }
    }
}

impl From<u8> for RTPCodecType {
    fn from(v: u8) -> Self {
        match v {
            1 => RTPCodecType::Audio,
            2 => RTPCodecType::Video,
            _ => RTPCodecType::Unspecified,
        }
    }
}

impl fmt::Display for RTPCodecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            RTPCodecType::Audio => "audio",
            RTPCodecType::Video => "video",
            RTPCodecType::Unspecified => crate::UNSPECIFIED_STR,
        };
        write!(f, "{s}")
    }
}

/// AudioCodecDescription is a negotiated audio codec as the offer/answer
/// engine reports it.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioCodecDescription {
    pub payload_type: PayloadType,
    pub name: String,
    pub clock_rate: u32,
    pub packet_size: u32,
    pub channels: u16,
    pub bitrate: u32,
}

/// VideoCodecDescription is a negotiated video codec as the offer/answer
/// engine reports it.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCodecDescription {
    pub payload_type: PayloadType,
    pub name: String,
    pub clock_rate: u32,
    pub sdp_fmtp_line: String,
    pub rtcp_feedback: Vec<RTCPFeedback>,
}

/// CodecDescription is a transport agnostic codec entry of a track's
/// negotiated codec list, tagged with its media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodecDescription {
    Audio(AudioCodecDescription),
    Video(VideoCodecDescription),
}

impl CodecDescription {
    pub fn media_type(&self) -> RTPCodecType {
        match self {
            CodecDescription::Audio(_) => RTPCodecType::Audio,
            CodecDescription::Video(_) => RTPCodecType::Video,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CodecDescription::Audio(d) => &d.name,
            CodecDescription::Video(d) => &d.name,
        }
    }

    pub fn payload_type(&self) -> PayloadType {
        match self {
            CodecDescription::Audio(d) => d.payload_type,
            CodecDescription::Video(d) => d.payload_type,
        }
    }
}
