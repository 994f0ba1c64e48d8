#[cfg(test)]
mod codec_test;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rtp_transceiver::rtp_codec::{CodecDescription, RTPCodecType};
use crate::rtp_transceiver::{PayloadType, RTCPFeedback};

/// AudioCodecConfig is the pipeline level configuration of one audio codec.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioCodecConfig {
    pub payload_type: PayloadType,
    pub name: String,
    pub clock_rate: u32,
    pub packet_size: u32,
    pub channels: u16,
    pub bitrate: u32,
}

/// VideoCodecConfig is the pipeline level configuration of one video codec.
///
/// Only the payload type and name are negotiated today. Feedback mechanisms
/// and the frame size and rate limits are left at neutral values until the
/// offer/answer engine reports them, so callers must not treat them as
/// agreed with the remote side.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCodecConfig {
    pub payload_type: PayloadType,
    pub name: String,
    pub rtcp_feedback: Vec<RTCPFeedback>,
    pub max_frame_size: u32,
    pub max_frame_rate: u32,
}

fn media_type_mismatch(desc: &CodecDescription, expected: RTPCodecType) -> Error {
    log::error!(
        "codec {} is {}, can't convert it into a {} config",
        desc.name(),
        desc.media_type(),
        expected
    );
    Error::ErrCodecMediaTypeMismatch {
        name: desc.name().to_owned(),
        expected: expected.to_string(),
        actual: desc.media_type().to_string(),
    }
}

impl TryFrom<&CodecDescription> for AudioCodecConfig {
    type Error = Error;

    fn try_from(desc: &CodecDescription) -> Result<Self> {
        match desc {
            CodecDescription::Audio(d) => Ok(AudioCodecConfig {
                payload_type: d.payload_type,
                name: d.name.clone(),
                clock_rate: d.clock_rate,
                packet_size: d.packet_size,
                channels: d.channels,
                bitrate: d.bitrate,
            }),
            _ => Err(media_type_mismatch(desc, RTPCodecType::Audio)),
        }
    }
}

impl TryFrom<&CodecDescription> for VideoCodecConfig {
    type Error = Error;

    fn try_from(desc: &CodecDescription) -> Result<Self> {
        match desc {
            CodecDescription::Video(d) => Ok(VideoCodecConfig {
                payload_type: d.payload_type,
                name: d.name.clone(),
                // TODO: carry the negotiated rtcp-fb list and the fmtp
                // max-fs/max-fr limits once the session description exposes them.
                rtcp_feedback: vec![],
                max_frame_size: 0,
                max_frame_rate: 0,
            }),
            _ => Err(media_type_mismatch(desc, RTPCodecType::Video)),
        }
    }
}

/// translate converts a negotiated codec description into the config variant
/// the caller asks for, e.g. `translate::<AudioCodecConfig>(&desc)`.
pub fn translate<'a, C>(desc: &'a CodecDescription) -> Result<C>
where
    C: TryFrom<&'a CodecDescription, Error = Error>,
{
    C::try_from(desc)
}

/// translate_all converts a whole codec list, stopping at the first failure.
pub fn translate_all<'a, C>(descs: &'a [CodecDescription]) -> Result<Vec<C>>
where
    C: TryFrom<&'a CodecDescription, Error = Error>,
{
    descs.iter().map(translate).collect()
}
