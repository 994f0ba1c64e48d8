use super::*;
use crate::rtp_transceiver::rtp_codec::{AudioCodecDescription, VideoCodecDescription};
use crate::rtp_transceiver::TYPE_RTCP_FB_NACK;

fn opus() -> CodecDescription {
    CodecDescription::Audio(AudioCodecDescription {
        payload_type: 109,
        name: "opus".to_owned(),
        clock_rate: 48000,
        packet_size: 960,
        channels: 2,
        bitrate: 40000,
    })
}

fn vp8() -> CodecDescription {
    CodecDescription::Video(VideoCodecDescription {
        payload_type: 120,
        name: "VP8".to_owned(),
        clock_rate: 90000,
        sdp_fmtp_line: "max-fs=12288;max-fr=60".to_owned(),
        rtcp_feedback: vec![RTCPFeedback {
            typ: TYPE_RTCP_FB_NACK.to_owned(),
            parameter: "pli".to_owned(),
        }],
    })
}

#[test]
fn test_translate_audio() -> Result<()> {
    let config: AudioCodecConfig = translate(&opus())?;
    assert_eq!(
        config,
        AudioCodecConfig {
            payload_type: 109,
            name: "opus".to_owned(),
            clock_rate: 48000,
            packet_size: 960,
            channels: 2,
            bitrate: 40000,
        }
    );
    Ok(())
}

#[test]
fn test_translate_video_uses_neutral_placeholders() -> Result<()> {
    let config: VideoCodecConfig = translate(&vp8())?;
    assert_eq!(config.payload_type, 120);
    assert_eq!(config.name, "VP8");
    assert!(config.rtcp_feedback.is_empty());
    assert_eq!(config.max_frame_size, 0);
    assert_eq!(config.max_frame_rate, 0);
    Ok(())
}

#[test]
fn test_translate_media_type_mismatch() {
    let result: Result<VideoCodecConfig> = translate(&opus());
    assert_eq!(
        result,
        Err(Error::ErrCodecMediaTypeMismatch {
            name: "opus".to_owned(),
            expected: "video".to_owned(),
            actual: "audio".to_owned(),
        })
    );

    let result: Result<AudioCodecConfig> = translate(&vp8());
    assert!(matches!(
        result,
        Err(Error::ErrCodecMediaTypeMismatch { .. })
    ));
}

#[test]
fn test_translate_all_stops_on_mismatch() -> Result<()> {
    let configs: Vec<AudioCodecConfig> = translate_all(&[opus(), opus()])?;
    assert_eq!(configs.len(), 2);

    let result: Result<Vec<AudioCodecConfig>> = translate_all(&[opus(), vp8()]);
    assert_eq!(
        result.map_err(|e| e.kind()),
        Err(crate::error::ErrorKind::CodecNegotiation)
    );
    Ok(())
}
