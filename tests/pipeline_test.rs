use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use webrtc_pipeline::api::{APIBuilder, SessionMediaOptions};
use webrtc_pipeline::dtls_transport::dtls_fingerprint::RTCDtlsFingerprint;
use webrtc_pipeline::dtls_transport::dtls_role::DTLSRole;
use webrtc_pipeline::dtls_transport::srtp_protection_profile::SrtpProtectionProfile;
use webrtc_pipeline::dtls_transport::{DTLSParameters, DtlsEngine};
use webrtc_pipeline::error::{Error, Result};
use webrtc_pipeline::ice_transport::ice_parameters::RTCIceParameters;
use webrtc_pipeline::ice_transport::{IceContext, IceMediaStream};
use webrtc_pipeline::media_stream::{MediaSink, MediaSource};
use webrtc_pipeline::peer_connection::MediaPipelineFactory;
use webrtc_pipeline::pipeline::MediaPipelineState;
use webrtc_pipeline::rtp_transceiver::rtp_codec::{
    AudioCodecDescription, CodecDescription, RTPCodecType, VideoCodecDescription,
};
use webrtc_pipeline::rtp_transceiver::track_pair::{
    TrackDirection, TrackPair, TransportAssociation,
};
use webrtc_pipeline::transport::TransportFlowState;

struct LoopbackIce;

impl IceContext for LoopbackIce {
    fn name(&self) -> &str {
        "loopback"
    }

    fn media_stream(&self, level: usize) -> Option<Arc<dyn IceMediaStream>> {
        Some(Arc::new(LoopbackStream { level }))
    }
}

struct LoopbackStream {
    level: usize,
}

#[async_trait]
impl IceMediaStream for LoopbackStream {
    fn level(&self) -> usize {
        self.level
    }

    async fn connect(&self, _component: u16, _remote: &RTCIceParameters) -> Result<()> {
        Ok(())
    }
}

struct AcceptingDtls;

#[async_trait]
impl DtlsEngine for AcceptingDtls {
    async fn handshake(
        &self,
        flow_id: &str,
        params: &DTLSParameters,
    ) -> Result<SrtpProtectionProfile> {
        params
            .srtp_protection_profiles
            .first()
            .copied()
            .ok_or_else(|| Error::ErrHandshakeFailed(flow_id.to_owned()))
    }
}

struct Microphone;

impl MediaSource for Microphone {
    fn id(&self) -> &str {
        "microphone"
    }
}

struct Renderer;

impl MediaSink for Renderer {
    fn id(&self) -> &str {
        "renderer"
    }
}

fn association() -> Arc<TransportAssociation> {
    Arc::new(TransportAssociation {
        role: DTLSRole::Server,
        fingerprints: vec![RTCDtlsFingerprint {
            algorithm: "sha-256".to_owned(),
            value: vec!["5E"; 32].join(":"),
        }],
        ice_parameters: RTCIceParameters {
            username_fragment: "u1".to_owned(),
            password: "p1p1p1p1p1p1p1p1p1p1p1".to_owned(),
            ice_lite: false,
        },
    })
}

fn track(
    level: usize,
    media_type: RTPCodecType,
    direction: TrackDirection,
    codecs: Vec<CodecDescription>,
) -> TrackPair {
    TrackPair {
        level,
        media_type,
        direction,
        rtp_transport: association(),
        rtcp_transport: Some(association()),
        rtcp_mux: false,
        codecs,
    }
}

#[tokio::test]
async fn test_audio_send_and_video_receive() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let api = APIBuilder::new()
        .with_dtls_engine(Arc::new(AcceptingDtls))
        .build();
    let session = api.new_session_media("e2e", Arc::new(LoopbackIce), SessionMediaOptions::default())?;
    session.add_local_stream(Arc::new(Microphone)).await;
    session.add_remote_stream(Arc::new(Renderer)).await;

    let factory = MediaPipelineFactory::new(Arc::clone(&session));
    factory
        .create_media_pipeline(&track(
            0,
            RTPCodecType::Audio,
            TrackDirection::Sending,
            vec![CodecDescription::Audio(AudioCodecDescription {
                payload_type: 109,
                name: "opus".to_owned(),
                clock_rate: 48000,
                packet_size: 960,
                channels: 2,
                bitrate: 40000,
            })],
        ))
        .await?;
    factory
        .create_media_pipeline(&track(
            1,
            RTPCodecType::Video,
            TrackDirection::Receiving,
            vec![CodecDescription::Video(VideoCodecDescription {
                payload_type: 120,
                name: "VP8".to_owned(),
                clock_rate: 90000,
                ..Default::default()
            })],
        ))
        .await?;

    let flows = session.transport_flows().flows().await;
    let ids: Vec<&str> = flows.iter().map(|f| f.id()).collect();
    assert_eq!(ids, vec!["e2e:0,rtp", "e2e:0,rtcp", "e2e:1,rtp", "e2e:1,rtcp"]);
    for flow in &flows {
        flow.wait_established().await?;
        assert_eq!(flow.state(), TransportFlowState::Established);
        assert_eq!(
            flow.srtp_protection_profile(),
            Some(SrtpProtectionProfile::Srtp_Aes128_Cm_Hmac_Sha1_80)
        );
    }

    let conduits = session.conduits().conduits().await;
    assert_eq!(conduits.len(), 2);
    assert_eq!(conduits[0].media_type(), RTPCodecType::Audio);
    assert_eq!(conduits[0].direction(), TrackDirection::Sending);
    assert_eq!(conduits[1].media_type(), RTPCodecType::Video);
    assert_eq!(conduits[1].direction(), TrackDirection::Receiving);
    for conduit in &conduits {
        assert!(!conduit.is_linked().await);
    }

    let local = session
        .get_local_stream(0)
        .await
        .ok_or(Error::ErrLocalStreamNotFound(0))?;
    let remote = session
        .get_remote_stream(0)
        .await
        .ok_or(Error::ErrRemoteStreamNotFound(0))?;
    let sending = local
        .get_pipeline(0)
        .await
        .ok_or(Error::ErrLocalStreamNotFound(0))?;
    let receiving = remote
        .get_pipeline(1)
        .await
        .ok_or(Error::ErrRemoteStreamNotFound(0))?;
    assert_eq!(sending.pipeline().track_id(), 1);
    assert_eq!(receiving.pipeline().track_id(), 2);

    for _ in 0..200 {
        if sending.pipeline().state() == MediaPipelineState::Active
            && receiving.pipeline().state() == MediaPipelineState::Active
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(sending.pipeline().state(), MediaPipelineState::Active);
    assert_eq!(receiving.pipeline().state(), MediaPipelineState::Active);

    let report = session.get_stats().await;
    assert_eq!(report.reports.len(), 8);

    session.close().await;
    assert_eq!(receiving.pipeline().state(), MediaPipelineState::TornDown);
    for flow in &flows {
        assert_eq!(flow.state(), TransportFlowState::Closed);
    }

    Ok(())
}
