use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::rtp_codec::{CodecDescription, RTPCodecType};
use crate::dtls_transport::dtls_fingerprint::RTCDtlsFingerprint;
use crate::dtls_transport::dtls_role::DTLSRole;
use crate::ice_transport::ice_parameters::RTCIceParameters;

/// TrackDirection is the direction media flows on a negotiated track.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackDirection {
    #[default]
    Sending,
    Receiving,
}

const TRACK_DIRECTION_SENDING_STR: &str = "sending";
const TRACK_DIRECTION_RECEIVING_STR: &str = "receiving";

impl TrackDirection {
    /// opposite returns the direction of the paired conduit on the same level.
    pub fn opposite(&self) -> Self {
        match *self {
            TrackDirection::Sending => TrackDirection::Receiving,
            TrackDirection::Receiving => TrackDirection::Sending,
        }
    }
}

impl fmt::Display for TrackDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            TrackDirection::Sending => TRACK_DIRECTION_SENDING_STR,
            TrackDirection::Receiving => TRACK_DIRECTION_RECEIVING_STR,
        };
        write!(f, "{s}")
    }
}

/// TransportAssociation carries the negotiated transport attributes of one
/// RTP or RTCP channel: the DTLS setup role, the remote fingerprints and the
/// remote ICE credentials.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportAssociation {
    pub role: DTLSRole,
    pub fingerprints: Vec<RTCDtlsFingerprint>,
    pub ice_parameters: RTCIceParameters,
}

/// TrackPair is one negotiated track as the offer/answer engine hands it
/// over. It is read-only for the pipeline subsystem.
#[derive(Debug, Clone)]
pub struct TrackPair {
    pub level: usize,
    pub media_type: RTPCodecType,
    pub direction: TrackDirection,
    pub rtp_transport: Arc<TransportAssociation>,
    pub rtcp_transport: Option<Arc<TransportAssociation>>,
    pub rtcp_mux: bool,
    pub codecs: Vec<CodecDescription>,
}

impl TrackPair {
    /// track_id is the one-based slot the pipeline of this pair is stored at.
    pub fn track_id(&self) -> usize {
        self.level + 1
    }

    /// needs_rtcp_flow reports whether RTCP runs on a flow of its own.
    pub fn needs_rtcp_flow(&self) -> bool {
        self.rtcp_transport.is_some() && !self.rtcp_mux
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pair(rtcp: bool, rtcp_mux: bool) -> TrackPair {
        let association = Arc::new(TransportAssociation::default());
        TrackPair {
            level: 3,
            media_type: RTPCodecType::Audio,
            direction: TrackDirection::Sending,
            rtp_transport: Arc::clone(&association),
            rtcp_transport: if rtcp { Some(association) } else { None },
            rtcp_mux,
            codecs: vec![],
        }
    }

    #[test]
    fn test_track_direction() {
        assert_eq!(TrackDirection::Sending.opposite(), TrackDirection::Receiving);
        assert_eq!(TrackDirection::Receiving.opposite(), TrackDirection::Sending);
        assert_eq!(TrackDirection::Sending.to_string(), "sending");
        assert_eq!(TrackDirection::Receiving.to_string(), "receiving");
    }

    #[test]
    fn test_track_pair_rtcp_flow() {
        let tests = vec![
            (false, false, false),
            (false, true, false),
            (true, false, true),
            (true, true, false),
        ];

        for (rtcp, rtcp_mux, expected) in tests {
            assert_eq!(
                pair(rtcp, rtcp_mux).needs_rtcp_flow(),
                expected,
                "rtcp={rtcp} rtcp_mux={rtcp_mux}"
            );
        }
        assert_eq!(pair(false, false).track_id(), 4);
    }
}
