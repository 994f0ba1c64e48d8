use serde::{Deserialize, Serialize};

/// RTCIceParameters includes the ICE username fragment and password of the
/// remote side of one transport association.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCIceParameters {
    pub username_fragment: String,
    pub password: String,
    pub ice_lite: bool,
}

impl RTCIceParameters {
    /// is_complete reports whether both credentials were negotiated.
    pub fn is_complete(&self) -> bool {
        !self.username_fragment.is_empty() && !self.password.is_empty()
    }
}
