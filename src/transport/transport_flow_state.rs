use std::fmt;

use serde::{Deserialize, Serialize};

/// TransportFlowState indicates how far a transport flow got establishing
/// its secured channel.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportFlowState {
    #[default]
    Unspecified = 0,

    /// TransportFlowStateCreated indicates the flow is registered but its
    /// layers were not pushed yet.
    Created = 1,

    /// TransportFlowStateLayersPushed indicates the connectivity layer is
    /// parameterized and the security layer is pushed; the handshake runs.
    LayersPushed = 2,

    /// TransportFlowStateEstablished indicates the handshake completed and
    /// SRTP keys are derived.
    Established = 3,

    /// TransportFlowStateClosed indicates the flow was closed intentionally.
    Closed = 4,

    /// TransportFlowStateFailed indicates connectivity or the handshake
    /// failed terminally.
    Failed = 5,
}

const TRANSPORT_FLOW_STATE_CREATED_STR: &str = "created";
const TRANSPORT_FLOW_STATE_LAYERS_PUSHED_STR: &str = "layers-pushed";
const TRANSPORT_FLOW_STATE_ESTABLISHED_STR: &str = "established";
const TRANSPORT_FLOW_STATE_CLOSED_STR: &str = "closed";
const TRANSPORT_FLOW_STATE_FAILED_STR: &str = "failed";

impl From<&str> for TransportFlowState {
    fn from(raw: &str) -> Self {
        match raw {
            TRANSPORT_FLOW_STATE_CREATED_STR => TransportFlowState::Created,
            TRANSPORT_FLOW_STATE_LAYERS_PUSHED_STR => TransportFlowState::LayersPushed,
            TRANSPORT_FLOW_STATE_ESTABLISHED_STR => TransportFlowState::Established,
            TRANSPORT_FLOW_STATE_CLOSED_STR => TransportFlowState::Closed,
            TRANSPORT_FLOW_STATE_FAILED_STR => TransportFlowState::Failed,
            _ => TransportFlowState::Unspecified,
        }
    }
}

impl From<u8> for TransportFlowState {
    fn from(v: u8) -> Self {
        match v {
            1 => TransportFlowState::Created,
            2 => TransportFlowState::LayersPushed,
            3 => TransportFlowState::Established,
            4 => TransportFlowState::Closed,
            5 => TransportFlowState::Failed,
            _ => TransportFlowState::Unspecified,
        }
    }
}

impl fmt::Display for TransportFlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            TransportFlowState::Created => TRANSPORT_FLOW_STATE_CREATED_STR,
            TransportFlowState::LayersPushed => TRANSPORT_FLOW_STATE_LAYERS_PUSHED_STR,
            TransportFlowState::Established => TRANSPORT_FLOW_STATE_ESTABLISHED_STR,
            TransportFlowState::Closed => TRANSPORT_FLOW_STATE_CLOSED_STR,
            TransportFlowState::Failed => TRANSPORT_FLOW_STATE_FAILED_STR,
            TransportFlowState::Unspecified => crate::UNSPECIFIED_STR,
        };
        write!(f, "{s}")
    }
}

impl TransportFlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransportFlowState::Closed | TransportFlowState::Failed)
    }

    /// can_transition_to reports whether `next` is a legal successor. The
    /// establishment states only move forward one step at a time, and any
    /// live state may close or fail.
    pub(crate) fn can_transition_to(&self, next: TransportFlowState) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            TransportFlowState::Closed | TransportFlowState::Failed => true,
            TransportFlowState::Unspecified => false,
            _ => next as u8 == *self as u8 + 1,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_transport_flow_state() {
        let tests = vec![
            (crate::UNSPECIFIED_STR, TransportFlowState::Unspecified),
            ("created", TransportFlowState::Created),
            ("layers-pushed", TransportFlowState::LayersPushed),
            ("established", TransportFlowState::Established),
            ("closed", TransportFlowState::Closed),
            ("failed", TransportFlowState::Failed),
        ];

        for (state_string, expected_state) in tests {
            assert_eq!(
                TransportFlowState::from(state_string),
                expected_state,
                "testCase: {expected_state}",
            );
            assert_eq!(TransportFlowState::from(expected_state as u8), expected_state);
        }
    }

    #[test]
    fn test_transport_flow_state_string() {
        let tests = vec![
            (TransportFlowState::Unspecified, crate::UNSPECIFIED_STR),
            (TransportFlowState::Created, "created"),
            (TransportFlowState::LayersPushed, "layers-pushed"),
            (TransportFlowState::Established, "established"),
            (TransportFlowState::Closed, "closed"),
            (TransportFlowState::Failed, "failed"),
        ];

        for (state, expected_string) in tests {
            assert_eq!(state.to_string(), expected_string)
        }
    }

    #[test]
    fn test_transport_flow_state_transitions() {
        use TransportFlowState::*;

        let tests = vec![
            (Created, LayersPushed, true),
            (Created, Established, false),
            (LayersPushed, Established, true),
            (Established, LayersPushed, false),
            (Established, Closed, true),
            (LayersPushed, Failed, true),
            (Closed, Established, false),
            (Failed, Closed, false),
            (Created, Unspecified, false),
        ];

        for (from, to, expected) in tests {
            assert_eq!(from.can_transition_to(to), expected, "{from} -> {to}");
        }
    }
}
