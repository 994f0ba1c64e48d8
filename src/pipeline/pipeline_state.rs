use std::fmt;

use serde::{Deserialize, Serialize};

/// MediaPipelineState is the lifecycle of a send or receive pipeline. States
/// only move forward.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MediaPipelineState {
    #[default]
    Unspecified = 0,

    /// MediaPipelineStateConstructed indicates a pipeline bound to its
    /// conduit and flows but not yet checked.
    Constructed = 1,

    /// MediaPipelineStateInitialized indicates that conduit and flows were
    /// found compatible. The handshake may still be running.
    Initialized = 2,

    /// MediaPipelineStateActive indicates the RTP flow is established and
    /// media can flow.
    Active = 3,

    /// MediaPipelineStateTornDown indicates the pipeline released its flows.
    TornDown = 4,
}

const MEDIA_PIPELINE_STATE_CONSTRUCTED_STR: &str = "constructed";
const MEDIA_PIPELINE_STATE_INITIALIZED_STR: &str = "initialized";
const MEDIA_PIPELINE_STATE_ACTIVE_STR: &str = "active";
const MEDIA_PIPELINE_STATE_TORN_DOWN_STR: &str = "torn-down";

impl From<&str> for MediaPipelineState {
    fn from(raw: &str) -> Self {
        match raw {
            MEDIA_PIPELINE_STATE_CONSTRUCTED_STR => MediaPipelineState::Constructed,
            MEDIA_PIPELINE_STATE_INITIALIZED_STR => MediaPipelineState::Initialized,
            MEDIA_PIPELINE_STATE_ACTIVE_STR => MediaPipelineState::Active,
            MEDIA_PIPELINE_STATE_TORN_DOWN_STR => MediaPipelineState::TornDown,
            _ => MediaPipelineState::Unspecified,
        }
    }
}

impl From<u8> for MediaPipelineState {
    fn from(v: u8) -> Self {
        match v {
            1 => MediaPipelineState::Constructed,
            2 => MediaPipelineState::Initialized,
            3 => MediaPipelineState::Active,
            4 => MediaPipelineState::TornDown,
            _ => MediaPipelineState::Unspecified,
        }
    }
}

impl fmt::Display for MediaPipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            MediaPipelineState::Constructed => MEDIA_PIPELINE_STATE_CONSTRUCTED_STR,
            MediaPipelineState::Initialized => MEDIA_PIPELINE_STATE_INITIALIZED_STR,
            MediaPipelineState::Active => MEDIA_PIPELINE_STATE_ACTIVE_STR,
            MediaPipelineState::TornDown => MEDIA_PIPELINE_STATE_TORN_DOWN_STR,
            MediaPipelineState::Unspecified => crate::UNSPECIFIED_STR,
        };
        write!(f, "{s}")
    }
}

impl MediaPipelineState {
    /// can_transition_to allows single forward steps, and tearing down from
    /// any state but TornDown itself.
    pub(crate) fn can_transition_to(&self, next: MediaPipelineState) -> bool {
        match next {
            MediaPipelineState::TornDown => *self != MediaPipelineState::TornDown,
            MediaPipelineState::Unspecified => false,
            _ => next as u8 == *self as u8 + 1,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_media_pipeline_state() {
        let tests = vec![
            (crate::UNSPECIFIED_STR, MediaPipelineState::Unspecified),
            ("constructed", MediaPipelineState::Constructed),
            ("initialized", MediaPipelineState::Initialized),
            ("active", MediaPipelineState::Active),
            ("torn-down", MediaPipelineState::TornDown),
        ];

        for (state_string, expected_state) in tests {
            assert_eq!(
                MediaPipelineState::from(state_string),
                expected_state,
                "testCase: {expected_state}",
            );
            assert_eq!(MediaPipelineState::from(expected_state as u8), expected_state);
            assert_eq!(expected_state.to_string(), state_string);
        }
    }

    #[test]
    fn test_media_pipeline_state_is_monotonic() {
        use MediaPipelineState::*;

        let tests = vec![
            (Unspecified, Constructed, true),
            (Constructed, Initialized, true),
            (Constructed, Active, false),
            (Initialized, Active, true),
            (Active, Initialized, false),
            (Initialized, Constructed, false),
            (Constructed, TornDown, true),
            (Active, TornDown, true),
            (TornDown, TornDown, false),
            (TornDown, Constructed, false),
        ];

        for (from, to, expected) in tests {
            assert_eq!(from.can_transition_to(to), expected, "{from} -> {to}");
        }
    }
}
