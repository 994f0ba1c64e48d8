//! Session-scoped media setup
//!
//! [`SessionMedia`] owns everything one session builds for its negotiated
//! tracks. [`MediaPipelineFactory`] turns a negotiated [`TrackPair`] into
//! transport flows, a configured conduit and a pipeline stored in the
//! session's stream buckets.
//!
//! [`TrackPair`]: crate::rtp_transceiver::track_pair::TrackPair


pub mod media_pipeline_factory;
pub mod session_media;

pub use media_pipeline_factory::MediaPipelineFactory;
pub use session_media::SessionMedia;
