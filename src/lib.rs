#![warn(rust_2018_idioms)]

//! Secure media transport establishment and media pipeline wiring.
//!
//! For every negotiated track of a session the crate sets up an ICE + DTLS
//! transport flow per RTP/RTCP component, a codec-configured conduit and a
//! send or receive pipeline connecting the two, see
//! [`peer_connection::MediaPipelineFactory`].

pub mod api;
pub mod codec;
pub mod conduit;
pub mod dtls_transport;
pub mod error;
pub mod ice_transport;
pub mod media_stream;
pub mod peer_connection;
pub mod pipeline;
pub mod rtp_transceiver;
pub mod runtime;
pub mod stats;
pub mod transport;

pub use error::Error;

pub(crate) const UNSPECIFIED_STR: &str = "Unspecified";
