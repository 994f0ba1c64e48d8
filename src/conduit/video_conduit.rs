use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;

use super::external_codec::{VideoDecoder, VideoEncoder};
use super::{ensure_direction, validate_recv_codecs, validate_send_codec};
use crate::codec::VideoCodecConfig;
use crate::error::{Error, Result};
use crate::rtp_transceiver::track_pair::TrackDirection;
use crate::rtp_transceiver::PayloadType;

/// VideoSessionConduit is the video engine session for one direction of a
/// level. Codecs the engine doesn't implement itself are bound to external
/// encoders and decoders.
pub struct VideoSessionConduit {
    level: usize,
    direction: TrackDirection,
    other: Mutex<Weak<VideoSessionConduit>>,
    recv_codecs: Mutex<Vec<VideoCodecConfig>>,
    send_codec: Mutex<Option<VideoCodecConfig>>,
    external_decoders: Mutex<BTreeMap<PayloadType, Arc<dyn VideoDecoder>>>,
    external_encoder: Mutex<Option<Arc<dyn VideoEncoder>>>,
    is_shutdown: AtomicBool,
}

impl std::fmt::Debug for VideoSessionConduit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoSessionConduit")
            .field("level", &self.level)
            .field("direction", &self.direction)
            .finish()
    }
}

impl VideoSessionConduit {
    /// create builds a conduit and links it with `other` in both directions.
    pub async fn create(
        level: usize,
        direction: TrackDirection,
        other: Option<Arc<VideoSessionConduit>>,
    ) -> Arc<Self> {
        let conduit = Arc::new(VideoSessionConduit {
            level,
            direction,
            other: Mutex::new(Weak::new()),
            recv_codecs: Mutex::new(vec![]),
            send_codec: Mutex::new(None),
            external_decoders: Mutex::new(BTreeMap::new()),
            external_encoder: Mutex::new(None),
            is_shutdown: AtomicBool::new(false),
        });

        if let Some(other) = other {
            *conduit.other.lock().await = Arc::downgrade(&other);
            *other.other.lock().await = Arc::downgrade(&conduit);
        }

        conduit
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn direction(&self) -> TrackDirection {
        self.direction
    }

    pub fn is_shutdown(&self) -> bool {
        self.is_shutdown.load(Ordering::SeqCst)
    }

    pub async fn other(&self) -> Option<Arc<VideoSessionConduit>> {
        self.other.lock().await.upgrade()
    }

    /// configure_recv_media_codecs replaces the receive codec list and drops
    /// external decoders bound for the previous one. On error nothing changes.
    pub async fn configure_recv_media_codecs(&self, configs: &[VideoCodecConfig]) -> Result<()> {
        self.check_usable(TrackDirection::Receiving, "configure receive codecs")?;
        validate_recv_codecs(configs)?;

        *self.recv_codecs.lock().await = configs.to_vec();
        self.external_decoders.lock().await.clear();
        log::debug!(
            "video conduit {} receives {:?}",
            self.level,
            configs.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
        );
        Ok(())
    }

    pub async fn configure_send_media_codec(&self, config: &VideoCodecConfig) -> Result<()> {
        self.check_usable(TrackDirection::Sending, "configure a send codec")?;
        validate_send_codec(config)?;

        *self.send_codec.lock().await = Some(config.clone());
        *self.external_encoder.lock().await = None;
        log::debug!("video conduit {} sends {}", self.level, config.name);
        Ok(())
    }

    /// set_external_recv_codec decodes `config`'s payload type with `decoder`.
    pub async fn set_external_recv_codec(
        &self,
        config: &VideoCodecConfig,
        decoder: Arc<dyn VideoDecoder>,
    ) -> Result<()> {
        self.check_usable(TrackDirection::Receiving, "set an external decoder")?;

        log::debug!(
            "video conduit {} decodes {} with {}",
            self.level,
            config.name,
            decoder.implementation_name()
        );
        self.external_decoders
            .lock()
            .await
            .insert(config.payload_type, decoder);
        Ok(())
    }

    /// set_external_send_codec encodes `config` with `encoder`.
    pub async fn set_external_send_codec(
        &self,
        config: &VideoCodecConfig,
        encoder: Arc<dyn VideoEncoder>,
    ) -> Result<()> {
        self.check_usable(TrackDirection::Sending, "set an external encoder")?;

        log::debug!(
            "video conduit {} encodes {} with {}",
            self.level,
            config.name,
            encoder.implementation_name()
        );
        *self.external_encoder.lock().await = Some(encoder);
        Ok(())
    }

    pub async fn recv_codecs(&self) -> Vec<VideoCodecConfig> {
        self.recv_codecs.lock().await.clone()
    }

    pub async fn send_codec(&self) -> Option<VideoCodecConfig> {
        self.send_codec.lock().await.clone()
    }

    /// external_decoder_names lists the external decoders by payload type.
    pub async fn external_decoder_names(&self) -> Vec<String> {
        self.external_decoders
            .lock()
            .await
            .values()
            .map(|d| d.implementation_name().to_owned())
            .collect()
    }

    pub async fn external_encoder_name(&self) -> Option<String> {
        self.external_encoder
            .lock()
            .await
            .as_ref()
            .map(|e| e.implementation_name().to_owned())
    }

    pub async fn shutdown(&self) {
        if self.is_shutdown.swap(true, Ordering::SeqCst) {
            return;
        }

        let other = std::mem::take(&mut *self.other.lock().await);
        if let Some(other) = other.upgrade() {
            *other.other.lock().await = Weak::new();
        }
        self.external_decoders.lock().await.clear();
        *self.external_encoder.lock().await = None;
        log::debug!("video conduit {} {} shut down", self.level, self.direction);
    }

    fn check_usable(&self, direction: TrackDirection, what: &str) -> Result<()> {
        if self.is_shutdown() {
            return Err(Error::ErrConduitShutdown);
        }
        ensure_direction(self.direction, direction, what)
    }
}
