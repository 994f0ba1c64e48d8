use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;

use super::{ensure_direction, validate_recv_codecs, validate_send_codec};
use crate::codec::AudioCodecConfig;
use crate::error::{Error, Result};
use crate::rtp_transceiver::track_pair::TrackDirection;

/// AudioSessionConduit is the audio engine session for one direction of a level.
pub struct AudioSessionConduit {
    level: usize,
    direction: TrackDirection,
    other: Mutex<Weak<AudioSessionConduit>>,
    recv_codecs: Mutex<Vec<AudioCodecConfig>>,
    send_codec: Mutex<Option<AudioCodecConfig>>,
    is_shutdown: AtomicBool,
}

impl std::fmt::Debug for AudioSessionConduit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSessionConduit")
            .field("level", &self.level)
            .field("direction", &self.direction)
            .finish()
    }
}

impl AudioSessionConduit {
    /// create builds a conduit and, when the opposite direction of the level
    /// already has one, links the two to each other.
    pub async fn create(
        level: usize,
        direction: TrackDirection,
        other: Option<Arc<AudioSessionConduit>>,
    ) -> Arc<Self> {
        let conduit = Arc::new(AudioSessionConduit {
            level,
            direction,
            other: Mutex::new(Weak::new()),
            recv_codecs: Mutex::new(vec![]),
            send_codec: Mutex::new(None),
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

    /// other returns the paired conduit of the opposite direction, if it is
    /// still alive.
    pub async fn other(&self) -> Option<Arc<AudioSessionConduit>> {
        self.other.lock().await.upgrade()
    }

    /// configure_recv_media_codecs replaces the receive codec list. The
    /// configs are copied; on error the previous list stays in place.
    pub async fn configure_recv_media_codecs(&self, configs: &[AudioCodecConfig]) -> Result<()> {
        self.check_usable(TrackDirection::Receiving, "configure receive codecs")?;
        validate_recv_codecs(configs)?;

        let mut recv_codecs = self.recv_codecs.lock().await;
        *recv_codecs = configs.to_vec();
        log::debug!(
            "audio conduit {} receives {:?}",
            self.level,
            configs.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
        );
        Ok(())
    }

    /// configure_send_media_codec sets the single active send codec.
    pub async fn configure_send_media_codec(&self, config: &AudioCodecConfig) -> Result<()> {
        self.check_usable(TrackDirection::Sending, "configure a send codec")?;
        validate_send_codec(config)?;

        let mut send_codec = self.send_codec.lock().await;
        *send_codec = Some(config.clone());
        log::debug!("audio conduit {} sends {}", self.level, config.name);
        Ok(())
    }

    pub async fn recv_codecs(&self) -> Vec<AudioCodecConfig> {
        self.recv_codecs.lock().await.clone()
    }

    pub async fn send_codec(&self) -> Option<AudioCodecConfig> {
        self.send_codec.lock().await.clone()
    }

    /// shutdown stops the conduit and unlinks it from its pair.
    pub async fn shutdown(&self) {
        if self.is_shutdown.swap(true, Ordering::SeqCst) {
            return;
        }

        let other = std::mem::take(&mut *self.other.lock().await);
        if let Some(other) = other.upgrade() {
            *other.other.lock().await = Weak::new();
        }
        log::debug!("audio conduit {} {} shut down", self.level, self.direction);
    }

    fn check_usable(&self, direction: TrackDirection, what: &str) -> Result<()> {
        if self.is_shutdown() {
            return Err(Error::ErrConduitShutdown);
        }
        ensure_direction(self.direction, direction, what)
    }
}
