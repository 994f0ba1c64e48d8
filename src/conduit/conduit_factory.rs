use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::audio_conduit::AudioSessionConduit;
use super::external_codec::{ExternalCodecResolver, VideoDecoder, VideoEncoder};
use super::video_conduit::VideoSessionConduit;
use super::MediaConduit;
use crate::codec::{translate, translate_all, AudioCodecConfig, VideoCodecConfig};
use crate::error::{Error, Result};
use crate::rtp_transceiver::rtp_codec::{CodecDescription, RTPCodecType};
use crate::rtp_transceiver::track_pair::TrackDirection;

/// ConduitFactory keeps at most one send and one receive conduit per level
/// and configures them from negotiated codec lists.
pub struct ConduitFactory {
    native_video_codecs: Vec<String>,
    external_codecs: ExternalCodecResolver,
    conduits: Mutex<HashMap<(usize, TrackDirection), MediaConduit>>,
}

impl ConduitFactory {
    pub fn new(native_video_codecs: Vec<String>, external_codecs: ExternalCodecResolver) -> Self {
        ConduitFactory {
            native_video_codecs,
            external_codecs,
            conduits: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_conduit(&self, level: usize, direction: TrackDirection) -> Option<MediaConduit> {
        self.conduits.lock().await.get(&(level, direction)).cloned()
    }

    /// get_or_create_conduit returns the conduit of (level, direction),
    /// creating it linked to the opposite direction's conduit when one
    /// exists.
    ///
    /// # Panics
    ///
    /// When the level already carries a conduit of another media type, or
    /// `media_type` is Unspecified. Both mean the negotiated session is
    /// inconsistent.
    pub async fn get_or_create_conduit(
        &self,
        level: usize,
        media_type: RTPCodecType,
        direction: TrackDirection,
    ) -> MediaConduit {
        let mut conduits = self.conduits.lock().await;
        if let Some(conduit) = conduits.get(&(level, direction)) {
            assert_eq!(
                conduit.media_type(),
                media_type,
                "level {level} already has a {} conduit",
                conduit.media_type()
            );
            return conduit.clone();
        }

        let other = conduits.get(&(level, direction.opposite())).cloned();
        if let Some(other) = &other {
            assert_eq!(
                other.media_type(),
                media_type,
                "level {level} pairs a {media_type} conduit with a {} one",
                other.media_type()
            );
        }

        let conduit = match media_type {
            RTPCodecType::Audio => {
                let other = other.and_then(|c| c.as_audio().cloned());
                MediaConduit::Audio(AudioSessionConduit::create(level, direction, other).await)
            }
            RTPCodecType::Video => {
                let other = other.and_then(|c| c.as_video().cloned());
                MediaConduit::Video(VideoSessionConduit::create(level, direction, other).await)
            }
            RTPCodecType::Unspecified => unreachable!("no conduit for unspecified media"),
        };

        log::debug!("created {media_type} {direction} conduit for level {level}");
        conduits.insert((level, direction), conduit.clone());
        conduit
    }

    /// configure installs a negotiated codec list on a conduit. Receiving
    /// conduits take the whole list, sending conduits only its first entry.
    pub async fn configure(
        &self,
        conduit: &MediaConduit,
        codecs: &[CodecDescription],
        direction: TrackDirection,
    ) -> Result<()> {
        if codecs.is_empty() {
            log::error!("can't set up a conduit with 0 codecs");
            return Err(Error::ErrNoCodecs);
        }
        if conduit.direction() != direction {
            return Err(Error::ErrConduitMismatch(format!(
                "{} conduit configured for {direction}",
                conduit.direction()
            )));
        }

        let result = match (conduit, direction) {
            (MediaConduit::Audio(c), TrackDirection::Receiving) => {
                self.configure_audio_recv(c, codecs).await
            }
            (MediaConduit::Audio(c), TrackDirection::Sending) => {
                self.configure_audio_send(c, &codecs[0]).await
            }
            (MediaConduit::Video(c), TrackDirection::Receiving) => {
                self.configure_video_recv(c, codecs).await
            }
            (MediaConduit::Video(c), TrackDirection::Sending) => {
                self.configure_video_send(c, &codecs[0]).await
            }
        };

        if let Err(err) = &result {
            log::error!(
                "couldn't configure {} {direction} conduit for level {}: {err}",
                conduit.media_type(),
                conduit.level()
            );
        }
        result
    }

    /// Encoding names compare case-insensitively.
    fn is_native_video_codec(&self, name: &str) -> bool {
        self.native_video_codecs
            .iter()
            .any(|n| n.eq_ignore_ascii_case(name))
    }

    async fn configure_audio_recv(
        &self,
        conduit: &Arc<AudioSessionConduit>,
        codecs: &[CodecDescription],
    ) -> Result<()> {
        let configs: Vec<AudioCodecConfig> = translate_all(codecs)?;
        conduit.configure_recv_media_codecs(&configs).await
    }

    async fn configure_audio_send(
        &self,
        conduit: &Arc<AudioSessionConduit>,
        codec: &CodecDescription,
    ) -> Result<()> {
        let config: AudioCodecConfig = translate(codec)?;
        conduit.configure_send_media_codec(&config).await
    }

    /// configure_video_recv binds every decoder before it touches the
    /// conduit so a missing one leaves the conduit as it was.
    async fn configure_video_recv(
        &self,
        conduit: &Arc<VideoSessionConduit>,
        codecs: &[CodecDescription],
    ) -> Result<()> {
        let configs: Vec<VideoCodecConfig> = translate_all(codecs)?;

        let mut externals: Vec<(&VideoCodecConfig, Arc<dyn VideoDecoder>)> = vec![];
        for config in &configs {
            if self.is_native_video_codec(&config.name) {
                continue;
            }
            match self.external_codecs.resolve_decoder(&config.name) {
                Some(decoder) => externals.push((config, decoder)),
                None => return Err(Error::ErrInvalidReceiveCodec(config.name.clone())),
            }
        }

        conduit.configure_recv_media_codecs(&configs).await?;
        for (config, decoder) in externals {
            conduit.set_external_recv_codec(config, decoder).await?;
        }
        Ok(())
    }

    async fn configure_video_send(
        &self,
        conduit: &Arc<VideoSessionConduit>,
        codec: &CodecDescription,
    ) -> Result<()> {
        let config: VideoCodecConfig = translate(codec)?;

        let encoder: Option<Arc<dyn VideoEncoder>> = if self.is_native_video_codec(&config.name) {
            None
        } else {
            match self.external_codecs.resolve_encoder(&config.name) {
                Some(encoder) => Some(encoder),
                None => return Err(Error::ErrInvalidSendCodec(config.name.clone())),
            }
        };

        conduit.configure_send_media_codec(&config).await?;
        if let Some(encoder) = encoder {
            conduit.set_external_send_codec(&config, encoder).await?;
        }
        Ok(())
    }

    /// remove_conduit forgets the conduit of (level, direction) and shuts it
    /// down, unlinking its pair.
    pub async fn remove_conduit(
        &self,
        level: usize,
        direction: TrackDirection,
    ) -> Option<MediaConduit> {
        let mut conduits = self.conduits.lock().await;
        let conduit = conduits.remove(&(level, direction))?;
        conduit.shutdown().await;
        Some(conduit)
    }

    /// conduits lists every conduit ordered by level, sending first.
    pub async fn conduits(&self) -> Vec<MediaConduit> {
        let conduits = self.conduits.lock().await;
        let mut all: Vec<MediaConduit> = conduits.values().cloned().collect();
        all.sort_by_key(|c| (c.level(), c.direction() == TrackDirection::Receiving));
        all
    }

    /// shutdown_all shuts every conduit down and forgets them.
    pub async fn shutdown_all(&self) {
        let mut conduits = self.conduits.lock().await;
        for (_, conduit) in conduits.drain() {
            conduit.shutdown().await;
        }
    }
}
