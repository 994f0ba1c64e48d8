#[cfg(test)]
mod stats_test;

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stats_collector::StatsCollector;

use crate::conduit::MediaConduit;
use crate::dtls_transport::srtp_protection_profile::SrtpProtectionProfile;
use crate::pipeline::MediaPipeline;
use crate::rtp_transceiver::rtp_codec::RTPCodecType;
use crate::rtp_transceiver::track_pair::TrackDirection;
use crate::transport::TransportFlow;

pub mod stats_collector;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RTCStatsType {
    #[serde(rename = "transport")]
    Transport,
    #[serde(rename = "conduit")]
    Conduit,
    #[serde(rename = "pipeline")]
    Pipeline,
}

/// epoch_seconds returns the wall clock as seconds since the epoch with
/// millisecond precision.
fn epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64 / 1000.0)
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatsReportType {
    Transport(TransportFlowStats),
    Conduit(ConduitStats),
    Pipeline(PipelineStats),
}

impl StatsReportType {
    pub fn id(&self) -> &str {
        match self {
            StatsReportType::Transport(stats) => &stats.id,
            StatsReportType::Conduit(stats) => &stats.id,
            StatsReportType::Pipeline(stats) => &stats.id,
        }
    }
}

impl Serialize for StatsReportType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            StatsReportType::Transport(stats) => stats.serialize(serializer),
            StatsReportType::Conduit(stats) => stats.serialize(serializer),
            StatsReportType::Pipeline(stats) => stats.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for StatsReportType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let type_field = value
            .get("type")
            .ok_or_else(|| serde::de::Error::missing_field("type"))?;
        let rtc_type: RTCStatsType = serde_json::from_value(type_field.clone()).map_err(|e| {
            serde::de::Error::custom(format!(
                "failed to deserialize RTCStatsType from the `type` field ({type_field}): {e}"
            ))
        })?;

        match rtc_type {
            RTCStatsType::Transport => {
                let stats = serde_json::from_value(value).map_err(serde::de::Error::custom)?;
                Ok(StatsReportType::Transport(stats))
            }
            RTCStatsType::Conduit => {
                let stats = serde_json::from_value(value).map_err(serde::de::Error::custom)?;
                Ok(StatsReportType::Conduit(stats))
            }
            RTCStatsType::Pipeline => {
                let stats = serde_json::from_value(value).map_err(serde::de::Error::custom)?;
                Ok(StatsReportType::Pipeline(stats))
            }
        }
    }
}

/// StatsReport is a snapshot of a session's flows, conduits and pipelines
/// keyed by stats id.
#[derive(Debug, Default)]
pub struct StatsReport {
    pub reports: HashMap<String, StatsReportType>,
}

impl From<StatsCollector> for StatsReport {
    fn from(collector: StatsCollector) -> Self {
        StatsReport {
            reports: collector.into_reports(),
        }
    }
}

impl Serialize for StatsReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.reports.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StatsReport {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let root = value
            .as_object()
            .ok_or(serde::de::Error::custom("root object missing"))?;

        let mut reports = HashMap::new();
        for (key, value) in root {
            let report = serde_json::from_value(value.clone()).map_err(|e| {
                serde::de::Error::custom(format!(
                    "failed to deserialize `StatsReportType` from key={key}, value={value}: {e}"
                ))
            })?;
            reports.insert(key.clone(), report);
        }
        Ok(StatsReport { reports })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportFlowStats {
    pub timestamp: f64,
    #[serde(rename = "type")]
    pub stats_type: RTCStatsType,
    pub id: String,

    pub level: usize,
    pub rtcp: bool,
    pub state: String,
    pub layers: Vec<String>,
    pub srtp_protection_profile: Option<SrtpProtectionProfile>,
}

impl From<&TransportFlow> for TransportFlowStats {
    fn from(flow: &TransportFlow) -> Self {
        TransportFlowStats {
            timestamp: epoch_seconds(),
            stats_type: RTCStatsType::Transport,
            id: flow.id().to_owned(),
            level: flow.level(),
            rtcp: flow.is_rtcp(),
            state: flow.state().to_string(),
            layers: flow.layer_ids().iter().map(|id| id.to_string()).collect(),
            srtp_protection_profile: flow.srtp_protection_profile(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConduitStats {
    pub timestamp: f64,
    #[serde(rename = "type")]
    pub stats_type: RTCStatsType,
    pub id: String,

    pub level: usize,
    pub kind: RTPCodecType,
    pub direction: TrackDirection,
    pub linked: bool,
    pub shutdown: bool,
    /// Names of the configured codecs, in negotiated order.
    pub codecs: Vec<String>,
    pub external_codecs: Vec<String>,
}

impl ConduitStats {
    pub fn stats_id(level: usize, direction: TrackDirection) -> String {
        format!("conduit-{level}-{direction}")
    }

    pub async fn collect(conduit: &MediaConduit) -> Self {
        let (codecs, external_codecs) = match conduit {
            MediaConduit::Audio(audio) => {
                let codecs = match conduit.direction() {
                    TrackDirection::Receiving => audio.recv_codecs().await,
                    TrackDirection::Sending => audio.send_codec().await.into_iter().collect(),
                };
                (codecs.into_iter().map(|c| c.name).collect(), vec![])
            }
            MediaConduit::Video(video) => {
                let (codecs, external) = match conduit.direction() {
                    TrackDirection::Receiving => (
                        video.recv_codecs().await,
                        video.external_decoder_names().await,
                    ),
                    TrackDirection::Sending => (
                        video.send_codec().await.into_iter().collect(),
                        video.external_encoder_name().await.into_iter().collect(),
                    ),
                };
                (codecs.into_iter().map(|c| c.name).collect(), external)
            }
        };

        ConduitStats {
            timestamp: epoch_seconds(),
            stats_type: RTCStatsType::Conduit,
            id: ConduitStats::stats_id(conduit.level(), conduit.direction()),
            level: conduit.level(),
            kind: conduit.media_type(),
            direction: conduit.direction(),
            linked: conduit.is_linked().await,
            shutdown: conduit.is_shutdown(),
            codecs,
            external_codecs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    pub timestamp: f64,
    #[serde(rename = "type")]
    pub stats_type: RTCStatsType,
    pub id: String,

    pub level: usize,
    pub track_id: usize,
    pub kind: RTPCodecType,
    pub direction: TrackDirection,
    pub state: String,
    pub conduit_id: String,
    pub transport_ids: Vec<String>,
}

impl PipelineStats {
    pub async fn collect(pipeline: &MediaPipeline) -> Self {
        let transport_ids = match pipeline.transport().await {
            Some(transport) => std::iter::once(&transport.rtp)
                .chain(transport.rtcp.iter())
                .map(|flow| flow.id().to_owned())
                .collect(),
            None => vec![],
        };

        PipelineStats {
            timestamp: epoch_seconds(),
            stats_type: RTCStatsType::Pipeline,
            id: pipeline.description(),
            level: pipeline.level(),
            track_id: pipeline.track_id(),
            kind: pipeline.media_type(),
            direction: pipeline.direction(),
            state: pipeline.state().to_string(),
            conduit_id: ConduitStats::stats_id(
                pipeline.conduit().level(),
                pipeline.conduit().direction(),
            ),
            transport_ids,
        }
    }
}
