use std::sync::Arc;

use super::*;
use crate::conduit::{AudioSessionConduit, MediaConduit};
use crate::transport::TransportFlow;

#[test]
fn test_transport_flow_stats() {
    let flow = TransportFlow::new("a1:0,rtcp".to_owned(), 0, true);
    let stats = TransportFlowStats::from(&flow);

    assert_eq!(stats.id, "a1:0,rtcp");
    assert_eq!(stats.stats_type, RTCStatsType::Transport);
    assert_eq!(stats.state, "created");
    assert!(stats.rtcp);
    assert!(stats.layers.is_empty());
    assert!(stats.srtp_protection_profile.is_none());
    assert!(stats.timestamp > 0.0);
}

#[tokio::test]
async fn test_conduit_stats() {
    let sending = AudioSessionConduit::create(2, TrackDirection::Sending, None).await;
    let receiving =
        AudioSessionConduit::create(2, TrackDirection::Receiving, Some(Arc::clone(&sending)))
            .await;

    let stats = ConduitStats::collect(&MediaConduit::Audio(receiving)).await;
    assert_eq!(stats.id, "conduit-2-receiving");
    assert_eq!(stats.kind, RTPCodecType::Audio);
    assert!(stats.linked);
    assert!(!stats.shutdown);
    assert!(stats.codecs.is_empty());
}

#[test]
fn test_stats_report_json() -> Result<(), serde_json::Error> {
    let mut collector = StatsCollector::new();
    collector.insert(StatsReportType::Transport(TransportFlowStats::from(
        &TransportFlow::new("a1:0,rtp".to_owned(), 0, false),
    )));
    let report = StatsReport::from(collector);

    let value = serde_json::to_value(&report)?;
    assert_eq!(value["a1:0,rtp"]["type"], "transport");
    assert_eq!(value["a1:0,rtp"]["srtpProtectionProfile"], serde_json::Value::Null);

    let parsed: StatsReport = serde_json::from_value(value)?;
    match parsed.reports.get("a1:0,rtp") {
        Some(StatsReportType::Transport(stats)) => assert_eq!(stats.level, 0),
        other => panic!("unexpected report {other:?}"),
    }

    let unknown = serde_json::json!({ "x": { "type": "codec", "id": "x" } });
    assert!(serde_json::from_value::<StatsReport>(unknown).is_err());

    Ok(())
}
