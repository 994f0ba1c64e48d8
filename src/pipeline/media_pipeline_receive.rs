use std::sync::Arc;

use tokio::sync::Mutex;

use super::media_pipeline::{MediaPipeline, MediaPipelineParams};
use super::pipeline_filter::MediaPipelineFilter;
use crate::error::Result;
use crate::media_stream::MediaSink;
use crate::rtp_transceiver::track_pair::TrackDirection;

/// MediaPipelineReceive feeds a receiving conduit's output into a remote sink.
pub struct MediaPipelineReceive {
    pipeline: Arc<MediaPipeline>,
    sink: Arc<dyn MediaSink>,
    filter: Mutex<Option<MediaPipelineFilter>>,
}

impl MediaPipelineReceive {
    pub fn new(
        params: MediaPipelineParams,
        sink: Arc<dyn MediaSink>,
        filter: Option<MediaPipelineFilter>,
    ) -> Self {
        MediaPipelineReceive {
            pipeline: MediaPipeline::new(params, TrackDirection::Receiving),
            sink,
            filter: Mutex::new(filter),
        }
    }

    pub fn pipeline(&self) -> &Arc<MediaPipeline> {
        &self.pipeline
    }

    pub fn sink(&self) -> &Arc<dyn MediaSink> {
        &self.sink
    }

    pub async fn filter(&self) -> Option<MediaPipelineFilter> {
        self.filter.lock().await.clone()
    }

    /// update_filter installs or refreshes the bundle demultiplexing filter.
    pub async fn update_filter(&self, filter: &MediaPipelineFilter) {
        let mut current = self.filter.lock().await;
        match current.as_mut() {
            Some(current) => current.update(filter),
            None => *current = Some(filter.clone()),
        }
    }

    pub async fn init(&self) -> Result<()> {
        self.pipeline.init().await
    }

    pub async fn teardown(&self) {
        self.pipeline.teardown().await
    }
}
