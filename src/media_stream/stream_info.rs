use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::{MediaSink, MediaSource};
use crate::pipeline::{MediaPipelineReceive, MediaPipelineTransmit};

/// LocalSourceStreamInfo is a local stream and the send pipelines built for
/// its tracks.
pub struct LocalSourceStreamInfo {
    id: String,
    source: Arc<dyn MediaSource>,
    pipelines: Mutex<BTreeMap<usize, Arc<MediaPipelineTransmit>>>,
}

impl LocalSourceStreamInfo {
    pub fn new(source: Arc<dyn MediaSource>) -> Self {
        LocalSourceStreamInfo {
            id: source.id().to_owned(),
            source,
            pipelines: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &Arc<dyn MediaSource> {
        &self.source
    }

    /// store_pipeline keeps `pipeline` at `slot`, tearing down the one it
    /// replaces.
    pub async fn store_pipeline(&self, slot: usize, pipeline: Arc<MediaPipelineTransmit>) {
        let replaced = self.pipelines.lock().await.insert(slot, pipeline);
        if let Some(replaced) = replaced {
            log::debug!("{}: replacing send pipeline at slot {slot}", self.id);
            replaced.teardown().await;
        }
    }

    pub async fn get_pipeline(&self, slot: usize) -> Option<Arc<MediaPipelineTransmit>> {
        self.pipelines.lock().await.get(&slot).cloned()
    }

    pub async fn pipelines(&self) -> Vec<(usize, Arc<MediaPipelineTransmit>)> {
        self.pipelines
            .lock()
            .await
            .iter()
            .map(|(slot, p)| (*slot, Arc::clone(p)))
            .collect()
    }

    /// teardown tears down and forgets every pipeline of the stream.
    pub async fn teardown(&self) {
        let pipelines = std::mem::take(&mut *self.pipelines.lock().await);
        for pipeline in pipelines.into_values() {
            pipeline.teardown().await;
        }
    }
}

/// RemoteSourceStreamInfo is a remote stream and the receive pipelines
/// feeding its sink.
pub struct RemoteSourceStreamInfo {
    id: String,
    sink: Arc<dyn MediaSink>,
    pipelines: Mutex<BTreeMap<usize, Arc<MediaPipelineReceive>>>,
}

impl RemoteSourceStreamInfo {
    pub fn new(sink: Arc<dyn MediaSink>) -> Self {
        RemoteSourceStreamInfo {
            id: sink.id().to_owned(),
            sink,
            pipelines: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sink(&self) -> &Arc<dyn MediaSink> {
        &self.sink
    }

    pub async fn store_pipeline(&self, slot: usize, pipeline: Arc<MediaPipelineReceive>) {
        let replaced = self.pipelines.lock().await.insert(slot, pipeline);
        if let Some(replaced) = replaced {
            log::debug!("{}: replacing receive pipeline at slot {slot}", self.id);
            replaced.teardown().await;
        }
    }

    pub async fn get_pipeline(&self, slot: usize) -> Option<Arc<MediaPipelineReceive>> {
        self.pipelines.lock().await.get(&slot).cloned()
    }

    pub async fn pipelines(&self) -> Vec<(usize, Arc<MediaPipelineReceive>)> {
        self.pipelines
            .lock()
            .await
            .iter()
            .map(|(slot, p)| (*slot, Arc::clone(p)))
            .collect()
    }

    pub async fn teardown(&self) {
        let pipelines = std::mem::take(&mut *self.pipelines.lock().await);
        for pipeline in pipelines.into_values() {
            pipeline.teardown().await;
        }
    }
}
