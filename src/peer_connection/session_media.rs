use std::sync::Arc;

use portable_atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::conduit::ConduitFactory;
use crate::error::{Error, Result};
use crate::media_stream::{
    LocalSourceStreamInfo, MediaSink, MediaSource, PresentationContext, Principal,
    RemoteSourceStreamInfo,
};
use crate::runtime::ContextThread;
use crate::stats::stats_collector::StatsCollector;
use crate::stats::{ConduitStats, PipelineStats, StatsReport, StatsReportType, TransportFlowStats};
use crate::transport::TransportFlowRegistry;

/// SessionMedia is the media state of one session: its transport flows,
/// conduits and stream buckets, and the threads they are driven from.
pub struct SessionMedia {
    handle: String,
    transport_flows: TransportFlowRegistry,
    conduits: ConduitFactory,
    local_streams: Mutex<Vec<Arc<LocalSourceStreamInfo>>>,
    remote_streams: Mutex<Vec<Arc<RemoteSourceStreamInfo>>>,
    network: Arc<ContextThread>,
    presentation: Option<(Arc<ContextThread>, Arc<dyn PresentationContext>)>,
    peer_identity: Option<String>,
    is_closed: AtomicBool,
}

impl SessionMedia {
    pub(crate) fn new(
        handle: String,
        transport_flows: TransportFlowRegistry,
        conduits: ConduitFactory,
        network: Arc<ContextThread>,
        presentation: Option<(Arc<ContextThread>, Arc<dyn PresentationContext>)>,
        peer_identity: Option<String>,
    ) -> Self {
        SessionMedia {
            handle,
            transport_flows,
            conduits,
            local_streams: Mutex::new(vec![]),
            remote_streams: Mutex::new(vec![]),
            network,
            presentation,
            peer_identity,
            is_closed: AtomicBool::new(false),
        }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn transport_flows(&self) -> &TransportFlowRegistry {
        &self.transport_flows
    }

    pub fn conduits(&self) -> &ConduitFactory {
        &self.conduits
    }

    pub fn network(&self) -> &Arc<ContextThread> {
        &self.network
    }

    pub fn presentation(&self) -> Option<&Arc<ContextThread>> {
        self.presentation.as_ref().map(|(thread, _)| thread)
    }

    /// peer_identity is the remote identity media of this session is
    /// restricted to, if any.
    pub fn peer_identity(&self) -> Option<&str> {
        self.peer_identity.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed.load(Ordering::SeqCst)
    }

    pub(crate) fn check_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::ErrSessionClosed);
        }
        Ok(())
    }

    /// add_local_stream appends a local stream bucket and returns its index.
    pub async fn add_local_stream(&self, source: Arc<dyn MediaSource>) -> usize {
        let mut streams = self.local_streams.lock().await;
        streams.push(Arc::new(LocalSourceStreamInfo::new(source)));
        streams.len() - 1
    }

    /// add_remote_stream appends a remote stream bucket and returns its index.
    pub async fn add_remote_stream(&self, sink: Arc<dyn MediaSink>) -> usize {
        let mut streams = self.remote_streams.lock().await;
        streams.push(Arc::new(RemoteSourceStreamInfo::new(sink)));
        streams.len() - 1
    }

    pub async fn get_local_stream(&self, index: usize) -> Option<Arc<LocalSourceStreamInfo>> {
        self.local_streams.lock().await.get(index).cloned()
    }

    pub async fn get_remote_stream(&self, index: usize) -> Option<Arc<RemoteSourceStreamInfo>> {
        self.remote_streams.lock().await.get(index).cloned()
    }

    /// document_principal reads the principal of the attached document on
    /// the presentation thread. Sessions without a document have none.
    pub async fn document_principal(&self) -> Result<Option<Principal>> {
        match &self.presentation {
            Some((thread, context)) => {
                let context = Arc::clone(context);
                thread
                    .dispatch(move || async move { context.principal() })?
                    .wait()
                    .await
            }
            None => Ok(None),
        }
    }

    /// get_stats snapshots every registered flow, conduit and stored pipeline.
    pub async fn get_stats(&self) -> StatsReport {
        let mut collector = StatsCollector::new();

        for flow in self.transport_flows.flows().await {
            collector.insert(StatsReportType::Transport(TransportFlowStats::from(
                flow.as_ref(),
            )));
        }

        for conduit in self.conduits.conduits().await {
            collector.insert(StatsReportType::Conduit(
                ConduitStats::collect(&conduit).await,
            ));
        }

        let local_streams = self.local_streams.lock().await.clone();
        for stream in local_streams {
            for (_, pipeline) in stream.pipelines().await {
                collector.insert(StatsReportType::Pipeline(
                    PipelineStats::collect(pipeline.pipeline()).await,
                ));
            }
        }

        let remote_streams = self.remote_streams.lock().await.clone();
        for stream in remote_streams {
            for (_, pipeline) in stream.pipelines().await {
                collector.insert(StatsReportType::Pipeline(
                    PipelineStats::collect(pipeline.pipeline()).await,
                ));
            }
        }

        collector.into()
    }

    /// close tears down every pipeline, shuts the conduits down and closes
    /// the transport flows. Pipelines can't be created afterwards and calling
    /// it again does nothing.
    pub async fn close(&self) {
        if self.is_closed.swap(true, Ordering::SeqCst) {
            return;
        }
        log::debug!("{}: closing session media", self.handle);

        let local_streams = std::mem::take(&mut *self.local_streams.lock().await);
        for stream in local_streams {
            stream.teardown().await;
        }
        let remote_streams = std::mem::take(&mut *self.remote_streams.lock().await);
        for stream in remote_streams {
            stream.teardown().await;
        }

        self.conduits.shutdown_all().await;
        self.transport_flows.close_all().await;
    }
}
