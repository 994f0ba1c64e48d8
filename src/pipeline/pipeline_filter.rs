use std::collections::BTreeSet;

/// MediaPipelineFilter decides which packets of a bundled flow belong to a
/// receive pipeline, by remote SSRC.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct MediaPipelineFilter {
    remote_ssrcs: BTreeSet<u32>,
}

impl MediaPipelineFilter {
    pub fn new() -> Self {
        MediaPipelineFilter::default()
    }

    pub fn add_remote_ssrc(&mut self, ssrc: u32) {
        self.remote_ssrcs.insert(ssrc);
    }

    /// filter reports whether a packet from `ssrc` is for this pipeline.
    pub fn filter(&self, ssrc: u32) -> bool {
        self.remote_ssrcs.contains(&ssrc)
    }

    /// update replaces the accepted SSRCs with the ones of a newer remote
    /// description.
    pub fn update(&mut self, other: &MediaPipelineFilter) {
        self.remote_ssrcs = other.remote_ssrcs.clone();
    }

    pub fn remote_ssrcs(&self) -> Vec<u32> {
        self.remote_ssrcs.iter().copied().collect()
    }
}
