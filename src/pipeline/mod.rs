
pub mod media_pipeline;
pub mod media_pipeline_receive;
pub mod media_pipeline_transmit;
pub mod pipeline_filter;
pub mod pipeline_state;

pub use media_pipeline::{MediaPipeline, MediaPipelineParams, PipelineTransport};
pub use media_pipeline_receive::MediaPipelineReceive;
pub use media_pipeline_transmit::{MediaPipelineTransmit, SinkIdentity};
pub use pipeline_filter::MediaPipelineFilter;
pub use pipeline_state::MediaPipelineState;
