//! # doorman-media
//!
//! The media pipeline: vision description and image generation against the
//! OpenAI API, artifact download, watermarking, and the retry policy that
//! drives the generation call.

pub mod download;
pub mod openai;
pub mod pipeline;
pub mod retry;
pub mod watermark;

pub use pipeline::{MediaPipeline, PipelineArtifact};
pub use retry::RetryPolicy;
