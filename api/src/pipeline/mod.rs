use async_trait::async_trait;
use bytes::Bytes;
use clipguard_policy::AnalysisResult;
use thiserror::Error;

use crate::services::video_url::VideoUrl;

/// Raw video received through the upload endpoint
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Failures of the external analysis pipeline. None are retried here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Analysis service unavailable: {0}")]
    Unavailable(String),
    #[error("Analysis service timed out")]
    Timeout,
    /// The pipeline refused the video itself (unreadable, live, restricted)
    #[error("{0}")]
    Rejected(String),
    #[error("Invalid response from analysis service: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PipelineError::Timeout
        } else {
            PipelineError::Unavailable(err.to_string())
        }
    }
}

/// Pluggable video analysis backend producing violence score and confidence
#[async_trait]
pub trait AnalysisPipeline: Send + Sync {
    /// Analyze an uploaded video
    async fn analyze_upload(&self, upload: VideoUpload) -> Result<AnalysisResult, PipelineError>;

    /// Fetch and analyze a linked video
    async fn analyze_url(&self, url: &VideoUrl) -> Result<AnalysisResult, PipelineError>;

    /// Short label for logs
    fn name(&self) -> &'static str;
}

mod fixed;
mod remote;

pub use fixed::FixedPipeline;
pub use remote::RemotePipeline;
