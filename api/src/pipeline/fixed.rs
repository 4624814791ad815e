use async_trait::async_trait;
use clipguard_policy::AnalysisResult;

use super::{AnalysisPipeline, PipelineError, VideoUpload};
use crate::services::video_url::VideoUrl;

/// Pipeline that answers every request with the same outcome - for local
/// development without an inference service, and for tests
pub struct FixedPipeline {
    outcome: Result<AnalysisResult, PipelineError>,
}

impl FixedPipeline {
    pub fn new(result: AnalysisResult) -> Self {
        Self {
            outcome: Ok(result),
        }
    }

    #[cfg(test)]
    pub fn failing(err: PipelineError) -> Self {
        Self { outcome: Err(err) }
    }
}

#[async_trait]
impl AnalysisPipeline for FixedPipeline {
    async fn analyze_upload(&self, _upload: VideoUpload) -> Result<AnalysisResult, PipelineError> {
        self.outcome.clone()
    }

    async fn analyze_url(&self, _url: &VideoUrl) -> Result<AnalysisResult, PipelineError> {
        self.outcome.clone()
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}
