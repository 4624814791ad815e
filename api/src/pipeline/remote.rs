use async_trait::async_trait;
use clipguard_policy::AnalysisResult;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::{AnalysisPipeline, PipelineError, VideoUpload};
use crate::constants::UPLOAD_FIELD;
use crate::services::video_url::VideoUrl;

/// Success body of the inference service
#[derive(Debug, Clone, Deserialize)]
struct InferenceResponse {
    /// Probability (0.0-1.0) that the video is violent
    violence_probability: f64,
    frames_analyzed: u32,
}

impl InferenceResponse {
    fn into_analysis(self) -> Result<AnalysisResult, PipelineError> {
        AnalysisResult::from_probability(self.violence_probability, self.frames_analyzed)
            .map_err(|e| PipelineError::InvalidResponse(e.to_string()))
    }
}

/// Body of the URL endpoint. Carries the canonical https link rather than
/// the submitted text, so scheme-less links still download.
#[derive(Debug, PartialEq, Serialize)]
struct UrlRequest {
    url: String,
}

impl From<&VideoUrl> for UrlRequest {
    fn from(url: &VideoUrl) -> Self {
        Self {
            url: url.canonical(),
        }
    }
}

/// Error body the inference service uses for rejected videos
#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Client for the external inference service hosting the violence model.
///
/// - `POST {base}/v1/analyze/upload` with a multipart `file` field
/// - `POST {base}/v1/analyze/url` with `{"url": ...}`; the service downloads
///   the video itself
#[derive(Debug, Clone)]
pub struct RemotePipeline {
    base_url: String,
    http: Client,
}

impl RemotePipeline {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, PipelineError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/analyze/{}", self.base_url, path)
    }

    async fn handle_response(response: Response) -> Result<AnalysisResult, PipelineError> {
        let status = response.status();
        if status.is_success() {
            let body: InferenceResponse = response
                .json()
                .await
                .map_err(|e| PipelineError::InvalidResponse(e.to_string()))?;
            return body.into_analysis();
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }
}

/// Maps a non-success status from the inference service. 4xx means the
/// video was refused and the service's message is passed on to the user.
fn status_error(status: StatusCode, body: &str) -> PipelineError {
    if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::GATEWAY_TIMEOUT {
        return PipelineError::Timeout;
    }
    if !status.is_client_error() {
        return PipelineError::Unavailable(format!("unexpected status {status}: {body}"));
    }

    let detail = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.detail)
        .unwrap_or_else(|_| body.trim().to_string());
    if detail.is_empty() {
        PipelineError::Rejected(format!("Video rejected by analysis service ({status})"))
    } else {
        PipelineError::Rejected(detail)
    }
}

#[async_trait]
impl AnalysisPipeline for RemotePipeline {
    async fn analyze_upload(&self, upload: VideoUpload) -> Result<AnalysisResult, PipelineError> {
        let part = Part::stream(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)
            .map_err(|e| PipelineError::Rejected(format!("Invalid content type: {e}")))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn analyze_url(&self, url: &VideoUrl) -> Result<AnalysisResult, PipelineError> {
        let response = self
            .http
            .post(self.endpoint("url"))
            .json(&UrlRequest::from(url))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
