//! Video analysis endpoints (/api/analyze/*)
//!
//! Both endpoints validate the request, run it through the analysis pipeline
//! and hand the pipeline's score and confidence to the moderation policy.

use axum::{
    Json, Router,
    extract::{
        Multipart, State,
        multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::StatusCode,
    routing::post,
};
use clipguard_policy::{AnalysisResult, Decision, PolicyResolver};
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;
use crate::constants::UPLOAD_FIELD;
use crate::pipeline::VideoUpload;
use crate::services::error::{ApiError, LogErr};
use crate::services::video_url::VideoUrl;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/analyze/upload", post(analyze_upload))
        .route("/api/analyze/youtube", post(analyze_youtube))
}

#[derive(Deserialize)]
struct YouTubeRequest {
    url: String,
}

/// POST /api/analyze/upload - Analyze an uploaded video
/// Accepts multipart form data with a "file" field holding a video/* part.
async fn analyze_upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Decision>, ApiError> {
    let mut multipart = multipart.log_api("[analyze/upload] Not a multipart request")?;
    let upload = read_video_field(&mut multipart).await?;
    let pipeline = state.pipeline()?;

    log::info!(
        "[analyze/upload] Received {:?} ({}, {} bytes) via {} pipeline",
        upload.file_name,
        upload.content_type,
        upload.bytes.len(),
        pipeline.name()
    );

    let analysis = {
        let _permit = state.analysis_permit().await?;
        pipeline
            .analyze_upload(upload)
            .await
            .log_api("[analyze/upload] Pipeline error")?
    };

    decide("[analyze/upload]", &analysis).map(Json)
}

/// POST /api/analyze/youtube - Analyze a linked YouTube video
async fn analyze_youtube(
    State(state): State<Arc<AppState>>,
    body: Result<Json<YouTubeRequest>, JsonRejection>,
) -> Result<Json<Decision>, ApiError> {
    let Json(req) = body.log_api("[analyze/youtube] Malformed request body")?;
    let url = VideoUrl::parse(&req.url).log_api("[analyze/youtube] Rejected URL")?;
    let pipeline = state.pipeline()?;

    log::info!(
        "[analyze/youtube] Analyzing {} ({:?} link, id {}) via {} pipeline",
        url.as_str(),
        url.shape(),
        url.video_id(),
        pipeline.name()
    );

    let analysis = {
        let _permit = state.analysis_permit().await?;
        pipeline
            .analyze_url(&url)
            .await
            .log_api("[analyze/youtube] Pipeline error")?
    };

    decide("[analyze/youtube]", &analysis).map(Json)
}

fn decide(context: &str, analysis: &AnalysisResult) -> Result<Decision, ApiError> {
    let decision = PolicyResolver::decide(analysis)
        .log_api(&format!("{context} Pipeline returned out-of-range values"))?;

    log::info!(
        "{} score={:.2} confidence={:.2} level={} action={} frames={}",
        context,
        decision.score,
        decision.confidence,
        decision.confidence_level,
        decision.action,
        decision.frames_analyzed
    );
    Ok(decision)
}

/// Pull the video part out of the form. Other fields are ignored.
async fn read_video_field(multipart: &mut Multipart) -> Result<VideoUpload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .log_api("[analyze/upload] Multipart field error")?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        if !content_type.starts_with("video/") {
            log::warn!(
                "[analyze/upload] Rejecting unsupported content type: {}",
                content_type
            );
            return Err(ApiError::bad_request("File must be a video"));
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .log_api("[analyze/upload] Failed to read file bytes")?;
        if bytes.is_empty() {
            return Err(ApiError::new(StatusCode::BAD_REQUEST, "Uploaded file is empty"));
        }

        return Ok(VideoUpload {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(ApiError::bad_request("No file provided"))
}
