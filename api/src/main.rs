mod config;
mod constants;
mod logging;
mod pipeline;
mod routes;
mod services;

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
};
use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use config::Config;
use pipeline::{AnalysisPipeline, FixedPipeline, RemotePipeline};
use services::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    /// `None` when no analysis backend is configured
    pipeline: Option<Arc<dyn AnalysisPipeline>>,
    /// Caps concurrent calls into the pipeline
    analysis_permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(pipeline: Option<Arc<dyn AnalysisPipeline>>, concurrency: usize) -> Self {
        Self {
            pipeline,
            analysis_permits: Arc::new(Semaphore::new(concurrency)),
        }
    }

    pub fn pipeline(&self) -> Result<&Arc<dyn AnalysisPipeline>, ApiError> {
        self.pipeline.as_ref().ok_or_else(|| {
            log::error!("[analyze] No analysis pipeline configured");
            ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Analysis pipeline not configured",
            )
        })
    }

    /// Waits for a free analysis slot
    pub async fn analysis_permit(&self) -> Result<SemaphorePermit<'_>, ApiError> {
        self.analysis_permits.acquire().await.map_err(|_| {
            ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Analysis is shutting down")
        })
    }
}

pub fn build_app(state: Arc<AppState>, config: &Config) -> Router {
    routes::build_routes()
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(&config.cors_allowed_origins))
                .layer(DefaultBodyLimit::max(config.max_upload_bytes)),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("[cors] Ignoring invalid origin {:?}: {}", o, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// A fixed analysis takes precedence so development never hits the network.
fn build_pipeline(config: &Config) -> anyhow::Result<Option<Arc<dyn AnalysisPipeline>>> {
    if let Some(result) = config.fixed_analysis {
        log::warn!(
            "[pipeline] FIXED_ANALYSIS set; every request resolves score={} confidence={}",
            result.score,
            result.confidence
        );
        return Ok(Some(Arc::new(FixedPipeline::new(result))));
    }

    match &config.inference_url {
        Some(url) => {
            let remote = RemotePipeline::new(url, config.inference_timeout)
                .context("Failed to create inference client")?;
            log::info!(
                "[pipeline] Using inference service at {} ({}s timeout)",
                remote.base_url(),
                config.inference_timeout.as_secs()
            );
            Ok(Some(Arc::new(remote)))
        }
        None => {
            log::warn!("[pipeline] INFERENCE_URL not set; analysis endpoints will return 503");
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = Config::from_env().context("Invalid configuration")?;
    let pipeline = build_pipeline(&config)?;
    let state = Arc::new(AppState::new(pipeline, config.analysis_concurrency));
    let app = build_app(state, &config);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    log::info!(
        "Listening on http://{} (max upload {} bytes, {} concurrent analyses)",
        addr,
        config.max_upload_bytes,
        config.analysis_concurrency
    );
    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
