//! Runtime configuration read from the environment once at startup

use anyhow::{Context, Result, anyhow, bail};
use clipguard_policy::AnalysisResult;
use std::time::Duration;
use url::Url;

use crate::constants::{
    DEFAULT_ANALYSIS_CONCURRENCY, DEFAULT_BIND_ADDR, DEFAULT_CORS_ORIGIN,
    DEFAULT_INFERENCE_TIMEOUT_SECS, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    /// Base URL of the inference service. `None` leaves analysis disabled
    /// unless `fixed_analysis` is set.
    pub inference_url: Option<Url>,
    /// Canned pipeline output for local development
    pub fixed_analysis: Option<AnalysisResult>,
    pub inference_timeout: Duration,
    pub max_upload_bytes: usize,
    pub analysis_concurrency: usize,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            inference_url: None,
            fixed_analysis: None,
            inference_timeout: Duration::from_secs(DEFAULT_INFERENCE_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            analysis_concurrency: DEFAULT_ANALYSIS_CONCURRENCY,
            cors_allowed_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset or blank keys keep their default;
    /// malformed values are an error rather than silently ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Config::default();

        if let Some(addr) = get("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(port) = get("PORT") {
            config.port = parse_number("PORT", &port)?;
        }
        if let Some(raw) = get("INFERENCE_URL") {
            let url = Url::parse(&raw).with_context(|| format!("INFERENCE_URL is not a valid URL: {raw}"))?;
            if !matches!(url.scheme(), "http" | "https") {
                bail!("INFERENCE_URL must use http or https, got {}", url.scheme());
            }
            config.inference_url = Some(url);
        }
        if let Some(raw) = get("FIXED_ANALYSIS") {
            config.fixed_analysis = Some(parse_fixed_analysis(&raw)?);
        }
        if let Some(raw) = get("INFERENCE_TIMEOUT_SECS") {
            let secs: u64 = parse_number("INFERENCE_TIMEOUT_SECS", &raw)?;
            config.inference_timeout = Duration::from_secs(positive("INFERENCE_TIMEOUT_SECS", secs)?);
        }
        if let Some(bytes) = get("MAX_UPLOAD_BYTES") {
            config.max_upload_bytes =
                positive("MAX_UPLOAD_BYTES", parse_number("MAX_UPLOAD_BYTES", &bytes)?)?;
        }
        if let Some(n) = get("ANALYSIS_CONCURRENCY") {
            config.analysis_concurrency =
                positive("ANALYSIS_CONCURRENCY", parse_number("ANALYSIS_CONCURRENCY", &n)?)?;
        }
        if let Some(origins) = get("CORS_ALLOWED_ORIGINS") {
            config.cors_allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| anyhow!("{key} must be a number, got {raw:?}: {e}"))
}

fn positive<T: PartialOrd + Default>(key: &str, value: T) -> Result<T> {
    if value <= T::default() {
        bail!("{key} must be greater than zero");
    }
    Ok(value)
}

/// Parses `score,confidence,frames`
fn parse_fixed_analysis(raw: &str) -> Result<AnalysisResult> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [score, confidence, frames] = parts.as_slice() else {
        bail!("FIXED_ANALYSIS must be score,confidence,frames, got {raw:?}");
    };

    Ok(AnalysisResult::new(
        parse_number("FIXED_ANALYSIS score", score)?,
        parse_number("FIXED_ANALYSIS confidence", confidence)?,
        parse_number("FIXED_ANALYSIS frames", frames)?,
    ))
}
