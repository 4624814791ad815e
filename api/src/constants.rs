//! Application constants

/// Default listen port
pub const DEFAULT_PORT: u16 = 8000;

/// Default bind address
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

/// Maximum upload size for videos (200 MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Request timeout for the inference service. Downloads of linked videos
/// happen inside that call, so this is generous.
pub const DEFAULT_INFERENCE_TIMEOUT_SECS: u64 = 120;

/// Concurrent analyses allowed against the pipeline
pub const DEFAULT_ANALYSIS_CONCURRENCY: usize = 4;

/// Frontend dev server
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Multipart field carrying the uploaded video
pub const UPLOAD_FIELD: &str = "file";
