pub mod error;
pub mod video_url;
