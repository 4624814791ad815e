//! Moderation policy for video violence analysis.
//!
//! Turns a violence score and model confidence (both percentages) into a
//! BLOCK / REVIEW / APPROVE recommendation with a rationale. Everything here
//! is pure and synchronous; see [`PolicyResolver`].

pub mod error;
pub mod model;
pub mod resolver;

pub use error::{InputField, PolicyError};
pub use model::{Action, AnalysisResult, ConfidenceLevel};
pub use resolver::{Decision, PolicyResolver, Rule, Verdict};
