//! Shared data model: pipeline output and the enums a decision is built from

use serde::{Deserialize, Serialize};

use crate::error::{InputField, Result, check_range};

/// Lower bound (inclusive) of the HIGH confidence bucket.
pub const HIGH_CONFIDENCE_MIN: f64 = 70.0;
/// Lower bound (inclusive) of the MEDIUM confidence bucket.
pub const MEDIUM_CONFIDENCE_MIN: f64 = 40.0;

pub const PERCENT_MIN: f64 = 0.0;
pub const PERCENT_MAX: f64 = 100.0;

/// Output of the external analysis pipeline for one video
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Estimated likelihood of violent content, as a percentage
    pub score: f64,
    /// Model's certainty in `score`, as a percentage
    pub confidence: f64,
    pub frames_analyzed: u32,
}

impl AnalysisResult {
    pub fn new(score: f64, confidence: f64, frames_analyzed: u32) -> Self {
        Self {
            score,
            confidence,
            frames_analyzed,
        }
    }

    /// Build a result from the raw violence probability (0.0-1.0) of a
    /// binary classifier.
    ///
    /// Confidence is the distance from the 0.5 decision boundary, scaled to
    /// 0-100. Both values are rounded to two decimals so that the reported
    /// numbers are exactly the ones the policy decides on.
    ///
    /// Rounding happens before any threshold is applied: a probability of
    /// 0.550001 becomes a score of 55.0 and resolves as 55.0, not as a
    /// score just above 55.
    pub fn from_probability(probability: f64, frames_analyzed: u32) -> Result<Self> {
        let p = check_range(InputField::Probability, probability, 0.0, 1.0)?;
        Ok(Self {
            score: round2(p * 100.0),
            confidence: round2((p - 0.5).abs() * 2.0 * 100.0),
            frames_analyzed,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Discretized model confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Bucket a confidence percentage. Callers validate the range first.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= HIGH_CONFIDENCE_MIN {
            ConfidenceLevel::High
        } else if confidence >= MEDIUM_CONFIDENCE_MIN {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "HIGH",
            ConfidenceLevel::Medium => "MEDIUM",
            ConfidenceLevel::Low => "LOW",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommended moderation action.
///
/// Variants are declared in ascending severity, so `Ord` compares severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Approve,
    Review,
    Block,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Approve => "APPROVE",
            Action::Review => "REVIEW",
            Action::Block => "BLOCK",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
