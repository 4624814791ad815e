//! Policy resolution: (score, confidence) -> moderation decision
//!
//! The policy is a two-level decision table. Confidence picks a bucket, then
//! the score is matched against that bucket's ordered thresholds. Lower
//! confidence widens the REVIEW band, and only HIGH confidence can BLOCK.
//!
//! | Bucket | Score | Action |
//! |---|---|---|
//! | HIGH (>= 70) | > 46 | BLOCK |
//! | HIGH | <= 46 | APPROVE |
//! | MEDIUM (40..70) | >= 35 | REVIEW |
//! | MEDIUM | < 35 | APPROVE |
//! | LOW (< 40) | > 55 | REVIEW (likely sports/action) |
//! | LOW | 40..=55 | REVIEW (uncertain) |
//! | LOW | < 40 | APPROVE |

use serde::Serialize;

use crate::error::{InputField, Result, check_range};
use crate::model::{Action, AnalysisResult, ConfidenceLevel, PERCENT_MAX, PERCENT_MIN};

/// HIGH confidence: scores strictly above this are blocked.
pub const HIGH_BLOCK_ABOVE: f64 = 46.0;
/// MEDIUM confidence: scores from this value up go to review.
pub const MEDIUM_REVIEW_FROM: f64 = 35.0;
/// LOW confidence: scores strictly above this read as sports/action footage.
pub const LOW_SPORTS_ACTION_ABOVE: f64 = 55.0;
/// LOW confidence: scores from this value up go to review.
pub const LOW_REVIEW_FROM: f64 = 40.0;

/// The decision-table row that produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    HighConfidenceViolent,
    HighConfidenceSafe,
    MediumConfidenceReview,
    MediumConfidenceSafe,
    LowConfidenceSportsAction,
    LowConfidenceUncertain,
    LowConfidenceSafe,
}

impl Rule {
    pub fn action(&self) -> Action {
        match self {
            Rule::HighConfidenceViolent => Action::Block,
            Rule::MediumConfidenceReview
            | Rule::LowConfidenceSportsAction
            | Rule::LowConfidenceUncertain => Action::Review,
            Rule::HighConfidenceSafe | Rule::MediumConfidenceSafe | Rule::LowConfidenceSafe => {
                Action::Approve
            }
        }
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        match self {
            Rule::HighConfidenceViolent | Rule::HighConfidenceSafe => ConfidenceLevel::High,
            Rule::MediumConfidenceReview | Rule::MediumConfidenceSafe => ConfidenceLevel::Medium,
            Rule::LowConfidenceSportsAction
            | Rule::LowConfidenceUncertain
            | Rule::LowConfidenceSafe => ConfidenceLevel::Low,
        }
    }

    /// Human-readable reason this rule fired
    pub fn rationale(&self) -> &'static str {
        match self {
            Rule::HighConfidenceViolent => {
                "high confidence violence detected; content violates safety policy"
            }
            Rule::HighConfidenceSafe => {
                "clear safe content with high confidence; no concerning activity detected"
            }
            Rule::MediumConfidenceReview => {
                "violence indicators with medium confidence; manual review recommended"
            }
            Rule::MediumConfidenceSafe => "likely safe content; low violence indicators detected",
            Rule::LowConfidenceSportsAction => {
                "borderline score with low confidence suggests sports/action content; flagged for human review"
            }
            Rule::LowConfidenceUncertain => "uncertain classification; flagged for human judgment",
            Rule::LowConfidenceSafe => "low violence score despite uncertainty; likely safe content",
        }
    }
}

/// Outcome of the decision table alone, before any pipeline metadata is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Verdict {
    pub action: Action,
    pub confidence_level: ConfidenceLevel,
    pub rule: Rule,
}

impl From<Rule> for Verdict {
    fn from(rule: Rule) -> Self {
        Self {
            action: rule.action(),
            confidence_level: rule.confidence_level(),
            rule,
        }
    }
}

impl Verdict {
    /// Sentence explaining the verdict for the given inputs
    pub fn reasoning(&self, score: f64, confidence: f64) -> String {
        format!(
            "Score {:.2}% with {} confidence ({:.2}%): {}",
            score,
            self.confidence_level,
            confidence,
            self.rule.rationale()
        )
    }
}

/// Moderation decision for one analyzed video.
///
/// Serializes to the public response payload. `rule` stays internal; the
/// same information is carried by `reasoning`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub score: f64,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    #[serde(rename = "recommended_action")]
    pub action: Action,
    pub reasoning: String,
    pub frames_analyzed: u32,
    #[serde(skip)]
    pub rule: Rule,
}

/// Stateless resolver over the fixed threshold table
pub struct PolicyResolver;

impl PolicyResolver {
    /// Resolve a verdict for a score and confidence, both percentages.
    ///
    /// Values outside [0, 100] or NaN are rejected, never clamped.
    pub fn resolve(score: f64, confidence: f64) -> Result<Verdict> {
        let score = check_range(InputField::Score, score, PERCENT_MIN, PERCENT_MAX)?;
        let confidence =
            check_range(InputField::Confidence, confidence, PERCENT_MIN, PERCENT_MAX)?;

        let rule = match ConfidenceLevel::from_confidence(confidence) {
            ConfidenceLevel::High => match score {
                s if s > HIGH_BLOCK_ABOVE => Rule::HighConfidenceViolent,
                _ => Rule::HighConfidenceSafe,
            },
            ConfidenceLevel::Medium => match score {
                s if s >= MEDIUM_REVIEW_FROM => Rule::MediumConfidenceReview,
                _ => Rule::MediumConfidenceSafe,
            },
            ConfidenceLevel::Low => match score {
                s if s > LOW_SPORTS_ACTION_ABOVE => Rule::LowConfidenceSportsAction,
                s if s >= LOW_REVIEW_FROM => Rule::LowConfidenceUncertain,
                _ => Rule::LowConfidenceSafe,
            },
        };

        Ok(Verdict::from(rule))
    }

    /// Resolve a full decision for a pipeline result, carrying
    /// `frames_analyzed` through unchanged.
    pub fn decide(analysis: &AnalysisResult) -> Result<Decision> {
        let verdict = Self::resolve(analysis.score, analysis.confidence)?;

        Ok(Decision {
            score: analysis.score,
            confidence: analysis.confidence,
            confidence_level: verdict.confidence_level,
            action: verdict.action,
            reasoning: verdict.reasoning(analysis.score, analysis.confidence),
            frames_analyzed: analysis.frames_analyzed,
            rule: verdict.rule,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PolicyError;

    const BOUNDARIES: [f64; 8] = [0.0, 35.0, 40.0, 46.0, 55.0, 60.0, 70.0, 100.0];

    /// Dense grid over [0, 100] in 0.25 steps, plus every table boundary
    /// and its immediate neighbours.
    fn grid() -> Vec<f64> {
        let mut values: Vec<f64> = (0..=400).map(|i| i as f64 * 0.25).collect();
        for b in BOUNDARIES {
            values.push(b);
            values.push((b - 0.01).max(0.0));
            values.push((b + 0.01).min(100.0));
        }
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();
        values
    }

    fn verdict(score: f64, confidence: f64) -> Verdict {
        PolicyResolver::resolve(score, confidence).expect("in-range input")
    }

    #[test]
    fn resolve_is_total_over_the_domain() {
        for &confidence in &grid() {
            for &score in &grid() {
                let v = verdict(score, confidence);
                assert_eq!(v.action, v.rule.action());
                assert_eq!(v.confidence_level, v.rule.confidence_level());
                assert_eq!(
                    v.confidence_level,
                    ConfidenceLevel::from_confidence(confidence)
                );
            }
        }
    }

    #[test]
    fn high_confidence_block_boundary() {
        let at = verdict(46.0, 85.0);
        assert_eq!(at.action, Action::Approve);
        assert_eq!(at.confidence_level, ConfidenceLevel::High);

        let above = verdict(46.01, 85.0);
        assert_eq!(above.action, Action::Block);
        assert_eq!(above.confidence_level, ConfidenceLevel::High);
    }

    #[test]
    fn confidence_boundaries_belong_to_the_upper_bucket() {
        assert_eq!(verdict(50.0, 70.0).confidence_level, ConfidenceLevel::High);
        assert_eq!(verdict(50.0, 40.0).confidence_level, ConfidenceLevel::Medium);
        assert_eq!(verdict(50.0, 39.99).confidence_level, ConfidenceLevel::Low);
    }

    #[test]
    fn medium_confidence_reviews_from_35() {
        assert_eq!(verdict(34.99, 55.0).action, Action::Approve);
        assert_eq!(verdict(35.0, 55.0).action, Action::Review);
        assert_eq!(verdict(60.0, 55.0).action, Action::Review);
        assert_eq!(verdict(60.01, 55.0).action, Action::Review);
        assert_eq!(verdict(100.0, 55.0).action, Action::Review);
    }

    #[test]
    fn low_confidence_bands() {
        assert_eq!(verdict(39.99, 10.0).rule, Rule::LowConfidenceSafe);
        assert_eq!(verdict(40.0, 10.0).rule, Rule::LowConfidenceUncertain);
        assert_eq!(verdict(55.0, 10.0).rule, Rule::LowConfidenceUncertain);
        assert_eq!(verdict(55.01, 10.0).rule, Rule::LowConfidenceSportsAction);
    }

    #[test]
    fn thresholds_apply_to_rounded_probability() {
        let analysis = AnalysisResult::from_probability(0.550001, 16).unwrap();
        assert_eq!(analysis.score, 55.0);
        assert_eq!(analysis.confidence, 10.0);

        let decision = PolicyResolver::decide(&analysis).unwrap();
        assert_eq!(decision.rule, Rule::LowConfidenceUncertain);
        assert_eq!(decision.action, Action::Review);
    }

    #[test]
    fn block_requires_high_confidence() {
        for &confidence in &grid() {
            for &score in &grid() {
                let v = verdict(score, confidence);
                if v.action == Action::Block {
                    assert_eq!(v.confidence_level, ConfidenceLevel::High);
                }
            }
        }
    }

    #[test]
    fn severity_is_monotonic_in_score() {
        for &confidence in &grid() {
            let mut previous = Action::Approve;
            for &score in &grid() {
                let action = verdict(score, confidence).action;
                assert!(
                    action >= previous,
                    "severity dropped at score {score} confidence {confidence}"
                );
                previous = action;
            }
        }
    }

    #[test]
    fn repeated_resolution_is_identical() {
        let analysis = AnalysisResult::new(61.0, 25.0, 16);
        let first = PolicyResolver::decide(&analysis).unwrap();
        for _ in 0..10 {
            let again = PolicyResolver::decide(&analysis).unwrap();
            assert_eq!(again, first);
            assert_eq!(
                serde_json::to_string(&again).unwrap(),
                serde_json::to_string(&first).unwrap()
            );
        }
    }

    #[test]
    fn scenario_confident_violence_is_blocked() {
        let v = verdict(98.0, 85.0);
        assert_eq!(v.confidence_level, ConfidenceLevel::High);
        assert_eq!(v.action, Action::Block);
    }

    #[test]
    fn scenario_uncertain_high_score_is_reviewed_as_sports() {
        let decision = PolicyResolver::decide(&AnalysisResult::new(61.0, 25.0, 16)).unwrap();
        assert_eq!(decision.confidence_level, ConfidenceLevel::Low);
        assert_eq!(decision.action, Action::Review);
        assert!(decision.reasoning.contains("sports/action"));
        assert!(decision.reasoning.contains("61.00%"));
        assert!(decision.reasoning.contains("LOW"));
    }

    #[test]
    fn scenario_confident_safe_is_approved() {
        let v = verdict(1.0, 90.0);
        assert_eq!(v.confidence_level, ConfidenceLevel::High);
        assert_eq!(v.action, Action::Approve);
    }

    #[test]
    fn scenario_medium_borderline_is_reviewed() {
        let v = verdict(50.0, 55.0);
        assert_eq!(v.confidence_level, ConfidenceLevel::Medium);
        assert_eq!(v.action, Action::Review);
    }

    #[test]
    fn scenario_low_score_low_confidence_is_approved() {
        let v = verdict(30.0, 20.0);
        assert_eq!(v.confidence_level, ConfidenceLevel::Low);
        assert_eq!(v.action, Action::Approve);
    }

    #[test]
    fn scenario_negative_score_is_rejected() {
        let err = PolicyResolver::resolve(-5.0, 50.0).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::InvalidInputRange {
                field: InputField::Score,
                ..
            }
        ));
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        assert!(PolicyResolver::resolve(50.0, 100.5).is_err());
        assert!(PolicyResolver::resolve(50.0, f64::NAN).is_err());
        assert!(PolicyResolver::decide(&AnalysisResult::new(50.0, -1.0, 3)).is_err());
    }

    #[test]
    fn decision_passes_frames_through() {
        let decision = PolicyResolver::decide(&AnalysisResult::new(12.5, 75.0, 7)).unwrap();
        assert_eq!(decision.frames_analyzed, 7);
        assert_eq!(decision.score, 12.5);
        assert_eq!(decision.confidence, 75.0);
        assert_eq!(decision.rule, Rule::HighConfidenceSafe);
    }

    #[test]
    fn every_rule_has_distinct_rationale() {
        let rules = [
            Rule::HighConfidenceViolent,
            Rule::HighConfidenceSafe,
            Rule::MediumConfidenceReview,
            Rule::MediumConfidenceSafe,
            Rule::LowConfidenceSportsAction,
            Rule::LowConfidenceUncertain,
            Rule::LowConfidenceSafe,
        ];
        let mut seen = std::collections::HashSet::new();
        for rule in rules {
            assert!(seen.insert(rule.rationale()), "duplicate rationale for {rule:?}");
        }
    }

    #[test]
    fn decision_serializes_to_response_payload() {
        let decision = PolicyResolver::decide(&AnalysisResult::new(98.0, 96.0, 16)).unwrap();
        let json = serde_json::to_value(&decision).unwrap();

        assert_eq!(json["score"], 98.0);
        assert_eq!(json["confidence"], 96.0);
        assert_eq!(json["confidence_level"], "HIGH");
        assert_eq!(json["recommended_action"], "BLOCK");
        assert_eq!(json["frames_analyzed"], 16);
        assert!(json["reasoning"].as_str().unwrap().contains("violates safety policy"));
        assert!(json.get("rule").is_none());
        assert_eq!(json.as_object().unwrap().len(), 6);
    }
}
