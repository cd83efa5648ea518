//! AI analysis result attached to a report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::severity::Severity;

/// Output of the scoring oracle for one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AiAnalysis {
    /// How severe the report reads, 0 to 100.
    #[validate(custom(function = "crate::score::validate_score"))]
    pub severity_score: f64,
    /// Overall confidence, 0 to 100.
    #[validate(custom(function = "crate::score::validate_score"))]
    pub confidence: f64,
    /// Topic tags such as `weather` or `photo_evidence`.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Text credibility, 0 to 100.
    #[validate(custom(function = "crate::score::validate_score"))]
    pub credibility: f64,
    /// Severity the model inferred, if any.
    pub predicted_severity: Option<Severity>,
    /// Model identifier.
    #[serde(default)]
    pub model_version: String,
    /// When the analysis completed.
    pub analyzed_at: DateTime<Utc>,
}
