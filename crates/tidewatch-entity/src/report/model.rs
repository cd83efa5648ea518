//! Report entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use tidewatch_core::types::{AlertId, GeoPoint, ReportId, UserId};

use super::analysis::AiAnalysis;
use super::attachment::Attachment;
use super::engagement::{Comment, VoteTally};
use super::kind::ReportType;
use super::status::ReportStatus;
use crate::severity::Severity;

/// A crowd-sourced observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Unique report identifier.
    pub id: ReportId,
    /// Who submitted it.
    pub author_id: UserId,
    /// What was observed.
    pub report_type: ReportType,
    /// Reporter's severity estimate.
    pub severity: Severity,
    /// Short headline.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Where it was observed.
    pub location: GeoPoint,
    /// Owned attachment references.
    pub attachments: Vec<Attachment>,
    /// Oracle output, absent until (and unless) analysis succeeds.
    pub analysis: Option<AiAnalysis>,
    /// Verification status.
    pub status: ReportStatus,
    /// Owned vote tally.
    pub votes: VoteTally,
    /// Owned, append-only follow-up log.
    pub comments: Vec<Comment>,
    /// Expert who decided the report.
    pub verified_by: Option<UserId>,
    /// When the decision was made.
    pub verified_at: Option<DateTime<Utc>>,
    /// Expert's notes.
    pub verification_notes: Option<String>,
    /// Alert generated from this report. Set at most once.
    pub escalated_alert: Option<AlertId>,
    /// Points credited to the author at submission.
    pub points_awarded: u64,
    /// When the report was submitted.
    pub created_at: DateTime<Utc>,
    /// When the report was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// Build a pending report from a submission.
    pub fn new(author_id: UserId, input: SubmitReport, now: DateTime<Utc>) -> Self {
        Self {
            id: ReportId::new(),
            author_id,
            report_type: input.report_type,
            severity: input.severity,
            title: input.title,
            description: input.description,
            location: input.location,
            attachments: input.attachments,
            analysis: None,
            status: ReportStatus::Pending,
            votes: VoteTally::default(),
            comments: Vec::new(),
            verified_by: None,
            verified_at: None,
            verification_notes: None,
            escalated_alert: None,
            points_awarded: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of image attachments.
    pub fn image_count(&self) -> usize {
        self.attachments.iter().filter(|a| a.is_image()).count()
    }
}

/// Data supplied by a reporter.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitReport {
    /// What was observed.
    pub report_type: ReportType,
    /// Reporter's severity estimate.
    pub severity: Severity,
    /// Short headline.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Free-text description.
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    /// Where it was observed.
    pub location: GeoPoint,
    /// Uploaded file references.
    #[serde(default)]
    #[validate(nested)]
    pub attachments: Vec<Attachment>,
}
