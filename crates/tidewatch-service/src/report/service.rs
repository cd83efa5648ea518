//! Report ingestion pipeline.
//!
//! `submit` stores the report and credits the author synchronously, then
//! hands analysis to a background task. The task stores the oracle result and
//! may escalate the report into an alert; escalation is claimed on the
//! report row so at most one alert is ever generated per report.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use validator::Validate;

use tidewatch_core::config::report::ReportsConfig;
use tidewatch_core::error::AppError;
use tidewatch_core::events::{EventKind, Room};
use tidewatch_core::result::AppResult;
use tidewatch_core::traits::{Clock, EventPublisher, Repository};
use tidewatch_core::types::geo::validate_radius;
use tidewatch_core::types::{AlertId, GeoPoint, ReportId, UserId};
use tidewatch_database::repositories::{ReportRepository, UserRepository};
use tidewatch_entity::Severity;
use tidewatch_entity::alert::Alert;
use tidewatch_entity::notification::{NotificationKind, NotificationPriority, OutboundMessage};
use tidewatch_entity::report::{AiAnalysis, Comment, Report, ReportStatus, SubmitReport};
use tidewatch_oracle::ScoringOracle;

use super::escalation::{escalation_spec, should_escalate};
use crate::alert::AlertService;
use crate::context::RequestContext;
use crate::gamification::{GamificationService, engine};
use crate::notification::NotificationDispatcher;

/// Longest accepted comment, in characters.
const MAX_COMMENT_CHARS: usize = 1000;

/// What the submitter gets back.
#[derive(Debug)]
pub struct SubmissionReceipt {
    /// The stored report, still pending.
    pub report: Report,
    /// Points credited for the submission.
    pub points_awarded: u64,
    /// Keys of badges unlocked by the submission.
    pub new_badges: Vec<String>,
    /// Background analysis. Resolves to the escalated alert, if any.
    pub analysis: JoinHandle<AppResult<Option<Alert>>>,
}

/// Validates, stores, scores and moderates community reports.
#[derive(Debug, Clone)]
pub struct ReportService {
    reports: Arc<ReportRepository>,
    users: Arc<UserRepository>,
    alerts: AlertService,
    gamification: GamificationService,
    oracle: Arc<dyn ScoringOracle>,
    dispatcher: NotificationDispatcher,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    config: ReportsConfig,
    oracle_timeout: Duration,
}

impl ReportService {
    /// Creates a new report service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reports: Arc<ReportRepository>,
        users: Arc<UserRepository>,
        alerts: AlertService,
        gamification: GamificationService,
        oracle: Arc<dyn ScoringOracle>,
        dispatcher: NotificationDispatcher,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        config: ReportsConfig,
        oracle_timeout: Duration,
    ) -> Self {
        Self {
            reports,
            users,
            alerts,
            gamification,
            oracle,
            dispatcher,
            publisher,
            clock,
            config,
            oracle_timeout,
        }
    }

    /// Submit a report on behalf of `ctx.user_id`.
    ///
    /// Points, streak and badges are settled before this returns. Analysis
    /// and escalation continue in the background; the returned handle can be
    /// awaited to observe them.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        input: SubmitReport,
    ) -> AppResult<SubmissionReceipt> {
        input.validate()?;
        if input.attachments.len() > self.config.max_attachments {
            return Err(AppError::validation(format!(
                "A report may carry at most {} attachments",
                self.config.max_attachments
            )));
        }
        let author = self
            .users
            .find_by_id(&ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", ctx.user_id)))?;

        let now = self.clock.now();
        let points = engine::report_points(
            input.report_type,
            input.severity,
            input.attachments.len(),
            u64::from(self.config.attachment_points),
        );
        let mut report = Report::new(author.id, input, now);
        report.points_awarded = points;
        let report = self.reports.create(&report).await?;

        info!(
            report_id = %report.id,
            author_id = %author.id,
            report_type = %report.report_type,
            severity = %report.severity,
            points,
            "Report submitted"
        );

        let rewards = self
            .gamification
            .record_submission(&author.id, report.report_type, points, now.date_naive())
            .await?;

        match serde_json::to_value(&report) {
            Ok(payload) => self.publisher.publish(
                &Room::for_point(&report.location),
                EventKind::NewReport,
                payload,
            ),
            Err(e) => warn!(report_id = %report.id, error = %e, "Failed to serialize report event"),
        }

        let analysis = {
            let service = self.clone();
            let snapshot = report.clone();
            tokio::spawn(async move { service.analyze(snapshot).await })
        };

        if report.severity != Severity::Low {
            self.notify_community(&report).await;
        }

        Ok(SubmissionReceipt {
            report,
            points_awarded: rewards.points_awarded,
            new_badges: rewards.new_badges.into_iter().map(|b| b.key).collect(),
            analysis,
        })
    }

    /// Store an oracle result, advance `pending → processing` and escalate
    /// when the report qualifies. Returns the escalated alert, if this call
    /// created one.
    pub async fn apply_analysis(
        &self,
        id: &ReportId,
        analysis: AiAnalysis,
    ) -> AppResult<Option<Alert>> {
        analysis.validate()?;
        let now = self.clock.now();
        let threshold = self.config.escalation_confidence_threshold;
        let (claim, report) = self
            .reports
            .update_with(id, |report| {
                report.analysis = Some(analysis.clone());
                if report.status.can_transition_to(ReportStatus::Processing) {
                    report.status = ReportStatus::Processing;
                }
                report.updated_at = now;

                if report.escalated_alert.is_none()
                    && should_escalate(report, &analysis, threshold)
                {
                    let alert_id = AlertId::new();
                    report.escalated_alert = Some(alert_id);
                    return Ok(Some(alert_id));
                }
                Ok(None)
            })
            .await?;

        debug!(
            report_id = %report.id,
            confidence = analysis.confidence,
            status = %report.status,
            "Report analysis stored"
        );

        match claim {
            Some(alert_id) => self.escalate(&report, &analysis, alert_id).await.map(Some),
            None => Ok(None),
        }
    }

    /// Expert decision on a report. Verification credits the author and
    /// notifies them; rejection does neither.
    pub async fn verify(
        &self,
        ctx: &RequestContext,
        id: &ReportId,
        verified: bool,
        notes: Option<String>,
    ) -> AppResult<Report> {
        if !ctx.can_verify() {
            return Err(AppError::authorization(
                "Only experts and admins may verify reports",
            ));
        }

        let now = self.clock.now();
        let next = if verified {
            ReportStatus::Verified
        } else {
            ReportStatus::Rejected
        };
        let ((), report) = self
            .reports
            .update_with(id, |report| {
                if report.status.is_decided() {
                    return Err(AppError::conflict(format!(
                        "Report {} is already {}",
                        report.id, report.status
                    )));
                }
                report.status = next;
                report.verified_by = Some(ctx.user_id);
                report.verified_at = Some(now);
                report.verification_notes = notes;
                report.updated_at = now;
                Ok(())
            })
            .await?;

        info!(
            report_id = %report.id,
            verifier = %ctx.user_id,
            status = %report.status,
            "Report decided"
        );

        if verified {
            self.gamification
                .record_verification(&report.author_id, self.config.verification_bonus)
                .await?;

            let message = OutboundMessage::new(
                NotificationKind::Verification,
                "Your report was verified",
                format!(
                    "\"{}\" was confirmed by an expert. +{} points.",
                    report.title, self.config.verification_bonus
                ),
            )
            .with_report(report.id);
            if let Err(e) = self.dispatcher.send_to_user_id(&report.author_id, &message).await {
                warn!(report_id = %report.id, error = %e, "Verification notification failed");
            }
        }
        Ok(report)
    }

    /// Record a vote. A second vote by the same user is a conflict and
    /// changes nothing.
    pub async fn vote(&self, ctx: &RequestContext, id: &ReportId, helpful: bool) -> AppResult<Report> {
        let now = self.clock.now();
        let ((), report) = self
            .reports
            .update_with(id, |report| {
                report.votes.record(ctx.user_id, helpful)?;
                report.updated_at = now;
                Ok(())
            })
            .await?;

        if helpful {
            if let Err(e) = self
                .gamification
                .award_points(&report.author_id, self.config.helpful_vote_bonus)
                .await
            {
                if e.is_fatal() {
                    return Err(e);
                }
                warn!(report_id = %report.id, error = %e, "Helpful vote bonus not credited");
            }
        }
        Ok(report)
    }

    /// Append a comment and notify the author when someone else wrote it.
    pub async fn comment(
        &self,
        ctx: &RequestContext,
        id: &ReportId,
        message: &str,
    ) -> AppResult<Report> {
        let text = message.trim();
        if text.is_empty() {
            return Err(AppError::validation("Comment must not be empty"));
        }
        if text.chars().count() > MAX_COMMENT_CHARS {
            return Err(AppError::validation(format!(
                "Comment must be at most {MAX_COMMENT_CHARS} characters"
            )));
        }

        let now = self.clock.now();
        let ((), report) = self
            .reports
            .update_with(id, |report| {
                report.comments.push(Comment {
                    author_id: ctx.user_id,
                    message: text.to_string(),
                    created_at: now,
                });
                report.updated_at = now;
                Ok(())
            })
            .await?;

        if report.author_id != ctx.user_id {
            let notice = OutboundMessage::new(
                NotificationKind::Comment,
                "New comment on your report",
                format!("Someone commented on \"{}\": {}", report.title, text),
            )
            .with_report(report.id);
            if let Err(e) = self.dispatcher.send_to_user_id(&report.author_id, &notice).await {
                warn!(report_id = %report.id, error = %e, "Comment notification failed");
            }
        }
        Ok(report)
    }

    /// Close out a decided report.
    pub async fn resolve(&self, ctx: &RequestContext, id: &ReportId) -> AppResult<Report> {
        if !ctx.can_verify() {
            return Err(AppError::authorization(
                "Only experts and admins may resolve reports",
            ));
        }
        let now = self.clock.now();
        let ((), report) = self
            .reports
            .update_with(id, |report| {
                if !report.status.can_transition_to(ReportStatus::Resolved) {
                    return Err(AppError::conflict(format!(
                        "Report {} is {} and cannot be resolved",
                        report.id, report.status
                    )));
                }
                report.status = ReportStatus::Resolved;
                report.updated_at = now;
                Ok(())
            })
            .await?;
        info!(report_id = %report.id, "Report resolved");
        Ok(report)
    }

    /// Get one report.
    pub async fn get(&self, id: &ReportId) -> AppResult<Report> {
        self.reports
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Report {id} not found")))
    }

    /// Reports within `radius_km` of `point`, newest first.
    pub async fn list_nearby(&self, point: &GeoPoint, radius_km: f64) -> AppResult<Vec<Report>> {
        validate_radius(radius_km)?;
        self.reports.find_nearby(point, radius_km).await
    }

    /// Reports written by `author_id`, newest first.
    pub async fn list_by_author(&self, author_id: &UserId) -> AppResult<Vec<Report>> {
        self.reports.find_by_author(author_id).await
    }

    /// Background half of `submit`. Oracle failure leaves the report pending.
    async fn analyze(self, report: Report) -> AppResult<Option<Alert>> {
        let outcome = tokio::time::timeout(self.oracle_timeout, self.oracle.analyze_report(&report)).await;
        let analysis = match outcome {
            Ok(Ok(analysis)) => analysis,
            Ok(Err(e)) => {
                warn!(report_id = %report.id, oracle = self.oracle.name(), error = %e, "Report analysis failed");
                return Ok(None);
            }
            Err(_) => {
                warn!(
                    report_id = %report.id,
                    oracle = self.oracle.name(),
                    timeout_ms = self.oracle_timeout.as_millis() as u64,
                    "Report analysis timed out"
                );
                return Ok(None);
            }
        };

        self.apply_analysis(&report.id, analysis).await.map_err(|e| {
            warn!(report_id = %report.id, error = %e, "Failed to apply report analysis");
            e
        })
    }

    /// Create the escalated alert under a claimed id, releasing the claim
    /// if creation fails.
    async fn escalate(
        &self,
        report: &Report,
        analysis: &AiAnalysis,
        alert_id: AlertId,
    ) -> AppResult<Alert> {
        let spec = escalation_spec(report, analysis, &self.config);
        match self.alerts.create_escalated(spec, alert_id).await {
            Ok(alert) => {
                info!(
                    report_id = %report.id,
                    alert_id = %alert.id,
                    confidence = analysis.confidence,
                    "Report escalated to alert"
                );
                Ok(alert)
            }
            Err(e) => {
                warn!(report_id = %report.id, error = %e, "Escalation failed, releasing claim");
                let released = self
                    .reports
                    .update_with(&report.id, |r| {
                        if r.escalated_alert == Some(alert_id) {
                            r.escalated_alert = None;
                        }
                        Ok(())
                    })
                    .await;
                if let Err(release_err) = released {
                    warn!(report_id = %report.id, error = %release_err, "Failed to release escalation claim");
                }
                Err(e)
            }
        }
    }

    async fn notify_community(&self, report: &Report) {
        let audience = match self.dispatcher.rules().community_audience(report).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(report_id = %report.id, error = %e, "Community audience lookup failed");
                return;
            }
        };
        if audience.is_empty() {
            return;
        }
        let message = OutboundMessage::new(
            NotificationKind::CommunityReport,
            format!("Nearby report: {}", report.title),
            format!(
                "A {} {} report was submitted near you.",
                report.severity,
                report.report_type.as_str().replace('_', " ")
            ),
        )
        .with_priority(NotificationPriority::from_severity(report.severity))
        .with_report(report.id);
        if let Err(e) = self.dispatcher.send_bulk(&audience, &message).await {
            warn!(report_id = %report.id, error = %e, "Community notification fan-out failed");
        }
    }
}
