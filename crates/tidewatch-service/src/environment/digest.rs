//! Daily digest.
//!
//! Once per UTC day every user with active alerts near home receives one
//! summary notification. The (user, day) pair is claimed before sending so
//! overlapping runs never send twice; a failed send gives the claim back.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use tidewatch_core::result::AppResult;
use tidewatch_core::traits::Clock;
use tidewatch_database::repositories::{AlertRepository, NotificationRepository, UserRepository};
use tidewatch_entity::alert::Alert;
use tidewatch_entity::notification::{NotificationKind, NotificationPriority, OutboundMessage};
use tidewatch_entity::user::User;

use crate::notification::NotificationDispatcher;

/// Most alerts listed in one digest body.
const MAX_LISTED_ALERTS: usize = 5;

/// Counters for one digest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DigestOutcome {
    /// Users looked at.
    pub users_considered: usize,
    /// Digests delivered.
    pub sent: usize,
    /// Users with nothing to report or already served today.
    pub skipped: usize,
    /// Sends that failed.
    pub failed: usize,
}

/// Sends the once-a-day summary of nearby active alerts.
#[derive(Debug, Clone)]
pub struct DigestService {
    users: Arc<UserRepository>,
    alerts: Arc<AlertRepository>,
    notifications: Arc<NotificationRepository>,
    dispatcher: NotificationDispatcher,
    clock: Arc<dyn Clock>,
    radius_km: f64,
}

impl DigestService {
    /// Creates a new digest service.
    pub fn new(
        users: Arc<UserRepository>,
        alerts: Arc<AlertRepository>,
        notifications: Arc<NotificationRepository>,
        dispatcher: NotificationDispatcher,
        clock: Arc<dyn Clock>,
        radius_km: f64,
    ) -> Self {
        Self {
            users,
            alerts,
            notifications,
            dispatcher,
            clock,
            radius_km,
        }
    }

    /// Send today's digest to every user who has not had one yet.
    pub async fn run_daily_digest(&self) -> AppResult<DigestOutcome> {
        let now = self.clock.now();
        let today = now.date_naive();
        let users = self.users.find_all().await?;
        let mut outcome = DigestOutcome {
            users_considered: users.len(),
            ..DigestOutcome::default()
        };

        for user in users {
            let nearby = self
                .alerts
                .find_active_near(&user.location, self.radius_km, now)
                .await?;
            if nearby.is_empty() {
                outcome.skipped += 1;
                continue;
            }
            if !self.notifications.claim_digest(user.id, today, now).await? {
                debug!(user_id = %user.id, %today, "Digest already sent today");
                outcome.skipped += 1;
                continue;
            }

            match self.send(&user, today, &nearby).await {
                Ok(()) => outcome.sent += 1,
                Err(e) => {
                    self.notifications.release_digest(user.id, today).await;
                    if e.is_fatal() {
                        return Err(e);
                    }
                    warn!(user_id = %user.id, error = %e, "Digest delivery failed");
                    outcome.failed += 1;
                }
            }
        }

        info!(
            %today,
            considered = outcome.users_considered,
            sent = outcome.sent,
            skipped = outcome.skipped,
            failed = outcome.failed,
            "Daily digest finished"
        );
        Ok(outcome)
    }

    async fn send(&self, user: &User, day: NaiveDate, alerts: &[Alert]) -> AppResult<()> {
        let message = OutboundMessage::new(
            NotificationKind::Digest,
            format!("Coastal summary for {day}"),
            digest_body(alerts),
        )
        .with_priority(NotificationPriority::Low);
        self.dispatcher.send_to_user(user, &message).await?;
        Ok(())
    }
}

fn digest_body(alerts: &[Alert]) -> String {
    let mut lines = vec![format!(
        "{} active alert{} near you:",
        alerts.len(),
        if alerts.len() == 1 { "" } else { "s" }
    )];
    for alert in alerts.iter().take(MAX_LISTED_ALERTS) {
        lines.push(format!(
            "- {} (until {})",
            alert.title,
            alert.expires_at.format("%H:%M UTC")
        ));
    }
    if alerts.len() > MAX_LISTED_ALERTS {
        lines.push(format!("…and {} more", alerts.len() - MAX_LISTED_ALERTS));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use tidewatch_entity::Severity;
    use tidewatch_entity::notification::NotificationKind;

    use crate::testing::{Harness, alert_spec};

    #[tokio::test]
    async fn test_digest_sent_once_per_day() {
        let h = Harness::new().await;
        let user = h.citizen("digest@example.org").await;
        h.services.alerts.create(alert_spec(Severity::Medium, 20.0)).await.unwrap();

        let (a, b) = tokio::join!(
            h.services.digest.run_daily_digest(),
            h.services.digest.run_daily_digest()
        );
        assert_eq!(a.unwrap().sent + b.unwrap().sent, 1);

        let same_day = h.services.digest.run_daily_digest().await.unwrap();
        assert_eq!(same_day.sent, 0);

        h.clock.advance(Duration::hours(20));
        let next_day = h.services.digest.run_daily_digest().await.unwrap();
        assert_eq!(next_day.sent, 1);

        let digests = h
            .db
            .notifications
            .find_by_user(&user.id, 50)
            .await
            .unwrap()
            .into_iter()
            .filter(|n| n.kind == NotificationKind::Digest)
            .count();
        assert_eq!(digests, 2);
    }

    #[tokio::test]
    async fn test_users_without_nearby_alerts_are_skipped() {
        let h = Harness::new().await;
        h.citizen("calm@example.org").await;
        let outcome = h.services.digest.run_daily_digest().await.unwrap();
        assert_eq!(outcome.users_considered, 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.sent, 0);
    }
}
