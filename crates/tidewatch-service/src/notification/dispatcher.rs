//! Multi-channel notification dispatcher.
//!
//! A notification is persisted first, then each planned channel is attempted
//! independently under its own timeout. Outcomes are written back onto the
//! stored record and the user's private room receives a `notification`
//! event. Channel failures are recorded, never propagated.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use tidewatch_core::config::notification::NotificationsConfig;
use tidewatch_core::error::AppError;
use tidewatch_core::events::{EventKind, Room};
use tidewatch_core::result::AppResult;
use tidewatch_core::traits::{Clock, DeliveryFailure, EventPublisher, PushContent, Repository};
use tidewatch_core::types::UserId;
use tidewatch_database::repositories::{NotificationRepository, UserRepository};
use tidewatch_entity::notification::{
    Channel, ChannelDeliveries, Notification, NotificationPriority, OutboundMessage,
};
use tidewatch_entity::user::User;

use super::gateway::Gateways;
use super::rules::NotificationRules;

/// Counters returned by [`NotificationDispatcher::send_bulk`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    /// Recipients handed in.
    pub attempted: usize,
    /// Notifications persisted.
    pub persisted: usize,
    /// Recipients that could not be notified.
    pub failed: usize,
    /// Batches processed.
    pub batches: usize,
}

/// Fans messages out to users over their opted-in channels.
#[derive(Clone)]
pub struct NotificationDispatcher {
    users: Arc<UserRepository>,
    notifications: Arc<NotificationRepository>,
    gateways: Gateways,
    rules: NotificationRules,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    batch_size: usize,
    batch_delay: Duration,
    channel_timeout: Duration,
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("batch_size", &self.batch_size)
            .field("batch_delay", &self.batch_delay)
            .field("channel_timeout", &self.channel_timeout)
            .finish_non_exhaustive()
    }
}

impl NotificationDispatcher {
    /// Creates a dispatcher. Fails if `sms_min_priority` is not a priority name.
    pub fn new(
        users: Arc<UserRepository>,
        notifications: Arc<NotificationRepository>,
        gateways: Gateways,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        config: &NotificationsConfig,
    ) -> AppResult<Self> {
        let sms_min_priority = config
            .sms_min_priority
            .parse::<NotificationPriority>()
            .map_err(|e| AppError::configuration(format!("notifications.sms_min_priority: {e}")))?;
        let rules = NotificationRules::new(
            Arc::clone(&users),
            sms_min_priority,
            config.community_radius_km,
        );

        Ok(Self {
            users,
            notifications,
            gateways,
            rules,
            publisher,
            clock,
            batch_size: config.batch_size.max(1),
            batch_delay: Duration::from_millis(config.batch_delay_ms),
            channel_timeout: Duration::from_millis(config.channel_timeout_ms),
        })
    }

    /// Audience and channel rules used by this dispatcher.
    pub fn rules(&self) -> &NotificationRules {
        &self.rules
    }

    /// Deliver `message` to one user.
    ///
    /// Returns the stored notification with every channel outcome recorded.
    /// Only a failure to persist the notification is an error.
    pub async fn send_to_user(
        &self,
        user: &User,
        message: &OutboundMessage,
    ) -> AppResult<Notification> {
        let channels = self.rules.plan_channels(user, message.priority);
        let now = self.clock.now();
        let notification = Notification::new(
            user.id,
            message,
            ChannelDeliveries::planned(&channels),
            now,
        );
        let notification = self.notifications.create(&notification).await.map_err(|e| {
            error!(user_id = %user.id, error = %e, "Failed to persist notification");
            e
        })?;

        let (push, sms, email) = tokio::join!(
            self.attempt_push(user, message, channels.contains(&Channel::Push)),
            self.attempt_sms(user, message, channels.contains(&Channel::Sms)),
            self.attempt_email(user, message, channels.contains(&Channel::Email)),
        );

        let finished_at = self.clock.now();
        let outcomes = [
            (Channel::Push, push),
            (Channel::Sms, sms),
            (Channel::Email, email),
        ];
        let recorded = self
            .notifications
            .update_with(&notification.id, |n| {
                for (channel, outcome) in &outcomes {
                    match outcome {
                        Some(Ok(())) => n.channels.get_mut(*channel).mark_sent(finished_at),
                        Some(Err(reason)) => n.channels.get_mut(*channel).mark_failed(reason.clone()),
                        None => {}
                    }
                }
                Ok(())
            })
            .await;

        let notification = match recorded {
            Ok(((), stored)) => stored,
            Err(e) => {
                warn!(notification_id = %notification.id, error = %e, "Failed to record channel outcomes");
                notification
            }
        };

        debug!(
            notification_id = %notification.id,
            user_id = %user.id,
            sent = ?notification.channels.sent_channels(),
            "Notification dispatched"
        );

        match serde_json::to_value(&notification) {
            Ok(payload) => self
                .publisher
                .publish(&Room::User(user.id), EventKind::Notification, payload),
            Err(e) => warn!(error = %e, "Failed to serialize notification event"),
        }

        Ok(notification)
    }

    /// Look up a user and deliver `message` to them.
    pub async fn send_to_user_id(
        &self,
        user_id: &UserId,
        message: &OutboundMessage,
    ) -> AppResult<Notification> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        self.send_to_user(&user, message).await
    }

    /// Deliver `message` to many users in fixed-size batches.
    ///
    /// Batches run one after another with the configured delay between them;
    /// sends inside a batch run concurrently. A missing user counts as a
    /// failure. An unavailable store aborts the run.
    pub async fn send_bulk(
        &self,
        user_ids: &[UserId],
        message: &OutboundMessage,
    ) -> AppResult<BulkOutcome> {
        let mut outcome = BulkOutcome {
            attempted: user_ids.len(),
            ..BulkOutcome::default()
        };

        for (index, batch) in user_ids.chunks(self.batch_size).enumerate() {
            if index > 0 && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }

            let results = join_all(batch.iter().map(|id| self.send_to_user_id(id, message))).await;
            outcome.batches += 1;

            for result in results {
                match result {
                    Ok(_) => outcome.persisted += 1,
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        debug!(error = %e, "Bulk recipient skipped");
                        outcome.failed += 1;
                    }
                }
            }
        }

        info!(
            kind = %message.kind,
            attempted = outcome.attempted,
            persisted = outcome.persisted,
            failed = outcome.failed,
            batches = outcome.batches,
            "Bulk notification finished"
        );
        Ok(outcome)
    }

    async fn attempt_push(
        &self,
        user: &User,
        message: &OutboundMessage,
        requested: bool,
    ) -> Option<Result<(), String>> {
        if !requested {
            return None;
        }
        let Some(token) = user.device_token.as_deref() else {
            return Some(Err(DeliveryFailure::InvalidTarget("no device token".into()).to_string()));
        };
        let content = PushContent {
            title: message.title.clone(),
            body: message.body.clone(),
            data: serde_json::json!({
                "kind": message.kind,
                "priority": message.priority,
                "metadata": message.metadata,
            }),
        };
        Some(self.bounded(self.gateways.push.send_push(token, &content)).await)
    }

    async fn attempt_sms(
        &self,
        user: &User,
        message: &OutboundMessage,
        requested: bool,
    ) -> Option<Result<(), String>> {
        if !requested {
            return None;
        }
        let Some(number) = user.phone.as_deref() else {
            return Some(Err(DeliveryFailure::InvalidTarget("no phone number".into()).to_string()));
        };
        let text = format!("{}: {}", message.title, message.body);
        Some(self.bounded(self.gateways.sms.send_sms(number, &text)).await)
    }

    async fn attempt_email(
        &self,
        user: &User,
        message: &OutboundMessage,
        requested: bool,
    ) -> Option<Result<(), String>> {
        if !requested {
            return None;
        }
        if user.email.trim().is_empty() {
            return Some(Err(DeliveryFailure::InvalidTarget("no email address".into()).to_string()));
        }
        Some(
            self.bounded(
                self.gateways
                    .email
                    .send_email(&user.email, &message.title, &message.body),
            )
            .await,
        )
    }

    async fn bounded<F>(&self, call: F) -> Result<(), String>
    where
        F: Future<Output = Result<(), DeliveryFailure>>,
    {
        match tokio::time::timeout(self.channel_timeout, call).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(failure)) => Err(failure.to_string()),
            Err(_) => Err(DeliveryFailure::Timeout(self.channel_timeout.as_millis() as u64).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewatch_entity::notification::NotificationKind;
    use tidewatch_entity::user::NotificationPreferences;

    use crate::testing::{Behavior, Harness, coast};

    fn message(priority: NotificationPriority) -> OutboundMessage {
        OutboundMessage::new(NotificationKind::System, "Test", "Body").with_priority(priority)
    }

    #[tokio::test]
    async fn test_failing_push_does_not_block_email() {
        let h = Harness::new().await;
        let user = h.citizen("asha@example.org").await;
        *h.gateway.push.lock().unwrap() = Behavior::Fail;

        let n = h
            .services
            .dispatcher
            .send_to_user(&user, &message(NotificationPriority::Normal))
            .await
            .unwrap();

        assert_eq!(h.gateway.total_calls(), 2);
        assert_eq!(h.gateway.calls("push"), 1);
        assert_eq!(h.gateway.calls("email"), 1);
        assert!(n.channels.push.requested);
        assert!(!n.channels.push.sent);
        assert!(n.channels.push.error.as_deref().unwrap().contains("push down"));
        assert!(n.channels.email.sent);
        assert!(n.channels.email.sent_at.is_some());
        assert!(!n.channels.sms.requested);
    }

    #[tokio::test]
    async fn test_hanging_gateway_is_recorded_as_timeout() {
        let h = Harness::new().await;
        let user = h.citizen("hang@example.org").await;
        *h.gateway.email.lock().unwrap() = Behavior::Hang;

        let n = h
            .services
            .dispatcher
            .send_to_user(&user, &message(NotificationPriority::Normal))
            .await
            .unwrap();

        assert!(n.channels.push.sent);
        assert!(n.channels.email.error.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_missing_target_skips_gateway() {
        let h = Harness::new().await;
        let mut user = h.citizen("notoken@example.org").await;
        user.device_token = None;

        let n = h
            .services
            .dispatcher
            .send_to_user(&user, &message(NotificationPriority::Normal))
            .await
            .unwrap();

        assert_eq!(h.gateway.calls("push"), 0);
        assert!(n.channels.push.error.as_deref().unwrap().contains("invalid target"));
        assert!(n.channels.email.sent);
    }

    #[tokio::test]
    async fn test_emergency_ignores_sms_throttle() {
        let h = Harness::new().await;
        let all = NotificationPreferences {
            push: true,
            sms: true,
            email: true,
            community_reports: true,
        };
        let user = h.user_at("sms@example.org", coast(), all).await;

        h.services
            .dispatcher
            .send_to_user(&user, &message(NotificationPriority::Normal))
            .await
            .unwrap();
        assert_eq!(h.gateway.calls("sms"), 0);

        h.services
            .dispatcher
            .send_to_user(&user, &message(NotificationPriority::Emergency))
            .await
            .unwrap();
        assert_eq!(h.gateway.calls("sms"), 1);
    }

    #[tokio::test]
    async fn test_send_publishes_to_user_room() {
        let h = Harness::new().await;
        let user = h.citizen("room@example.org").await;
        h.services
            .dispatcher
            .send_to_user(&user, &message(NotificationPriority::Low))
            .await
            .unwrap();

        assert_eq!(
            h.publisher.rooms_for(EventKind::Notification),
            vec![Room::User(user.id)]
        );
        assert_eq!(h.db.notifications.count_unread(&user.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bulk_runs_in_batches_of_100() {
        let h = Harness::new().await;
        let mut ids = Vec::new();
        for i in 0..250 {
            ids.push(h.citizen(&format!("user{i}@example.org")).await.id);
        }

        let outcome = h
            .services
            .dispatcher
            .send_bulk(&ids, &message(NotificationPriority::Normal))
            .await
            .unwrap();

        assert_eq!(outcome.batches, 3);
        assert_eq!(outcome.persisted, 250);
        assert_eq!(outcome.failed, 0);
        assert_eq!(h.db.notifications.count().await.unwrap(), 250);
    }

    #[tokio::test]
    async fn test_bulk_counts_unknown_users_as_failed() {
        let h = Harness::new().await;
        let known = h.citizen("known@example.org").await.id;

        let outcome = h
            .services
            .dispatcher
            .send_bulk(&[known, UserId::new()], &message(NotificationPriority::Normal))
            .await
            .unwrap();

        assert_eq!(outcome.persisted, 1);
        assert_eq!(outcome.failed, 1);
    }

    #[tokio::test]
    async fn test_bulk_aborts_when_store_is_down() {
        let h = Harness::new().await;
        let id = h.citizen("down@example.org").await.id;
        h.db.set_available(false);

        let err = h
            .services
            .dispatcher
            .send_bulk(&[id], &message(NotificationPriority::Normal))
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
