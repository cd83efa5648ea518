//! Inbox operations on stored notifications.

use std::sync::Arc;

use tidewatch_core::error::AppError;
use tidewatch_core::result::AppResult;
use tidewatch_core::traits::{Clock, Repository};
use tidewatch_core::types::NotificationId;
use tidewatch_database::repositories::NotificationRepository;
use tidewatch_entity::notification::Notification;

use crate::context::RequestContext;

/// Lists and marks a user's notifications.
#[derive(Debug, Clone)]
pub struct NotificationService {
    notifications: Arc<NotificationRepository>,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(notifications: Arc<NotificationRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            notifications,
            clock,
        }
    }

    /// Lists the current user's notifications, newest first.
    pub async fn list(&self, ctx: &RequestContext, limit: usize) -> AppResult<Vec<Notification>> {
        self.notifications.find_by_user(&ctx.user_id, limit).await
    }

    /// Gets the unread notification count.
    pub async fn unread_count(&self, ctx: &RequestContext) -> AppResult<u64> {
        self.notifications.count_unread(&ctx.user_id).await
    }

    /// Marks one of the current user's notifications as read.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        id: &NotificationId,
    ) -> AppResult<Notification> {
        let existing = self
            .notifications
            .find_by_id(id)
            .await?
            .filter(|n| n.user_id == ctx.user_id)
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;
        if existing.is_read {
            return Ok(existing);
        }

        let now = self.clock.now();
        let (_, stored) = self
            .notifications
            .update_with(id, |n| Ok(n.mark_read(now)))
            .await?;
        Ok(stored)
    }

    /// Marks all notifications as read for the current user.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> AppResult<u64> {
        self.notifications
            .mark_all_read(&ctx.user_id, self.clock.now())
            .await
    }
}

#[cfg(test)]
mod tests {
    use tidewatch_core::error::ErrorKind;
    use tidewatch_entity::notification::{NotificationKind, OutboundMessage};

    use crate::testing::{Harness, ctx};

    #[tokio::test]
    async fn test_read_flags_are_per_owner() {
        let h = Harness::new().await;
        let owner = h.citizen("owner@example.org").await;
        let stranger = h.citizen("stranger@example.org").await;
        let message = OutboundMessage::new(NotificationKind::System, "Hello", "World");
        let first = h.services.dispatcher.send_to_user(&owner, &message).await.unwrap();
        h.services.dispatcher.send_to_user(&owner, &message).await.unwrap();

        let err = h
            .services
            .notifications
            .mark_read(&ctx(&stranger), &first.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let read = h.services.notifications.mark_read(&ctx(&owner), &first.id).await.unwrap();
        assert!(read.is_read);
        assert_eq!(h.services.notifications.unread_count(&ctx(&owner)).await.unwrap(), 1);

        assert_eq!(h.services.notifications.mark_all_read(&ctx(&owner)).await.unwrap(), 1);
        assert_eq!(h.services.notifications.unread_count(&ctx(&owner)).await.unwrap(), 0);
        assert_eq!(h.services.notifications.list(&ctx(&owner), 10).await.unwrap().len(), 2);
    }
}
