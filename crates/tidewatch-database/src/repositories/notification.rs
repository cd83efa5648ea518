//! Notification repository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use tidewatch_core::result::AppResult;
use tidewatch_core::traits::Repository;
use tidewatch_core::types::{NotificationId, UserId};
use tidewatch_entity::notification::Notification;

use crate::connection::StoreHealth;
use crate::table::MemoryTable;

/// Repository for stored notifications and the digest ledger.
#[derive(Debug)]
pub struct NotificationRepository {
    table: MemoryTable<NotificationId, Notification>,
    by_user: DashMap<UserId, Vec<NotificationId>>,
    digests: DashMap<(UserId, NaiveDate), DateTime<Utc>>,
    health: Arc<StoreHealth>,
}

impl NotificationRepository {
    /// Create an empty notification repository.
    pub fn new(health: Arc<StoreHealth>) -> Self {
        Self {
            table: MemoryTable::new("Notification", Arc::clone(&health)),
            by_user: DashMap::new(),
            digests: DashMap::new(),
            health,
        }
    }

    /// Atomically modify one notification.
    pub async fn update_with<R>(
        &self,
        id: &NotificationId,
        f: impl FnOnce(&mut Notification) -> AppResult<R>,
    ) -> AppResult<(R, Notification)> {
        self.table.update_with(id, f)
    }

    /// A user's notifications, newest first.
    pub async fn find_by_user(&self, user_id: &UserId, limit: usize) -> AppResult<Vec<Notification>> {
        self.health.check()?;
        let ids: Vec<NotificationId> = self
            .by_user
            .get(user_id)
            .map(|entry| entry.value().iter().rev().take(limit).copied().collect())
            .unwrap_or_default();

        let mut notifications = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(n) = self.table.get(&id)? {
                notifications.push(n);
            }
        }
        Ok(notifications)
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: &UserId) -> AppResult<u64> {
        Ok(self
            .table
            .scan(|n| n.user_id == *user_id && !n.is_read)?
            .len() as u64)
    }

    /// Mark every notification of a user as read. Returns how many changed.
    pub async fn mark_all_read(&self, user_id: &UserId, now: DateTime<Utc>) -> AppResult<u64> {
        let ids: Vec<NotificationId> = self
            .by_user
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        let mut changed = 0;
        for id in ids {
            let (did_change, _) = self.table.update_with(&id, |n| Ok(n.mark_read(now)))?;
            if did_change {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Claim the digest slot for `(user, day)`. Returns `false` if another
    /// caller already claimed it.
    pub async fn claim_digest(
        &self,
        user_id: UserId,
        day: NaiveDate,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.health.check()?;
        match self.digests.entry((user_id, day)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(now);
                Ok(true)
            }
        }
    }

    /// Give a digest slot back after a failed send.
    pub async fn release_digest(&self, user_id: UserId, day: NaiveDate) {
        self.digests.remove(&(user_id, day));
    }
}

#[async_trait]
impl Repository<Notification, NotificationId> for NotificationRepository {
    async fn find_by_id(&self, id: &NotificationId) -> AppResult<Option<Notification>> {
        self.table.get(id)
    }

    async fn create(&self, notification: &Notification) -> AppResult<Notification> {
        let stored = self
            .table
            .insert_new(notification.id, notification.clone())?;
        self.by_user
            .entry(notification.user_id)
            .or_default()
            .push(notification.id);
        Ok(stored)
    }

    async fn update(&self, notification: &Notification) -> AppResult<Notification> {
        self.table.replace(&notification.id, notification.clone())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.table.len() as u64)
    }
}
