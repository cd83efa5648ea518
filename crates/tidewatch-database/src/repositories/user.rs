//! User repository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use tidewatch_core::error::AppError;
use tidewatch_core::result::AppResult;
use tidewatch_core::traits::Repository;
use tidewatch_core::types::{GeoPoint, UserId};
use tidewatch_entity::user::User;

use crate::connection::StoreHealth;
use crate::geo::GeoIndex;
use crate::table::MemoryTable;

/// Repository for user accounts, indexed by email and home location.
#[derive(Debug)]
pub struct UserRepository {
    table: MemoryTable<UserId, User>,
    emails: DashMap<String, UserId>,
    geo: GeoIndex<UserId>,
}

impl UserRepository {
    /// Create an empty user repository.
    pub fn new(health: Arc<StoreHealth>) -> Self {
        Self {
            table: MemoryTable::new("User", health),
            emails: DashMap::new(),
            geo: GeoIndex::new(),
        }
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let key = email.trim().to_lowercase();
        let id = self.emails.get(&key).map(|entry| *entry.value());
        match id {
            Some(id) => self.table.get(&id),
            None => Ok(None),
        }
    }

    /// Atomically modify one user. Concurrent calls for the same user are
    /// serialized; the closure sees the latest committed state.
    pub async fn update_with<R>(
        &self,
        id: &UserId,
        f: impl FnOnce(&mut User) -> AppResult<R>,
    ) -> AppResult<(R, User)> {
        let (result, user) = self.table.update_with(id, f)?;
        self.geo.upsert(user.id, user.location);
        Ok((result, user))
    }

    /// Ids of users whose home location is within `radius_km` of `center`.
    pub async fn find_ids_nearby(&self, center: &GeoPoint, radius_km: f64) -> AppResult<Vec<UserId>> {
        self.table.ensure_available()?;
        self.geo.nearby(center, radius_km)
    }

    /// Users whose home location is within `radius_km` of `center`.
    pub async fn find_nearby(&self, center: &GeoPoint, radius_km: f64) -> AppResult<Vec<User>> {
        let ids = self.geo.nearby(center, radius_km)?;
        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.table.get(&id)? {
                users.push(user);
            }
        }
        Ok(users)
    }

    /// Every user.
    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        self.table.scan(|_| true)
    }
}

#[async_trait]
impl Repository<User, UserId> for UserRepository {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        self.table.get(id)
    }

    async fn create(&self, user: &User) -> AppResult<User> {
        match self.emails.entry(user.email_key()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Email '{}' is already registered",
                user.email
            ))),
            Entry::Vacant(slot) => {
                let stored = self.table.insert_new(user.id, user.clone())?;
                slot.insert(user.id);
                self.geo.upsert(user.id, user.location);
                Ok(stored)
            }
        }
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let stored = self.table.replace(&user.id, user.clone())?;
        self.geo.upsert(user.id, user.location);
        Ok(stored)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.table.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tidewatch_core::error::ErrorKind;
    use tidewatch_entity::user::{CreateUser, NotificationPreferences, UserRole};

    fn user(email: &str, lon: f64, lat: f64) -> User {
        User::new(
            CreateUser {
                name: "Asha".to_string(),
                email: email.to_string(),
                phone: None,
                device_token: None,
                role: UserRole::Citizen,
                location: GeoPoint::new(lon, lat).unwrap(),
                preferences: NotificationPreferences::default(),
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_email_is_unique_case_insensitively() {
        let repo = UserRepository::new(Arc::new(StoreHealth::new()));
        repo.create(&user("asha@example.org", 80.0, 13.0)).await.unwrap();
        let err = repo
            .create(&user("ASHA@example.org", 80.0, 13.0))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.find_by_email("Asha@Example.org").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_insert_does_not_claim_email() {
        let health = Arc::new(StoreHealth::new());
        let repo = UserRepository::new(Arc::clone(&health));
        health.set_available(false);
        assert!(repo.create(&user("a@example.org", 0.0, 0.0)).await.is_err());
        health.set_available(true);
        repo.create(&user("a@example.org", 0.0, 0.0)).await.unwrap();
    }

    #[tokio::test]
    async fn test_location_update_reindexes() {
        let repo = UserRepository::new(Arc::new(StoreHealth::new()));
        let u = repo.create(&user("b@example.org", 80.0, 13.0)).await.unwrap();
        let far = GeoPoint::new(72.8, 19.0).unwrap();

        repo.update_with(&u.id, |row| {
            row.location = far;
            Ok(())
        })
        .await
        .unwrap();

        let here = GeoPoint::new(80.0, 13.0).unwrap();
        assert!(repo.find_ids_nearby(&here, 5.0).await.unwrap().is_empty());
        assert_eq!(repo.find_ids_nearby(&far, 5.0).await.unwrap(), vec![u.id]);
    }
}
