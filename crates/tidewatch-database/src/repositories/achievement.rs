//! Achievement catalog and unlock junction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use tidewatch_core::result::AppResult;
use tidewatch_core::types::{AchievementId, UserId};
use tidewatch_entity::achievement::{Achievement, UserAchievement};

use crate::connection::StoreHealth;

/// Repository for the achievement catalog and per-user unlocks.
///
/// The junction is keyed by `(user, achievement)`, so at most one unlock
/// row can exist per pair.
#[derive(Debug)]
pub struct AchievementRepository {
    catalog: DashMap<String, Achievement>,
    unlocked: DashMap<(UserId, AchievementId), UserAchievement>,
    health: Arc<StoreHealth>,
}

impl AchievementRepository {
    /// Create an empty repository.
    pub fn new(health: Arc<StoreHealth>) -> Self {
        Self {
            catalog: DashMap::new(),
            unlocked: DashMap::new(),
            health,
        }
    }

    /// Add catalog entries whose key is not present yet.
    pub async fn seed(&self, entries: Vec<Achievement>) -> AppResult<usize> {
        self.health.check()?;
        let mut added = 0;
        for entry in entries {
            if let Entry::Vacant(slot) = self.catalog.entry(entry.key.clone()) {
                debug!(key = %entry.key, "Seeded achievement");
                slot.insert(entry);
                added += 1;
            }
        }
        Ok(added)
    }

    /// The whole catalog ordered by key.
    pub async fn catalog(&self) -> AppResult<Vec<Achievement>> {
        self.health.check()?;
        let mut entries: Vec<Achievement> =
            self.catalog.iter().map(|e| e.value().clone()).collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    /// Look up a catalog entry by badge key.
    pub async fn find_by_key(&self, key: &str) -> AppResult<Option<Achievement>> {
        self.health.check()?;
        Ok(self.catalog.get(key).map(|e| e.value().clone()))
    }

    /// Record an unlock. Returns `false` if the pair already existed.
    pub async fn try_unlock(
        &self,
        user_id: UserId,
        achievement: &Achievement,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.health.check()?;
        match self.unlocked.entry((user_id, achievement.id)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(UserAchievement {
                    user_id,
                    achievement_id: achievement.id,
                    key: achievement.key.clone(),
                    unlocked_at: at,
                });
                Ok(true)
            }
        }
    }

    /// A user's unlocks, oldest first.
    pub async fn find_by_user(&self, user_id: &UserId) -> AppResult<Vec<UserAchievement>> {
        self.health.check()?;
        let mut rows: Vec<UserAchievement> = self
            .unlocked
            .iter()
            .filter(|e| e.key().0 == *user_id)
            .map(|e| e.value().clone())
            .collect();
        rows.sort_by(|a, b| a.unlocked_at.cmp(&b.unlocked_at));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewatch_entity::achievement::{AchievementMetric, Requirement};

    fn entry(key: &str) -> Achievement {
        Achievement {
            id: AchievementId::new(),
            key: key.to_string(),
            name: key.to_string(),
            description: String::new(),
            points: 100,
            requirement: Requirement {
                metric: AchievementMetric::TotalReports,
                threshold: 1.0,
                min_reports: 0,
            },
        }
    }

    #[tokio::test]
    async fn test_seed_is_idempotent_by_key() {
        let repo = AchievementRepository::new(Arc::new(StoreHealth::new()));
        assert_eq!(repo.seed(vec![entry("a"), entry("b")]).await.unwrap(), 2);
        assert_eq!(repo.seed(vec![entry("a")]).await.unwrap(), 0);
        assert_eq!(repo.catalog().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unlock_once_per_pair() {
        let repo = AchievementRepository::new(Arc::new(StoreHealth::new()));
        let achievement = entry("first_report");
        let user = UserId::new();
        assert!(repo.try_unlock(user, &achievement, Utc::now()).await.unwrap());
        assert!(!repo.try_unlock(user, &achievement, Utc::now()).await.unwrap());
        assert!(repo.try_unlock(UserId::new(), &achievement, Utc::now()).await.unwrap());
        assert_eq!(repo.find_by_user(&user).await.unwrap().len(), 1);
    }
}
