//! Applies reward rules to stored users.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use tidewatch_core::result::AppResult;
use tidewatch_core::traits::Clock;
use tidewatch_core::types::UserId;
use tidewatch_database::repositories::{AchievementRepository, UserRepository};
use tidewatch_entity::achievement::Achievement;
use tidewatch_entity::notification::{NotificationKind, OutboundMessage};
use tidewatch_entity::report::ReportType;
use tidewatch_entity::user::User;

use super::catalog::default_catalog;
use super::engine;
use crate::notification::NotificationDispatcher;

/// What one reward step changed.
#[derive(Debug, Clone, Serialize)]
pub struct Rewards {
    /// Points credited for the action itself.
    pub points_awarded: u64,
    /// Badges unlocked by the action.
    pub new_badges: Vec<Achievement>,
    /// The user after the update.
    pub user: User,
}

/// Credits points, advances streaks and unlocks badges.
///
/// Every change to one user's counters happens inside a single
/// [`UserRepository::update_with`] call.
#[derive(Debug, Clone)]
pub struct GamificationService {
    users: Arc<UserRepository>,
    achievements: Arc<AchievementRepository>,
    dispatcher: NotificationDispatcher,
    clock: Arc<dyn Clock>,
    badge_points: u64,
}

impl GamificationService {
    /// Creates a new gamification service.
    pub fn new(
        users: Arc<UserRepository>,
        achievements: Arc<AchievementRepository>,
        dispatcher: NotificationDispatcher,
        clock: Arc<dyn Clock>,
        badge_points: u64,
    ) -> Self {
        Self {
            users,
            achievements,
            dispatcher,
            clock,
            badge_points,
        }
    }

    /// Load the built-in catalog. Safe to call more than once.
    pub async fn seed_catalog(&self) -> AppResult<usize> {
        let added = self
            .achievements
            .seed(default_catalog(self.badge_points))
            .await?;
        if added > 0 {
            info!(added, "Achievement catalog seeded");
        }
        Ok(added)
    }

    /// Credit a new report: points, counters, streak, then badges.
    pub async fn record_submission(
        &self,
        user_id: &UserId,
        report_type: ReportType,
        points: u64,
        today: NaiveDate,
    ) -> AppResult<Rewards> {
        let catalog = self.achievements.catalog().await?;
        let (new_badges, user) = self
            .users
            .update_with(user_id, |user| {
                user.stats.points += points;
                engine::record_report(&mut user.stats, report_type, today);
                Ok(engine::unlock_badges(&mut user.stats, &catalog))
            })
            .await?;

        self.finish_unlocks(&user, &new_badges).await?;
        Ok(Rewards {
            points_awarded: points,
            new_badges,
            user,
        })
    }

    /// Credit a verified report and re-check badges.
    pub async fn record_verification(&self, user_id: &UserId, bonus: u64) -> AppResult<Rewards> {
        let catalog = self.achievements.catalog().await?;
        let (new_badges, user) = self
            .users
            .update_with(user_id, |user| {
                user.stats.points += bonus;
                user.stats.verified_reports += 1;
                Ok(engine::unlock_badges(&mut user.stats, &catalog))
            })
            .await?;

        self.finish_unlocks(&user, &new_badges).await?;
        Ok(Rewards {
            points_awarded: bonus,
            new_badges,
            user,
        })
    }

    /// Credit plain points.
    pub async fn award_points(&self, user_id: &UserId, points: u64) -> AppResult<User> {
        let ((), user) = self
            .users
            .update_with(user_id, |user| {
                user.stats.points += points;
                Ok(())
            })
            .await?;
        Ok(user)
    }

    /// Re-check the catalog against the user's current counters.
    pub async fn evaluate(&self, user_id: &UserId) -> AppResult<Vec<Achievement>> {
        let catalog = self.achievements.catalog().await?;
        let (new_badges, user) = self
            .users
            .update_with(user_id, |user| {
                Ok(engine::unlock_badges(&mut user.stats, &catalog))
            })
            .await?;
        self.finish_unlocks(&user, &new_badges).await?;
        Ok(new_badges)
    }

    /// Write junction rows and send one notification per badge.
    async fn finish_unlocks(&self, user: &User, badges: &[Achievement]) -> AppResult<()> {
        let now = self.clock.now();
        for badge in badges {
            if !self.achievements.try_unlock(user.id, badge, now).await? {
                continue;
            }
            info!(user_id = %user.id, badge = %badge.key, "Achievement unlocked");

            let message = OutboundMessage::new(
                NotificationKind::Achievement,
                format!("Badge unlocked: {}", badge.name),
                format!("{} (+{} points)", badge.description, badge.points),
            )
            .with_achievement(badge.id);
            if let Err(e) = self.dispatcher.send_to_user(user, &message).await {
                warn!(user_id = %user.id, badge = %badge.key, error = %e, "Badge notification failed");
            }
        }
        Ok(())
    }
}
