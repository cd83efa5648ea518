//! User account service.

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use tidewatch_core::error::AppError;
use tidewatch_core::result::AppResult;
use tidewatch_core::traits::{Clock, Repository};
use tidewatch_core::types::{GeoPoint, UserId};
use tidewatch_database::repositories::{AchievementRepository, UserRepository};
use tidewatch_entity::achievement::UserAchievement;
use tidewatch_entity::user::{CreateUser, NotificationPreferences, User};

use crate::context::RequestContext;

/// Registers users and maintains the fields the notification rules read.
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<UserRepository>,
    achievements: Arc<AchievementRepository>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        users: Arc<UserRepository>,
        achievements: Arc<AchievementRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            achievements,
            clock,
        }
    }

    /// Register a user. A taken email (case-insensitive) is a conflict.
    pub async fn register(&self, input: CreateUser) -> AppResult<User> {
        input.validate()?;
        let user = User::new(input, self.clock.now());
        let user = self.users.create(&user).await?;
        info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Get one user.
    pub async fn get(&self, id: &UserId) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// Move the caller's home location.
    pub async fn update_location(&self, ctx: &RequestContext, location: GeoPoint) -> AppResult<User> {
        let now = self.clock.now();
        let ((), user) = self
            .users
            .update_with(&ctx.user_id, |user| {
                user.location = location;
                user.last_active_at = now;
                Ok(())
            })
            .await?;
        Ok(user)
    }

    /// Replace the caller's channel opt-ins.
    pub async fn update_preferences(
        &self,
        ctx: &RequestContext,
        preferences: NotificationPreferences,
    ) -> AppResult<User> {
        let now = self.clock.now();
        let ((), user) = self
            .users
            .update_with(&ctx.user_id, |user| {
                user.preferences = preferences;
                user.last_active_at = now;
                Ok(())
            })
            .await?;
        Ok(user)
    }

    /// Badges the caller has unlocked.
    pub async fn achievements(&self, ctx: &RequestContext) -> AppResult<Vec<UserAchievement>> {
        self.achievements.find_by_user(&ctx.user_id).await
    }
}
