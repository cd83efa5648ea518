//! Audience resolution and channel planning.

use std::sync::Arc;

use tidewatch_core::result::AppResult;
use tidewatch_core::types::UserId;
use tidewatch_database::repositories::UserRepository;
use tidewatch_entity::alert::Alert;
use tidewatch_entity::notification::{Channel, NotificationPriority};
use tidewatch_entity::report::Report;
use tidewatch_entity::user::User;

/// Decides who hears about an event and over which channels.
#[derive(Debug, Clone)]
pub struct NotificationRules {
    users: Arc<UserRepository>,
    sms_min_priority: NotificationPriority,
    community_radius_km: f64,
}

impl NotificationRules {
    /// Creates a new rules engine.
    pub fn new(
        users: Arc<UserRepository>,
        sms_min_priority: NotificationPriority,
        community_radius_km: f64,
    ) -> Self {
        Self {
            users,
            sms_min_priority,
            community_radius_km,
        }
    }

    /// Channels to attempt for `user` at `priority`.
    ///
    /// Only opted-in channels are considered. SMS is throttled below
    /// `sms_min_priority`; emergencies skip throttling.
    pub fn plan_channels(&self, user: &User, priority: NotificationPriority) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|channel| user.preferences.opted_in(*channel))
            .filter(|channel| {
                *channel != Channel::Sms
                    || priority.bypasses_throttling()
                    || priority >= self.sms_min_priority
            })
            .collect()
    }

    /// Users whose home location lies inside the alert's geofence.
    pub async fn alert_audience(&self, alert: &Alert) -> AppResult<Vec<UserId>> {
        self.users.find_ids_nearby(&alert.center, alert.radius_km).await
    }

    /// Users near a report who opted into community notifications, minus
    /// the author.
    pub async fn community_audience(&self, report: &Report) -> AppResult<Vec<UserId>> {
        let users = self
            .users
            .find_nearby(&report.location, self.community_radius_km)
            .await?;
        Ok(users
            .into_iter()
            .filter(|u| u.id != report.author_id && u.preferences.community_reports)
            .map(|u| u.id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tidewatch_core::types::GeoPoint;
    use tidewatch_database::StoreHealth;
    use tidewatch_entity::user::{CreateUser, NotificationPreferences, UserRole};

    fn rules() -> NotificationRules {
        NotificationRules::new(
            Arc::new(UserRepository::new(Arc::new(StoreHealth::new()))),
            NotificationPriority::High,
            10.0,
        )
    }

    fn user(preferences: NotificationPreferences) -> User {
        User::new(
            CreateUser {
                name: "Ravi".to_string(),
                email: "ravi@example.org".to_string(),
                phone: Some("+919800000000".to_string()),
                device_token: Some("device-1".to_string()),
                role: UserRole::Citizen,
                location: GeoPoint::new(80.2, 13.0).unwrap(),
                preferences,
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_only_opted_in_channels() {
        let u = user(NotificationPreferences {
            push: true,
            sms: false,
            email: true,
            community_reports: true,
        });
        assert_eq!(
            rules().plan_channels(&u, NotificationPriority::Emergency),
            vec![Channel::Push, Channel::Email]
        );
    }

    #[test]
    fn test_sms_throttled_below_minimum() {
        let u = user(NotificationPreferences {
            push: false,
            sms: true,
            email: false,
            community_reports: true,
        });
        let rules = rules();
        assert!(rules.plan_channels(&u, NotificationPriority::Normal).is_empty());
        assert_eq!(rules.plan_channels(&u, NotificationPriority::High), vec![Channel::Sms]);
        assert_eq!(
            rules.plan_channels(&u, NotificationPriority::Emergency),
            vec![Channel::Sms]
        );
    }
}
