//! Request context carrying the acting user and their role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tidewatch_core::types::UserId;
use tidewatch_entity::user::UserRole;

/// Who is performing an operation.
///
/// Built by the (external) authentication layer and passed into service
/// methods that act on behalf of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user's ID.
    pub user_id: UserId,
    /// The user's role at request time.
    pub role: UserRole,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self {
            user_id,
            role,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Returns whether the current user may verify reports.
    pub fn can_verify(&self) -> bool {
        self.role.can_verify()
    }
}
