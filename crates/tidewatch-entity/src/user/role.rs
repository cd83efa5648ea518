//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles ordered by privilege level: Admin > Expert > Citizen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full system administrator.
    Admin,
    /// Domain expert allowed to verify reports.
    Expert,
    /// Regular community member.
    Citizen,
}

impl UserRole {
    /// Return the privilege level (higher = more privileged).
    pub fn privilege_level(&self) -> u8 {
        match self {
            Self::Admin => 3,
            Self::Expert => 2,
            Self::Citizen => 1,
        }
    }

    /// Check if this role has at least the given role's privileges.
    pub fn has_at_least(&self, other: &UserRole) -> bool {
        self.privilege_level() >= other.privilege_level()
    }

    /// Whether this role may verify or reject reports.
    pub fn can_verify(&self) -> bool {
        self.has_at_least(&Self::Expert)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Expert => "expert",
            Self::Citizen => "citizen",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = tidewatch_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "expert" => Ok(Self::Expert),
            "citizen" => Ok(Self::Citizen),
            _ => Err(tidewatch_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, expert, citizen"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_ordering() {
        assert!(UserRole::Admin.has_at_least(&UserRole::Citizen));
        assert!(UserRole::Expert.has_at_least(&UserRole::Expert));
        assert!(!UserRole::Citizen.has_at_least(&UserRole::Expert));
    }

    #[test]
    fn test_can_verify() {
        assert!(UserRole::Admin.can_verify());
        assert!(UserRole::Expert.can_verify());
        assert!(!UserRole::Citizen.can_verify());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("viewer".parse::<UserRole>().is_err());
    }
}
