//! User model
//!
//! Defines the `User` entity plus the role and account-status enums used
//! for authorization throughout the system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity representing a registered account.
///
/// Roles determine visibility: staff (`admin`/`editor`) see everything,
/// `normal`/`visitor` accounts are scoped to their own rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Mail address (unique, login account)
    pub mail: String,
    /// Password hash (bcrypt)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role
    pub user_type: UserRole,
    /// Avatar URL
    pub imgurl: Option<String>,
    /// Account status
    pub status: UserStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Last successful login
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new User. The password must already be hashed
    /// (`services::password::hash_password`).
    pub fn new(
        username: String,
        mail: String,
        password_hash: String,
        user_type: UserRole,
        imgurl: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            mail,
            password_hash,
            user_type,
            imgurl,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.user_type == UserRole::Admin
    }

    /// Check if the user is staff (admin or editor)
    pub fn is_staff(&self) -> bool {
        self.user_type.is_staff()
    }

    /// Check if the account is disabled
    pub fn is_disabled(&self) -> bool {
        self.status == UserStatus::Disabled
    }
}

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator - full access
    Admin,
    /// Editor - full content visibility
    Editor,
    /// Normal user - scoped to own rows
    Normal,
    /// Visitor - scoped to own rows
    Visitor,
}

impl UserRole {
    /// Staff roles see all content and may send any message type.
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Editor)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Normal
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Editor => write!(f, "editor"),
            UserRole::Normal => write!(f, "normal"),
            UserRole::Visitor => write!(f, "visitor"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "editor" => Ok(UserRole::Editor),
            "normal" => Ok(UserRole::Normal),
            "visitor" => Ok(UserRole::Visitor),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// Account status, stored as a tinyint (1 = active, 0 = disabled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Disabled,
}

impl UserStatus {
    pub fn as_i64(&self) -> i64 {
        match self {
            UserStatus::Active => 1,
            UserStatus::Disabled => 0,
        }
    }

    pub fn from_i64(v: i64) -> Self {
        if v == 0 {
            UserStatus::Disabled
        } else {
            UserStatus::Active
        }
    }
}

impl Default for UserStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Input for registering a new user (before password hashing)
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub mail: String,
    pub password: String,
    pub imgurl: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role: UserRole) -> User {
        User::new(
            "tester".to_string(),
            "tester@linlog.com".to_string(),
            "hash".to_string(),
            role,
            None,
        )
    }

    #[test]
    fn test_user_new_defaults() {
        let user = user_with_role(UserRole::Normal);
        assert_eq!(user.id, 0);
        assert_eq!(user.status, UserStatus::Active);
        assert!(user.last_login_at.is_none());
    }

    #[test]
    fn test_staff_roles() {
        assert!(user_with_role(UserRole::Admin).is_staff());
        assert!(user_with_role(UserRole::Editor).is_staff());
        assert!(!user_with_role(UserRole::Normal).is_staff());
        assert!(!user_with_role(UserRole::Visitor).is_staff());
    }

    #[test]
    fn test_only_admin_is_admin() {
        assert!(user_with_role(UserRole::Admin).is_admin());
        assert!(!user_with_role(UserRole::Editor).is_admin());
    }

    #[test]
    fn test_role_roundtrip() {
        for role in [
            UserRole::Admin,
            UserRole::Editor,
            UserRole::Normal,
            UserRole::Visitor,
        ] {
            assert_eq!(UserRole::from_str(&role.to_string()).unwrap(), role);
        }
        assert!(UserRole::from_str("superuser").is_err());
    }

    #[test]
    fn test_status_tinyint_mapping() {
        assert_eq!(UserStatus::Active.as_i64(), 1);
        assert_eq!(UserStatus::Disabled.as_i64(), 0);
        assert_eq!(UserStatus::from_i64(1), UserStatus::Active);
        assert_eq!(UserStatus::from_i64(0), UserStatus::Disabled);
    }
}
