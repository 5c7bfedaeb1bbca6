//! Service layer
//!
//! Business rules on top of the repositories: input validation, role
//! scoping, and the error taxonomy the API layer maps onto response codes.

pub mod article;
pub mod comment;
pub mod diary;
pub mod file;
pub mod message;
pub mod password;
pub mod subset;
pub mod token;
pub mod user;

pub use article::ArticleService;
pub use comment::CommentService;
pub use diary::DiaryService;
pub use file::FileService;
pub use message::MessageService;
pub use subset::SubsetService;
pub use token::{Claims, TokenError, TokenService};
pub use user::UserService;

use crate::models::UserRole;

/// Error types shared by the content services.
///
/// The API layer maps these onto the response envelope: validation and
/// authentication failures become 400, permission denials 403, missing
/// resources 404, everything else 500.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Invalid input
    #[error("{0}")]
    Validation(String),

    /// Credential check failed
    #[error("{0}")]
    Authentication(String),

    /// The caller may not perform this operation
    #[error("{0}")]
    Forbidden(String),

    /// Resource absent (or invisible to the caller)
    #[error("{0}")]
    NotFound(String),

    /// Database or other internal fault
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// The authenticated caller, as established by the bearer-token middleware.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: i64,
    pub user_type: UserRole,
}

impl Actor {
    pub fn new(user_id: i64, user_type: UserRole) -> Self {
        Self { user_id, user_type }
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == UserRole::Admin
    }

    pub fn is_staff(&self) -> bool {
        self.user_type.is_staff()
    }

    /// `Some(user_id)` when queries must be restricted to the caller's
    /// own rows, `None` for staff.
    pub fn owner_scope(&self) -> Option<i64> {
        if self.is_staff() {
            None
        } else {
            Some(self.user_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_owner_scope() {
        assert_eq!(Actor::new(1, UserRole::Admin).owner_scope(), None);
        assert_eq!(Actor::new(2, UserRole::Editor).owner_scope(), None);
        assert_eq!(Actor::new(3, UserRole::Normal).owner_scope(), Some(3));
        assert_eq!(Actor::new(4, UserRole::Visitor).owner_scope(), Some(4));
    }
}
