//! User service
//!
//! Registration and login:
//! - mail and username uniqueness checks before insert
//! - bcrypt hashing of the submitted password
//! - the first registered account becomes admin, later accounts are normal
//! - login rejects unknown names, disabled accounts and wrong passwords,
//!   and stamps last_login_at on success

use crate::db::repositories::UserRepository;
use crate::models::{RegisterInput, User, UserRole};
use crate::services::password::{hash_password, verify_password};
use crate::services::ServiceError;
use anyhow::Context;
use std::sync::Arc;

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Whether a mail address already belongs to an account.
    pub async fn is_registered(&self, mail: &str) -> Result<bool, ServiceError> {
        let existing = self
            .user_repo
            .get_by_mail(mail)
            .await
            .context("Failed to check mail")?;
        Ok(existing.is_some())
    }

    /// Register a new account.
    pub async fn register(&self, input: RegisterInput) -> Result<User, ServiceError> {
        if input.name.trim().is_empty() || input.mail.trim().is_empty() || input.password.is_empty()
        {
            return Err(ServiceError::Validation(
                "请提供用户名、邮箱和密码".to_string(),
            ));
        }

        if self
            .user_repo
            .get_by_mail(&input.mail)
            .await
            .context("Failed to check mail")?
            .is_some()
        {
            return Err(ServiceError::Validation("该用户已被注册".to_string()));
        }

        if self
            .user_repo
            .get_by_username(&input.name)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(ServiceError::Validation("该用户名已被占用".to_string()));
        }

        // The first account bootstraps the instance and becomes admin
        let user_type = if self.user_repo.count().await.context("Failed to count users")? == 0 {
            UserRole::Admin
        } else {
            UserRole::Normal
        };

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        let user = User::new(input.name, input.mail, password_hash, user_type, input.imgurl);
        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        tracing::info!(user_id = created.id, "User registered");
        Ok(created)
    }

    /// Verify credentials and record the login.
    pub async fn login(&self, name: &str, password: &str) -> Result<User, ServiceError> {
        if name.is_empty() || password.is_empty() {
            return Err(ServiceError::Validation(
                "请提供用户名和密码".to_string(),
            ));
        }

        let user = self
            .user_repo
            .get_by_username(name)
            .await
            .context("Failed to look up user")?
            .ok_or_else(|| ServiceError::Authentication("用户未注册".to_string()))?;

        if user.is_disabled() {
            return Err(ServiceError::Authentication("账号已被禁用".to_string()));
        }

        let valid = verify_password(password, &user.password_hash)
            .context("Failed to verify password")?;
        if !valid {
            return Err(ServiceError::Authentication("密码错误".to_string()));
        }

        self.user_repo
            .touch_last_login(user.id)
            .await
            .context("Failed to record login")?;

        // Re-read so the returned row carries last_login_at
        let user = self
            .user_repo
            .get_by_id(user.id)
            .await
            .context("Failed to reload user")?
            .ok_or_else(|| ServiceError::Authentication("用户未注册".to_string()))?;

        Ok(user)
    }

    /// Fetch an account by id.
    pub async fn get(&self, id: i64) -> Result<User, ServiceError> {
        self.user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or_else(|| ServiceError::NotFound("用户不存在".to_string()))
    }
}
