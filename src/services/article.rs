//! Article service
//!
//! Validation and role scoping for article operations. New articles are
//! always drafts; publication and rejection manage published_at; deletion
//! is a logical transition that cannot be reversed through the API.

use crate::db::repositories::ArticleRepository;
use crate::models::{
    ArticleFilter, ArticleState, ArticleWithSubset, CreateArticleInput, ListParams, PagedResult,
    UpdateArticleInput, INTRODUCE_MAX_LEN, TITLE_MAX_LEN,
};
use crate::services::{Actor, ServiceError};
use anyhow::Context;
use std::sync::Arc;

pub struct ArticleService {
    repo: Arc<dyn ArticleRepository>,
}

impl ArticleService {
    pub fn new(repo: Arc<dyn ArticleRepository>) -> Self {
        Self { repo }
    }

    fn validate_title(title: &str) -> Result<(), ServiceError> {
        let chars = title.chars().count();
        if chars < 1 || chars > TITLE_MAX_LEN {
            return Err(ServiceError::Validation(
                "文章标题长度需在1-150字之间".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_introduce(introduce: &str) -> Result<(), ServiceError> {
        if introduce.chars().count() > INTRODUCE_MAX_LEN {
            return Err(ServiceError::Validation(
                "文章简介长度不能超过512字".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a draft article owned by the caller.
    pub async fn create(
        &self,
        input: CreateArticleInput,
        actor: &Actor,
    ) -> Result<i64, ServiceError> {
        Self::validate_title(&input.title)?;
        if input.content.is_empty() {
            return Err(ServiceError::Validation("文章内容不能为空".to_string()));
        }
        Self::validate_introduce(&input.introduce)?;

        let id = self
            .repo
            .create(&input, actor.user_id)
            .await
            .context("Failed to create article")?;

        tracing::debug!(article_id = id, user_id = actor.user_id, "Article created");
        Ok(id)
    }

    /// Filtered, paginated listing. Non-staff only see their own articles.
    pub async fn list(
        &self,
        params: &ListParams,
        filter: &ArticleFilter,
        actor: &Actor,
    ) -> Result<PagedResult<ArticleWithSubset>, ServiceError> {
        let page = self
            .repo
            .list_page(params, filter, actor.owner_scope())
            .await
            .context("Failed to list articles")?;
        Ok(page)
    }

    /// Detail view. Non-staff may read their own or published articles.
    pub async fn get(&self, id: i64, actor: &Actor) -> Result<ArticleWithSubset, ServiceError> {
        self.repo
            .get_by_id(id, actor.owner_scope())
            .await
            .context("Failed to get article")?
            .ok_or_else(|| ServiceError::NotFound("文章不存在或无权限访问".to_string()))
    }

    /// Partial update with per-field validation.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateArticleInput,
        actor: &Actor,
    ) -> Result<(), ServiceError> {
        if !input.has_changes() {
            return Err(ServiceError::Validation(
                "请传入至少一个更新字段".to_string(),
            ));
        }
        if let Some(title) = &input.title {
            Self::validate_title(title)?;
        }
        if let Some(introduce) = &input.introduce {
            Self::validate_introduce(introduce)?;
        }
        if let Some(state) = input.state {
            if !state.is_assignable() {
                return Err(ServiceError::Validation(
                    "状态仅支持 draft/published/rejected".to_string(),
                ));
            }
        }

        let affected = self
            .repo
            .update(id, &input, actor.owner_scope())
            .await
            .context("Failed to update article")?;
        if affected == 0 {
            return Err(ServiceError::Forbidden(
                "无权限更新该文章或文章不存在".to_string(),
            ));
        }
        Ok(())
    }

    /// Lifecycle transition. Re-applying the current state is a no-op success.
    pub async fn update_state(
        &self,
        id: i64,
        state: ArticleState,
        actor: &Actor,
    ) -> Result<(), ServiceError> {
        if !state.is_assignable() {
            return Err(ServiceError::Validation(
                "状态值无效，仅支持 draft（草稿）/ published（已发布）/ rejected（已驳回）"
                    .to_string(),
            ));
        }

        let affected = self
            .repo
            .update_state(id, state, actor.owner_scope())
            .await
            .context("Failed to update article state")?;
        if affected == 0 {
            return Err(ServiceError::Forbidden(
                "无权限修改该文章状态或文章不存在".to_string(),
            ));
        }
        Ok(())
    }

    /// Logical delete.
    pub async fn delete(&self, id: i64, actor: &Actor) -> Result<(), ServiceError> {
        let affected = self
            .repo
            .soft_delete(id, actor.owner_scope())
            .await
            .context("Failed to delete article")?;
        if affected == 0 {
            return Err(ServiceError::Forbidden(
                "无权限删除该文章或文章不存在".to_string(),
            ));
        }
        Ok(())
    }

    /// Toggle the caller's like on a visible article.
    /// Returns `true` when the article is now liked.
    pub async fn praise(&self, id: i64, actor: &Actor) -> Result<bool, ServiceError> {
        // Only articles the caller can see are likeable
        self.get(id, actor).await?;

        let liked = self
            .repo
            .toggle_praise(id, actor.user_id)
            .await
            .context("Failed to toggle praise")?;
        Ok(liked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxArticleRepository, SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Classify, User, UserRole};

    async fn setup() -> (ArticleService, Actor, Actor) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let admin = users
            .create(&User::new(
                "admin".to_string(),
                "admin@linlog.com".to_string(),
                "hash".to_string(),
                UserRole::Admin,
                None,
            ))
            .await
            .unwrap();
        let normal = users
            .create(&User::new(
                "normal".to_string(),
                "normal@linlog.com".to_string(),
                "hash".to_string(),
                UserRole::Normal,
                None,
            ))
            .await
            .unwrap();

        (
            ArticleService::new(SqlxArticleRepository::shared(pool)),
            Actor::new(admin.id, admin.user_type),
            Actor::new(normal.id, normal.user_type),
        )
    }

    fn input(title: &str) -> CreateArticleInput {
        CreateArticleInput {
            title: title.to_string(),
            content: "内容".to_string(),
            classify: Classify::Article,
            subset_id: None,
            label: String::new(),
            introduce: String::new(),
            cover: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_validates_title_length() {
        let (service, admin, _) = setup().await;

        let result = service.create(input(""), &admin).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        let long_title = "标".repeat(151);
        let result = service.create(input(&long_title), &admin).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        // 150 characters is still accepted
        let max_title = "标".repeat(150);
        assert!(service.create(input(&max_title), &admin).await.is_ok());
    }

    #[tokio::test]
    async fn test_normal_user_cannot_touch_others_article() {
        let (service, admin, normal) = setup().await;
        let id = service.create(input("admin的文章"), &admin).await.unwrap();

        let result = service
            .update_state(id, ArticleState::Published, &normal)
            .await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));

        let result = service.delete(id, &normal).await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_staff_can_moderate_any_article() {
        let (service, admin, normal) = setup().await;
        let id = service.create(input("普通用户的文章"), &normal).await.unwrap();

        service
            .update_state(id, ArticleState::Published, &admin)
            .await
            .unwrap();

        let article = service.get(id, &admin).await.unwrap();
        assert_eq!(article.article.state, ArticleState::Published);
    }

    #[tokio::test]
    async fn test_update_requires_some_field() {
        let (service, admin, _) = setup().await;
        let id = service.create(input("文章"), &admin).await.unwrap();

        let result = service
            .update(id, UpdateArticleInput::default(), &admin)
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_deleted_state_not_assignable() {
        let (service, admin, _) = setup().await;
        let id = service.create(input("文章"), &admin).await.unwrap();

        let result = service
            .update_state(id, ArticleState::Deleted, &admin)
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_then_operate_is_forbidden() {
        let (service, admin, _) = setup().await;
        let id = service.create(input("将被删除"), &admin).await.unwrap();

        service.delete(id, &admin).await.unwrap();

        assert!(matches!(
            service.delete(id, &admin).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.get(id, &admin).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_praise_requires_visibility() {
        let (service, admin, normal) = setup().await;
        let id = service.create(input("草稿"), &admin).await.unwrap();

        // Normal user cannot like an invisible draft
        let result = service.praise(id, &normal).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));

        service
            .update_state(id, ArticleState::Published, &admin)
            .await
            .unwrap();
        assert!(service.praise(id, &normal).await.unwrap());
        assert!(!service.praise(id, &normal).await.unwrap());
    }
}
