//! Comment service
//!
//! Creating a comment bumps the article's denormalized counter; deleting
//! one puts it back. Admins may delete any comment, everyone else only
//! their own.

use crate::db::repositories::{ArticleRepository, CommentRepository};
use crate::models::{
    CommentWithMeta, CreateCommentInput, ListParams, PagedResult, COMMENT_MAX_LEN,
};
use crate::services::{Actor, ServiceError};
use anyhow::Context;
use std::sync::Arc;

pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
    article_repo: Arc<dyn ArticleRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>, article_repo: Arc<dyn ArticleRepository>) -> Self {
        Self { repo, article_repo }
    }

    /// Create a comment on a visible article.
    pub async fn create(
        &self,
        input: CreateCommentInput,
        actor: &Actor,
    ) -> Result<i64, ServiceError> {
        if input.content.trim().is_empty() {
            return Err(ServiceError::Validation("评论内容不能为空".to_string()));
        }
        if input.content.chars().count() > COMMENT_MAX_LEN {
            return Err(ServiceError::Validation(
                "评论内容不能超过512字".to_string(),
            ));
        }

        // The target article must exist and be visible to the caller
        self.article_repo
            .get_by_id(input.article_id, actor.owner_scope())
            .await
            .context("Failed to check article")?
            .ok_or_else(|| ServiceError::NotFound("文章不存在或无权限访问".to_string()))?;

        let id = self
            .repo
            .create(&input, actor.user_id)
            .await
            .context("Failed to create comment")?;

        self.article_repo
            .adjust_comment_count(input.article_id, 1)
            .await
            .context("Failed to bump comment counter")?;

        Ok(id)
    }

    /// All active comments, newest first.
    pub async fn list_all(
        &self,
        params: &ListParams,
    ) -> Result<PagedResult<CommentWithMeta>, ServiceError> {
        let page = self
            .repo
            .list_page(params)
            .await
            .context("Failed to list comments")?;
        Ok(page)
    }

    /// The caller's own comments.
    pub async fn list_mine(
        &self,
        params: &ListParams,
        actor: &Actor,
    ) -> Result<PagedResult<CommentWithMeta>, ServiceError> {
        let page = self
            .repo
            .list_by_user(params, actor.user_id)
            .await
            .context("Failed to list comments")?;
        Ok(page)
    }

    /// Logical delete. Admins may delete any comment.
    pub async fn delete(&self, id: i64, actor: &Actor) -> Result<(), ServiceError> {
        let comment = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get comment")?;

        let scope = if actor.is_admin() {
            None
        } else {
            Some(actor.user_id)
        };
        let affected = self
            .repo
            .soft_delete(id, scope)
            .await
            .context("Failed to delete comment")?;
        if affected == 0 {
            return Err(ServiceError::Forbidden(
                "无权限删除该评论或评论不存在".to_string(),
            ));
        }

        if let Some(comment) = comment {
            self.article_repo
                .adjust_comment_count(comment.article_id, -1)
                .await
                .context("Failed to drop comment counter")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxArticleRepository, SqlxCommentRepository, SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{ArticleState, Classify, CreateArticleInput, User, UserRole};

    struct Fixture {
        service: CommentService,
        articles: Arc<dyn ArticleRepository>,
        admin: Actor,
        normal: Actor,
        article_id: i64,
    }

    async fn setup() -> Fixture {
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

        let articles: Arc<dyn ArticleRepository> = SqlxArticleRepository::shared(pool.clone());
        let article_id = articles
            .create(
                &CreateArticleInput {
                    title: "文章".to_string(),
                    content: "内容".to_string(),
                    classify: Classify::Article,
                    subset_id: None,
                    label: String::new(),
                    introduce: String::new(),
                    cover: String::new(),
                },
                admin.id,
            )
            .await
            .unwrap();
        articles
            .update_state(article_id, ArticleState::Published, None)
            .await
            .unwrap();

        Fixture {
            service: CommentService::new(SqlxCommentRepository::shared(pool), articles.clone()),
            articles,
            admin: Actor::new(admin.id, admin.user_type),
            normal: Actor::new(normal.id, normal.user_type),
            article_id,
        }
    }

    fn comment(article_id: i64, content: &str) -> CreateCommentInput {
        CreateCommentInput {
            article_id,
            content: content.to_string(),
            parent_id: 0,
        }
    }

    #[tokio::test]
    async fn test_create_bumps_counter() {
        let f = setup().await;

        f.service
            .create(comment(f.article_id, "好文"), &f.normal)
            .await
            .unwrap();

        let article = f.articles.get_by_id(f.article_id, None).await.unwrap().unwrap();
        assert_eq!(article.article.comments, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_and_oversized() {
        let f = setup().await;

        assert!(matches!(
            f.service.create(comment(f.article_id, "  "), &f.normal).await,
            Err(ServiceError::Validation(_))
        ));

        let long = "评".repeat(513);
        assert!(matches!(
            f.service.create(comment(f.article_id, &long), &f.normal).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_on_missing_article() {
        let f = setup().await;
        let result = f.service.create(comment(9999, "无处安放"), &f.normal).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_permissions_and_counter() {
        let f = setup().await;
        let id = f
            .service
            .create(comment(f.article_id, "目标"), &f.normal)
            .await
            .unwrap();

        // Another normal user (the admin actor downgraded) cannot delete it;
        // model a second normal user by reusing admin id with Normal role.
        let stranger = Actor::new(f.admin.user_id, UserRole::Normal);
        assert!(matches!(
            f.service.delete(id, &stranger).await,
            Err(ServiceError::Forbidden(_))
        ));

        // Admin can delete anything
        f.service.delete(id, &f.admin).await.unwrap();

        let article = f.articles.get_by_id(f.article_id, None).await.unwrap().unwrap();
        assert_eq!(article.article.comments, 0);

        // Gone now
        assert!(matches!(
            f.service.delete(id, &f.admin).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_list_mine_scopes_to_caller() {
        let f = setup().await;
        f.service
            .create(comment(f.article_id, "normal的评论"), &f.normal)
            .await
            .unwrap();
        f.service
            .create(comment(f.article_id, "admin的评论"), &f.admin)
            .await
            .unwrap();

        let all = f.service.list_all(&ListParams::default()).await.unwrap();
        assert_eq!(all.total, 2);

        let mine = f
            .service
            .list_mine(&ListParams::default(), &f.normal)
            .await
            .unwrap();
        assert_eq!(mine.total, 1);
        assert_eq!(mine.list[0].content, "normal的评论");
    }
}
