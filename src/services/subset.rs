//! Subset service

use crate::db::repositories::SubsetRepository;
use crate::models::{CreateSubsetInput, Subset, SubsetClassify, UpdateSubsetInput};
use crate::services::ServiceError;
use anyhow::Context;
use std::sync::Arc;

pub struct SubsetService {
    repo: Arc<dyn SubsetRepository>,
}

impl SubsetService {
    pub fn new(repo: Arc<dyn SubsetRepository>) -> Self {
        Self { repo }
    }

    /// List subsets, optionally restricted to one classify.
    pub async fn list(
        &self,
        classify: Option<SubsetClassify>,
    ) -> Result<Vec<Subset>, ServiceError> {
        let subsets = self
            .repo
            .list(classify)
            .await
            .context("Failed to list subsets")?;
        Ok(subsets)
    }

    /// Create a subset; (name, classify) must be unique.
    pub async fn create(&self, input: CreateSubsetInput) -> Result<i64, ServiceError> {
        if input.subset_name.trim().is_empty() {
            return Err(ServiceError::Validation("分类名称不能为空".to_string()));
        }
        if input.subset_name.chars().count() > 50 {
            return Err(ServiceError::Validation(
                "分类名称不能超过50字".to_string(),
            ));
        }

        let existing = self
            .repo
            .list(Some(input.classify))
            .await
            .context("Failed to check subsets")?;
        if existing.iter().any(|s| s.subset_name == input.subset_name) {
            return Err(ServiceError::Validation("该分类已存在".to_string()));
        }

        let id = self
            .repo
            .create(&input)
            .await
            .context("Failed to create subset")?;
        Ok(id)
    }

    /// Rename, reorder or enable/disable a subset.
    pub async fn update(&self, id: i64, input: UpdateSubsetInput) -> Result<(), ServiceError> {
        if !input.has_changes() {
            return Err(ServiceError::Validation(
                "请传入至少一个更新字段".to_string(),
            ));
        }
        if let Some(name) = &input.subset_name {
            if name.trim().is_empty() {
                return Err(ServiceError::Validation("分类名称不能为空".to_string()));
            }
        }

        let affected = self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update subset")?;
        if affected == 0 {
            return Err(ServiceError::NotFound("分类不存在".to_string()));
        }
        Ok(())
    }

    /// Disable a subset (logical delete).
    pub async fn disable(&self, id: i64) -> Result<(), ServiceError> {
        let affected = self
            .repo
            .disable(id)
            .await
            .context("Failed to disable subset")?;
        if affected == 0 {
            return Err(ServiceError::NotFound("分类不存在".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxSubsetRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SubsetService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SubsetService::new(SqlxSubsetRepository::shared(pool))
    }

    #[tokio::test]
    async fn test_duplicate_name_within_classify_rejected() {
        let service = setup().await;
        service
            .create(CreateSubsetInput {
                subset_name: "技术".to_string(),
                classify: SubsetClassify::Article,
                sort: 0,
            })
            .await
            .unwrap();

        let dup = service
            .create(CreateSubsetInput {
                subset_name: "技术".to_string(),
                classify: SubsetClassify::Article,
                sort: 0,
            })
            .await;
        assert!(matches!(dup, Err(ServiceError::Validation(_))));

        // Same name under another classify is fine
        assert!(service
            .create(CreateSubsetInput {
                subset_name: "技术".to_string(),
                classify: SubsetClassify::Image,
                sort: 0,
            })
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_update_missing_subset() {
        let service = setup().await;
        let result = service
            .update(
                42,
                UpdateSubsetInput {
                    sort: Some(1),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
