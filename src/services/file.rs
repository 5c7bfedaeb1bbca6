//! File metadata service

use crate::db::repositories::FileRepository;
use crate::models::{CreateFileInput, FileFilter, ListParams, PagedResult, StoredFile};
use crate::services::ServiceError;
use anyhow::Context;
use std::sync::Arc;

pub struct FileService {
    repo: Arc<dyn FileRepository>,
}

impl FileService {
    pub fn new(repo: Arc<dyn FileRepository>) -> Self {
        Self { repo }
    }

    /// Register metadata for a file placed under the data directory.
    pub async fn create(&self, input: CreateFileInput) -> Result<i64, ServiceError> {
        if input.file_name.trim().is_empty()
            || input.format.trim().is_empty()
            || input.url.trim().is_empty()
        {
            return Err(ServiceError::Validation(
                "文件名、格式、地址不能为空".to_string(),
            ));
        }

        let mut input = input;
        input.format = input.format.to_lowercase();

        let id = self
            .repo
            .create(&input)
            .await
            .context("Failed to register file")?;
        Ok(id)
    }

    /// Paginated listing with optional subset/format filters.
    pub async fn list(
        &self,
        params: &ListParams,
        filter: &FileFilter,
    ) -> Result<PagedResult<StoredFile>, ServiceError> {
        let page = self
            .repo
            .list_page(params, filter)
            .await
            .context("Failed to list files")?;
        Ok(page)
    }

    /// Logical delete.
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let affected = self
            .repo
            .soft_delete(id)
            .await
            .context("Failed to delete file")?;
        if affected == 0 {
            return Err(ServiceError::NotFound("文件不存在".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxFileRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> FileService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        FileService::new(SqlxFileRepository::shared(pool))
    }

    #[tokio::test]
    async fn test_create_normalizes_format() {
        let service = setup().await;
        service
            .create(CreateFileInput {
                file_name: "照片.JPG".to_string(),
                format: "JPG".to_string(),
                size: Some(2048),
                url: "/data/照片.JPG".to_string(),
                subset_id: None,
            })
            .await
            .unwrap();

        let filter = FileFilter {
            subset_id: None,
            format: Some("jpg".to_string()),
        };
        let page = service.list(&ListParams::default(), &filter).await.unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_create_requires_fields() {
        let service = setup().await;
        let result = service
            .create(CreateFileInput {
                file_name: String::new(),
                format: "jpg".to_string(),
                size: None,
                url: "/data/x.jpg".to_string(),
                subset_id: None,
            })
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_file() {
        let service = setup().await;
        assert!(matches!(
            service.delete(404).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
