//! Message service
//!
//! Send/inbox/outbox/read/delete plus the unread counter. Receivers must
//! exist and be active; non-staff accounts may only send private messages.

use crate::db::repositories::{MessageRepository, UserRepository};
use crate::models::{
    ListParams, MessageFilter, MessageType, MessageWithUsers, PagedResult, SendMessageInput,
    MESSAGE_MAX_LEN,
};
use crate::services::{Actor, ServiceError};
use anyhow::Context;
use std::sync::Arc;

pub struct MessageService {
    repo: Arc<dyn MessageRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl MessageService {
    pub fn new(repo: Arc<dyn MessageRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self { repo, user_repo }
    }

    /// Send a message to an active account.
    pub async fn send(
        &self,
        input: SendMessageInput,
        actor: &Actor,
    ) -> Result<i64, ServiceError> {
        if input.content.trim().is_empty() {
            return Err(ServiceError::Validation("消息内容不能为空".to_string()));
        }
        if input.content.chars().count() > MESSAGE_MAX_LEN {
            return Err(ServiceError::Validation(
                "消息内容不能超过512字".to_string(),
            ));
        }

        // Only staff may send system/notice messages
        if !actor.is_staff() && input.message_type != MessageType::Private {
            return Err(ServiceError::Forbidden(
                "普通用户仅能发送私信（private类型）".to_string(),
            ));
        }

        let receiver = self
            .user_repo
            .get_by_id(input.receiver_id)
            .await
            .context("Failed to check receiver")?;
        match receiver {
            Some(user) if !user.is_disabled() => {}
            _ => {
                return Err(ServiceError::Validation(
                    "接收用户不存在或已禁用".to_string(),
                ))
            }
        }

        let id = self
            .repo
            .create(&input, actor.user_id)
            .await
            .context("Failed to send message")?;
        Ok(id)
    }

    /// The caller's inbox.
    pub async fn inbox(
        &self,
        params: &ListParams,
        filter: &MessageFilter,
        actor: &Actor,
    ) -> Result<PagedResult<MessageWithUsers>, ServiceError> {
        let page = self
            .repo
            .inbox_page(params, filter, actor.user_id)
            .await
            .context("Failed to query inbox")?;
        Ok(page)
    }

    /// The caller's outbox.
    pub async fn outbox(
        &self,
        params: &ListParams,
        message_type: Option<MessageType>,
        actor: &Actor,
    ) -> Result<PagedResult<MessageWithUsers>, ServiceError> {
        let page = self
            .repo
            .outbox_page(params, message_type, actor.user_id)
            .await
            .context("Failed to query outbox")?;
        Ok(page)
    }

    /// Mark inbox messages read; returns how many rows changed.
    pub async fn mark_read(&self, ids: &[i64], actor: &Actor) -> Result<u64, ServiceError> {
        if ids.is_empty() {
            return Err(ServiceError::Validation(
                "请传入有效的消息ID(单个或数组)".to_string(),
            ));
        }

        let marked = self
            .repo
            .mark_read(ids, actor.user_id)
            .await
            .context("Failed to mark messages read")?;
        Ok(marked)
    }

    /// Delete a message the caller sent or received.
    pub async fn delete(&self, id: i64, actor: &Actor) -> Result<(), ServiceError> {
        let affected = self
            .repo
            .delete(id, actor.user_id)
            .await
            .context("Failed to delete message")?;
        if affected == 0 {
            return Err(ServiceError::Forbidden(
                "无权限删除该消息或消息不存在".to_string(),
            ));
        }
        Ok(())
    }

    /// Unread inbox count, optionally per type.
    pub async fn unread_count(
        &self,
        message_type: Option<MessageType>,
        actor: &Actor,
    ) -> Result<i64, ServiceError> {
        let count = self
            .repo
            .unread_count(actor.user_id, message_type)
            .await
            .context("Failed to count unread messages")?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxMessageRepository, SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{User, UserRole};

    async fn setup() -> (MessageService, Actor, Actor) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users: Arc<dyn UserRepository> = SqlxUserRepository::shared(pool.clone());
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
            MessageService::new(SqlxMessageRepository::shared(pool), users),
            Actor::new(admin.id, admin.user_type),
            Actor::new(normal.id, normal.user_type),
        )
    }

    fn message(receiver_id: i64, message_type: MessageType) -> SendMessageInput {
        SendMessageInput {
            receiver_id,
            message_type,
            content: "消息内容".to_string(),
        }
    }

    #[tokio::test]
    async fn test_normal_user_limited_to_private() {
        let (service, admin, normal) = setup().await;

        let result = service
            .send(message(admin.user_id, MessageType::System), &normal)
            .await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));

        assert!(service
            .send(message(admin.user_id, MessageType::Private), &normal)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_staff_may_send_any_type() {
        let (service, admin, normal) = setup().await;

        for t in [MessageType::System, MessageType::Private, MessageType::Notice] {
            assert!(service.send(message(normal.user_id, t), &admin).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_send_to_missing_receiver() {
        let (service, _admin, normal) = setup().await;

        let result = service
            .send(message(9999, MessageType::Private), &normal)
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unread_flow() {
        let (service, admin, normal) = setup().await;

        let id = service
            .send(message(normal.user_id, MessageType::Private), &admin)
            .await
            .unwrap();

        assert_eq!(service.unread_count(None, &normal).await.unwrap(), 1);

        let marked = service.mark_read(&[id], &normal).await.unwrap();
        assert_eq!(marked, 1);
        assert_eq!(service.unread_count(None, &normal).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_requires_ids() {
        let (service, _admin, normal) = setup().await;
        let result = service.mark_read(&[], &normal).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_by_stranger_forbidden() {
        let (service, admin, normal) = setup().await;
        let id = service
            .send(message(normal.user_id, MessageType::Private), &admin)
            .await
            .unwrap();

        let stranger = Actor::new(9999, UserRole::Normal);
        assert!(matches!(
            service.delete(id, &stranger).await,
            Err(ServiceError::Forbidden(_))
        ));

        service.delete(id, &normal).await.unwrap();
    }
}
