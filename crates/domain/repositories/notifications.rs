use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::notifications::{InsertNotificationEntity, NotificationEntity},
    value_objects::notifications::OrderNotification,
};

#[async_trait]
#[automock]
pub trait NotificationRepository {
    async fn insert_many(&self, notifications: Vec<InsertNotificationEntity>) -> Result<usize>;

    async fn list_for_user(&self, user_id: Uuid, unread_only: bool)
    -> Result<Vec<NotificationEntity>>;

    /// Returns false when the notification does not exist or belongs to someone else.
    async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> Result<bool>;
}

/// Fire-and-forget channel for order events. Implementations never block the caller
/// and never surface delivery failures.
#[automock]
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: OrderNotification);
}
