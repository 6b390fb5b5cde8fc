use std::sync::Arc;

use crates::domain::{
    repositories::notifications::NotificationRepository,
    value_objects::{
        iam::Actor,
        notifications::{NotificationModel, NotificationsFilter},
    },
};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification not found")]
    NotificationNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl NotificationError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            NotificationError::NotificationNotFound => StatusCode::NOT_FOUND,
            NotificationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, NotificationError>;

pub struct NotificationUseCase<N>
where
    N: NotificationRepository + Send + Sync + 'static,
{
    notification_repository: Arc<N>,
}

impl<N> NotificationUseCase<N>
where
    N: NotificationRepository + Send + Sync + 'static,
{
    pub fn new(notification_repository: Arc<N>) -> Self {
        Self {
            notification_repository,
        }
    }

    pub async fn list(
        &self,
        actor: Actor,
        filter: NotificationsFilter,
    ) -> UseCaseResult<Vec<NotificationModel>> {
        let unread_only = filter.unread.unwrap_or(false);
        let notifications = self
            .notification_repository
            .list_for_user(actor.user_id, unread_only)
            .await
            .map_err(|err| {
                error!(user_id = %actor.user_id, db_error = ?err, "notifications: failed to list");
                err
            })?;

        Ok(notifications
            .into_iter()
            .map(NotificationModel::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?)
    }

    pub async fn mark_read(&self, actor: Actor, notification_id: Uuid) -> UseCaseResult<()> {
        let updated = self
            .notification_repository
            .mark_read(notification_id, actor.user_id)
            .await
            .map_err(|err| {
                error!(%notification_id, db_error = ?err, "notifications: failed to mark read");
                err
            })?;

        if !updated {
            warn!(user_id = %actor.user_id, %notification_id, "notifications: not found for user");
            return Err(NotificationError::NotificationNotFound);
        }
        Ok(())
    }
}
