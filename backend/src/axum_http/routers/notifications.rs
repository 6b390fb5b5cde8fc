use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::notifications::NotificationRepository,
        value_objects::notifications::NotificationsFilter,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::notifications::NotificationPostgres,
    },
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    usecases::notifications::{NotificationError, NotificationUseCase},
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let notification_repository = NotificationPostgres::new(Arc::clone(&db_pool));
    let notification_usecase = NotificationUseCase::new(Arc::new(notification_repository));

    Router::new()
        .route("/", get(list_notifications))
        .route("/:notification_id/read", post(mark_read))
        .with_state(Arc::new(notification_usecase))
}

pub async fn list_notifications<N>(
    State(notification_usecase): State<Arc<NotificationUseCase<N>>>,
    auth: AuthUser,
    Query(filter): Query<NotificationsFilter>,
) -> Result<impl IntoResponse, NotificationError>
where
    N: NotificationRepository + Send + Sync + 'static,
{
    let notifications = notification_usecase.list(auth.actor(), filter).await?;
    Ok(Json(notifications))
}

pub async fn mark_read<N>(
    State(notification_usecase): State<Arc<NotificationUseCase<N>>>,
    auth: AuthUser,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, NotificationError>
where
    N: NotificationRepository + Send + Sync + 'static,
{
    notification_usecase
        .mark_read(auth.actor(), notification_id)
        .await?;
    Ok(Json(json!({ "message": "Notification marked as read" })))
}
