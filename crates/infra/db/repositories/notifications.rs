use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::{
        db::postgres::{postgres_connection::PgPoolSquad, schema::notifications},
        notifications::NotificationDelivery,
    },
};
use domain::{
    entities::notifications::{InsertNotificationEntity, NotificationEntity},
    repositories::notifications::NotificationRepository,
    value_objects::notifications::OrderNotification,
};

pub struct NotificationPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl NotificationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl NotificationRepository for NotificationPostgres {
    async fn insert_many(&self, notifications: Vec<InsertNotificationEntity>) -> Result<usize> {
        if notifications.is_empty() {
            return Ok(0);
        }

        let mut conn = Arc::clone(&self.db_pool).get()?;

        let inserted = diesel::insert_into(notifications::table)
            .values(&notifications)
            .execute(&mut conn)?;

        Ok(inserted)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<NotificationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .select(NotificationEntity::as_select())
            .into_boxed();

        if unread_only {
            query = query.filter(notifications::is_read.eq(false));
        }

        let result = query
            .order(notifications::created_at.desc())
            .load::<NotificationEntity>(&mut conn)?;

        Ok(result)
    }

    async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = diesel::update(
            notifications::table
                .filter(notifications::id.eq(notification_id))
                .filter(notifications::user_id.eq(user_id)),
        )
        .set(notifications::is_read.eq(true))
        .execute(&mut conn)?;

        Ok(updated > 0)
    }
}

#[async_trait]
impl NotificationDelivery for NotificationPostgres {
    async fn deliver(&self, notification: &OrderNotification) -> Result<()> {
        self.insert_many(vec![notification.to_entity(Utc::now())])
            .await
            .map(|_| ())
    }

    fn provider_name(&self) -> &'static str {
        "postgres"
    }
}
