use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::notifications::{InsertNotificationEntity, NotificationEntity},
    value_objects::enums::{notification_kinds::NotificationKind, order_types::OrderType},
};

/// Event handed to the notification sink after an order changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderNotification {
    pub recipient_user_id: Uuid,
    pub kind: NotificationKind,
    pub order_id: Uuid,
    pub order_type: OrderType,
}

impl OrderNotification {
    pub fn new(
        recipient_user_id: Uuid,
        kind: NotificationKind,
        order_id: Uuid,
        order_type: OrderType,
    ) -> Self {
        Self {
            recipient_user_id,
            kind,
            order_id,
            order_type,
        }
    }

    pub fn message(&self) -> String {
        match self.kind {
            NotificationKind::NewOrder => {
                format!("A new {} order is waiting to be accepted", self.order_type)
            }
            NotificationKind::OrderAccepted => {
                "Your order has been accepted by a driver".to_string()
            }
            NotificationKind::OrderCompleted => "Your order has been completed".to_string(),
            NotificationKind::OrderCancelled => {
                "An order assigned to you was cancelled by the customer".to_string()
            }
            NotificationKind::OrderExpired => {
                "No driver accepted your order in time, it was cancelled".to_string()
            }
        }
    }

    pub fn to_entity(&self, now: DateTime<Utc>) -> InsertNotificationEntity {
        InsertNotificationEntity {
            user_id: self.recipient_user_id,
            title: self.kind.title().to_string(),
            message: self.message(),
            type_: self.kind.to_string(),
            related_id: Some(self.order_id),
            is_read: false,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationModel {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub related_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationEntity> for NotificationModel {
    type Error = anyhow::Error;

    fn try_from(entity: NotificationEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            title: entity.title,
            message: entity.message,
            kind: entity.type_.parse()?,
            related_id: entity.related_id,
            is_read: entity.is_read,
            created_at: entity.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NotificationsFilter {
    #[serde(default)]
    pub unread: Option<bool>,
}
