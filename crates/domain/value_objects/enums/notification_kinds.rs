use std::{fmt::Display, str::FromStr};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewOrder,
    OrderAccepted,
    OrderCompleted,
    OrderCancelled,
    OrderExpired,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::NewOrder => "new_order",
            NotificationKind::OrderAccepted => "order_accepted",
            NotificationKind::OrderCompleted => "order_completed",
            NotificationKind::OrderCancelled => "order_cancelled",
            NotificationKind::OrderExpired => "order_expired",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            NotificationKind::NewOrder => "New Order Available",
            NotificationKind::OrderAccepted => "Order Accepted",
            NotificationKind::OrderCompleted => "Order Completed",
            NotificationKind::OrderCancelled => "Order Cancelled",
            NotificationKind::OrderExpired => "Order Expired",
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "new_order" => Ok(NotificationKind::NewOrder),
            "order_accepted" => Ok(NotificationKind::OrderAccepted),
            "order_completed" => Ok(NotificationKind::OrderCompleted),
            "order_cancelled" => Ok(NotificationKind::OrderCancelled),
            "order_expired" => Ok(NotificationKind::OrderExpired),
            other => Err(anyhow!("unknown notification kind: {other}")),
        }
    }
}
