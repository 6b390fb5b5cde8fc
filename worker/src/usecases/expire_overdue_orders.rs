use anyhow::Result;
use chrono::{DateTime, Utc};
use crates::domain::{
    repositories::{notifications::NotificationSink, orders::OrderRepository},
    value_objects::{enums::notification_kinds::NotificationKind, notifications::OrderNotification},
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpireOverdueOrdersResult {
    pub expired: usize,
    pub expired_ids: Vec<Uuid>,
}

/// Cancels pending orders whose accept window has closed and tells their customers.
pub struct ExpireOverdueOrdersUseCase {
    order_repository: Arc<dyn OrderRepository + Send + Sync>,
    notification_sink: Arc<dyn NotificationSink>,
    batch_size: i64,
}

impl ExpireOverdueOrdersUseCase {
    pub fn new(
        order_repository: Arc<dyn OrderRepository + Send + Sync>,
        notification_sink: Arc<dyn NotificationSink>,
        batch_size: i64,
    ) -> Self {
        Self {
            order_repository,
            notification_sink,
            batch_size: batch_size.max(1),
        }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> Result<ExpireOverdueOrdersResult> {
        let expired = self
            .order_repository
            .expire_overdue(now, self.batch_size)
            .await?;

        if expired.is_empty() {
            debug!("housekeeping: no overdue orders");
            return Ok(ExpireOverdueOrdersResult::default());
        }

        let mut result = ExpireOverdueOrdersResult {
            expired: expired.len(),
            ..Default::default()
        };

        for order in expired {
            result.expired_ids.push(order.id);
            match order.order_type.parse() {
                Ok(order_type) => self.notification_sink.notify(OrderNotification::new(
                    order.user_id,
                    NotificationKind::OrderExpired,
                    order.id,
                    order_type,
                )),
                Err(err) => warn!(
                    order_id = %order.id,
                    error = %err,
                    "housekeeping: expired order has unknown type, customer not notified"
                ),
            }
        }

        info!(
            expired = result.expired,
            batch_size = self.batch_size,
            "housekeeping: overdue orders cancelled"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::{Duration, NaiveDate};
    use crates::domain::{
        entities::orders::OrderEntity,
        repositories::{notifications::MockNotificationSink, orders::MockOrderRepository},
        value_objects::order_transitions::EXPIRED_CANCELLATION_REASON,
    };
    use mockall::predicate::eq;

    fn expired_order(now: DateTime<Utc>) -> OrderEntity {
        OrderEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            driver_id: None,
            order_type: "taxi".to_string(),
            status: "cancelled".to_string(),
            customer_name: "Aziz".to_string(),
            customer_phone: "+998901234567".to_string(),
            recipient_phone: None,
            from_region_id: 1,
            from_district_id: 11,
            from_latitude: None,
            from_longitude: None,
            from_address: None,
            to_region_id: 2,
            to_district_id: 21,
            to_latitude: None,
            to_longitude: None,
            to_address: None,
            passenger_count: Some(1),
            delivery_type: None,
            scheduled_date: NaiveDate::from_ymd_opt(2026, 12, 25).unwrap(),
            time_range_start: "08:00".to_string(),
            time_range_end: "10:00".to_string(),
            price: BigDecimal::from(165000),
            service_fee: BigDecimal::from(24750),
            discount_percentage: BigDecimal::from(0),
            final_price: BigDecimal::from(189750),
            notes: None,
            cancellation_reason: Some(EXPIRED_CANCELLATION_REASON.to_string()),
            accepted_at: None,
            accept_deadline: Some(now - Duration::minutes(1)),
            completed_at: None,
            cancelled_at: Some(now),
            created_at: now - Duration::minutes(6),
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn each_expired_customer_is_notified_once() {
        let now = Utc::now();
        let orders = vec![expired_order(now), expired_order(now)];
        let customers: Vec<Uuid> = orders.iter().map(|order| order.user_id).collect();

        let mut order_repo = MockOrderRepository::new();
        order_repo
            .expect_expire_overdue()
            .with(eq(now), eq(50))
            .times(1)
            .returning(move |_, _| {
                let orders = orders.clone();
                Box::pin(async move { Ok(orders) })
            });

        let mut sink = MockNotificationSink::new();
        sink.expect_notify()
            .withf(move |notification| {
                notification.kind == NotificationKind::OrderExpired
                    && customers.contains(&notification.recipient_user_id)
            })
            .times(2)
            .return_const(());

        let usecase = ExpireOverdueOrdersUseCase::new(Arc::new(order_repo), Arc::new(sink), 50);
        let result = usecase.run(now).await.unwrap();

        assert_eq!(result.expired, 2);
        assert_eq!(result.expired_ids.len(), 2);
    }

    #[tokio::test]
    async fn quiet_pass_sends_nothing() {
        let mut order_repo = MockOrderRepository::new();
        order_repo
            .expect_expire_overdue()
            .returning(|_, _| Box::pin(async { Ok(vec![]) }));
        let mut sink = MockNotificationSink::new();
        sink.expect_notify().never();

        let usecase = ExpireOverdueOrdersUseCase::new(Arc::new(order_repo), Arc::new(sink), 100);
        let result = usecase.run(Utc::now()).await.unwrap();

        assert_eq!(result, ExpireOverdueOrdersResult::default());
    }
}
