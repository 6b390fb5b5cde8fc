use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::{
    repositories::notifications::NotificationSink,
    value_objects::notifications::OrderNotification,
};

pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Something that can hand a notification to a user: a table, a push gateway, a bot.
#[async_trait]
pub trait NotificationDelivery: Send + Sync {
    async fn deliver(&self, notification: &OrderNotification) -> Result<()>;
    fn provider_name(&self) -> &'static str;
}

/// Bounded queue drained by one background task. `notify` never waits; when the
/// queue is full the event is dropped with a warning.
#[derive(Clone)]
pub struct QueuedNotificationSink {
    tx: mpsc::Sender<OrderNotification>,
}

impl QueuedNotificationSink {
    /// Must be called from inside a tokio runtime.
    pub fn new(providers: Vec<Arc<dyn NotificationDelivery>>) -> Self {
        Self::with_capacity(providers, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(providers: Vec<Arc<dyn NotificationDelivery>>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<OrderNotification>(capacity.max(1));

        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                for provider in &providers {
                    if let Err(error) = provider.deliver(&notification).await {
                        warn!(
                            provider = provider.provider_name(),
                            recipient = %notification.recipient_user_id,
                            order_id = %notification.order_id,
                            kind = %notification.kind,
                            error = %error,
                            "notifications: provider failed"
                        );
                    }
                }
            }
            debug!("notifications: queue closed, dispatcher stopped");
        });

        Self { tx }
    }
}

impl NotificationSink for QueuedNotificationSink {
    fn notify(&self, notification: OrderNotification) {
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                warn!(
                    recipient = %dropped.recipient_user_id,
                    order_id = %dropped.order_id,
                    "notifications: queue full; dropping event"
                );
            }
            Err(mpsc::error::TrySendError::Closed(dropped)) => {
                warn!(
                    recipient = %dropped.recipient_user_id,
                    order_id = %dropped.order_id,
                    "notifications: queue closed; dropping event"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::enums::{
        notification_kinds::NotificationKind, order_types::OrderType,
    };
    use anyhow::anyhow;
    use std::{sync::Mutex, time::Duration};
    use uuid::Uuid;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<OrderNotification>>,
    }

    #[async_trait]
    impl NotificationDelivery for Recorder {
        async fn deliver(&self, notification: &OrderNotification) -> Result<()> {
            self.seen.lock().unwrap().push(notification.clone());
            Ok(())
        }

        fn provider_name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Broken;

    #[async_trait]
    impl NotificationDelivery for Broken {
        async fn deliver(&self, _notification: &OrderNotification) -> Result<()> {
            Err(anyhow!("gateway unavailable"))
        }

        fn provider_name(&self) -> &'static str {
            "broken"
        }
    }

    fn sample() -> OrderNotification {
        OrderNotification::new(
            Uuid::new_v4(),
            NotificationKind::NewOrder,
            Uuid::new_v4(),
            OrderType::Taxi,
        )
    }

    #[tokio::test]
    async fn failing_provider_does_not_block_the_others() {
        let recorder = Arc::new(Recorder::default());
        let providers: Vec<Arc<dyn NotificationDelivery>> = vec![Arc::new(Broken), recorder.clone()];
        let sink = QueuedNotificationSink::new(providers);

        for _ in 0..3 {
            sink.notify(sample());
        }

        for _ in 0..100 {
            if recorder.seen.lock().unwrap().len() == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(recorder.seen.lock().unwrap().len(), 3);
    }
}
