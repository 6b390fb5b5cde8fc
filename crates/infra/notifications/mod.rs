mod dispatcher;

pub use dispatcher::{DEFAULT_QUEUE_CAPACITY, NotificationDelivery, QueuedNotificationSink};
