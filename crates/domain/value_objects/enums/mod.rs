pub mod delivery_types;
pub mod driver_statuses;
pub mod notification_kinds;
pub mod order_statuses;
pub mod order_types;
pub mod statistics_periods;
pub mod transaction_kinds;
pub mod user_roles;
