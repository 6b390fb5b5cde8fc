pub mod enums;
pub mod fares;
pub mod iam;
pub mod ledger;
pub mod notifications;
pub mod order_transitions;
pub mod orders;
pub mod ratings;
pub mod statistics;
