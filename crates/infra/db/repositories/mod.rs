pub mod drivers;
pub mod ledger;
pub mod notifications;
pub mod orders;
pub mod pricing;
pub mod ratings;
