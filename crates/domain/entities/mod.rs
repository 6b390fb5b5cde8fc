pub mod discounts;
pub mod drivers;
pub mod notifications;
pub mod orders;
pub mod pricing;
pub mod ratings;
pub mod transactions;
