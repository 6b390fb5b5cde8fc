pub mod admin;
pub mod driver;
pub mod notifications;
pub mod orders;
pub mod ratings;
