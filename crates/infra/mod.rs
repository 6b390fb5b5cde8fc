pub mod db;
pub mod notifications;
