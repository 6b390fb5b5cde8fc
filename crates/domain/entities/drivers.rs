use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::drivers;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = drivers)]
pub struct DriverEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub car_model: String,
    pub car_number: String,
    pub license_image: Option<String>,
    pub balance: BigDecimal,
    pub rating: BigDecimal,
    pub total_ratings: i32,
    pub status: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
