use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::orders;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = orders)]
pub struct OrderEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub order_type: String,
    pub status: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub recipient_phone: Option<String>,
    pub from_region_id: i64,
    pub from_district_id: i64,
    pub from_latitude: Option<f64>,
    pub from_longitude: Option<f64>,
    pub from_address: Option<String>,
    pub to_region_id: i64,
    pub to_district_id: i64,
    pub to_latitude: Option<f64>,
    pub to_longitude: Option<f64>,
    pub to_address: Option<String>,
    pub passenger_count: Option<i32>,
    pub delivery_type: Option<String>,
    pub scheduled_date: NaiveDate,
    pub time_range_start: String,
    pub time_range_end: String,
    pub price: BigDecimal,
    pub service_fee: BigDecimal,
    pub discount_percentage: BigDecimal,
    pub final_price: BigDecimal,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub accept_deadline: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = orders)]
pub struct InsertOrderEntity {
    pub user_id: Uuid,
    pub order_type: String,
    pub status: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub recipient_phone: Option<String>,
    pub from_region_id: i64,
    pub from_district_id: i64,
    pub from_latitude: Option<f64>,
    pub from_longitude: Option<f64>,
    pub from_address: Option<String>,
    pub to_region_id: i64,
    pub to_district_id: i64,
    pub to_latitude: Option<f64>,
    pub to_longitude: Option<f64>,
    pub to_address: Option<String>,
    pub passenger_count: Option<i32>,
    pub delivery_type: Option<String>,
    pub scheduled_date: NaiveDate,
    pub time_range_start: String,
    pub time_range_end: String,
    pub price: BigDecimal,
    pub service_fee: BigDecimal,
    pub discount_percentage: BigDecimal,
    pub final_price: BigDecimal,
    pub notes: Option<String>,
    pub accept_deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
