use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::pricing;

/// Tariff for one directed route. `service_fee` is a percentage.
#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = pricing)]
pub struct PricingEntity {
    pub id: Uuid,
    pub from_region_id: i64,
    pub to_region_id: i64,
    pub base_price: BigDecimal,
    pub price_per_person: BigDecimal,
    pub service_fee: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
