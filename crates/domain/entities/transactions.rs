use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::transactions;

/// Ledger row. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = transactions)]
pub struct TransactionEntity {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub order_id: Option<Uuid>,
    pub amount: BigDecimal,
    pub type_: String,
    pub description: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = transactions)]
pub struct InsertTransactionEntity {
    pub driver_id: Uuid,
    pub order_id: Option<Uuid>,
    pub amount: BigDecimal,
    pub type_: String,
    pub description: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
