use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::ratings;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = ratings)]
pub struct RatingEntity {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub driver_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = ratings)]
pub struct InsertRatingEntity {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub driver_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
