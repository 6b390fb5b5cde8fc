use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::ratings::{InsertRatingEntity, RatingEntity};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateRatingModel {
    pub order_id: Uuid,
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

impl CreateRatingModel {
    pub fn is_in_range(&self) -> bool {
        (MIN_RATING..=MAX_RATING).contains(&self.rating)
    }

    pub fn to_entity(&self, user_id: Uuid, driver_id: Uuid) -> InsertRatingEntity {
        InsertRatingEntity {
            order_id: self.order_id,
            user_id,
            driver_id,
            rating: self.rating,
            comment: self
                .comment
                .as_ref()
                .map(|comment| comment.trim().to_string())
                .filter(|comment| !comment.is_empty()),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingModel {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub driver_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<RatingEntity> for RatingModel {
    fn from(entity: RatingEntity) -> Self {
        Self {
            id: entity.id,
            order_id: entity.order_id,
            user_id: entity.user_id,
            driver_id: entity.driver_id,
            rating: entity.rating,
            comment: entity.comment,
            created_at: entity.created_at,
        }
    }
}

/// Driver aggregate written back after every new rating.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverRatingSummary {
    pub average: BigDecimal,
    pub count: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RatingOutcome {
    Created(RatingEntity),
    AlreadyRated,
}
