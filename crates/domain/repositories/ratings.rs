use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::ratings::{InsertRatingEntity, RatingEntity},
    value_objects::ratings::RatingOutcome,
};

#[async_trait]
#[automock]
pub trait RatingRepository {
    /// Inserts the rating and rewrites the driver's average and count in one transaction.
    async fn create_and_recompute(&self, rating: InsertRatingEntity) -> Result<RatingOutcome>;

    async fn list_for_driver(&self, driver_id: Uuid) -> Result<Vec<RatingEntity>>;
}
