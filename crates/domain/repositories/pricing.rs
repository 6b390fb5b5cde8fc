use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::{discounts::DiscountEntity, pricing::PricingEntity};

#[async_trait]
#[automock]
pub trait PricingRepository {
    async fn find_route_tariff(
        &self,
        from_region_id: i64,
        to_region_id: i64,
    ) -> Result<Option<PricingEntity>>;

    async fn find_discount(&self, passenger_count: i32) -> Result<Option<DiscountEntity>>;
}
