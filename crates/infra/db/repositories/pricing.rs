use anyhow::Result;
use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{discounts, pricing},
    },
};
use domain::{
    entities::{discounts::DiscountEntity, pricing::PricingEntity},
    repositories::pricing::PricingRepository,
};

pub struct PricingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PricingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PricingRepository for PricingPostgres {
    async fn find_route_tariff(
        &self,
        from_region_id: i64,
        to_region_id: i64,
    ) -> Result<Option<PricingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = pricing::table
            .filter(pricing::from_region_id.eq(from_region_id))
            .filter(pricing::to_region_id.eq(to_region_id))
            .select(PricingEntity::as_select())
            .first::<PricingEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_discount(&self, passenger_count: i32) -> Result<Option<DiscountEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = discounts::table
            .filter(discounts::passenger_count.eq(passenger_count))
            .select(DiscountEntity::as_select())
            .first::<DiscountEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
