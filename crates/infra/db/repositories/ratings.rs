use anyhow::Result;
use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use diesel::{
    dsl::{avg, count_star},
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{drivers, ratings},
    },
};
use domain::{
    entities::ratings::{InsertRatingEntity, RatingEntity},
    repositories::ratings::RatingRepository,
    value_objects::{
        fares::round_money,
        ratings::{DriverRatingSummary, RatingOutcome},
    },
};

pub struct RatingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl RatingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl RatingRepository for RatingPostgres {
    async fn create_and_recompute(&self, rating: InsertRatingEntity) -> Result<RatingOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<RatingEntity, DieselError, _>(|tx| {
            let created = diesel::insert_into(ratings::table)
                .values(&rating)
                .returning(RatingEntity::as_returning())
                .get_result::<RatingEntity>(tx)?;

            let (average, count) = ratings::table
                .filter(ratings::driver_id.eq(created.driver_id))
                .select((avg(ratings::rating), count_star()))
                .first::<(Option<BigDecimal>, i64)>(tx)?;

            let summary = DriverRatingSummary {
                average: round_money(&average.unwrap_or_else(BigDecimal::zero)),
                count: i32::try_from(count).unwrap_or(i32::MAX),
            };

            diesel::update(drivers::table.filter(drivers::id.eq(created.driver_id)))
                .set((
                    drivers::rating.eq(summary.average),
                    drivers::total_ratings.eq(summary.count),
                    drivers::updated_at.eq(Utc::now()),
                ))
                .execute(tx)?;

            Ok(created)
        });

        match result {
            Ok(created) => Ok(RatingOutcome::Created(created)),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Ok(RatingOutcome::AlreadyRated)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn list_for_driver(&self, driver_id: Uuid) -> Result<Vec<RatingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = ratings::table
            .filter(ratings::driver_id.eq(driver_id))
            .order(ratings::created_at.desc())
            .select(RatingEntity::as_select())
            .load::<RatingEntity>(&mut conn)?;

        Ok(result)
    }
}
