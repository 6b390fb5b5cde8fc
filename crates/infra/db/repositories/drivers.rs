use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use diesel::{dsl::sum, prelude::*};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

use crate::{
    domain,
    infra::db::{
        postgres::{
            postgres_connection::PgPoolSquad,
            schema::{drivers, transactions, users},
        },
        repositories::ledger::apply_ledger_entry,
    },
};
use domain::{
    entities::{drivers::DriverEntity, transactions::TransactionEntity},
    repositories::drivers::DriverRepository,
    value_objects::{
        enums::driver_statuses::DriverStatus,
        ledger::{LedgerDrift, LedgerEntry},
    },
};

pub struct DriverPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl DriverPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl DriverRepository for DriverPostgres {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<DriverEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = drivers::table
            .filter(drivers::user_id.eq(user_id))
            .select(DriverEntity::as_select())
            .first::<DriverEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_id(&self, driver_id: Uuid) -> Result<Option<DriverEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = drivers::table
            .filter(drivers::id.eq(driver_id))
            .select(DriverEntity::as_select())
            .first::<DriverEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_notifiable_user_ids(&self) -> Result<Vec<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = drivers::table
            .inner_join(users::table)
            .filter(drivers::status.eq(DriverStatus::Approved.to_string()))
            .filter(drivers::is_active.eq(true))
            .filter(users::is_blocked.eq(false))
            .select(drivers::user_id)
            .load::<Uuid>(&mut conn)?;

        Ok(result)
    }

    async fn apply_entry(&self, entry: LedgerEntry) -> Result<TransactionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let applied = conn.transaction::<Option<TransactionEntity>, diesel::result::Error, _>(
            |tx| apply_ledger_entry(tx, &entry, now),
        )?;

        applied.ok_or_else(|| {
            anyhow!(
                "ledger entry rejected for driver {}: driver missing or balance too low",
                entry.driver_id
            )
        })
    }

    async fn list_transactions(&self, driver_id: Uuid) -> Result<Vec<TransactionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = transactions::table
            .filter(transactions::driver_id.eq(driver_id))
            .order(transactions::created_at.desc())
            .select(TransactionEntity::as_select())
            .load::<TransactionEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_ledger_drift(&self) -> Result<Vec<LedgerDrift>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // One snapshot for both reads so in-flight entries cannot show up as drift.
        let (balances, totals) = conn
            .build_transaction()
            .repeatable_read()
            .read_only()
            .run::<_, diesel::result::Error, _>(|tx| {
                let balances = drivers::table
                    .select((drivers::id, drivers::balance))
                    .load::<(Uuid, BigDecimal)>(tx)?;

                let totals = transactions::table
                    .group_by(transactions::driver_id)
                    .select((transactions::driver_id, sum(transactions::amount)))
                    .load::<(Uuid, Option<BigDecimal>)>(tx)?;

                Ok((balances, totals))
            })?;

        let totals: HashMap<Uuid, BigDecimal> = totals
            .into_iter()
            .map(|(driver_id, total)| (driver_id, total.unwrap_or_else(BigDecimal::zero)))
            .collect();

        let drift = balances
            .into_iter()
            .filter_map(|(driver_id, balance)| {
                let ledger_total = totals.get(&driver_id).cloned().unwrap_or_else(BigDecimal::zero);
                (balance != ledger_total).then_some(LedgerDrift {
                    driver_id,
                    balance,
                    ledger_total,
                })
            })
            .collect();

        Ok(drift)
    }
}
