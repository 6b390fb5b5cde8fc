use anyhow::Result;
use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use diesel::{
    BoxableExpression, PgConnection, QueryResult, dsl::sum, pg::Pg, prelude::*, sql_types::Bool,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::{
        postgres::{postgres_connection::PgPoolSquad, schema::orders},
        repositories::ledger::apply_ledger_entry,
    },
};
use domain::{
    entities::{
        orders::{InsertOrderEntity, OrderEntity},
        transactions::TransactionEntity,
    },
    repositories::orders::OrderRepository,
    value_objects::{
        enums::order_statuses::OrderStatus,
        ledger::LedgerEntry,
        order_transitions::{
            AcceptOutcome, CancelOutcome, EXPIRED_CANCELLATION_REASON, OrderTransition,
            RefundOutcome, TransitionGuard,
        },
        orders::{DriverOrdersFilter, MyOrdersFilter, NewOrdersFilter, OrderVisibility},
        statistics::DriverOrderCounts,
    },
};

type OrderPredicate = Box<dyn BoxableExpression<orders::table, Pg, SqlType = Bool>>;

/// Ways the accept unit of work can end without committing.
enum AcceptAbort {
    AlreadyProcessed,
    InsufficientBalance,
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for AcceptAbort {
    fn from(err: diesel::result::Error) -> Self {
        AcceptAbort::Database(err)
    }
}

pub struct OrderPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl OrderPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn guard_predicate(order_id: Uuid, guard: &TransitionGuard) -> OrderPredicate {
    let statuses: Vec<String> = guard
        .expected_statuses
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut predicate: OrderPredicate = Box::new(
        orders::id
            .eq(order_id)
            .and(orders::status.eq_any(statuses)),
    );

    if let Some(driver_id) = guard.driver_id {
        predicate = Box::new(predicate.and(orders::driver_id.eq(driver_id).assume_not_null()));
    }
    if let Some(user_id) = guard.user_id {
        predicate = Box::new(predicate.and(orders::user_id.eq(user_id)));
    }
    if let Some(now) = guard.open_at {
        predicate = Box::new(predicate.and(
            orders::accept_deadline
                .is_null()
                .or(orders::accept_deadline.gt(now).assume_not_null()),
        ));
    }

    predicate
}

/// Runs one conditional `UPDATE` and returns the row it changed, if any.
fn transition_order(
    conn: &mut PgConnection,
    order_id: Uuid,
    guard: &TransitionGuard,
    transition: &OrderTransition,
) -> QueryResult<Option<OrderEntity>> {
    let predicate = guard_predicate(order_id, guard);
    let status = transition.target_status().to_string();

    match transition {
        OrderTransition::Accept { driver_id, at } => diesel::update(orders::table)
            .filter(predicate)
            .set((
                orders::status.eq(status),
                orders::driver_id.eq(Some(*driver_id)),
                orders::accepted_at.eq(Some(*at)),
                orders::accept_deadline.eq(None::<DateTime<Utc>>),
                orders::updated_at.eq(*at),
            ))
            .returning(OrderEntity::as_returning())
            .get_result::<OrderEntity>(conn)
            .optional(),
        OrderTransition::Complete { at } => diesel::update(orders::table)
            .filter(predicate)
            .set((
                orders::status.eq(status),
                orders::completed_at.eq(Some(*at)),
                orders::updated_at.eq(*at),
            ))
            .returning(OrderEntity::as_returning())
            .get_result::<OrderEntity>(conn)
            .optional(),
        OrderTransition::Cancel { reason, at } => diesel::update(orders::table)
            .filter(predicate)
            .set((
                orders::status.eq(status),
                orders::cancellation_reason.eq(Some(reason.clone())),
                orders::cancelled_at.eq(Some(*at)),
                orders::updated_at.eq(*at),
            ))
            .returning(OrderEntity::as_returning())
            .get_result::<OrderEntity>(conn)
            .optional(),
    }
}

#[async_trait]
impl OrderRepository for OrderPostgres {
    async fn create(&self, order: InsertOrderEntity) -> Result<OrderEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = diesel::insert_into(orders::table)
            .values(&order)
            .returning(OrderEntity::as_returning())
            .get_result::<OrderEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(
        &self,
        order_id: Uuid,
        visibility: OrderVisibility,
    ) -> Result<Option<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = orders::table
            .filter(orders::id.eq(order_id))
            .select(OrderEntity::as_select())
            .into_boxed();

        if let OrderVisibility::Owner(user_id) = visibility {
            query = query.filter(orders::user_id.eq(user_id));
        }

        let result = query.first::<OrderEntity>(&mut conn).optional()?;

        Ok(result)
    }

    async fn find_new(
        &self,
        filter: NewOrdersFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = orders::table
            .filter(orders::status.eq(OrderStatus::Pending.to_string()))
            .filter(
                orders::accept_deadline
                    .is_null()
                    .or(orders::accept_deadline.gt(now).assume_not_null()),
            )
            .select(OrderEntity::as_select())
            .into_boxed();

        if let Some(order_type) = filter.order_type {
            query = query.filter(orders::order_type.eq(order_type.to_string()));
        }
        if let Some(from_region_id) = filter.from_region_id {
            query = query.filter(orders::from_region_id.eq(from_region_id));
        }
        if let Some(to_region_id) = filter.to_region_id {
            query = query.filter(orders::to_region_id.eq(to_region_id));
        }

        let result = query
            .order(orders::created_at.desc())
            .load::<OrderEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_mine(&self, user_id: Uuid, filter: MyOrdersFilter) -> Result<Vec<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = orders::table
            .filter(orders::user_id.eq(user_id))
            .select(OrderEntity::as_select())
            .into_boxed();

        if let Some(status) = filter.status {
            query = query.filter(orders::status.eq(status.to_string()));
        }
        if let Some(order_type) = filter.order_type {
            query = query.filter(orders::order_type.eq(order_type.to_string()));
        }

        let result = query
            .order(orders::created_at.desc())
            .load::<OrderEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_for_driver(
        &self,
        driver_id: Uuid,
        filter: DriverOrdersFilter,
    ) -> Result<Vec<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = orders::table
            .filter(orders::driver_id.eq(driver_id))
            .select(OrderEntity::as_select())
            .into_boxed();

        if let Some(status) = filter.status {
            query = query.filter(orders::status.eq(status.to_string()));
        }

        let result = query
            .order(orders::created_at.desc())
            .load::<OrderEntity>(&mut conn)?;

        Ok(result)
    }

    async fn conditional_transition(
        &self,
        order_id: Uuid,
        guard: TransitionGuard,
        transition: OrderTransition,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = transition_order(&mut conn, order_id, &guard, &transition)?;

        Ok(usize::from(updated.is_some()))
    }

    async fn accept_with_debit(
        &self,
        order_id: Uuid,
        driver_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<AcceptOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<(OrderEntity, TransactionEntity), AcceptAbort, _>(|tx| {
            let transition = OrderTransition::Accept { driver_id, at: now };
            let guard = TransitionGuard::for_transition(&transition).open_at(now);

            let order = transition_order(tx, order_id, &guard, &transition)?
                .ok_or(AcceptAbort::AlreadyProcessed)?;

            let entry = LedgerEntry::order_debit(driver_id, order.id, &order.service_fee);
            let debit =
                apply_ledger_entry(tx, &entry, now)?.ok_or(AcceptAbort::InsufficientBalance)?;

            Ok((order, debit))
        });

        match result {
            Ok((order, debit)) => Ok(AcceptOutcome::Accepted { order, debit }),
            Err(AcceptAbort::AlreadyProcessed) => Ok(AcceptOutcome::AlreadyProcessed),
            Err(AcceptAbort::InsufficientBalance) => Ok(AcceptOutcome::InsufficientBalance),
            Err(AcceptAbort::Database(err)) => Err(err.into()),
        }
    }

    async fn cancel_with_refund(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<CancelOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let outcome = conn.transaction::<CancelOutcome, diesel::result::Error, _>(|tx| {
            let transition = OrderTransition::Cancel { reason, at: now };
            let guard = TransitionGuard::for_transition(&transition).owned_by(user_id);

            let Some(order) = transition_order(tx, order_id, &guard, &transition)? else {
                return Ok(CancelOutcome::NotCancellable);
            };

            let refund = match order.driver_id {
                None => RefundOutcome::NotRequired,
                Some(driver_id) => {
                    let entry = LedgerEntry::order_refund(driver_id, order.id, &order.service_fee);

                    // Nested transaction is a savepoint; a failed refund leaves the
                    // cancellation intact.
                    let credited = tx.transaction::<TransactionEntity, diesel::result::Error, _>(
                        |savepoint| {
                            apply_ledger_entry(savepoint, &entry, now)?
                                .ok_or(diesel::result::Error::NotFound)
                        },
                    );

                    match credited {
                        Ok(transaction) => RefundOutcome::Credited(transaction),
                        Err(err) => RefundOutcome::Failed {
                            driver_id,
                            amount: entry.amount.clone(),
                            error: err.to_string(),
                        },
                    }
                }
            };

            Ok(CancelOutcome::Cancelled { order, refund })
        })?;

        Ok(outcome)
    }

    async fn expire_overdue(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let pending = OrderStatus::Pending.to_string();

        let expired = conn.transaction::<Vec<OrderEntity>, diesel::result::Error, _>(|tx| {
            let overdue_ids: Vec<Uuid> = orders::table
                .select(orders::id)
                .filter(orders::status.eq(&pending))
                .filter(orders::accept_deadline.le(now))
                .order(orders::accept_deadline.asc())
                .limit(limit)
                .for_update()
                .skip_locked()
                .load::<Uuid>(tx)?;

            if overdue_ids.is_empty() {
                return Ok(Vec::new());
            }

            diesel::update(
                orders::table
                    .filter(orders::id.eq_any(overdue_ids))
                    .filter(orders::status.eq(&pending)),
            )
            .set((
                orders::status.eq(OrderStatus::Cancelled.to_string()),
                orders::cancellation_reason.eq(Some(EXPIRED_CANCELLATION_REASON.to_string())),
                orders::cancelled_at.eq(Some(now)),
                orders::updated_at.eq(now),
            ))
            .returning(OrderEntity::as_returning())
            .get_results::<OrderEntity>(tx)
        })?;

        Ok(expired)
    }

    async fn driver_statistics(
        &self,
        driver_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<DriverOrderCounts> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let since = since.unwrap_or(DateTime::UNIX_EPOCH);
        let completed = OrderStatus::Completed.to_string();

        let total_orders = orders::table
            .filter(orders::driver_id.eq(driver_id))
            .filter(orders::created_at.ge(since))
            .count()
            .get_result::<i64>(&mut conn)?;

        let completed_orders = orders::table
            .filter(orders::driver_id.eq(driver_id))
            .filter(orders::created_at.ge(since))
            .filter(orders::status.eq(&completed))
            .count()
            .get_result::<i64>(&mut conn)?;

        let total_earnings = orders::table
            .filter(orders::driver_id.eq(driver_id))
            .filter(orders::created_at.ge(since))
            .filter(orders::status.eq(&completed))
            .select(sum(orders::service_fee))
            .first::<Option<BigDecimal>>(&mut conn)?
            .unwrap_or_else(BigDecimal::zero);

        Ok(DriverOrderCounts {
            total_orders,
            completed_orders,
            total_earnings,
        })
    }
}
