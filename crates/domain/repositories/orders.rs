use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::orders::{InsertOrderEntity, OrderEntity},
    value_objects::{
        order_transitions::{AcceptOutcome, CancelOutcome, OrderTransition, TransitionGuard},
        orders::{DriverOrdersFilter, MyOrdersFilter, NewOrdersFilter, OrderVisibility},
        statistics::DriverOrderCounts,
    },
};

#[async_trait]
#[automock]
pub trait OrderRepository {
    async fn create(&self, order: InsertOrderEntity) -> Result<OrderEntity>;

    async fn find_by_id(
        &self,
        order_id: Uuid,
        visibility: OrderVisibility,
    ) -> Result<Option<OrderEntity>>;

    /// Pending orders still open at `now`, newest first.
    async fn find_new(&self, filter: NewOrdersFilter, now: DateTime<Utc>)
    -> Result<Vec<OrderEntity>>;

    async fn find_mine(&self, user_id: Uuid, filter: MyOrdersFilter) -> Result<Vec<OrderEntity>>;

    async fn find_for_driver(
        &self,
        driver_id: Uuid,
        filter: DriverOrdersFilter,
    ) -> Result<Vec<OrderEntity>>;

    /// Single conditional update. Returns the number of rows changed (0 or 1).
    async fn conditional_transition(
        &self,
        order_id: Uuid,
        guard: TransitionGuard,
        transition: OrderTransition,
    ) -> Result<usize>;

    /// Assigns the order and debits its service fee from the driver in one transaction.
    async fn accept_with_debit(
        &self,
        order_id: Uuid,
        driver_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<AcceptOutcome>;

    /// Cancels an owned order and, when a driver was assigned, refunds the fee.
    async fn cancel_with_refund(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<CancelOutcome>;

    async fn expire_overdue(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<OrderEntity>>;

    async fn driver_statistics(
        &self,
        driver_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<DriverOrderCounts>;
}
