//! Fixtures and an in-memory marketplace used by the use case tests.

use std::{
    collections::HashMap,
    str::FromStr,
    sync::{Arc, Mutex},
};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use crates::domain::{
    entities::{
        discounts::DiscountEntity,
        drivers::DriverEntity,
        orders::{InsertOrderEntity, OrderEntity},
        pricing::PricingEntity,
        transactions::TransactionEntity,
    },
    repositories::{
        drivers::DriverRepository, notifications::NotificationSink, orders::OrderRepository,
    },
    value_objects::{
        enums::{
            driver_statuses::DriverStatus, order_statuses::OrderStatus, order_types::OrderType,
        },
        ledger::{LedgerDrift, LedgerEntry},
        notifications::OrderNotification,
        order_transitions::{
            AcceptOutcome, CancelOutcome, EXPIRED_CANCELLATION_REASON, OrderTransition,
            RefundOutcome, TransitionGuard,
        },
        orders::{DriverOrdersFilter, MyOrdersFilter, NewOrdersFilter, OrderVisibility},
        statistics::DriverOrderCounts,
    },
};
use uuid::Uuid;

pub fn dec(raw: &str) -> BigDecimal {
    BigDecimal::from_str(raw).unwrap()
}

/// Tashkent to Samarkand: 160000 base, 5000 per person, 15 % service fee.
pub fn tariff(from_region_id: i64, to_region_id: i64) -> PricingEntity {
    let now = Utc::now();
    PricingEntity {
        id: Uuid::new_v4(),
        from_region_id,
        to_region_id,
        base_price: dec("160000"),
        price_per_person: dec("5000"),
        service_fee: dec("15"),
        created_at: now,
        updated_at: now,
    }
}

pub fn discount(passenger_count: i32, percentage: &str) -> DiscountEntity {
    let now = Utc::now();
    DiscountEntity {
        id: Uuid::new_v4(),
        passenger_count,
        discount_percentage: dec(percentage),
        created_at: now,
        updated_at: now,
    }
}

pub fn driver(user_id: Uuid, balance: &str) -> DriverEntity {
    let now = Utc::now();
    DriverEntity {
        id: Uuid::new_v4(),
        user_id,
        full_name: "Bekzod Karimov".to_string(),
        car_model: "Chevrolet Cobalt".to_string(),
        car_number: "01A123BC".to_string(),
        license_image: None,
        balance: dec(balance),
        rating: BigDecimal::zero(),
        total_ratings: 0,
        status: DriverStatus::Approved.to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Pending taxi order, two passengers, 10 % discount, open for five more minutes.
pub fn pending_order(user_id: Uuid) -> OrderEntity {
    let now = Utc::now();
    OrderEntity {
        id: Uuid::new_v4(),
        user_id,
        driver_id: None,
        order_type: OrderType::Taxi.to_string(),
        status: OrderStatus::Pending.to_string(),
        customer_name: "Aziz".to_string(),
        customer_phone: "+998901234567".to_string(),
        recipient_phone: None,
        from_region_id: 1,
        from_district_id: 11,
        from_latitude: None,
        from_longitude: None,
        from_address: None,
        to_region_id: 2,
        to_district_id: 21,
        to_latitude: None,
        to_longitude: None,
        to_address: None,
        passenger_count: Some(2),
        delivery_type: None,
        scheduled_date: NaiveDate::from_ymd_opt(2026, 12, 25).unwrap(),
        time_range_start: "08:00".to_string(),
        time_range_end: "10:00".to_string(),
        price: dec("170000"),
        service_fee: dec("22950"),
        discount_percentage: dec("10"),
        final_price: dec("175950"),
        notes: None,
        cancellation_reason: None,
        accepted_at: None,
        accept_deadline: Some(now + Duration::minutes(5)),
        completed_at: None,
        cancelled_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn accepted_order(user_id: Uuid, driver_id: Uuid) -> OrderEntity {
    let now = Utc::now();
    OrderEntity {
        driver_id: Some(driver_id),
        status: OrderStatus::Accepted.to_string(),
        accepted_at: Some(now),
        accept_deadline: None,
        ..pending_order(user_id)
    }
}

pub fn with_status(order: OrderEntity, status: OrderStatus) -> OrderEntity {
    OrderEntity {
        status: status.to_string(),
        ..order
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<OrderNotification>>,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<OrderNotification> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: OrderNotification) {
        self.sent.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
struct MarketplaceState {
    orders: HashMap<Uuid, OrderEntity>,
    drivers: HashMap<Uuid, DriverEntity>,
    transactions: Vec<TransactionEntity>,
    fail_refunds: bool,
}

/// Single-lock stand-in for Postgres: every repository call is atomic, the same way
/// one SQL statement or one database transaction is.
#[derive(Default)]
pub struct InMemoryMarketplace {
    state: Mutex<MarketplaceState>,
}

impl InMemoryMarketplace {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert_driver(&self, driver: DriverEntity) {
        self.state.lock().unwrap().drivers.insert(driver.id, driver);
    }

    pub fn insert_order(&self, order: OrderEntity) {
        self.state.lock().unwrap().orders.insert(order.id, order);
    }

    pub fn order(&self, order_id: Uuid) -> OrderEntity {
        self.state.lock().unwrap().orders[&order_id].clone()
    }

    pub fn balance(&self, driver_id: Uuid) -> BigDecimal {
        self.state.lock().unwrap().drivers[&driver_id].balance.clone()
    }

    pub fn transactions_for(&self, driver_id: Uuid) -> Vec<TransactionEntity> {
        self.state
            .lock()
            .unwrap()
            .transactions
            .iter()
            .filter(|transaction| transaction.driver_id == driver_id)
            .cloned()
            .collect()
    }

    pub fn ledger_sum(&self, driver_id: Uuid) -> BigDecimal {
        self.transactions_for(driver_id)
            .iter()
            .fold(BigDecimal::zero(), |sum, transaction| sum + &transaction.amount)
    }

    pub fn fail_refunds(&self) {
        self.state.lock().unwrap().fail_refunds = true;
    }
}

fn apply_entry_locked(
    state: &mut MarketplaceState,
    entry: &LedgerEntry,
    now: DateTime<Utc>,
) -> Option<TransactionEntity> {
    let driver = state.drivers.get_mut(&entry.driver_id)?;
    if entry.kind.is_debit() && driver.balance < entry.amount {
        return None;
    }
    driver.balance = &driver.balance + entry.signed_amount();
    driver.updated_at = now;

    let row = entry.to_entity(now);
    let transaction = TransactionEntity {
        id: Uuid::new_v4(),
        driver_id: row.driver_id,
        order_id: row.order_id,
        amount: row.amount,
        type_: row.type_,
        description: row.description,
        created_by: row.created_by,
        created_at: row.created_at,
    };
    state.transactions.push(transaction.clone());
    Some(transaction)
}

fn transition_locked(
    state: &mut MarketplaceState,
    order_id: Uuid,
    guard: &TransitionGuard,
    transition: &OrderTransition,
) -> Option<OrderEntity> {
    let order = state.orders.get_mut(&order_id)?;
    if !guard.matches(order) {
        return None;
    }

    order.status = transition.target_status().to_string();
    order.updated_at = transition.at();
    match transition {
        OrderTransition::Accept { driver_id, at } => {
            order.driver_id = Some(*driver_id);
            order.accepted_at = Some(*at);
            order.accept_deadline = None;
        }
        OrderTransition::Complete { at } => order.completed_at = Some(*at),
        OrderTransition::Cancel { reason, at } => {
            order.cancellation_reason = Some(reason.clone());
            order.cancelled_at = Some(*at);
        }
    }
    Some(order.clone())
}

fn newest_first(mut orders: Vec<OrderEntity>) -> Vec<OrderEntity> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}

#[async_trait]
impl OrderRepository for InMemoryMarketplace {
    async fn create(&self, order: InsertOrderEntity) -> Result<OrderEntity> {
        let entity = OrderEntity {
            id: Uuid::new_v4(),
            user_id: order.user_id,
            driver_id: None,
            order_type: order.order_type,
            status: order.status,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            recipient_phone: order.recipient_phone,
            from_region_id: order.from_region_id,
            from_district_id: order.from_district_id,
            from_latitude: order.from_latitude,
            from_longitude: order.from_longitude,
            from_address: order.from_address,
            to_region_id: order.to_region_id,
            to_district_id: order.to_district_id,
            to_latitude: order.to_latitude,
            to_longitude: order.to_longitude,
            to_address: order.to_address,
            passenger_count: order.passenger_count,
            delivery_type: order.delivery_type,
            scheduled_date: order.scheduled_date,
            time_range_start: order.time_range_start,
            time_range_end: order.time_range_end,
            price: order.price,
            service_fee: order.service_fee,
            discount_percentage: order.discount_percentage,
            final_price: order.final_price,
            notes: order.notes,
            cancellation_reason: None,
            accepted_at: None,
            accept_deadline: order.accept_deadline,
            completed_at: None,
            cancelled_at: None,
            created_at: order.created_at,
            updated_at: order.updated_at,
        };
        self.insert_order(entity.clone());
        Ok(entity)
    }

    async fn find_by_id(
        &self,
        order_id: Uuid,
        visibility: OrderVisibility,
    ) -> Result<Option<OrderEntity>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .get(&order_id)
            .filter(|order| match visibility {
                OrderVisibility::Any => true,
                OrderVisibility::Owner(user_id) => order.user_id == user_id,
            })
            .cloned())
    }

    async fn find_new(
        &self,
        filter: NewOrdersFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<OrderEntity>> {
        let state = self.state.lock().unwrap();
        let open = TransitionGuard {
            expected_statuses: vec![OrderStatus::Pending],
            open_at: Some(now),
            ..Default::default()
        };
        Ok(newest_first(
            state
                .orders
                .values()
                .filter(|order| open.matches(order))
                .filter(|order| {
                    filter
                        .order_type
                        .is_none_or(|order_type| order.order_type == order_type.to_string())
                })
                .filter(|order| filter.from_region_id.is_none_or(|id| order.from_region_id == id))
                .filter(|order| filter.to_region_id.is_none_or(|id| order.to_region_id == id))
                .cloned()
                .collect(),
        ))
    }

    async fn find_mine(&self, user_id: Uuid, filter: MyOrdersFilter) -> Result<Vec<OrderEntity>> {
        let state = self.state.lock().unwrap();
        Ok(newest_first(
            state
                .orders
                .values()
                .filter(|order| order.user_id == user_id)
                .filter(|order| filter.status.is_none_or(|status| order.status == status.to_string()))
                .filter(|order| {
                    filter
                        .order_type
                        .is_none_or(|order_type| order.order_type == order_type.to_string())
                })
                .cloned()
                .collect(),
        ))
    }

    async fn find_for_driver(
        &self,
        driver_id: Uuid,
        filter: DriverOrdersFilter,
    ) -> Result<Vec<OrderEntity>> {
        let state = self.state.lock().unwrap();
        Ok(newest_first(
            state
                .orders
                .values()
                .filter(|order| order.driver_id == Some(driver_id))
                .filter(|order| filter.status.is_none_or(|status| order.status == status.to_string()))
                .cloned()
                .collect(),
        ))
    }

    async fn conditional_transition(
        &self,
        order_id: Uuid,
        guard: TransitionGuard,
        transition: OrderTransition,
    ) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        Ok(usize::from(
            transition_locked(&mut state, order_id, &guard, &transition).is_some(),
        ))
    }

    async fn accept_with_debit(
        &self,
        order_id: Uuid,
        driver_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<AcceptOutcome> {
        // Let competing accepts finish their reads before anyone writes.
        tokio::task::yield_now().await;

        let mut state = self.state.lock().unwrap();
        let snapshot = state.orders.get(&order_id).cloned();

        let transition = OrderTransition::Accept { driver_id, at: now };
        let guard = TransitionGuard::for_transition(&transition).open_at(now);
        let Some(order) = transition_locked(&mut state, order_id, &guard, &transition) else {
            return Ok(AcceptOutcome::AlreadyProcessed);
        };

        let entry = LedgerEntry::order_debit(driver_id, order.id, &order.service_fee);
        match apply_entry_locked(&mut state, &entry, now) {
            Some(debit) => Ok(AcceptOutcome::Accepted { order, debit }),
            None => {
                // Roll the order back, as the database transaction would.
                if let Some(snapshot) = snapshot {
                    state.orders.insert(order_id, snapshot);
                }
                Ok(AcceptOutcome::InsufficientBalance)
            }
        }
    }

    async fn cancel_with_refund(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<CancelOutcome> {
        let mut state = self.state.lock().unwrap();

        let transition = OrderTransition::Cancel { reason, at: now };
        let guard = TransitionGuard::for_transition(&transition).owned_by(user_id);
        let Some(order) = transition_locked(&mut state, order_id, &guard, &transition) else {
            return Ok(CancelOutcome::NotCancellable);
        };

        let refund = match order.driver_id {
            None => RefundOutcome::NotRequired,
            Some(driver_id) => {
                let entry = LedgerEntry::order_refund(driver_id, order.id, &order.service_fee);
                if state.fail_refunds {
                    RefundOutcome::Failed {
                        driver_id,
                        amount: entry.amount.clone(),
                        error: "connection reset".to_string(),
                    }
                } else {
                    match apply_entry_locked(&mut state, &entry, now) {
                        Some(transaction) => RefundOutcome::Credited(transaction),
                        None => RefundOutcome::Failed {
                            driver_id,
                            amount: entry.amount.clone(),
                            error: "driver not found".to_string(),
                        },
                    }
                }
            }
        };

        Ok(CancelOutcome::Cancelled { order, refund })
    }

    async fn expire_overdue(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<OrderEntity>> {
        let mut state = self.state.lock().unwrap();
        let overdue: Vec<Uuid> = state
            .orders
            .values()
            .filter(|order| order.status == OrderStatus::Pending.to_string())
            .filter(|order| order.accept_deadline.is_some_and(|deadline| deadline <= now))
            .map(|order| order.id)
            .take(usize::try_from(limit).unwrap_or(0))
            .collect();

        let transition = OrderTransition::Cancel {
            reason: EXPIRED_CANCELLATION_REASON.to_string(),
            at: now,
        };
        let guard = TransitionGuard::for_transition(&transition);
        Ok(overdue
            .into_iter()
            .filter_map(|order_id| transition_locked(&mut state, order_id, &guard, &transition))
            .collect())
    }

    async fn driver_statistics(
        &self,
        driver_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<DriverOrderCounts> {
        let state = self.state.lock().unwrap();
        let in_period: Vec<&OrderEntity> = state
            .orders
            .values()
            .filter(|order| order.driver_id == Some(driver_id))
            .filter(|order| since.is_none_or(|since| order.created_at >= since))
            .collect();
        let completed: Vec<&&OrderEntity> = in_period
            .iter()
            .filter(|order| order.status == OrderStatus::Completed.to_string())
            .collect();

        Ok(DriverOrderCounts {
            total_orders: in_period.len() as i64,
            completed_orders: completed.len() as i64,
            total_earnings: completed
                .iter()
                .fold(BigDecimal::zero(), |sum, order| sum + &order.service_fee),
        })
    }
}

#[async_trait]
impl DriverRepository for InMemoryMarketplace {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<DriverEntity>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .drivers
            .values()
            .find(|driver| driver.user_id == user_id)
            .cloned())
    }

    async fn find_by_id(&self, driver_id: Uuid) -> Result<Option<DriverEntity>> {
        Ok(self.state.lock().unwrap().drivers.get(&driver_id).cloned())
    }

    async fn list_notifiable_user_ids(&self) -> Result<Vec<Uuid>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .drivers
            .values()
            .filter(|driver| driver.is_active)
            .filter(|driver| DriverStatus::from_str(&driver.status) == DriverStatus::Approved)
            .map(|driver| driver.user_id)
            .collect())
    }

    async fn apply_entry(&self, entry: LedgerEntry) -> Result<TransactionEntity> {
        let mut state = self.state.lock().unwrap();
        apply_entry_locked(&mut state, &entry, Utc::now())
            .ok_or_else(|| anyhow!("ledger entry rejected for driver {}", entry.driver_id))
    }

    async fn list_transactions(&self, driver_id: Uuid) -> Result<Vec<TransactionEntity>> {
        let mut transactions = self.transactions_for(driver_id);
        transactions.reverse();
        Ok(transactions)
    }

    async fn find_ledger_drift(&self) -> Result<Vec<LedgerDrift>> {
        let drivers: Vec<DriverEntity> =
            self.state.lock().unwrap().drivers.values().cloned().collect();
        Ok(drivers
            .into_iter()
            .filter_map(|driver| {
                let ledger_total = self.ledger_sum(driver.id);
                (driver.balance != ledger_total).then_some(LedgerDrift {
                    driver_id: driver.id,
                    balance: driver.balance,
                    ledger_total,
                })
            })
            .collect())
    }
}
