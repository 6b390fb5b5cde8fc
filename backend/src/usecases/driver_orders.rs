use std::sync::Arc;

use chrono::Utc;
use crates::domain::{
    entities::{drivers::DriverEntity, orders::OrderEntity},
    repositories::{
        drivers::DriverRepository, notifications::NotificationSink, orders::OrderRepository,
    },
    value_objects::{
        enums::{notification_kinds::NotificationKind, order_statuses::OrderStatus},
        iam::Actor,
        notifications::OrderNotification,
        order_transitions::{AcceptOutcome, OrderTransition, TransitionGuard},
        orders::{DriverOrdersFilter, NewOrdersFilter, OrderModel, OrderVisibility},
        statistics::{DriverStatisticsModel, StatisticsQuery},
    },
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::usecases::{
    DRIVER_ROLES,
    orders::{OrderError, UseCaseResult},
};

/// Driver side of the order lifecycle: browse, accept, complete, history and statistics.
pub struct DriverOrderUseCase<O, D>
where
    O: OrderRepository + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
{
    order_repository: Arc<O>,
    driver_repository: Arc<D>,
    notification_sink: Arc<dyn NotificationSink>,
}

impl<O, D> DriverOrderUseCase<O, D>
where
    O: OrderRepository + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
{
    pub fn new(
        order_repository: Arc<O>,
        driver_repository: Arc<D>,
        notification_sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            order_repository,
            driver_repository,
            notification_sink,
        }
    }

    pub async fn list_new_orders(
        &self,
        actor: Actor,
        filter: NewOrdersFilter,
    ) -> UseCaseResult<Vec<OrderModel>> {
        ensure_driver_role(&actor)?;

        let orders = self
            .order_repository
            .find_new(filter, Utc::now())
            .await
            .map_err(|err| {
                error!(db_error = ?err, "driver_orders: failed to list new orders");
                err
            })?;

        debug!(count = orders.len(), "driver_orders: new orders listed");
        to_models(orders)
    }

    /// Preconditions are checked in a fixed order and the first failure is returned.
    /// The final word belongs to the conditional update inside `accept_with_debit`.
    pub async fn accept_order(&self, actor: Actor, order_id: Uuid) -> UseCaseResult<OrderModel> {
        ensure_driver_role(&actor)?;
        info!(user_id = %actor.user_id, %order_id, "driver_orders: accept requested");

        let driver = self.driver_profile(&actor).await?;
        if !driver.is_active {
            let err = OrderError::DriverInactive;
            warn!(
                driver_id = %driver.id,
                status = err.status_code().as_u16(),
                "driver_orders: inactive driver tried to accept"
            );
            return Err(err);
        }

        let order = self
            .order_repository
            .find_by_id(order_id, OrderVisibility::Any)
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "driver_orders: failed to load order");
                err
            })?
            .ok_or(OrderError::OrderNotFound)?;

        if order.status.parse::<OrderStatus>()? != OrderStatus::Pending {
            warn!(%order_id, order_status = order.status, "driver_orders: order not available");
            return Err(OrderError::OrderNotAvailable);
        }

        let now = Utc::now();
        if order.accept_deadline.is_some_and(|deadline| deadline <= now) {
            warn!(%order_id, "driver_orders: accept deadline passed");
            return Err(OrderError::AcceptDeadlineExpired);
        }

        if driver.balance < order.service_fee {
            warn!(
                driver_id = %driver.id,
                balance = %driver.balance,
                service_fee = %order.service_fee,
                "driver_orders: insufficient balance"
            );
            return Err(OrderError::InsufficientBalance);
        }

        let outcome = self
            .order_repository
            .accept_with_debit(order_id, driver.id, now)
            .await
            .map_err(|err| {
                error!(%order_id, driver_id = %driver.id, db_error = ?err, "driver_orders: accept transaction failed");
                err
            })?;

        let accepted = match outcome {
            AcceptOutcome::Accepted { order, debit } => {
                info!(
                    %order_id,
                    driver_id = %driver.id,
                    debit = %debit.amount,
                    "driver_orders: order accepted"
                );
                order
            }
            AcceptOutcome::AlreadyProcessed => {
                let err = OrderError::OrderAlreadyProcessed;
                warn!(
                    %order_id,
                    driver_id = %driver.id,
                    status = err.status_code().as_u16(),
                    "driver_orders: lost the accept race"
                );
                return Err(err);
            }
            AcceptOutcome::InsufficientBalance => {
                warn!(%order_id, driver_id = %driver.id, "driver_orders: balance dropped before debit");
                return Err(OrderError::InsufficientBalance);
            }
        };

        let model = OrderModel::try_from(accepted)?;
        self.notify_customer(&model, NotificationKind::OrderAccepted);
        Ok(model)
    }

    pub async fn complete_order(&self, actor: Actor, order_id: Uuid) -> UseCaseResult<OrderModel> {
        ensure_driver_role(&actor)?;
        let driver = self.driver_profile(&actor).await?;

        let transition = OrderTransition::Complete { at: Utc::now() };
        let guard = TransitionGuard::for_transition(&transition).assigned_to(driver.id);

        let updated = self
            .order_repository
            .conditional_transition(order_id, guard, transition)
            .await
            .map_err(|err| {
                error!(%order_id, driver_id = %driver.id, db_error = ?err, "driver_orders: complete update failed");
                err
            })?;

        if updated == 0 {
            warn!(%order_id, driver_id = %driver.id, "driver_orders: order not completable by driver");
            return Err(OrderError::OrderNotFoundOrNotYours);
        }

        let order = self
            .order_repository
            .find_by_id(order_id, OrderVisibility::Any)
            .await?
            .ok_or(OrderError::OrderNotFound)?;
        let model = OrderModel::try_from(order)?;

        info!(%order_id, driver_id = %driver.id, "driver_orders: order completed");
        self.notify_customer(&model, NotificationKind::OrderCompleted);
        Ok(model)
    }

    pub async fn list_driver_orders(
        &self,
        actor: Actor,
        filter: DriverOrdersFilter,
    ) -> UseCaseResult<Vec<OrderModel>> {
        ensure_driver_role(&actor)?;
        let driver = self.driver_profile(&actor).await?;

        let orders = self
            .order_repository
            .find_for_driver(driver.id, filter)
            .await
            .map_err(|err| {
                error!(driver_id = %driver.id, db_error = ?err, "driver_orders: failed to list driver orders");
                err
            })?;

        to_models(orders)
    }

    pub async fn statistics(
        &self,
        actor: Actor,
        query: StatisticsQuery,
    ) -> UseCaseResult<DriverStatisticsModel> {
        ensure_driver_role(&actor)?;
        let driver = self.driver_profile(&actor).await?;

        let counts = self
            .order_repository
            .driver_statistics(driver.id, query.period.since(Utc::now()))
            .await
            .map_err(|err| {
                error!(driver_id = %driver.id, db_error = ?err, "driver_orders: failed to compute statistics");
                err
            })?;

        Ok(DriverStatisticsModel {
            period: query.period,
            total_orders: counts.total_orders,
            completed_orders: counts.completed_orders,
            total_earnings: counts.total_earnings,
            current_balance: driver.balance,
            average_rating: driver.rating,
            total_ratings: driver.total_ratings,
        })
    }

    async fn driver_profile(&self, actor: &Actor) -> UseCaseResult<DriverEntity> {
        self.driver_repository
            .find_by_user_id(actor.user_id)
            .await
            .map_err(|err| {
                error!(user_id = %actor.user_id, db_error = ?err, "driver_orders: failed to load driver profile");
                err
            })?
            .ok_or_else(|| {
                warn!(user_id = %actor.user_id, "driver_orders: driver profile not found");
                OrderError::DriverNotFound
            })
    }

    fn notify_customer(&self, order: &OrderModel, kind: NotificationKind) {
        self.notification_sink.notify(OrderNotification::new(
            order.user_id,
            kind,
            order.id,
            order.order_type,
        ));
    }
}

fn ensure_driver_role(actor: &Actor) -> UseCaseResult<()> {
    if actor.has_any_role(&DRIVER_ROLES) {
        return Ok(());
    }
    warn!(user_id = %actor.user_id, role = %actor.role, "driver_orders: role not allowed");
    Err(OrderError::Forbidden)
}

fn to_models(orders: Vec<OrderEntity>) -> UseCaseResult<Vec<OrderModel>> {
    Ok(orders
        .into_iter()
        .map(OrderModel::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::{
        InMemoryMarketplace, RecordingSink, accepted_order, dec, driver, pending_order,
        with_status,
    };
    use chrono::Duration;
    use crates::domain::{
        repositories::{drivers::MockDriverRepository, orders::MockOrderRepository},
        value_objects::{
            enums::{
                driver_statuses::DriverStatus, statistics_periods::StatisticsPeriod,
                user_roles::UserRole,
            },
            statistics::DriverOrderCounts,
        },
    };
    use mockall::predicate::eq;

    struct Fixture {
        marketplace: Arc<InMemoryMarketplace>,
        sink: Arc<RecordingSink>,
        usecase: Arc<DriverOrderUseCase<InMemoryMarketplace, InMemoryMarketplace>>,
    }

    fn fixture() -> Fixture {
        let marketplace = InMemoryMarketplace::new();
        let sink = Arc::new(RecordingSink::default());
        let usecase = Arc::new(DriverOrderUseCase::new(
            Arc::clone(&marketplace),
            Arc::clone(&marketplace),
            Arc::clone(&sink) as Arc<dyn NotificationSink>,
        ));
        Fixture {
            marketplace,
            sink,
            usecase,
        }
    }

    fn driver_actor(user_id: Uuid) -> Actor {
        Actor::new(user_id, UserRole::Driver)
    }

    #[tokio::test]
    async fn accepting_with_too_little_balance_changes_nothing() {
        let f = fixture();
        let profile = driver(Uuid::new_v4(), "20000");
        let order = pending_order(Uuid::new_v4());
        let order_id = order.id;
        f.marketplace.insert_driver(profile.clone());
        f.marketplace.insert_order(order);

        let err = f
            .usecase
            .accept_order(driver_actor(profile.user_id), order_id)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::InsufficientBalance));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(f.marketplace.balance(profile.id), dec("20000"));
        assert!(f.marketplace.transactions_for(profile.id).is_empty());
        assert_eq!(
            f.marketplace.order(order_id).status,
            OrderStatus::Pending.to_string()
        );
    }

    #[tokio::test]
    async fn accepting_debits_the_service_fee_once() {
        let f = fixture();
        let profile = driver(Uuid::new_v4(), "30000");
        let order = pending_order(Uuid::new_v4());
        let customer_id = order.user_id;
        let order_id = order.id;
        f.marketplace.insert_driver(profile.clone());
        f.marketplace.insert_order(order);

        let accepted = f
            .usecase
            .accept_order(driver_actor(profile.user_id), order_id)
            .await
            .unwrap();

        assert_eq!(accepted.status, OrderStatus::Accepted);
        assert_eq!(accepted.driver_id, Some(profile.id));
        assert!(accepted.accepted_at.is_some());
        assert!(accepted.accept_deadline.is_none());
        assert_eq!(f.marketplace.balance(profile.id), dec("7050"));

        let ledger = f.marketplace.transactions_for(profile.id);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].amount, dec("-22950"));
        assert_eq!(ledger[0].type_, "debit");
        assert_eq!(ledger[0].order_id, Some(order_id));

        let sent = f.sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient_user_id, customer_id);
        assert_eq!(sent[0].kind, NotificationKind::OrderAccepted);
    }

    async fn race_for_one_order(f: &Fixture) -> (usize, usize) {
        let order = pending_order(Uuid::new_v4());
        let order_id = order.id;
        f.marketplace.insert_order(order);

        let drivers: Vec<DriverEntity> = (0..8)
            .map(|_| driver(Uuid::new_v4(), "100000"))
            .collect();
        for profile in &drivers {
            f.marketplace.insert_driver(profile.clone());
        }

        let handles: Vec<_> = drivers
            .iter()
            .map(|profile| {
                let usecase = Arc::clone(&f.usecase);
                let actor = driver_actor(profile.user_id);
                tokio::spawn(async move { usecase.accept_order(actor, order_id).await })
            })
            .collect();

        let mut winners = 0;
        let mut already_processed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(OrderError::OrderAlreadyProcessed) => already_processed += 1,
                Err(err) => assert!(
                    matches!(err, OrderError::OrderNotAvailable),
                    "unexpected accept error: {err:?}"
                ),
            }
        }

        let winner_id = f.marketplace.order(order_id).driver_id.unwrap();
        let total_debited = drivers.iter().fold(dec("0"), |sum, profile| {
            sum + (dec("100000") - f.marketplace.balance(profile.id))
        });
        assert_eq!(total_debited, dec("22950"));
        for profile in &drivers {
            let expected = if profile.id == winner_id { 1 } else { 0 };
            assert_eq!(f.marketplace.transactions_for(profile.id).len(), expected);
            assert_eq!(
                f.marketplace.balance(profile.id),
                f.marketplace.ledger_sum(profile.id) + dec("100000")
            );
        }
        assert_eq!(f.sink.sent().len(), 1);

        (winners, already_processed)
    }

    #[tokio::test]
    async fn concurrent_accepts_lose_at_the_conditional_update() {
        let f = fixture();

        let (winners, already_processed) = race_for_one_order(&f).await;

        // Every driver reads the order as pending; only the guarded write decides.
        assert_eq!(winners, 1);
        assert_eq!(already_processed, 7);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_accepts_on_many_threads_have_one_winner() {
        let f = fixture();

        let (winners, _) = race_for_one_order(&f).await;

        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn losing_the_accept_race_is_a_conflict_without_side_effects() {
        let user_id = Uuid::new_v4();
        let profile = driver(user_id, "30000");
        let driver_id = profile.id;
        let order = pending_order(Uuid::new_v4());
        let order_id = order.id;

        let mut driver_repo = MockDriverRepository::new();
        driver_repo
            .expect_find_by_user_id()
            .with(eq(user_id))
            .returning(move |_| {
                let profile = profile.clone();
                Box::pin(async move { Ok(Some(profile)) })
            });
        driver_repo.expect_apply_entry().never();

        let mut order_repo = MockOrderRepository::new();
        order_repo
            .expect_find_by_id()
            .with(eq(order_id), eq(OrderVisibility::Any))
            .returning(move |_, _| {
                let order = order.clone();
                Box::pin(async move { Ok(Some(order)) })
            });
        order_repo
            .expect_accept_with_debit()
            .withf(move |id, driver, _| *id == order_id && *driver == driver_id)
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(AcceptOutcome::AlreadyProcessed) }));

        let sink = Arc::new(RecordingSink::default());
        let usecase = DriverOrderUseCase::new(
            Arc::new(order_repo),
            Arc::new(driver_repo),
            Arc::clone(&sink) as Arc<dyn NotificationSink>,
        );

        let err = usecase
            .accept_order(driver_actor(user_id), order_id)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::OrderAlreadyProcessed));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn active_applicant_awaiting_approval_can_accept() {
        let f = fixture();
        let profile = DriverEntity {
            status: DriverStatus::Pending.to_string(),
            ..driver(Uuid::new_v4(), "30000")
        };
        let order = pending_order(Uuid::new_v4());
        let order_id = order.id;
        f.marketplace.insert_driver(profile.clone());
        f.marketplace.insert_order(order);

        let accepted = f
            .usecase
            .accept_order(driver_actor(profile.user_id), order_id)
            .await
            .unwrap();

        assert_eq!(accepted.driver_id, Some(profile.id));
        assert_eq!(f.marketplace.balance(profile.id), dec("7050"));
    }

    #[tokio::test]
    async fn expired_orders_cannot_be_accepted() {
        let f = fixture();
        let profile = driver(Uuid::new_v4(), "30000");
        let mut order = pending_order(Uuid::new_v4());
        order.accept_deadline = Some(Utc::now() - Duration::seconds(1));
        let order_id = order.id;
        f.marketplace.insert_driver(profile.clone());
        f.marketplace.insert_order(order);

        let err = f
            .usecase
            .accept_order(driver_actor(profile.user_id), order_id)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::AcceptDeadlineExpired));
        assert_eq!(f.marketplace.balance(profile.id), dec("30000"));
    }

    #[tokio::test]
    async fn expired_orders_are_hidden_from_the_new_list() {
        let f = fixture();
        let open = pending_order(Uuid::new_v4());
        let mut expired = pending_order(Uuid::new_v4());
        expired.accept_deadline = Some(Utc::now() - Duration::seconds(1));
        f.marketplace.insert_order(open.clone());
        f.marketplace.insert_order(expired);

        let listed = f
            .usecase
            .list_new_orders(driver_actor(Uuid::new_v4()), NewOrdersFilter::default())
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, open.id);
    }

    #[tokio::test]
    async fn preconditions_fail_in_documented_order() {
        let f = fixture();
        let missing_order = Uuid::new_v4();

        // No profile yet.
        let user_id = Uuid::new_v4();
        let err = f
            .usecase
            .accept_order(driver_actor(user_id), missing_order)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::DriverNotFound));

        // Inactive profile wins over a missing order.
        let mut inactive = driver(user_id, "0");
        inactive.is_active = false;
        f.marketplace.insert_driver(inactive.clone());
        let err = f
            .usecase
            .accept_order(driver_actor(user_id), missing_order)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::DriverInactive));
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);

        // Active, but the order does not exist.
        f.marketplace.insert_driver(DriverEntity {
            is_active: true,
            ..inactive
        });
        let err = f
            .usecase
            .accept_order(driver_actor(user_id), missing_order)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderNotFound));

        // Not pending beats an expired deadline and an empty balance.
        let mut taken = with_status(pending_order(Uuid::new_v4()), OrderStatus::Cancelled);
        taken.accept_deadline = Some(Utc::now() - Duration::minutes(1));
        let taken_id = taken.id;
        f.marketplace.insert_order(taken);
        let err = f
            .usecase
            .accept_order(driver_actor(user_id), taken_id)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderNotAvailable));
    }

    #[tokio::test]
    async fn plain_customers_are_forbidden_on_driver_routes() {
        let mut order_repo = MockOrderRepository::new();
        order_repo.expect_find_new().never();
        let usecase = DriverOrderUseCase::new(
            Arc::new(order_repo),
            Arc::new(MockDriverRepository::new()),
            Arc::new(RecordingSink::default()),
        );

        let err = usecase
            .list_new_orders(
                Actor::new(Uuid::new_v4(), UserRole::User),
                NewOrdersFilter::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Forbidden));
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn only_the_assigned_driver_completes() {
        let f = fixture();
        let assigned = driver(Uuid::new_v4(), "0");
        let intruder = driver(Uuid::new_v4(), "0");
        let order = accepted_order(Uuid::new_v4(), assigned.id);
        let order_id = order.id;
        f.marketplace.insert_driver(assigned.clone());
        f.marketplace.insert_driver(intruder.clone());
        f.marketplace.insert_order(order);

        let err = f
            .usecase
            .complete_order(driver_actor(intruder.user_id), order_id)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderNotFoundOrNotYours));

        let completed = f
            .usecase
            .complete_order(driver_actor(assigned.user_id), order_id)
            .await
            .unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);
        assert!(completed.completed_at.is_some());
        assert!(f.marketplace.transactions_for(assigned.id).is_empty());
        assert_eq!(f.sink.sent()[0].kind, NotificationKind::OrderCompleted);
    }

    #[tokio::test]
    async fn terminal_orders_never_change_again() {
        let f = fixture();
        let assigned = driver(Uuid::new_v4(), "50000");
        let cancelled = with_status(
            accepted_order(Uuid::new_v4(), assigned.id),
            OrderStatus::Cancelled,
        );
        let order_id = cancelled.id;
        f.marketplace.insert_driver(assigned.clone());
        f.marketplace.insert_order(cancelled.clone());

        let err = f
            .usecase
            .complete_order(driver_actor(assigned.user_id), order_id)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderNotFoundOrNotYours));

        let err = f
            .usecase
            .accept_order(driver_actor(assigned.user_id), order_id)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderNotAvailable));

        assert_eq!(f.marketplace.order(order_id), cancelled);
        assert_eq!(f.marketplace.balance(assigned.id), dec("50000"));
    }

    #[tokio::test]
    async fn statistics_combine_counts_with_the_profile() {
        let user_id = Uuid::new_v4();
        let profile = driver(user_id, "7050");
        let driver_id = profile.id;

        let mut driver_repo = MockDriverRepository::new();
        driver_repo
            .expect_find_by_user_id()
            .with(eq(user_id))
            .returning(move |_| {
                let profile = profile.clone();
                Box::pin(async move { Ok(Some(profile)) })
            });
        let mut order_repo = MockOrderRepository::new();
        order_repo
            .expect_driver_statistics()
            .withf(move |id, since| *id == driver_id && since.is_none())
            .returning(|_, _| {
                Box::pin(async {
                    Ok(DriverOrderCounts {
                        total_orders: 3,
                        completed_orders: 2,
                        total_earnings: dec("45900"),
                    })
                })
            });

        let usecase = DriverOrderUseCase::new(
            Arc::new(order_repo),
            Arc::new(driver_repo),
            Arc::new(RecordingSink::default()),
        );
        let stats = usecase
            .statistics(
                driver_actor(user_id),
                StatisticsQuery {
                    period: StatisticsPeriod::All,
                },
            )
            .await
            .unwrap();

        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.completed_orders, 2);
        assert_eq!(stats.total_earnings, dec("45900"));
        assert_eq!(stats.current_balance, dec("7050"));
        assert_eq!(stats.total_ratings, 0);
    }
}
