use std::sync::Arc;

use chrono::{Duration, Utc};
use crates::domain::{
    entities::orders::InsertOrderEntity,
    repositories::{
        drivers::DriverRepository, notifications::NotificationSink, orders::OrderRepository,
        pricing::PricingRepository,
    },
    value_objects::{
        enums::{notification_kinds::NotificationKind, order_statuses::OrderStatus},
        iam::Actor,
        notifications::OrderNotification,
        order_transitions::{CancelOutcome, RefundOutcome},
        orders::{
            CancelOrderModel, CreateDeliveryOrderModel, CreateTaxiOrderModel, MyOrdersFilter,
            OrderModel, OrderValidationError, OrderVisibility,
        },
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::pricing::{FareCalculator, PricingError};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Validation(#[from] OrderValidationError),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error("Insufficient permissions")]
    Forbidden,
    #[error("Cancellation reason is required")]
    MissingReason,
    #[error("Order not found")]
    OrderNotFound,
    #[error("Driver profile not found")]
    DriverNotFound,
    #[error("Driver account is not active")]
    DriverInactive,
    #[error("Order is no longer available")]
    OrderNotAvailable,
    #[error("Order acceptance deadline has passed")]
    AcceptDeadlineExpired,
    #[error("Insufficient balance to accept order")]
    InsufficientBalance,
    #[error("Order was already accepted by another driver")]
    OrderAlreadyProcessed,
    #[error("Order not found or not assigned to you")]
    OrderNotFoundOrNotYours,
    #[error("Cannot cancel order in current status")]
    CannotCancel,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl OrderError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            OrderError::Pricing(err) => err.status_code(),
            OrderError::Forbidden | OrderError::DriverInactive => StatusCode::FORBIDDEN,
            OrderError::OrderNotFound | OrderError::DriverNotFound => StatusCode::NOT_FOUND,
            OrderError::OrderAlreadyProcessed => StatusCode::CONFLICT,
            OrderError::Validation(_)
            | OrderError::MissingReason
            | OrderError::OrderNotAvailable
            | OrderError::AcceptDeadlineExpired
            | OrderError::InsufficientBalance
            | OrderError::OrderNotFoundOrNotYours
            | OrderError::CannotCancel => StatusCode::BAD_REQUEST,
            OrderError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, OrderError>;

/// Customer side of the order lifecycle: create, read and cancel.
pub struct OrderUseCase<O, D, P>
where
    O: OrderRepository + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
    P: PricingRepository + Send + Sync + 'static,
{
    order_repository: Arc<O>,
    driver_repository: Arc<D>,
    fare_calculator: FareCalculator<P>,
    notification_sink: Arc<dyn NotificationSink>,
    accept_window: Duration,
}

impl<O, D, P> OrderUseCase<O, D, P>
where
    O: OrderRepository + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
    P: PricingRepository + Send + Sync + 'static,
{
    pub fn new(
        order_repository: Arc<O>,
        driver_repository: Arc<D>,
        pricing_repository: Arc<P>,
        notification_sink: Arc<dyn NotificationSink>,
        accept_window: Duration,
    ) -> Self {
        Self {
            order_repository,
            driver_repository,
            fare_calculator: FareCalculator::new(pricing_repository),
            notification_sink,
            accept_window,
        }
    }

    pub async fn create_taxi_order(
        &self,
        actor: Actor,
        model: CreateTaxiOrderModel,
    ) -> UseCaseResult<OrderModel> {
        info!(
            user_id = %actor.user_id,
            from_region_id = model.details.from_region_id,
            to_region_id = model.details.to_region_id,
            passenger_count = model.passenger_count,
            "orders: create taxi order requested"
        );

        let scheduled_date = model.validate().map_err(|err| {
            warn!(user_id = %actor.user_id, error = %err, "orders: invalid taxi order");
            err
        })?;

        let fare = self
            .fare_calculator
            .compute_taxi_fare(
                model.details.from_region_id,
                model.details.to_region_id,
                model.passenger_count,
            )
            .await?;

        let now = Utc::now();
        let entity = model.to_entity(
            actor.user_id,
            scheduled_date,
            &fare,
            now + self.accept_window,
            now,
        );

        self.insert_and_announce(actor, entity).await
    }

    pub async fn create_delivery_order(
        &self,
        actor: Actor,
        model: CreateDeliveryOrderModel,
    ) -> UseCaseResult<OrderModel> {
        info!(
            user_id = %actor.user_id,
            from_region_id = model.details.from_region_id,
            to_region_id = model.details.to_region_id,
            delivery_type = %model.delivery_type,
            "orders: create delivery order requested"
        );

        let scheduled_date = model.validate().map_err(|err| {
            warn!(user_id = %actor.user_id, error = %err, "orders: invalid delivery order");
            err
        })?;

        let fare = self
            .fare_calculator
            .compute_delivery_fare(model.details.from_region_id, model.details.to_region_id)
            .await?;

        let now = Utc::now();
        let entity = model.to_entity(
            actor.user_id,
            scheduled_date,
            &fare,
            now + self.accept_window,
            now,
        );

        self.insert_and_announce(actor, entity).await
    }

    pub async fn list_my_orders(
        &self,
        actor: Actor,
        filter: MyOrdersFilter,
    ) -> UseCaseResult<Vec<OrderModel>> {
        let orders = self
            .order_repository
            .find_mine(actor.user_id, filter)
            .await
            .map_err(|err| {
                error!(user_id = %actor.user_id, db_error = ?err, "orders: failed to list own orders");
                err
            })?;

        Ok(orders
            .into_iter()
            .map(OrderModel::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?)
    }

    pub async fn get_order(&self, actor: Actor, order_id: Uuid) -> UseCaseResult<OrderModel> {
        let order = self
            .order_repository
            .find_by_id(order_id, OrderVisibility::for_actor(&actor))
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "orders: failed to load order");
                err
            })?
            .ok_or(OrderError::OrderNotFound)?;

        Ok(OrderModel::try_from(order)?)
    }

    pub async fn cancel_order(
        &self,
        actor: Actor,
        order_id: Uuid,
        model: CancelOrderModel,
    ) -> UseCaseResult<OrderModel> {
        let reason = model.reason.trim().to_string();
        if reason.is_empty() {
            return Err(OrderError::MissingReason);
        }

        info!(user_id = %actor.user_id, %order_id, "orders: cancel requested");

        let order = self
            .order_repository
            .find_by_id(order_id, OrderVisibility::Owner(actor.user_id))
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "orders: failed to load order for cancel");
                err
            })?
            .ok_or(OrderError::OrderNotFound)?;

        let status = order.status.parse::<OrderStatus>()?;
        if !status.is_cancellable() {
            let err = OrderError::CannotCancel;
            warn!(
                %order_id,
                status = %status,
                http_status = err.status_code().as_u16(),
                "orders: order is not cancellable"
            );
            return Err(err);
        }

        let outcome = self
            .order_repository
            .cancel_with_refund(order_id, actor.user_id, reason, Utc::now())
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "orders: cancel transaction failed");
                err
            })?;

        let (cancelled, refund) = match outcome {
            CancelOutcome::Cancelled { order, refund } => (order, refund),
            CancelOutcome::NotCancellable => {
                warn!(%order_id, "orders: order changed state before cancel");
                return Err(OrderError::CannotCancel);
            }
        };

        match &refund {
            RefundOutcome::NotRequired => {}
            RefundOutcome::Credited(transaction) => info!(
                %order_id,
                driver_id = %transaction.driver_id,
                amount = %transaction.amount,
                "orders: service fee refunded"
            ),
            RefundOutcome::Failed {
                driver_id,
                amount,
                error,
            } => error!(
                %order_id,
                %driver_id,
                %amount,
                refund_error = %error,
                "orders: service fee refund failed, cancellation kept"
            ),
        }

        let model = OrderModel::try_from(cancelled)?;
        if let Some(driver_id) = model.driver_id {
            self.notify_driver(driver_id, &model).await;
        }

        info!(%order_id, "orders: order cancelled");
        Ok(model)
    }

    async fn insert_and_announce(
        &self,
        actor: Actor,
        entity: InsertOrderEntity,
    ) -> UseCaseResult<OrderModel> {
        let created = self.order_repository.create(entity).await.map_err(|err| {
            error!(user_id = %actor.user_id, db_error = ?err, "orders: failed to insert order");
            err
        })?;
        let model = OrderModel::try_from(created)?;

        info!(
            order_id = %model.id,
            order_type = %model.order_type,
            final_price = %model.final_price,
            "orders: order created"
        );

        self.announce_new_order(actor.user_id, &model).await;
        Ok(model)
    }

    /// Best effort. A failed lookup leaves the order in place without notifications.
    async fn announce_new_order(&self, customer_id: Uuid, order: &OrderModel) {
        let recipients = match self.driver_repository.list_notifiable_user_ids().await {
            Ok(recipients) => recipients,
            Err(err) => {
                warn!(order_id = %order.id, db_error = ?err, "orders: could not list drivers to notify");
                return;
            }
        };

        let mut sent = 0usize;
        for recipient in recipients.into_iter().filter(|id| *id != customer_id) {
            self.notification_sink.notify(OrderNotification::new(
                recipient,
                NotificationKind::NewOrder,
                order.id,
                order.order_type,
            ));
            sent += 1;
        }

        info!(order_id = %order.id, recipients = sent, "orders: new order announced");
    }

    async fn notify_driver(&self, driver_id: Uuid, order: &OrderModel) {
        match self.driver_repository.find_by_id(driver_id).await {
            Ok(Some(driver)) => self.notification_sink.notify(OrderNotification::new(
                driver.user_id,
                NotificationKind::OrderCancelled,
                order.id,
                order.order_type,
            )),
            Ok(None) => warn!(%driver_id, order_id = %order.id, "orders: assigned driver missing"),
            Err(err) => warn!(
                %driver_id,
                order_id = %order.id,
                db_error = ?err,
                "orders: could not resolve driver to notify"
            ),
        }
    }
}
