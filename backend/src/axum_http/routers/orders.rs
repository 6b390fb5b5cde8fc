use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Duration;
use crates::{
    domain::{
        repositories::{
            drivers::DriverRepository, notifications::NotificationSink, orders::OrderRepository,
            pricing::PricingRepository,
        },
        value_objects::orders::{
            CancelOrderModel, CreateDeliveryOrderModel, CreateTaxiOrderModel, MyOrdersFilter,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{drivers::DriverPostgres, orders::OrderPostgres, pricing::PricingPostgres},
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    usecases::orders::{OrderError, OrderUseCase},
};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    notification_sink: Arc<dyn NotificationSink>,
    accept_window: Duration,
) -> Router {
    let order_repository = OrderPostgres::new(Arc::clone(&db_pool));
    let driver_repository = DriverPostgres::new(Arc::clone(&db_pool));
    let pricing_repository = PricingPostgres::new(Arc::clone(&db_pool));
    let order_usecase = OrderUseCase::new(
        Arc::new(order_repository),
        Arc::new(driver_repository),
        Arc::new(pricing_repository),
        notification_sink,
        accept_window,
    );

    Router::new()
        .route("/taxi", post(create_taxi_order))
        .route("/delivery", post(create_delivery_order))
        .route("/my", get(list_my_orders))
        .route("/:order_id", get(get_order))
        .route("/:order_id/cancel", post(cancel_order))
        .with_state(Arc::new(order_usecase))
}

pub async fn create_taxi_order<O, D, P>(
    State(order_usecase): State<Arc<OrderUseCase<O, D, P>>>,
    auth: AuthUser,
    Json(create_taxi_order_model): Json<CreateTaxiOrderModel>,
) -> Result<impl IntoResponse, OrderError>
where
    O: OrderRepository + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
    P: PricingRepository + Send + Sync + 'static,
{
    let order = order_usecase
        .create_taxi_order(auth.actor(), create_taxi_order_model)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn create_delivery_order<O, D, P>(
    State(order_usecase): State<Arc<OrderUseCase<O, D, P>>>,
    auth: AuthUser,
    Json(create_delivery_order_model): Json<CreateDeliveryOrderModel>,
) -> Result<impl IntoResponse, OrderError>
where
    O: OrderRepository + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
    P: PricingRepository + Send + Sync + 'static,
{
    let order = order_usecase
        .create_delivery_order(auth.actor(), create_delivery_order_model)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_my_orders<O, D, P>(
    State(order_usecase): State<Arc<OrderUseCase<O, D, P>>>,
    auth: AuthUser,
    Query(filter): Query<MyOrdersFilter>,
) -> Result<impl IntoResponse, OrderError>
where
    O: OrderRepository + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
    P: PricingRepository + Send + Sync + 'static,
{
    let orders = order_usecase.list_my_orders(auth.actor(), filter).await?;
    Ok(Json(orders))
}

pub async fn get_order<O, D, P>(
    State(order_usecase): State<Arc<OrderUseCase<O, D, P>>>,
    auth: AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, OrderError>
where
    O: OrderRepository + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
    P: PricingRepository + Send + Sync + 'static,
{
    let order = order_usecase.get_order(auth.actor(), order_id).await?;
    Ok(Json(order))
}

pub async fn cancel_order<O, D, P>(
    State(order_usecase): State<Arc<OrderUseCase<O, D, P>>>,
    auth: AuthUser,
    Path(order_id): Path<Uuid>,
    Json(cancel_order_model): Json<CancelOrderModel>,
) -> Result<impl IntoResponse, OrderError>
where
    O: OrderRepository + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
    P: PricingRepository + Send + Sync + 'static,
{
    let order = order_usecase
        .cancel_order(auth.actor(), order_id, cancel_order_model)
        .await?;
    Ok(Json(order))
}
