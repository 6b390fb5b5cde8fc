use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{
            drivers::DriverRepository, notifications::NotificationSink, orders::OrderRepository,
        },
        value_objects::{
            orders::{DriverOrdersFilter, NewOrdersFilter},
            statistics::StatisticsQuery,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{drivers::DriverPostgres, orders::OrderPostgres},
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    usecases::{
        driver_orders::DriverOrderUseCase,
        ledger::{LedgerError, LedgerUseCase},
        orders::OrderError,
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, notification_sink: Arc<dyn NotificationSink>) -> Router {
    let order_repository = Arc::new(OrderPostgres::new(Arc::clone(&db_pool)));
    let driver_repository = Arc::new(DriverPostgres::new(Arc::clone(&db_pool)));

    let driver_order_usecase = DriverOrderUseCase::new(
        order_repository,
        Arc::clone(&driver_repository),
        notification_sink,
    );
    let ledger_usecase = LedgerUseCase::new(driver_repository);

    let order_routes = Router::new()
        .route("/orders/new", get(list_new_orders))
        .route("/orders", get(list_driver_orders))
        .route("/orders/:order_id/accept", post(accept_order))
        .route("/orders/:order_id/complete", post(complete_order))
        .route("/statistics", get(statistics))
        .with_state(Arc::new(driver_order_usecase));

    let ledger_routes = Router::new()
        .route("/transactions", get(list_transactions))
        .with_state(Arc::new(ledger_usecase));

    order_routes.merge(ledger_routes)
}

pub async fn list_new_orders<O, D>(
    State(driver_order_usecase): State<Arc<DriverOrderUseCase<O, D>>>,
    auth: AuthUser,
    Query(filter): Query<NewOrdersFilter>,
) -> Result<impl IntoResponse, OrderError>
where
    O: OrderRepository + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
{
    let orders = driver_order_usecase
        .list_new_orders(auth.actor(), filter)
        .await?;
    Ok(Json(orders))
}

pub async fn accept_order<O, D>(
    State(driver_order_usecase): State<Arc<DriverOrderUseCase<O, D>>>,
    auth: AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, OrderError>
where
    O: OrderRepository + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
{
    let order = driver_order_usecase
        .accept_order(auth.actor(), order_id)
        .await?;
    Ok(Json(order))
}

pub async fn complete_order<O, D>(
    State(driver_order_usecase): State<Arc<DriverOrderUseCase<O, D>>>,
    auth: AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, OrderError>
where
    O: OrderRepository + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
{
    let order = driver_order_usecase
        .complete_order(auth.actor(), order_id)
        .await?;
    Ok(Json(order))
}

pub async fn list_driver_orders<O, D>(
    State(driver_order_usecase): State<Arc<DriverOrderUseCase<O, D>>>,
    auth: AuthUser,
    Query(filter): Query<DriverOrdersFilter>,
) -> Result<impl IntoResponse, OrderError>
where
    O: OrderRepository + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
{
    let orders = driver_order_usecase
        .list_driver_orders(auth.actor(), filter)
        .await?;
    Ok(Json(orders))
}

pub async fn statistics<O, D>(
    State(driver_order_usecase): State<Arc<DriverOrderUseCase<O, D>>>,
    auth: AuthUser,
    Query(query): Query<StatisticsQuery>,
) -> Result<impl IntoResponse, OrderError>
where
    O: OrderRepository + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
{
    let statistics = driver_order_usecase.statistics(auth.actor(), query).await?;
    Ok(Json(statistics))
}

pub async fn list_transactions<D>(
    State(ledger_usecase): State<Arc<LedgerUseCase<D>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, LedgerError>
where
    D: DriverRepository + Send + Sync + 'static,
{
    let transactions = ledger_usecase.list_driver_transactions(auth.actor()).await?;
    Ok(Json(transactions))
}
