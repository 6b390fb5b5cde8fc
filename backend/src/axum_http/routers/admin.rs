use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::drivers::DriverRepository, value_objects::ledger::AddBalanceModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::drivers::DriverPostgres,
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    usecases::ledger::{LedgerError, LedgerUseCase},
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let driver_repository = DriverPostgres::new(Arc::clone(&db_pool));
    let ledger_usecase = LedgerUseCase::new(Arc::new(driver_repository));

    Router::new()
        .route("/drivers/:driver_id/add-balance", post(add_balance))
        .route("/drivers/:driver_id/transactions", get(list_driver_transactions))
        .with_state(Arc::new(ledger_usecase))
}

pub async fn add_balance<D>(
    State(ledger_usecase): State<Arc<LedgerUseCase<D>>>,
    auth: AuthUser,
    Path(driver_id): Path<Uuid>,
    Json(add_balance_model): Json<AddBalanceModel>,
) -> Result<impl IntoResponse, LedgerError>
where
    D: DriverRepository + Send + Sync + 'static,
{
    let transaction = ledger_usecase
        .admin_add_balance(auth.actor(), driver_id, add_balance_model)
        .await?;
    Ok(Json(transaction))
}

pub async fn list_driver_transactions<D>(
    State(ledger_usecase): State<Arc<LedgerUseCase<D>>>,
    auth: AuthUser,
    Path(driver_id): Path<Uuid>,
) -> Result<impl IntoResponse, LedgerError>
where
    D: DriverRepository + Send + Sync + 'static,
{
    let transactions = ledger_usecase
        .admin_list_transactions(auth.actor(), driver_id)
        .await?;
    Ok(Json(transactions))
}
