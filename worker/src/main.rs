use anyhow::Result;
use crates::{
    domain::repositories::{
        drivers::DriverRepository, notifications::NotificationSink, orders::OrderRepository,
    },
    infra::{
        db::{
            postgres::postgres_connection,
            repositories::{
                drivers::DriverPostgres, notifications::NotificationPostgres,
                orders::OrderPostgres,
            },
        },
        notifications::{NotificationDelivery, QueuedNotificationSink},
    },
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};
use worker::{
    axum_http, config,
    services::housekeeping_loop,
    usecases::{
        expire_overdue_orders::ExpireOverdueOrdersUseCase,
        reconcile_ledger::ReconcileLedgerUseCase,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Worker exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let order_repository: Arc<dyn OrderRepository + Send + Sync> =
        Arc::new(OrderPostgres::new(Arc::clone(&db_pool_arc)));
    let driver_repository: Arc<dyn DriverRepository + Send + Sync> =
        Arc::new(DriverPostgres::new(Arc::clone(&db_pool_arc)));
    let stored_notifications: Arc<dyn NotificationDelivery> =
        Arc::new(NotificationPostgres::new(Arc::clone(&db_pool_arc)));
    let notification_sink: Arc<dyn NotificationSink> =
        Arc::new(QueuedNotificationSink::new(vec![stored_notifications]));

    let expire_usecase = Arc::new(ExpireOverdueOrdersUseCase::new(
        order_repository,
        notification_sink,
        dotenvy_env.housekeeping.batch_size,
    ));
    let reconcile_usecase = Arc::new(ReconcileLedgerUseCase::new(driver_repository));

    let housekeeping = tokio::spawn(housekeeping_loop::run_housekeeping_loop(
        expire_usecase,
        reconcile_usecase,
        Duration::from_secs(dotenvy_env.housekeeping.interval_secs),
    ));

    let server_config = Arc::clone(&dotenvy_env);
    let health_server = tokio::spawn(async move { axum_http::http_serve::start(server_config).await });

    tokio::select! {
        result = housekeeping => result??,
        result = health_server => result??,
    };
    Ok(())
}
