use crate::usecases::{
    expire_overdue_orders::ExpireOverdueOrdersUseCase, reconcile_ledger::ReconcileLedgerUseCase,
};
use anyhow::Result;
use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

pub async fn run_housekeeping_loop(
    expire_usecase: Arc<ExpireOverdueOrdersUseCase>,
    reconcile_usecase: Arc<ReconcileLedgerUseCase>,
    interval: Duration,
) -> Result<()> {
    info!(interval_secs = interval.as_secs(), "housekeeping: loop started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        run_pass(&expire_usecase, &reconcile_usecase).await;
    }
}

/// One pass never aborts the loop; failures are logged and retried next tick.
pub async fn run_pass(
    expire_usecase: &ExpireOverdueOrdersUseCase,
    reconcile_usecase: &ReconcileLedgerUseCase,
) {
    if let Err(err) = expire_usecase.run(Utc::now()).await {
        error!(error = ?err, "housekeeping: failed to expire overdue orders");
    }

    if let Err(err) = reconcile_usecase.run().await {
        error!(error = ?err, "housekeeping: failed to reconcile ledger");
    }
}
