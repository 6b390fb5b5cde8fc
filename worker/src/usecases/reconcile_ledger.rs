use anyhow::Result;
use crates::domain::{repositories::drivers::DriverRepository, value_objects::ledger::LedgerDrift};
use std::sync::Arc;
use tracing::{debug, error};

/// Compares every driver balance against the sum of its ledger rows.
/// Drift is reported, never repaired.
pub struct ReconcileLedgerUseCase {
    driver_repository: Arc<dyn DriverRepository + Send + Sync>,
}

impl ReconcileLedgerUseCase {
    pub fn new(driver_repository: Arc<dyn DriverRepository + Send + Sync>) -> Self {
        Self { driver_repository }
    }

    pub async fn run(&self) -> Result<Vec<LedgerDrift>> {
        let drifts = self.driver_repository.find_ledger_drift().await?;

        if drifts.is_empty() {
            debug!("housekeeping: ledger balanced");
            return Ok(drifts);
        }

        for drift in &drifts {
            error!(
                driver_id = %drift.driver_id,
                balance = %drift.balance,
                ledger_total = %drift.ledger_total,
                difference = %drift.difference(),
                "housekeeping: driver balance does not match ledger"
            );
        }

        Ok(drifts)
    }
}
