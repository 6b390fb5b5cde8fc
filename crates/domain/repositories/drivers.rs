use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::{drivers::DriverEntity, transactions::TransactionEntity},
    value_objects::ledger::{LedgerDrift, LedgerEntry},
};

#[async_trait]
#[automock]
pub trait DriverRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<DriverEntity>>;

    async fn find_by_id(&self, driver_id: Uuid) -> Result<Option<DriverEntity>>;

    /// User ids of approved, active drivers whose accounts are not blocked.
    async fn list_notifiable_user_ids(&self) -> Result<Vec<Uuid>>;

    /// Applies one ledger entry in its own database transaction.
    async fn apply_entry(&self, entry: LedgerEntry) -> Result<TransactionEntity>;

    async fn list_transactions(&self, driver_id: Uuid) -> Result<Vec<TransactionEntity>>;

    async fn find_ledger_drift(&self) -> Result<Vec<LedgerDrift>>;
}
