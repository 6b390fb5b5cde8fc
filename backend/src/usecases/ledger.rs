use std::sync::Arc;

use crates::domain::{
    entities::{drivers::DriverEntity, transactions::TransactionEntity},
    repositories::drivers::DriverRepository,
    value_objects::{
        enums::user_roles::UserRole,
        iam::Actor,
        ledger::{AddBalanceModel, LedgerEntry, TransactionModel},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::{ADMIN_ROLES, DRIVER_ROLES};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Insufficient permissions")]
    Forbidden,
    #[error("Amount must be positive")]
    InvalidAmount,
    #[error("Driver not found")]
    DriverNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl LedgerError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            LedgerError::Forbidden => StatusCode::FORBIDDEN,
            LedgerError::InvalidAmount => StatusCode::BAD_REQUEST,
            LedgerError::DriverNotFound => StatusCode::NOT_FOUND,
            LedgerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, LedgerError>;

/// Read access to driver ledgers and the admin top-up path.
pub struct LedgerUseCase<D>
where
    D: DriverRepository + Send + Sync + 'static,
{
    driver_repository: Arc<D>,
}

impl<D> LedgerUseCase<D>
where
    D: DriverRepository + Send + Sync + 'static,
{
    pub fn new(driver_repository: Arc<D>) -> Self {
        Self { driver_repository }
    }

    pub async fn list_driver_transactions(
        &self,
        actor: Actor,
    ) -> UseCaseResult<Vec<TransactionModel>> {
        require_role(&actor, &DRIVER_ROLES)?;

        let driver = self
            .driver_repository
            .find_by_user_id(actor.user_id)
            .await
            .map_err(|err| {
                error!(user_id = %actor.user_id, db_error = ?err, "ledger: failed to load driver profile");
                err
            })?
            .ok_or(LedgerError::DriverNotFound)?;

        self.transactions_of(&driver).await
    }

    pub async fn admin_add_balance(
        &self,
        actor: Actor,
        driver_id: Uuid,
        model: AddBalanceModel,
    ) -> UseCaseResult<TransactionModel> {
        require_role(&actor, &ADMIN_ROLES)?;

        if !model.is_positive() {
            let err = LedgerError::InvalidAmount;
            warn!(
                admin_id = %actor.user_id,
                %driver_id,
                amount = %model.amount,
                status = err.status_code().as_u16(),
                "ledger: rejected non-positive top-up"
            );
            return Err(err);
        }

        let driver = self.driver(driver_id).await?;
        let entry = LedgerEntry::admin_top_up(driver.id, &model.amount, actor.user_id);

        let transaction = self
            .driver_repository
            .apply_entry(entry)
            .await
            .map_err(|err| {
                error!(%driver_id, db_error = ?err, "ledger: top-up failed");
                err
            })?;

        info!(
            admin_id = %actor.user_id,
            %driver_id,
            amount = %transaction.amount,
            "ledger: balance topped up"
        );

        Ok(TransactionModel::try_from(transaction)?)
    }

    pub async fn admin_list_transactions(
        &self,
        actor: Actor,
        driver_id: Uuid,
    ) -> UseCaseResult<Vec<TransactionModel>> {
        require_role(&actor, &ADMIN_ROLES)?;
        let driver = self.driver(driver_id).await?;
        self.transactions_of(&driver).await
    }

    async fn driver(&self, driver_id: Uuid) -> UseCaseResult<DriverEntity> {
        self.driver_repository
            .find_by_id(driver_id)
            .await
            .map_err(|err| {
                error!(%driver_id, db_error = ?err, "ledger: failed to load driver");
                err
            })?
            .ok_or(LedgerError::DriverNotFound)
    }

    async fn transactions_of(&self, driver: &DriverEntity) -> UseCaseResult<Vec<TransactionModel>> {
        let transactions: Vec<TransactionEntity> = self
            .driver_repository
            .list_transactions(driver.id)
            .await
            .map_err(|err| {
                error!(driver_id = %driver.id, db_error = ?err, "ledger: failed to list transactions");
                err
            })?;

        Ok(transactions
            .into_iter()
            .map(TransactionModel::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?)
    }
}

fn require_role(actor: &Actor, roles: &[UserRole]) -> UseCaseResult<()> {
    if actor.has_any_role(roles) {
        return Ok(());
    }
    warn!(user_id = %actor.user_id, role = %actor.role, "ledger: role not allowed");
    Err(LedgerError::Forbidden)
}
