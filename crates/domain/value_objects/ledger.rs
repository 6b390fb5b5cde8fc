use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::transactions::{InsertTransactionEntity, TransactionEntity},
    value_objects::{enums::transaction_kinds::TransactionKind, fares::round_money},
};

pub const ORDER_DEBIT_DESCRIPTION: &str = "Service fee for accepting order";
pub const ORDER_REFUND_DESCRIPTION: &str = "Refund for cancelled order";
pub const ADMIN_TOP_UP_DESCRIPTION: &str = "Balance added by admin";

/// One balance movement. `amount` is the magnitude; the sign comes from `kind`.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub driver_id: Uuid,
    pub order_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub amount: BigDecimal,
    pub description: String,
    pub created_by: Option<Uuid>,
}

impl LedgerEntry {
    pub fn order_debit(driver_id: Uuid, order_id: Uuid, service_fee: &BigDecimal) -> Self {
        Self {
            driver_id,
            order_id: Some(order_id),
            kind: TransactionKind::Debit,
            amount: round_money(&service_fee.abs()),
            description: ORDER_DEBIT_DESCRIPTION.to_string(),
            created_by: None,
        }
    }

    pub fn order_refund(driver_id: Uuid, order_id: Uuid, service_fee: &BigDecimal) -> Self {
        Self {
            driver_id,
            order_id: Some(order_id),
            kind: TransactionKind::Refund,
            amount: round_money(&service_fee.abs()),
            description: ORDER_REFUND_DESCRIPTION.to_string(),
            created_by: None,
        }
    }

    pub fn admin_top_up(driver_id: Uuid, amount: &BigDecimal, admin_id: Uuid) -> Self {
        Self {
            driver_id,
            order_id: None,
            kind: TransactionKind::Credit,
            amount: round_money(&amount.abs()),
            description: ADMIN_TOP_UP_DESCRIPTION.to_string(),
            created_by: Some(admin_id),
        }
    }

    /// Delta applied to the driver balance.
    pub fn signed_amount(&self) -> BigDecimal {
        if self.kind.is_debit() {
            -self.amount.clone()
        } else {
            self.amount.clone()
        }
    }

    pub fn to_entity(&self, now: DateTime<Utc>) -> InsertTransactionEntity {
        InsertTransactionEntity {
            driver_id: self.driver_id,
            order_id: self.order_id,
            amount: self.signed_amount(),
            type_: self.kind.to_string(),
            description: self.description.clone(),
            created_by: self.created_by,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionModel {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub order_id: Option<Uuid>,
    pub amount: BigDecimal,
    pub kind: TransactionKind,
    pub description: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TransactionEntity> for TransactionModel {
    type Error = anyhow::Error;

    fn try_from(entity: TransactionEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            driver_id: entity.driver_id,
            order_id: entity.order_id,
            amount: entity.amount,
            kind: entity.type_.parse()?,
            description: entity.description,
            created_by: entity.created_by,
            created_at: entity.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddBalanceModel {
    pub amount: BigDecimal,
}

impl AddBalanceModel {
    pub fn is_positive(&self) -> bool {
        self.amount > BigDecimal::zero()
    }
}

/// A driver whose stored balance disagrees with the sum of their ledger rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerDrift {
    pub driver_id: Uuid,
    pub balance: BigDecimal,
    pub ledger_total: BigDecimal,
}

impl LedgerDrift {
    pub fn difference(&self) -> BigDecimal {
        &self.balance - &self.ledger_total
    }
}
