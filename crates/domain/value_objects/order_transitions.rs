use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    entities::{orders::OrderEntity, transactions::TransactionEntity},
    value_objects::enums::order_statuses::OrderStatus,
};

pub const EXPIRED_CANCELLATION_REASON: &str = "accept deadline expired";

const ALL_STATUSES: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Accepted,
    OrderStatus::InProgress,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
];

/// A requested move of one order to its next status, with the column values it writes.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderTransition {
    Accept {
        driver_id: Uuid,
        at: DateTime<Utc>,
    },
    Complete {
        at: DateTime<Utc>,
    },
    Cancel {
        reason: String,
        at: DateTime<Utc>,
    },
}

impl OrderTransition {
    pub fn target_status(&self) -> OrderStatus {
        match self {
            OrderTransition::Accept { .. } => OrderStatus::Accepted,
            OrderTransition::Complete { .. } => OrderStatus::Completed,
            OrderTransition::Cancel { .. } => OrderStatus::Cancelled,
        }
    }

    /// Statuses from which this transition is legal.
    pub fn allowed_from(&self) -> Vec<OrderStatus> {
        let target = self.target_status();
        ALL_STATUSES
            .into_iter()
            .filter(|status| status.can_transition_to(target))
            .collect()
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            OrderTransition::Accept { at, .. }
            | OrderTransition::Complete { at }
            | OrderTransition::Cancel { at, .. } => *at,
        }
    }
}

/// Row predicate for a conditional status update. An empty `expected_statuses`
/// matches nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransitionGuard {
    pub expected_statuses: Vec<OrderStatus>,
    pub driver_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    /// Row qualifies only when its accept deadline is unset or later than this instant.
    pub open_at: Option<DateTime<Utc>>,
}

impl TransitionGuard {
    pub fn for_transition(transition: &OrderTransition) -> Self {
        Self {
            expected_statuses: transition.allowed_from(),
            ..Default::default()
        }
    }

    pub fn assigned_to(mut self, driver_id: Uuid) -> Self {
        self.driver_id = Some(driver_id);
        self
    }

    pub fn owned_by(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn open_at(mut self, now: DateTime<Utc>) -> Self {
        self.open_at = Some(now);
        self
    }

    pub fn matches(&self, order: &OrderEntity) -> bool {
        let status_ok = order
            .status
            .parse::<OrderStatus>()
            .map(|status| self.expected_statuses.contains(&status))
            .unwrap_or(false);
        let driver_ok = self
            .driver_id
            .is_none_or(|driver_id| order.driver_id == Some(driver_id));
        let owner_ok = self.user_id.is_none_or(|user_id| order.user_id == user_id);
        let deadline_ok = self.open_at.is_none_or(|now| {
            order
                .accept_deadline
                .is_none_or(|deadline| deadline > now)
        });

        status_ok && driver_ok && owner_ok && deadline_ok
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AcceptOutcome {
    Accepted {
        order: OrderEntity,
        debit: TransactionEntity,
    },
    /// Another driver won the race, the order was cancelled, or its deadline passed.
    AlreadyProcessed,
    InsufficientBalance,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefundOutcome {
    NotRequired,
    Credited(TransactionEntity),
    Failed {
        driver_id: Uuid,
        amount: BigDecimal,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    Cancelled {
        order: OrderEntity,
        refund: RefundOutcome,
    },
    NotCancellable,
}
