pub mod expire_overdue_orders;
pub mod reconcile_ledger;
