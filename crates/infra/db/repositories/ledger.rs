use chrono::{DateTime, Utc};
use diesel::{PgConnection, QueryResult, prelude::*};

use crate::{
    domain::{entities::transactions::TransactionEntity, value_objects::ledger::LedgerEntry},
    infra::db::postgres::schema::{drivers, transactions},
};

/// The only code path that moves a driver balance.
///
/// Must run on a connection that is already inside a database transaction so the
/// balance delta and the ledger row commit or roll back together. The delta is applied
/// in SQL. Debits only match rows whose balance covers the amount.
///
/// Returns `Ok(None)` when no driver row matched: unknown driver, or a debit larger than
/// the current balance.
pub fn apply_ledger_entry(
    conn: &mut PgConnection,
    entry: &LedgerEntry,
    now: DateTime<Utc>,
) -> QueryResult<Option<TransactionEntity>> {
    let delta = entry.signed_amount();
    let target = drivers::table.filter(drivers::id.eq(entry.driver_id));

    let updated = if entry.kind.is_debit() {
        diesel::update(target.filter(drivers::balance.ge(entry.amount.clone())))
            .set((
                drivers::balance.eq(drivers::balance + delta),
                drivers::updated_at.eq(now),
            ))
            .execute(conn)?
    } else {
        diesel::update(target)
            .set((
                drivers::balance.eq(drivers::balance + delta),
                drivers::updated_at.eq(now),
            ))
            .execute(conn)?
    };

    if updated == 0 {
        return Ok(None);
    }

    let transaction = diesel::insert_into(transactions::table)
        .values(&entry.to_entity(now))
        .returning(TransactionEntity::as_returning())
        .get_result::<TransactionEntity>(conn)?;

    Ok(Some(transaction))
}
