//! Scoped transaction and savepoint helpers.
//!
//! # Responsibility
//! - Bracket a sequence of repository calls in one atomic scope.
//! - Expose named savepoints for partial rollback inside a transaction.
//!
//! # Invariants
//! - A scope commits on `Ok` and rolls back on `Err`; state visible before
//!   the scope is restored on failure.
//! - Rolling back an inner savepoint leaves the outer pending work intact.

use log::debug;
use rusqlite::{Connection, Savepoint, Transaction, TransactionBehavior};

/// Runs `body` inside an immediate transaction.
///
/// Commits when `body` returns `Ok`; any `Err` rolls the scope back (the
/// transaction is dropped without commit), restoring the pre-scope state.
/// Repository calls outside such a scope autocommit per statement.
pub fn with_transaction<T, E>(
    conn: &mut Connection,
    body: impl FnOnce(&Transaction<'_>) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<rusqlite::Error>,
{
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(E::from)?;
    debug!("event=txn_begin module=db status=ok");

    match body(&tx) {
        Ok(value) => {
            tx.commit().map_err(E::from)?;
            debug!("event=txn_commit module=db status=ok");
            Ok(value)
        }
        Err(err) => {
            // Dropping the transaction without commit rolls it back.
            debug!("event=txn_rollback module=db status=ok");
            Err(err)
        }
    }
}

/// Runs `body` under a named savepoint inside an open transaction.
///
/// Releases the savepoint on `Ok`; on `Err` only the work since the
/// savepoint is undone, while the surrounding transaction stays pending.
/// Savepoints nest through `Savepoint::savepoint`.
pub fn with_savepoint<T, E>(
    tx: &mut Transaction<'_>,
    name: &str,
    body: impl FnOnce(&mut Savepoint<'_>) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<rusqlite::Error>,
{
    let mut sp = tx.savepoint_with_name(name).map_err(E::from)?;
    debug!("event=savepoint_begin module=db status=ok name={name}");

    match body(&mut sp) {
        Ok(value) => {
            sp.commit().map_err(E::from)?;
            debug!("event=savepoint_release module=db status=ok name={name}");
            Ok(value)
        }
        Err(err) => {
            debug!("event=savepoint_rollback module=db status=ok name={name}");
            Err(err)
        }
    }
}
