use diesel::connection::TransactionManager;
use diesel::pg::PgConnection;
use diesel::Connection;
use log::warn;

use crate::app::ctx::Ctx;
use crate::app::AppError;
use crate::database::db_utils::{get_conn, PgPool, PgPooledConn};

/// An open unit of work against the store.
///
/// Owns the checked-out connection for the lifetime of the transaction.
/// `commit` and `rollback` consume the handle, so a closed transaction
/// cannot be reused; a handle dropped on an error path rolls back before
/// the connection returns to the pool.
pub struct TxHandle {
    conn: PgPooledConn,
    open: bool,
}

impl TxHandle {
    pub fn begin(ctx: &Ctx, pool: &PgPool) -> Result<TxHandle, AppError> {
        ctx.check()?;
        let conn = get_conn(pool)?;
        conn.transaction_manager().begin_transaction(&*conn)?;
        Ok(TxHandle { conn, open: true })
    }

    /// The connection carrying the transaction. Statements run on it
    /// participate in the transaction until commit or rollback.
    pub fn conn(&self) -> &PgConnection {
        &self.conn
    }

    /// Commits the transaction. A commit failure is surfaced to the
    /// caller after a best-effort rollback of the broken transaction.
    pub fn commit(mut self, ctx: &Ctx) -> Result<(), AppError> {
        ctx.check()?;
        self.open = false;
        if let Err(err) = self.conn.transaction_manager().commit_transaction(&*self.conn) {
            if let Err(rollback_err) = self
                .conn
                .transaction_manager()
                .rollback_transaction(&*self.conn)
            {
                warn!("Failed to roll back after commit failure: {}", rollback_err);
            }
            return Err(AppError::Database(err));
        }
        Ok(())
    }

    /// Best-effort abort. Invoked from already-failing paths, so a
    /// rollback failure is logged instead of masking the original error.
    pub fn rollback(mut self) {
        self.open = false;
        if let Err(err) = self
            .conn
            .transaction_manager()
            .rollback_transaction(&*self.conn)
        {
            warn!("Failed to roll back transaction: {}", err);
        }
    }
}

impl Drop for TxHandle {
    fn drop(&mut self) {
        if self.open {
            if let Err(err) = self
                .conn
                .transaction_manager()
                .rollback_transaction(&*self.conn)
            {
                warn!("Failed to roll back abandoned transaction: {}", err);
            }
        }
    }
}
