use diesel::connection::Connection;
use diesel::{PgConnection, RunQueryDsl};
use log::{debug, warn};
use std::time::{Duration, Instant};

use crate::core::client::Client;
use crate::core::shared::error::{StoreError, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    Serializable,
}

/// Limits of an interactive transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Longest wait for a pooled connection before giving up.
    pub max_wait: Duration,
    /// Longest the transaction may run, enforced per statement by the server
    /// and checked again when the callback returns.
    pub timeout: Duration,
    /// `None` keeps the database default (READ COMMITTED on PostgreSQL).
    pub isolation_level: Option<IsolationLevel>,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_millis(2000),
            timeout: Duration::from_millis(5000),
            isolation_level: None,
        }
    }
}

impl TransactionOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn serializable(mut self) -> Self {
        self.isolation_level = Some(IsolationLevel::Serializable);
        self
    }
}

/// One step of a batch transaction.
pub type BatchOperation<T> = Box<dyn FnOnce(&mut Client<'_>) -> StoreResult<T> + Send>;

/// Runs `f` inside a transaction on `conn`. Any error, including an overrun
/// of `options.timeout`, rolls the whole transaction back.
pub fn run<T, F>(conn: &mut PgConnection, options: &TransactionOptions, f: F) -> StoreResult<T>
where
    F: FnOnce(&mut Client<'_>) -> StoreResult<T>,
{
    let timeout_ms = options.timeout.as_millis() as u64;
    let body = |conn: &mut PgConnection| -> StoreResult<T> {
        if timeout_ms > 0 {
            diesel::sql_query(format!("SET LOCAL statement_timeout = {timeout_ms}")).execute(conn)?;
        }
        let started = Instant::now();
        let result = f(&mut Client::new(conn));
        let elapsed_ms = started.elapsed().as_millis() as u64;
        if timeout_ms > 0 && elapsed_ms >= timeout_ms {
            warn!("Transaction exceeded {timeout_ms}ms (ran {elapsed_ms}ms), rolling back");
            return Err(StoreError::TransactionTimeout {
                elapsed_ms,
                timeout_ms,
            });
        }
        if let Err(e) = &result {
            warn!("Transaction rolled back: {e}");
        } else {
            debug!("Transaction committed after {elapsed_ms}ms");
        }
        result
    };
    match options.isolation_level {
        Some(IsolationLevel::Serializable) => conn.build_transaction().serializable().run(body),
        None => conn.transaction(body),
    }
}
