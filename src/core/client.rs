use diesel::deserialize::QueryableByName;
use diesel::pg::Pg;
use diesel::r2d2::R2D2Connection;
use diesel::PgConnection;
use log::{error, info, warn};
use std::time::Instant;

use crate::clip::{AnalyticsDelegate, AssetDelegate, ClipDelegate};
use crate::core::config::AppConfig;
use crate::core::raw::{self, RawValue};
use crate::core::shared::error::{StoreError, StoreResult};
use crate::core::shared::utils::{
    create_conn, pending_migrations, redact_database_url, run_migrations, DbConnection, DbPool,
};
use crate::core::transaction::{self, BatchOperation, TransactionOptions};
use crate::jobs::JobDelegate;
use crate::preferences::{
    AutopilotConfigDelegate, ClipProfileDelegate, SettingsDelegate, ThemePresetDelegate,
};
use crate::project::{ClipCandidateDelegate, ProjectDelegate, TranscriptDelegate};

/// Entry point to every model delegate, bound to one connection. Inside a
/// transaction the same type is handed to the callback.
pub struct Client<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> Client<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub fn project(&mut self) -> ProjectDelegate<'_> {
        ProjectDelegate::new(self.conn)
    }

    pub fn clip_profile(&mut self) -> ClipProfileDelegate<'_> {
        ClipProfileDelegate::new(self.conn)
    }

    pub fn transcript(&mut self) -> TranscriptDelegate<'_> {
        TranscriptDelegate::new(self.conn)
    }

    pub fn clip_candidate(&mut self) -> ClipCandidateDelegate<'_> {
        ClipCandidateDelegate::new(self.conn)
    }

    pub fn clip(&mut self) -> ClipDelegate<'_> {
        ClipDelegate::new(self.conn)
    }

    pub fn asset(&mut self) -> AssetDelegate<'_> {
        AssetDelegate::new(self.conn)
    }

    pub fn job(&mut self) -> JobDelegate<'_> {
        JobDelegate::new(self.conn)
    }

    pub fn theme_preset(&mut self) -> ThemePresetDelegate<'_> {
        ThemePresetDelegate::new(self.conn)
    }

    pub fn analytics(&mut self) -> AnalyticsDelegate<'_> {
        AnalyticsDelegate::new(self.conn)
    }

    pub fn settings(&mut self) -> SettingsDelegate<'_> {
        SettingsDelegate::new(self.conn)
    }

    pub fn autopilot_config(&mut self) -> AutopilotConfigDelegate<'_> {
        AutopilotConfigDelegate::new(self.conn)
    }

    /// Runs a statement with `$1..$n` placeholders and returns the affected row count.
    pub fn execute_raw(&mut self, sql: &str, params: &[RawValue]) -> StoreResult<usize> {
        raw::execute(self.conn, sql, params)
    }

    pub fn query_raw<T>(&mut self, sql: &str, params: &[RawValue]) -> StoreResult<Vec<T>>
    where
        T: QueryableByName<Pg> + 'static,
    {
        raw::query(self.conn, sql, params)
    }

    /// Escape hatch for queries the delegates do not cover.
    pub fn connection(&mut self) -> &mut PgConnection {
        self.conn
    }
}

/// Cloneable handle over the connection pool.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
    options: TransactionOptions,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("pool_state", &self.pool.state())
            .field("options", &self.options)
            .finish()
    }
}

impl Store {
    /// Builds the pool, checks the database answers and applies pending
    /// migrations when `config.run_migrations` is set.
    pub fn connect(config: &AppConfig) -> StoreResult<Self> {
        let pool = create_conn(&config.database)?;
        let store = Self::from_pool(pool, config.transactions.clone());
        {
            let mut conn = store.get_conn()?;
            conn.ping().map_err(|e| {
                error!("Database ping failed: {e}");
                StoreError::Initialization(format!(
                    "Database at {} is not reachable: {e}",
                    redact_database_url(&config.database.url)
                ))
            })?;
            if config.run_migrations {
                run_migrations(&mut conn)?;
            }
        }
        info!(
            "Connected to {} (pool size {})",
            redact_database_url(&config.database.url),
            config.database.pool_size
        );
        Ok(store)
    }

    pub fn from_pool(pool: DbPool, options: TransactionOptions) -> Self {
        Self { pool, options }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn transaction_options(&self) -> &TransactionOptions {
        &self.options
    }

    fn get_conn(&self) -> StoreResult<DbConnection> {
        self.pool.get().map_err(|e| {
            error!("DB connection error: {e}");
            StoreError::Initialization(e.to_string())
        })
    }

    pub fn migrate(&self) -> StoreResult<Vec<String>> {
        let mut conn = self.get_conn()?;
        run_migrations(&mut conn)
    }

    pub fn pending_migrations(&self) -> StoreResult<Vec<String>> {
        let mut conn = self.get_conn()?;
        pending_migrations(&mut conn)
    }

    /// Runs `f` on a pooled connection, outside any transaction.
    pub fn with_client<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Client<'_>) -> StoreResult<T>,
    {
        let mut conn = self.get_conn()?;
        f(&mut Client::new(&mut conn))
    }

    /// [`Store::with_client`] on tokio's blocking pool.
    pub async fn interact<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Client<'_>) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.with_client(f))
            .await
            .map_err(|e| StoreError::Query(format!("Database task failed: {e}")))?
    }

    /// Interactive transaction with the store's default options.
    pub fn transaction<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Client<'_>) -> StoreResult<T>,
    {
        self.transaction_with(&self.options, f)
    }

    pub fn transaction_with<T, F>(&self, options: &TransactionOptions, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Client<'_>) -> StoreResult<T>,
    {
        let waiting = Instant::now();
        let mut conn = self.pool.get_timeout(options.max_wait).map_err(|e| {
            let waited_ms = waiting.elapsed().as_millis() as u64;
            warn!("No connection for transaction after {waited_ms}ms: {e}");
            StoreError::TransactionStartTimeout { waited_ms }
        })?;
        transaction::run(&mut conn, options, f)
    }

    /// Runs every operation in order inside one transaction and returns their
    /// results in the same order. The first failure rolls all of them back.
    pub fn batch<T>(&self, operations: Vec<BatchOperation<T>>) -> StoreResult<Vec<T>> {
        self.transaction(|client| {
            operations
                .into_iter()
                .map(|operation| operation(client))
                .collect()
        })
    }
}
