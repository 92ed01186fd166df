//! Bounded PostgreSQL connection pool.
//!
//! [`ScorePool`] is built once at startup and handed to whoever needs it; no
//! connection is opened until the first [`ScorePool::acquire`]. Borrowed
//! connections come back either through [`PooledConnection::release`], through
//! [`PooledConnection::discard`] when they failed at the transport level, or by
//! being dropped.

use std::ops::{Deref, DerefMut};

use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions, Postgres};

use crate::config::PoolConfig;
use crate::error::{Result, StorageError};

#[derive(Debug, Clone)]
pub struct ScorePool {
    pool: PgPool,
}

impl ScorePool {
    /// Create the pool without connecting. Must be called inside a tokio
    /// runtime.
    pub fn new(config: &PoolConfig, options: PgConnectOptions) -> Result<Self> {
        config.validate()?;

        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .test_before_acquire(true)
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    /// Wrap a pool that was configured elsewhere.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Borrow a connection, waiting up to the configured acquire timeout.
    pub async fn acquire(&self) -> Result<PooledConnection> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StorageError::from_sqlx("acquire", e))?;

        Ok(PooledConnection { conn })
    }

    /// Connections currently open, idle or lent out.
    pub fn size(&self) -> u32 {
        self.pool.size()
    }

    pub fn num_idle(&self) -> usize {
        self.pool.num_idle()
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Stop lending connections and close the ones that are open. Waits for
    /// borrowed connections to come back.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Connection pool closed");
    }
}

/// A connection exclusively owned by one borrower until it is released,
/// discarded or dropped.
#[derive(Debug)]
pub struct PooledConnection {
    conn: PoolConnection<Postgres>,
}

impl PooledConnection {
    /// Hand the connection back for reuse.
    pub fn release(self) {
        drop(self.conn);
    }

    /// Close the connection instead of returning it. The pool opens a
    /// replacement on a later acquisition.
    pub async fn discard(self) {
        if let Err(e) = self.conn.close().await {
            tracing::debug!("Error while closing discarded connection: {}", e);
        }
    }

    /// Classify a failure that happened on this connection and dispose of the
    /// connection accordingly.
    pub async fn fail(self, operation: &'static str, source: sqlx::Error) -> StorageError {
        let error = StorageError::from_sqlx(operation, source);
        if error.is_transient() {
            tracing::warn!("Discarding connection after {} failed: {}", operation, error);
            self.discard().await;
        } else {
            self.release();
        }
        error
    }
}

impl Deref for PooledConnection {
    type Target = PgConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}
