//! Connection pool utilities

use crate::config::PgRunnerConfig;
use crate::error::{QbError, QbResult};
use crate::param::{Param, as_refs};
use crate::placeholder::Placeholder;
use crate::postgres::{race, server_cancel, spawn_cancel};
use crate::runner::Runner;
use deadpool_postgres::{Manager, ManagerConfig, Pool, PoolBuilder, RecyclingMethod};
use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};
use tokio_postgres::{NoTls, Row, Socket};
use tokio_util::sync::CancellationToken;

/// Create a connection pool from a database URL.
///
/// This is a convenience helper that uses `NoTls` and small default settings
/// (suitable for local/dev). Use [`create_pool_with_manager_config`] to pass a
/// TLS connector or tune the pool.
pub fn create_pool(database_url: &str) -> QbResult<Pool> {
    create_pool_with_config(database_url, 16)
}

/// Create a connection pool with a custom maximum size.
pub fn create_pool_with_config(database_url: &str, max_size: usize) -> QbResult<Pool> {
    create_pool_with_manager_config(database_url, NoTls, default_manager_config(), |builder| {
        builder.max_size(max_size)
    })
}

/// Create a connection pool with injected `deadpool_postgres::ManagerConfig` and `PoolBuilder`.
pub fn create_pool_with_manager_config<T>(
    database_url: &str,
    tls: T,
    manager_config: ManagerConfig,
    configure_pool: impl FnOnce(PoolBuilder) -> PoolBuilder,
) -> QbResult<Pool>
where
    T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
    T::Stream: Sync + Send,
    T::TlsConnect: Sync + Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| QbError::Connection(e.to_string()))?;

    let mgr = Manager::from_config(pg_config, tls, manager_config);
    configure_pool(Pool::builder(mgr))
        .build()
        .map_err(|e| QbError::Pool(e.to_string()))
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}

/// Runs each statement on a connection checked out from a pool.
///
/// The connection goes back to the pool as soon as the statement finishes. A
/// statement abandoned on timeout or cancellation keeps its connection until
/// the server-side cancel request has been sent.
#[derive(Clone)]
pub struct PoolRunner {
    pool: Pool,
    config: PgRunnerConfig,
}

impl PoolRunner {
    pub fn new(pool: Pool) -> Self {
        Self::with_config(pool, PgRunnerConfig::default())
    }

    pub fn with_config(pool: Pool, config: PgRunnerConfig) -> Self {
        Self { pool, config }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn config(&self) -> &PgRunnerConfig {
        &self.config
    }

    async fn execute_inner(
        &self,
        cancel: Option<&CancellationToken>,
        sql: &str,
        params: &[Param],
    ) -> QbResult<u64> {
        let client = self.pool.get().await?;
        let refs = as_refs(params);
        race(&self.config, cancel, client.execute(sql, &refs))
            .await
            .settle(&self.config, move |reason| {
                spawn_cancel(server_cancel(&client), reason, client)
            })
    }

    async fn query_inner(
        &self,
        cancel: Option<&CancellationToken>,
        sql: &str,
        params: &[Param],
    ) -> QbResult<Vec<Row>> {
        let client = self.pool.get().await?;
        let refs = as_refs(params);
        race(&self.config, cancel, client.query(sql, &refs))
            .await
            .settle(&self.config, move |reason| {
                spawn_cancel(server_cancel(&client), reason, client)
            })
    }
}

impl Runner for PoolRunner {
    type Row = Row;
    type Outcome = u64;

    async fn execute(&self, sql: &str, params: &[Param]) -> QbResult<u64> {
        self.execute_inner(None, sql, params).await
    }

    async fn execute_cancellable(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[Param],
    ) -> QbResult<u64> {
        self.execute_inner(Some(cancel), sql, params).await
    }

    async fn query(&self, sql: &str, params: &[Param]) -> QbResult<Vec<Row>> {
        self.query_inner(None, sql, params).await
    }

    async fn query_cancellable(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[Param],
    ) -> QbResult<Vec<Row>> {
        self.query_inner(Some(cancel), sql, params).await
    }

    fn placeholder(&self) -> Option<Placeholder> {
        Some(self.config.placeholder)
    }
}
