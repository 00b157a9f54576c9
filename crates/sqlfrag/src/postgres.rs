//! tokio-postgres runner.

use crate::config::PgRunnerConfig;
use crate::error::{QbError, QbResult};
use crate::param::{Param, as_refs};
use crate::placeholder::Placeholder;
use crate::runner::Runner;
use std::future::Future;
use std::time::Duration;
use tokio_postgres::{Client, GenericClient, NoTls, Row};
use tokio_util::sync::CancellationToken;

/// Runs statements on a tokio-postgres client or transaction.
///
/// ```ignore
/// let runner = PgRunner::new(client);
/// let n = delete("sessions")
///     .lt("expires_at", now)
///     .run_with(&runner)
///     .rows_affected()
///     .exec()
///     .await?;
/// ```
pub struct PgRunner<C> {
    client: C,
    config: PgRunnerConfig,
}

impl<C: GenericClient + Send + Sync> PgRunner<C> {
    pub fn new(client: C) -> Self {
        Self::with_config(client, PgRunnerConfig::default())
    }

    pub fn with_config(client: C, config: PgRunnerConfig) -> Self {
        Self { client, config }
    }

    /// Get a reference to the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &PgRunnerConfig {
        &self.config
    }

    /// Consume the runner and return the client.
    pub fn into_inner(self) -> C {
        self.client
    }

    async fn execute_inner(
        &self,
        cancel: Option<&CancellationToken>,
        sql: &str,
        params: &[Param],
    ) -> QbResult<u64> {
        let refs = as_refs(params);
        race(&self.config, cancel, self.client.execute(sql, &refs))
            .await
            .settle(&self.config, |reason| {
                spawn_cancel(server_cancel(self.client.client()), reason, ())
            })
    }

    async fn query_inner(
        &self,
        cancel: Option<&CancellationToken>,
        sql: &str,
        params: &[Param],
    ) -> QbResult<Vec<Row>> {
        let refs = as_refs(params);
        race(&self.config, cancel, self.client.query(sql, &refs))
            .await
            .settle(&self.config, |reason| {
                spawn_cancel(server_cancel(self.client.client()), reason, ())
            })
    }
}

impl<C: GenericClient + Send + Sync> Runner for PgRunner<C> {
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

/// How a database call raced against the timeout and the token.
pub(crate) enum Raced<T> {
    Done(QbResult<T>),
    TimedOut(Duration),
    Cancelled,
}

impl<T> Raced<T> {
    /// Turn the race into a result, calling `on_abort` when the statement may
    /// still be running on the server.
    pub(crate) fn settle(
        self,
        config: &PgRunnerConfig,
        on_abort: impl FnOnce(&'static str),
    ) -> QbResult<T> {
        match self {
            Raced::Done(result) => result,
            Raced::TimedOut(elapsed) => {
                on_abort("timeout");
                Err(QbError::Timeout(elapsed))
            }
            Raced::Cancelled => {
                if config.cancel_on_abort {
                    on_abort("token cancelled");
                }
                Err(QbError::Cancelled)
            }
        }
    }
}

/// Drive a database call under the configured timeout and an optional
/// cancellation token. Whichever finishes first decides the outcome; the call
/// future is dropped before this returns.
pub(crate) async fn race<T, F>(
    config: &PgRunnerConfig,
    cancel: Option<&CancellationToken>,
    future: F,
) -> Raced<T>
where
    F: Future<Output = Result<T, tokio_postgres::Error>>,
{
    if cancel.is_some_and(CancellationToken::is_cancelled) {
        return Raced::Done(Err(QbError::Cancelled));
    }

    tokio::select! {
        result = future => Raced::Done(result.map_err(QbError::from_db_error)),
        elapsed = sleep_for(config.query_timeout) => Raced::TimedOut(elapsed),
        _ = wait_cancelled(cancel) => Raced::Cancelled,
    }
}

/// Sleep for `timeout`, or forever if there is none.
async fn sleep_for(timeout: Option<Duration>) -> Duration {
    match timeout {
        Some(timeout) => {
            tokio::time::sleep(timeout).await;
            timeout
        }
        None => std::future::pending().await,
    }
}

async fn wait_cancelled(cancel: Option<&CancellationToken>) {
    match cancel {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

/// A cancel request for whatever `client` is running right now.
pub(crate) fn server_cancel(client: &Client) -> impl Future<Output = ()> + Send + use<> {
    let cancel_token = client.cancel_token();
    async move {
        let _ = cancel_token.cancel_query(NoTls).await;
    }
}

/// Send `request` in the background. `hold` is dropped only once the request
/// has finished, so a pooled connection cannot be handed out while its cancel
/// is still in flight.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
pub(crate) fn spawn_cancel<Fut, H>(request: Fut, reason: &'static str, hold: H)
where
    Fut: Future<Output = ()> + Send + 'static,
    H: Send + 'static,
{
    #[cfg(feature = "tracing")]
    tracing::warn!(target: "sqlfrag.sql", reason, "cancelling statement on server");

    tokio::spawn(async move {
        request.await;
        drop(hold);
    });
}
