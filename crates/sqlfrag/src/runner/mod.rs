//! Execution backends and result decoration.
//!
//! A builder renders; a [`Runner`] executes. Builders are generic over the
//! runner they are bound to, and an unbound builder carries [`NoRunner`], which
//! has no values, so its execution methods always fail with
//! [`QbError::RunnerNotSet`] before anything is rendered.

use crate::error::{QbError, QbResult};
use crate::param::Param;
use crate::placeholder::Placeholder;
use crate::traits::BuiltQuery;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The execution backend a statement is sent to.
///
/// Only the final rendered `(sql, params)` pair is ever passed in. The
/// `*_cancellable` variants receive the caller's token; the default
/// implementations ignore it, so how quickly (or whether) a statement stops is
/// entirely up to the backend.
pub trait Runner: Send + Sync {
    /// A single result row.
    type Row: Send;
    /// What `execute` reports back.
    type Outcome: ExecOutcome + Send;

    /// Execute a statement.
    fn execute(
        &self,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Self::Outcome>> + Send;

    /// Execute a statement, forwarding a cancellation token.
    fn execute_cancellable(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Self::Outcome>> + Send {
        let _ = cancel;
        self.execute(sql, params)
    }

    /// Run a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Vec<Self::Row>>> + Send;

    /// Run a query and return all rows, forwarding a cancellation token.
    fn query_cancellable(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Vec<Self::Row>>> + Send {
        let _ = cancel;
        self.query(sql, params)
    }

    /// Run a query and return the **first** row.
    ///
    /// Semantics:
    /// - 0 rows: returns [`QbError::NotFound`]
    /// - 1 or more rows: returns the first row
    fn query_row(
        &self,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Self::Row>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            rows.into_iter()
                .next()
                .ok_or_else(|| QbError::not_found("Expected one row, got none"))
        }
    }

    /// Run a query and return the first row, forwarding a cancellation token.
    fn query_row_cancellable(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Self::Row>> + Send {
        async move {
            let rows = self.query_cancellable(cancel, sql, params).await?;
            rows.into_iter()
                .next()
                .ok_or_else(|| QbError::not_found("Expected one row, got none"))
        }
    }

    /// Placeholder format this backend expects, used when the builder has no
    /// explicit format of its own.
    fn placeholder(&self) -> Option<Placeholder> {
        None
    }
}

/// Scalar extraction from an execution result. Each accessor may fail
/// independently of the other.
pub trait ExecOutcome {
    fn rows_affected(&self) -> QbResult<u64>;
    fn last_insert_id(&self) -> QbResult<i64>;
}

/// tokio-postgres reports only the affected row count.
impl ExecOutcome for u64 {
    fn rows_affected(&self) -> QbResult<u64> {
        Ok(*self)
    }

    fn last_insert_id(&self) -> QbResult<i64> {
        Err(QbError::unsupported(
            "PostgreSQL does not report generated ids; use RETURNING instead",
        ))
    }
}

/// Which scalar `exec` should extract from the execution result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Decoration {
    /// Return the raw outcome.
    #[default]
    None,
    RowsAffected,
    LastInsertId,
}

impl Decoration {
    pub(crate) fn apply<O: ExecOutcome>(self, outcome: O) -> QbResult<ExecOutput<O>> {
        match self {
            Decoration::None => Ok(ExecOutput::Result(outcome)),
            Decoration::RowsAffected => outcome.rows_affected().map(ExecOutput::RowsAffected),
            Decoration::LastInsertId => outcome.last_insert_id().map(ExecOutput::LastInsertId),
        }
    }
}

/// What `exec` returns, shaped by the builder's [`Decoration`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecOutput<O> {
    Result(O),
    RowsAffected(u64),
    LastInsertId(i64),
}

impl<O> ExecOutput<O> {
    /// The raw outcome, if no decoration was requested.
    pub fn into_result(self) -> Option<O> {
        match self {
            ExecOutput::Result(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn rows_affected(&self) -> Option<u64> {
        match self {
            ExecOutput::RowsAffected(n) => Some(*n),
            _ => None,
        }
    }

    pub fn last_insert_id(&self) -> Option<i64> {
        match self {
            ExecOutput::LastInsertId(id) => Some(*id),
            _ => None,
        }
    }
}

/// The runner of a builder that has not been bound yet. Uninhabited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoRunner {}

impl Runner for NoRunner {
    type Row = ();
    type Outcome = u64;

    async fn execute(&self, _sql: &str, _params: &[Param]) -> QbResult<u64> {
        match *self {}
    }

    async fn query(&self, _sql: &str, _params: &[Param]) -> QbResult<Vec<()>> {
        match *self {}
    }
}

impl<T: Runner> Runner for &T {
    type Row = T::Row;
    type Outcome = T::Outcome;

    fn execute(
        &self,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Self::Outcome>> + Send {
        (**self).execute(sql, params)
    }

    fn execute_cancellable(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Self::Outcome>> + Send {
        (**self).execute_cancellable(cancel, sql, params)
    }

    fn query(
        &self,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Vec<Self::Row>>> + Send {
        (**self).query(sql, params)
    }

    fn query_cancellable(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Vec<Self::Row>>> + Send {
        (**self).query_cancellable(cancel, sql, params)
    }

    fn query_row(
        &self,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Self::Row>> + Send {
        (**self).query_row(sql, params)
    }

    fn query_row_cancellable(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Self::Row>> + Send {
        (**self).query_row_cancellable(cancel, sql, params)
    }

    fn placeholder(&self) -> Option<Placeholder> {
        (**self).placeholder()
    }
}

impl<T: Runner> Runner for Arc<T> {
    type Row = T::Row;
    type Outcome = T::Outcome;

    fn execute(
        &self,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Self::Outcome>> + Send {
        (**self).execute(sql, params)
    }

    fn execute_cancellable(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Self::Outcome>> + Send {
        (**self).execute_cancellable(cancel, sql, params)
    }

    fn query(
        &self,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Vec<Self::Row>>> + Send {
        (**self).query(sql, params)
    }

    fn query_cancellable(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Vec<Self::Row>>> + Send {
        (**self).query_cancellable(cancel, sql, params)
    }

    fn query_row(
        &self,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Self::Row>> + Send {
        (**self).query_row(sql, params)
    }

    fn query_row_cancellable(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[Param],
    ) -> impl std::future::Future<Output = QbResult<Self::Row>> + Send {
        (**self).query_row_cancellable(cancel, sql, params)
    }

    fn placeholder(&self) -> Option<Placeholder> {
        (**self).placeholder()
    }
}

/// Emit the statement about to run.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
pub(crate) fn trace_statement(op: &'static str, built: &BuiltQuery) {
    #[cfg(feature = "tracing")]
    tracing::debug!(
        target: "sqlfrag.sql",
        op,
        sql = %built.sql,
        param_count = built.params.len(),
    );
}
