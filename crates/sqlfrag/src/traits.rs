//! Trait definitions shared by builders and fragments.

use crate::error::QbResult;
use crate::param::{Param, as_refs};
use crate::placeholder::Placeholder;
use tokio_postgres::types::ToSql;

/// Anything that can render itself into SQL text plus ordered parameters.
///
/// Implementations must emit the canonical `?` marker. Dialect formatting is
/// applied once by the outermost statement, never by a nested one.
pub trait Render {
    fn render(&self) -> QbResult<BuiltQuery>;
}

/// The result of building a query.
#[derive(Debug, Clone, Default)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Param>,
}

impl BuiltQuery {
    /// Create a new built query.
    pub fn new(sql: String, params: Vec<Param>) -> Self {
        Self { sql, params }
    }

    /// Rewrite the markers of this query into `format`.
    pub fn formatted(self, format: Placeholder) -> Self {
        Self {
            sql: format.replace(&self.sql),
            params: self.params,
        }
    }

    /// Get parameters as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        as_refs(&self.params)
    }
}

impl<T: Render + ?Sized> Render for &T {
    fn render(&self) -> QbResult<BuiltQuery> {
        (**self).render()
    }
}

impl<T: Render + ?Sized> Render for std::sync::Arc<T> {
    fn render(&self) -> QbResult<BuiltQuery> {
        (**self).render()
    }
}
