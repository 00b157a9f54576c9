//! Shared defaults for building many statements.

use crate::delete::DeleteBuilder;
use crate::placeholder::Placeholder;
use crate::runner::{NoRunner, Runner};

/// Carries a placeholder format and a runner into every builder it creates.
///
/// ```ignore
/// let sb = StatementBuilder::new()
///     .placeholder(Placeholder::Dollar)
///     .run_with(PgRunner::new(client));
///
/// sb.delete("sessions").lt("expires_at", now).exec().await?;
/// ```
#[derive(Clone, Debug)]
#[must_use]
pub struct StatementBuilder<R = NoRunner> {
    placeholder: Option<Placeholder>,
    runner: Option<R>,
}

impl StatementBuilder<NoRunner> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R> Default for StatementBuilder<R> {
    fn default() -> Self {
        Self {
            placeholder: None,
            runner: None,
        }
    }
}

impl<R: Clone> StatementBuilder<R> {
    /// Set the placeholder format for builders created from here on.
    pub fn placeholder(mut self, format: Placeholder) -> Self {
        self.placeholder = Some(format);
        self
    }

    /// Bind a runner for builders created from here on.
    pub fn run_with<R2: Runner + Clone>(self, runner: R2) -> StatementBuilder<R2> {
        StatementBuilder {
            placeholder: self.placeholder,
            runner: Some(runner),
        }
    }

    /// Start a DELETE on `table` with these defaults.
    pub fn delete(&self, table: &str) -> DeleteBuilder<R> {
        DeleteBuilder::with_defaults(table, self.placeholder, self.runner.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_flow_into_builders() {
        let sb = StatementBuilder::new().placeholder(Placeholder::Dollar);
        let built = sb.delete("a").eq("id", 1).to_sql().unwrap();
        assert_eq!(built.sql, "DELETE FROM a WHERE id = $1");
    }

    #[test]
    fn builders_do_not_share_state() {
        let sb = StatementBuilder::new();
        let _first = sb.delete("a").eq("id", 1);
        let second = sb.delete("b").to_sql().unwrap();
        assert_eq!(second.sql, "DELETE FROM b");
        assert!(second.params.is_empty());
    }
}
