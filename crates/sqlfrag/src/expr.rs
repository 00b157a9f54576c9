//! Expression fragments: the atomic unit every clause is built from.

use crate::error::QbResult;
use crate::param::{IntoParams, Param, ParamList};
use crate::traits::{BuiltQuery, Render};
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A SQL fragment and the values bound to its `?` markers.
///
/// Marker count is not checked against the number of values; a mismatch only
/// surfaces as a malformed statement at execution time.
#[derive(Clone)]
pub enum Expr {
    /// Caller-supplied text with its values.
    Raw { sql: String, params: Vec<Param> },

    /// Another renderable, emitted as `(<sql>)` or `(<sql>) AS <alias>`.
    /// Rendered lazily, each time the enclosing statement renders.
    Nested {
        query: Arc<dyn Render + Send + Sync>,
        alias: Option<String>,
    },
}

impl Expr {
    /// A raw fragment with `?` markers.
    pub fn raw(sql: impl Into<String>, params: impl IntoParams) -> Self {
        Expr::Raw {
            sql: sql.into(),
            params: params.into_params(),
        }
    }

    /// A nested query wrapped in parentheses.
    pub fn nested<Q: Render + Send + Sync + 'static>(query: Q) -> Self {
        Expr::Nested {
            query: Arc::new(query),
            alias: None,
        }
    }

    /// A nested query wrapped in parentheses and aliased: `(<sql>) AS alias`.
    pub fn aliased<Q: Render + Send + Sync + 'static>(query: Q, alias: &str) -> Self {
        Expr::Nested {
            query: Arc::new(query),
            alias: Some(alias.to_string()),
        }
    }

    fn compare<T: ToSql + Send + Sync + 'static>(column: &str, op: &str, value: T) -> Self {
        Expr::Raw {
            sql: format!("{column} {op} ?"),
            params: vec![Param::new(value)],
        }
    }

    /// column = ?
    pub fn eq<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, "=", value)
    }

    /// column <> ?
    pub fn ne<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, "<>", value)
    }

    /// column > ?
    pub fn gt<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, ">", value)
    }

    /// column >= ?
    pub fn gte<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, ">=", value)
    }

    /// column < ?
    pub fn lt<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, "<", value)
    }

    /// column <= ?
    pub fn lte<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, "<=", value)
    }

    /// column LIKE ?
    pub fn like<T: ToSql + Send + Sync + 'static>(column: &str, pattern: T) -> Self {
        Self::compare(column, "LIKE", pattern)
    }

    /// column NOT LIKE ?
    pub fn not_like<T: ToSql + Send + Sync + 'static>(column: &str, pattern: T) -> Self {
        Self::compare(column, "NOT LIKE", pattern)
    }

    pub fn is_null(column: &str) -> Self {
        Expr::raw(format!("{column} IS NULL"), ())
    }

    pub fn is_not_null(column: &str) -> Self {
        Expr::raw(format!("{column} IS NOT NULL"), ())
    }

    /// column IN (?, ?, ...). An empty list matches nothing (`1=0`).
    pub fn in_list<T: ToSql + Send + Sync + 'static>(column: &str, values: Vec<T>) -> Self {
        Self::list(column, "IN", values, "1=0")
    }

    /// column NOT IN (?, ?, ...). An empty list matches everything (`1=1`).
    pub fn not_in<T: ToSql + Send + Sync + 'static>(column: &str, values: Vec<T>) -> Self {
        Self::list(column, "NOT IN", values, "1=1")
    }

    fn list<T: ToSql + Send + Sync + 'static>(
        column: &str,
        op: &str,
        values: Vec<T>,
        when_empty: &str,
    ) -> Self {
        if values.is_empty() {
            return Expr::raw(when_empty, ());
        }
        let markers = vec!["?"; values.len()].join(", ");
        Expr::Raw {
            sql: format!("{column} {op} ({markers})"),
            params: values.into_iter().map(Param::new).collect(),
        }
    }

    /// column BETWEEN ? AND ?
    pub fn between<T: ToSql + Send + Sync + 'static>(column: &str, from: T, to: T) -> Self {
        Expr::Raw {
            sql: format!("{column} BETWEEN ? AND ?"),
            params: vec![Param::new(from), Param::new(to)],
        }
    }

    /// A raw fragment with no text. Clauses skip these entirely, values included.
    pub(crate) fn is_blank(&self) -> bool {
        matches!(self, Expr::Raw { sql, .. } if sql.is_empty())
    }

    /// Write this fragment's text into `sql` and its values into `params`.
    ///
    /// Nested queries are rendered here; their errors short-circuit.
    pub(crate) fn append_to(&self, sql: &mut String, params: &mut ParamList) -> QbResult<()> {
        match self {
            Expr::Raw { sql: text, params: values } => {
                sql.push_str(text);
                params.extend_params(values.iter().cloned());
            }
            Expr::Nested { query, alias } => {
                let built = query.render()?;
                sql.push('(');
                sql.push_str(&built.sql);
                sql.push(')');
                if let Some(alias) = alias {
                    sql.push_str(" AS ");
                    sql.push_str(alias);
                }
                params.extend_params(built.params);
            }
        }
        Ok(())
    }
}

impl Render for Expr {
    fn render(&self) -> QbResult<BuiltQuery> {
        let mut sql = String::new();
        let mut params = ParamList::new();
        self.append_to(&mut sql, &mut params)?;
        Ok(BuiltQuery::new(sql, params.into_vec()))
    }
}

impl std::fmt::Debug for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Raw { sql, params } => f
                .debug_struct("Raw")
                .field("sql", sql)
                .field("params", params)
                .finish(),
            Expr::Nested { alias, .. } => f
                .debug_struct("Nested")
                .field("query", &"<dyn Render>")
                .field("alias", alias)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QbError;

    fn shown(params: &[Param]) -> Vec<String> {
        params.iter().map(|p| format!("{p:?}")).collect()
    }

    struct Broken;

    impl Render for Broken {
        fn render(&self) -> QbResult<BuiltQuery> {
            Err(QbError::MissingTable)
        }
    }

    #[test]
    fn raw_keeps_text_and_values() {
        let built = Expr::raw("a = ? AND b = ?", (1_i32, 2_i32)).render().unwrap();
        assert_eq!(built.sql, "a = ? AND b = ?");
        assert_eq!(shown(&built.params), ["1", "2"]);
    }

    #[test]
    fn nested_is_parenthesized_and_aliased() {
        let inner = Expr::raw("SELECT bar FROM b WHERE b.id = a.id", ());
        let built = Expr::aliased(inner, "bar").render().unwrap();
        assert_eq!(built.sql, "(SELECT bar FROM b WHERE b.id = a.id) AS bar");
        assert!(built.params.is_empty());

        let built = Expr::nested(Expr::raw("SELECT 1", ())).render().unwrap();
        assert_eq!(built.sql, "(SELECT 1)");
    }

    #[test]
    fn nested_values_are_spliced() {
        let inner = Expr::raw("SELECT x FROM t WHERE y = ?", (7_i32,));
        let mut sql = String::from("a = ? AND b IN ");
        let mut params = ParamList::new();
        params.extend_params([Param::new(1_i32)]);
        Expr::nested(inner).append_to(&mut sql, &mut params).unwrap();
        Expr::raw(" AND c = ?", (9_i32,))
            .append_to(&mut sql, &mut params)
            .unwrap();

        assert_eq!(sql, "a = ? AND b IN (SELECT x FROM t WHERE y = ?) AND c = ?");
        assert_eq!(shown(&params.into_vec()), ["1", "7", "9"]);
    }

    #[test]
    fn nested_error_propagates() {
        let err = Expr::aliased(Broken, "x").render().unwrap_err();
        assert!(err.is_missing_table());
    }

    #[test]
    fn comparison_helpers() {
        assert_eq!(Expr::eq("id", 1_i64).render().unwrap().sql, "id = ?");
        assert_eq!(Expr::ne("id", 1_i64).render().unwrap().sql, "id <> ?");
        assert_eq!(Expr::lte("age", 3_i32).render().unwrap().sql, "age <= ?");
        assert_eq!(
            Expr::not_like("name", "%x").render().unwrap().sql,
            "name NOT LIKE ?"
        );
        assert_eq!(Expr::is_null("deleted_at").render().unwrap().sql, "deleted_at IS NULL");
    }

    #[test]
    fn in_list_and_empty_lists() {
        let built = Expr::in_list("id", vec![1_i64, 2, 3]).render().unwrap();
        assert_eq!(built.sql, "id IN (?, ?, ?)");
        assert_eq!(built.params.len(), 3);

        assert_eq!(Expr::in_list("id", Vec::<i64>::new()).render().unwrap().sql, "1=0");
        assert_eq!(Expr::not_in("id", Vec::<i64>::new()).render().unwrap().sql, "1=1");
    }

    #[test]
    fn only_empty_raw_text_is_blank() {
        assert!(Expr::raw("", ()).is_blank());
        assert!(!Expr::raw("a = 1", ()).is_blank());
        assert!(!Expr::nested(Expr::raw("", ())).is_blank());
    }

    #[test]
    fn between_binds_both_bounds() {
        let built = Expr::between("age", 18_i32, 65_i32).render().unwrap();
        assert_eq!(built.sql, "age BETWEEN ? AND ?");
        assert_eq!(shown(&built.params), ["18", "65"]);
    }
}
