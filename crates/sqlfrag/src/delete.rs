//! DELETE statement builder.

use crate::clause::{Clauses, SqlWriter};
use crate::error::{QbError, QbResult};
use crate::expr::Expr;
use crate::param::IntoParams;
use crate::placeholder::Placeholder;
use crate::row::FromRow;
use crate::runner::{Decoration, ExecOutput, NoRunner, Runner, trace_statement};
use crate::traits::{BuiltQuery, Render};
use tokio_postgres::types::ToSql;
use tokio_util::sync::CancellationToken;

/// Fluent DELETE builder.
///
/// Mutators take the builder by value and hand it back, so calls chain. Clone a
/// partially built statement to reuse it as a common base.
///
/// Clauses are always emitted in this order, skipping those that are unset:
/// `prefix, DELETE <targets>, FROM, USING, JOIN..., WHERE, ORDER BY, LIMIT,
/// OFFSET, suffix, RETURNING`.
#[derive(Clone, Debug)]
#[must_use]
pub struct DeleteBuilder<R = NoRunner> {
    clauses: Clauses,
    placeholder: Option<Placeholder>,
    runner: Option<R>,
    decoration: Decoration,
}

impl DeleteBuilder<NoRunner> {
    /// Create a DELETE builder targeting `table`.
    ///
    /// An empty name leaves the target list empty, for statements that only
    /// name a FROM source.
    pub fn new(table: &str) -> Self {
        Self::with_defaults(table, None, None)
    }
}

impl<R> DeleteBuilder<R> {
    pub(crate) fn with_defaults(
        table: &str,
        placeholder: Option<Placeholder>,
        runner: Option<R>,
    ) -> Self {
        let mut clauses = Clauses::default();
        if !table.is_empty() {
            clauses.targets.push(table.to_string());
        }
        Self {
            clauses,
            placeholder,
            runner,
            decoration: Decoration::None,
        }
    }

    // ==================== Statement shape ====================

    /// Add a fragment before `DELETE`, e.g. a `WITH` clause.
    pub fn prefix(self, sql: &str, params: impl IntoParams) -> Self {
        self.prefix_expr(Expr::raw(sql, params))
    }

    /// Add a prefix expression.
    pub fn prefix_expr(mut self, expr: Expr) -> Self {
        self.clauses.prefixes.push(expr);
        self
    }

    /// Replace the target tables (the tables rows are deleted from).
    pub fn targets(mut self, tables: &[&str]) -> Self {
        self.clauses.targets = tables
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect();
        self
    }

    /// Set the FROM source. Last call wins; an empty string clears it.
    pub fn from(mut self, source: &str) -> Self {
        self.clauses.from = (!source.is_empty()).then(|| source.to_string());
        self
    }

    /// Add a USING table.
    pub fn using(mut self, table: &str) -> Self {
        self.clauses.using.push(table.to_string());
        self
    }

    /// Add several USING tables.
    pub fn using_tables(mut self, tables: &[&str]) -> Self {
        self.clauses
            .using
            .extend(tables.iter().map(|t| t.to_string()));
        self
    }

    // ==================== JOIN ====================

    /// Add a join clause exactly as written, e.g.
    /// `"INNER JOIN a2 ON a1.id = a2.ref_id"`.
    pub fn join_clause(mut self, sql: &str, params: impl IntoParams) -> Self {
        self.clauses.joins.push(Expr::raw(sql, params));
        self
    }

    /// Add `JOIN <sql>`.
    pub fn join(self, sql: &str, params: impl IntoParams) -> Self {
        self.join_clause(&format!("JOIN {sql}"), params)
    }

    /// Add `LEFT JOIN <sql>`.
    pub fn left_join(self, sql: &str, params: impl IntoParams) -> Self {
        self.join_clause(&format!("LEFT JOIN {sql}"), params)
    }

    /// Add `RIGHT JOIN <sql>`.
    pub fn right_join(self, sql: &str, params: impl IntoParams) -> Self {
        self.join_clause(&format!("RIGHT JOIN {sql}"), params)
    }

    /// Add `INNER JOIN <sql>`.
    pub fn inner_join(self, sql: &str, params: impl IntoParams) -> Self {
        self.join_clause(&format!("INNER JOIN {sql}"), params)
    }

    /// Add `JOIN <table> ON <condition>`.
    pub fn join_on(self, table: &str, condition: &str, params: impl IntoParams) -> Self {
        self.join_clause(&format!("JOIN {table} ON {condition}"), params)
    }

    // ==================== WHERE conditions ====================

    /// Add a WHERE fragment. Fragments are joined with `AND`.
    pub fn and_where(self, sql: &str, params: impl IntoParams) -> Self {
        self.and_expr(Expr::raw(sql, params))
    }

    /// Add a WHERE expression.
    pub fn and_expr(mut self, expr: Expr) -> Self {
        self.clauses.wheres.push(expr);
        self
    }

    /// Add WHERE: column = value
    pub fn eq<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.and_expr(Expr::eq(column, value))
    }

    /// Add WHERE: column <> value
    pub fn ne<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.and_expr(Expr::ne(column, value))
    }

    /// Add WHERE: column > value
    pub fn gt<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.and_expr(Expr::gt(column, value))
    }

    /// Add WHERE: column >= value
    pub fn gte<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.and_expr(Expr::gte(column, value))
    }

    /// Add WHERE: column < value
    pub fn lt<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.and_expr(Expr::lt(column, value))
    }

    /// Add WHERE: column <= value
    pub fn lte<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.and_expr(Expr::lte(column, value))
    }

    /// Add WHERE: column LIKE pattern
    pub fn like<T: ToSql + Send + Sync + 'static>(self, column: &str, pattern: T) -> Self {
        self.and_expr(Expr::like(column, pattern))
    }

    /// Add WHERE: column IN (values...)
    pub fn in_list<T: ToSql + Send + Sync + 'static>(self, column: &str, values: Vec<T>) -> Self {
        self.and_expr(Expr::in_list(column, values))
    }

    /// Add WHERE: column NOT IN (values...)
    pub fn not_in<T: ToSql + Send + Sync + 'static>(self, column: &str, values: Vec<T>) -> Self {
        self.and_expr(Expr::not_in(column, values))
    }

    /// Add WHERE: column IS NULL
    pub fn is_null(self, column: &str) -> Self {
        self.and_expr(Expr::is_null(column))
    }

    /// Add WHERE: column IS NOT NULL
    pub fn is_not_null(self, column: &str) -> Self {
        self.and_expr(Expr::is_not_null(column))
    }

    /// Add WHERE: column BETWEEN from AND to
    pub fn between<T: ToSql + Send + Sync + 'static>(self, column: &str, from: T, to: T) -> Self {
        self.and_expr(Expr::between(column, from, to))
    }

    // ==================== ORDER BY / LIMIT / OFFSET ====================

    /// Add an ORDER BY column or expression.
    pub fn order_by(mut self, column: &str) -> Self {
        self.clauses.order_bys.push(column.to_string());
        self
    }

    /// Add several ORDER BY columns.
    pub fn order_by_cols(mut self, columns: &[&str]) -> Self {
        self.clauses
            .order_bys
            .extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// Set LIMIT. Zero is rendered as `LIMIT 0`.
    pub fn limit(mut self, n: u64) -> Self {
        self.clauses.limit = Some(n);
        self
    }

    /// Set OFFSET. Zero is rendered as `OFFSET 0`.
    pub fn offset(mut self, n: u64) -> Self {
        self.clauses.offset = Some(n);
        self
    }

    // ==================== Suffix / RETURNING ====================

    /// Add a fragment after everything but RETURNING.
    pub fn suffix(self, sql: &str, params: impl IntoParams) -> Self {
        self.suffix_expr(Expr::raw(sql, params))
    }

    /// Add a suffix expression.
    pub fn suffix_expr(mut self, expr: Expr) -> Self {
        self.clauses.suffixes.push(expr);
        self
    }

    /// Add a RETURNING column or expression.
    pub fn returning(mut self, column: &str) -> Self {
        self.clauses.returning.push(Expr::raw(column, ()));
        self
    }

    /// Add several RETURNING columns.
    pub fn returning_cols(mut self, columns: &[&str]) -> Self {
        self.clauses
            .returning
            .extend(columns.iter().map(|c| Expr::raw(*c, ())));
        self
    }

    /// Add `RETURNING (<query>) AS <alias>`.
    ///
    /// The query is rendered each time this statement renders, and its values
    /// are spliced in at this position.
    pub fn returning_select<Q>(mut self, query: Q, alias: &str) -> Self
    where
        Q: Render + Send + Sync + 'static,
    {
        self.clauses.returning.push(Expr::aliased(query, alias));
        self
    }

    // ==================== Rendering options ====================

    /// Set the placeholder format used when rendering.
    pub fn placeholder(mut self, format: Placeholder) -> Self {
        self.placeholder = Some(format);
        self
    }

    /// Bind an execution backend.
    pub fn run_with<R2: Runner>(self, runner: R2) -> DeleteBuilder<R2> {
        DeleteBuilder {
            clauses: self.clauses,
            placeholder: self.placeholder,
            runner: Some(runner),
            decoration: self.decoration,
        }
    }

    /// Make `exec` return the affected row count.
    pub fn rows_affected(mut self) -> Self {
        self.decoration = Decoration::RowsAffected;
        self
    }

    /// Make `exec` return the generated id.
    pub fn last_insert_id(mut self) -> Self {
        self.decoration = Decoration::LastInsertId;
        self
    }

    // ==================== Build ====================

    /// Assemble the statement with canonical `?` markers.
    fn build(&self) -> QbResult<BuiltQuery> {
        let c = &self.clauses;
        let Some(source) = c.source() else {
            return Err(QbError::MissingTable);
        };

        let mut w = SqlWriter::new();
        w.exprs("", &c.prefixes, " ")?;
        w.keyword("DELETE");
        w.list("", c.named_targets(), ", ");
        w.keyword("FROM");
        w.keyword(&source);
        w.list("USING", &c.using, ", ");
        w.exprs("", &c.joins, " ")?;
        w.exprs("WHERE", &c.wheres, " AND ")?;
        w.list("ORDER BY", &c.order_bys, ", ");
        w.scalar("LIMIT", c.limit);
        w.scalar("OFFSET", c.offset);
        w.exprs("", &c.suffixes, " ")?;
        w.exprs("RETURNING", &c.returning, ", ")?;
        Ok(w.finish())
    }

    /// Render the statement in this builder's placeholder format.
    ///
    /// Pure: repeated calls without mutation return identical output.
    pub fn to_sql(&self) -> QbResult<BuiltQuery> {
        Ok(self
            .build()?
            .formatted(self.placeholder.unwrap_or_default()))
    }
}

impl<R: Runner> DeleteBuilder<R> {
    fn runner(&self) -> QbResult<&R> {
        self.runner.as_ref().ok_or(QbError::RunnerNotSet)
    }

    /// Render for `runner`: the builder's format wins, then the runner's.
    fn prepare(&self, runner: &R, op: &'static str) -> QbResult<BuiltQuery> {
        let format = self
            .placeholder
            .or_else(|| runner.placeholder())
            .unwrap_or_default();
        let built = self.build()?.formatted(format);
        trace_statement(op, &built);
        Ok(built)
    }

    /// Execute the statement.
    ///
    /// Returns the raw outcome, or the scalar selected by
    /// [`rows_affected`](Self::rows_affected) / [`last_insert_id`](Self::last_insert_id).
    pub async fn exec(&self) -> QbResult<ExecOutput<R::Outcome>> {
        let runner = self.runner()?;
        let built = self.prepare(runner, "exec")?;
        let outcome = runner.execute(&built.sql, &built.params).await?;
        self.decoration.apply(outcome)
    }

    /// [`exec`](Self::exec), forwarding `cancel` to the runner.
    pub async fn exec_cancellable(
        &self,
        cancel: &CancellationToken,
    ) -> QbResult<ExecOutput<R::Outcome>> {
        let runner = self.runner()?;
        let built = self.prepare(runner, "exec")?;
        let outcome = runner
            .execute_cancellable(cancel, &built.sql, &built.params)
            .await?;
        self.decoration.apply(outcome)
    }

    /// Run the statement and return all rows (for `RETURNING`).
    pub async fn query(&self) -> QbResult<Vec<R::Row>> {
        let runner = self.runner()?;
        let built = self.prepare(runner, "query")?;
        runner.query(&built.sql, &built.params).await
    }

    /// [`query`](Self::query), forwarding `cancel` to the runner.
    pub async fn query_cancellable(&self, cancel: &CancellationToken) -> QbResult<Vec<R::Row>> {
        let runner = self.runner()?;
        let built = self.prepare(runner, "query")?;
        runner
            .query_cancellable(cancel, &built.sql, &built.params)
            .await
    }

    /// Run the statement and return the first row.
    pub async fn query_row(&self) -> QbResult<R::Row> {
        let runner = self.runner()?;
        let built = self.prepare(runner, "query_row")?;
        runner.query_row(&built.sql, &built.params).await
    }

    /// [`query_row`](Self::query_row), forwarding `cancel` to the runner.
    pub async fn query_row_cancellable(&self, cancel: &CancellationToken) -> QbResult<R::Row> {
        let runner = self.runner()?;
        let built = self.prepare(runner, "query_row")?;
        runner
            .query_row_cancellable(cancel, &built.sql, &built.params)
            .await
    }

    /// Run the statement and map the first row into `T`.
    pub async fn scan<T: FromRow<R::Row>>(&self) -> QbResult<T> {
        let row = self.query_row().await?;
        T::from_row(&row)
    }

    /// [`scan`](Self::scan), forwarding `cancel` to the runner.
    pub async fn scan_cancellable<T: FromRow<R::Row>>(
        &self,
        cancel: &CancellationToken,
    ) -> QbResult<T> {
        let row = self.query_row_cancellable(cancel).await?;
        T::from_row(&row)
    }
}

impl<R> Render for DeleteBuilder<R> {
    fn render(&self) -> QbResult<BuiltQuery> {
        self.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Param;
    use crate::placeholder;

    fn shown(params: &[Param]) -> Vec<String> {
        params.iter().map(|p| format!("{p:?}")).collect()
    }

    #[test]
    fn full_statement() {
        let built = DeleteBuilder::new("")
            .prefix("WITH prefix AS ?", (0,))
            .from("a")
            .and_where("b = ?", (1,))
            .order_by("c")
            .limit(2)
            .offset(3)
            .suffix("RETURNING ?", (4,))
            .to_sql()
            .unwrap();

        assert_eq!(
            built.sql,
            "WITH prefix AS ? DELETE FROM a WHERE b = ? ORDER BY c LIMIT 2 OFFSET 3 RETURNING ?"
        );
        assert_eq!(shown(&built.params), ["0", "1", "4"]);
    }

    #[test]
    fn target_differs_from_source() {
        let built = DeleteBuilder::new("b")
            .from("a")
            .and_where("b = ?", (1,))
            .to_sql()
            .unwrap();
        assert_eq!(built.sql, "DELETE b FROM a WHERE b = ?");
        assert_eq!(shown(&built.params), ["1"]);
    }

    #[test]
    fn target_same_as_source() {
        let built = DeleteBuilder::new("a")
            .from("a")
            .and_where("b = ?", (1,))
            .to_sql()
            .unwrap();
        assert_eq!(built.sql, "DELETE FROM a WHERE b = ?");
        assert_eq!(shown(&built.params), ["1"]);
    }

    #[test]
    fn target_without_from() {
        let built = DeleteBuilder::new("a")
            .and_where("b = ?", (1,))
            .to_sql()
            .unwrap();
        assert_eq!(built.sql, "DELETE FROM a WHERE b = ?");
    }

    #[test]
    fn multiple_targets_with_joins() {
        let built = DeleteBuilder::new("")
            .targets(&["a1", "a2"])
            .from("z1 AS a1")
            .join_clause("INNER JOIN a2 ON a1.id = a2.ref_id", ())
            .join("a3", ())
            .and_where("b = ?", (1,))
            .to_sql()
            .unwrap();

        assert_eq!(
            built.sql,
            "DELETE a1, a2 FROM z1 AS a1 INNER JOIN a2 ON a1.id = a2.ref_id JOIN a3 WHERE b = ?"
        );
        assert_eq!(shown(&built.params), ["1"]);
    }

    #[test]
    fn using_tables() {
        let built = DeleteBuilder::new("a1")
            .using("a2")
            .and_where("id = a2.ref_id AND a2.num = ?", (42,))
            .to_sql()
            .unwrap();
        assert_eq!(
            built.sql,
            "DELETE FROM a1 USING a2 WHERE id = a2.ref_id AND a2.num = ?"
        );
        assert_eq!(shown(&built.params), ["42"]);

        let built = DeleteBuilder::new("a1")
            .using_tables(&["a2", "a3"])
            .and_where("id = a2.ref_id AND a2.num = ?", (42,))
            .to_sql()
            .unwrap();
        assert_eq!(
            built.sql,
            "DELETE FROM a1 USING a2, a3 WHERE id = a2.ref_id AND a2.num = ?"
        );
    }

    #[test]
    fn returning_columns() {
        let built = DeleteBuilder::new("a")
            .and_where("id = ?", (42,))
            .returning("bar")
            .to_sql()
            .unwrap();
        assert_eq!(built.sql, "DELETE FROM a WHERE id = ? RETURNING bar");
        assert_eq!(shown(&built.params), ["42"]);

        let built = DeleteBuilder::new("a")
            .returning_cols(&["id", "name"])
            .to_sql()
            .unwrap();
        assert_eq!(built.sql, "DELETE FROM a RETURNING id, name");
    }

    #[test]
    fn returning_select() {
        let select = Expr::raw("SELECT bar FROM b WHERE b.id = a.id", ());
        let built = DeleteBuilder::new("a")
            .and_where("id = ?", (42,))
            .returning_select(select, "bar")
            .to_sql()
            .unwrap();
        assert_eq!(
            built.sql,
            "DELETE FROM a WHERE id = ? RETURNING (SELECT bar FROM b WHERE b.id = a.id) AS bar"
        );
        assert_eq!(shown(&built.params), ["42"]);
    }

    #[test]
    fn returning_select_values_follow_text_order() {
        let select = Expr::raw("SELECT bar FROM b WHERE b.kind = ?", ("k",));
        let built = DeleteBuilder::new("a")
            .and_where("id = ?", (1,))
            .suffix("/* ? */", (2,))
            .returning_select(select, "bar")
            .placeholder(Placeholder::Dollar)
            .to_sql()
            .unwrap();
        assert_eq!(
            built.sql,
            "DELETE FROM a WHERE id = $1 /* $2 */ RETURNING (SELECT bar FROM b WHERE b.kind = $3) AS bar"
        );
        assert_eq!(shown(&built.params), ["1", "2", "\"k\""]);
    }

    #[test]
    fn nested_render_error_propagates() {
        let broken = DeleteBuilder::new("");
        let err = DeleteBuilder::new("a")
            .returning_select(broken, "x")
            .to_sql()
            .unwrap_err();
        assert!(err.is_missing_table());
    }

    #[test]
    fn zero_limit_and_offset() {
        let built = DeleteBuilder::new("")
            .from("b")
            .limit(0)
            .offset(0)
            .to_sql()
            .unwrap();
        assert_eq!(built.sql, "DELETE FROM b LIMIT 0 OFFSET 0");

        let built = DeleteBuilder::new("b").to_sql().unwrap();
        assert_eq!(built.sql, "DELETE FROM b");
    }

    #[test]
    fn limit_last_write_wins() {
        let built = DeleteBuilder::new("b").limit(5).limit(1).to_sql().unwrap();
        assert_eq!(built.sql, "DELETE FROM b LIMIT 1");
    }

    #[test]
    fn empty_fragments_leave_no_separators() {
        let sql = DeleteBuilder::new("a").and_where("", ()).to_sql().unwrap().sql;
        assert_eq!(sql, "DELETE FROM a");

        let sql = DeleteBuilder::new("a").suffix("", ()).to_sql().unwrap().sql;
        assert_eq!(sql, "DELETE FROM a");

        let sql = DeleteBuilder::new("a")
            .using("")
            .order_by("")
            .to_sql()
            .unwrap()
            .sql;
        assert_eq!(sql, "DELETE FROM a");

        let built = DeleteBuilder::new("a")
            .prefix("", ())
            .join_clause("", ())
            .and_where("", ())
            .eq("b", 1)
            .and_where("", ())
            .order_by_cols(&["", "c"])
            .to_sql()
            .unwrap();
        assert_eq!(built.sql, "DELETE FROM a WHERE b = ? ORDER BY c");
        assert_eq!(built.params.len(), 1);
    }

    #[test]
    fn missing_table_is_an_error() {
        let err = DeleteBuilder::new("").to_sql().unwrap_err();
        assert!(err.is_missing_table());

        let err = DeleteBuilder::new("").from("").to_sql().unwrap_err();
        assert!(err.is_missing_table());
    }

    #[test]
    fn placeholder_formats() {
        let b = DeleteBuilder::new("test").and_where("x = ? AND y = ?", (1, 2));

        let sql = b.clone().placeholder(Placeholder::Question).to_sql().unwrap().sql;
        assert_eq!(sql, "DELETE FROM test WHERE x = ? AND y = ?");

        let sql = b.placeholder(Placeholder::Dollar).to_sql().unwrap().sql;
        assert_eq!(sql, "DELETE FROM test WHERE x = $1 AND y = $2");
    }

    #[test]
    fn join_then_limit() {
        let built = DeleteBuilder::new("a")
            .from("A a")
            .join("B b ON a.c = b.c", ())
            .and_where("b.d = ?", (1,))
            .limit(2)
            .to_sql()
            .unwrap();
        assert_eq!(
            built.sql,
            "DELETE a FROM A a JOIN B b ON a.c = b.c WHERE b.d = ? LIMIT 2"
        );
        assert_eq!(shown(&built.params), ["1"]);
    }

    #[test]
    fn join_helpers() {
        let built = DeleteBuilder::new("o")
            .from("orders o")
            .left_join("users u ON u.id = o.user_id", ())
            .join_on("items i", "i.order_id = o.id AND i.sku = ?", ("x",))
            .is_null("u.id")
            .to_sql()
            .unwrap();
        assert_eq!(
            built.sql,
            "DELETE o FROM orders o LEFT JOIN users u ON u.id = o.user_id \
             JOIN items i ON i.order_id = o.id AND i.sku = ? WHERE u.id IS NULL"
        );
        assert_eq!(built.params.len(), 1);
    }

    #[test]
    fn marker_count_matches_values() {
        let built = DeleteBuilder::new("users")
            .prefix("WITH stale AS (SELECT id FROM sessions WHERE age > ?)", (30,))
            .eq("status", "inactive")
            .in_list("role", vec!["guest", "bot"])
            .between("id", 10_i64, 20_i64)
            .and_where("a = ? OR b = ?", (true, false))
            .to_sql()
            .unwrap();

        assert_eq!(placeholder::count(&built.sql), built.params.len());
        assert_eq!(
            shown(&built.params),
            ["30", "\"inactive\"", "\"guest\"", "\"bot\"", "10", "20", "true", "false"]
        );
        assert_eq!(
            built.sql,
            "WITH stale AS (SELECT id FROM sessions WHERE age > ?) DELETE FROM users \
             WHERE status = ? AND role IN (?, ?) AND id BETWEEN ? AND ? AND a = ? OR b = ?"
        );
    }

    #[test]
    fn render_is_idempotent() {
        let b = DeleteBuilder::new("t")
            .eq("a", 1)
            .returning("id")
            .placeholder(Placeholder::Dollar);
        let first = b.to_sql().unwrap();
        let second = b.to_sql().unwrap();
        assert_eq!(first.sql, second.sql);
        assert_eq!(shown(&first.params), shown(&second.params));
    }

    #[test]
    fn clones_diverge_independently() {
        let base = DeleteBuilder::new("events").lt("created_at", 100_i64);
        let archived = base.clone().eq("archived", true).to_sql().unwrap();
        let limited = base.clone().limit(10).to_sql().unwrap();
        let plain = base.to_sql().unwrap();

        assert_eq!(archived.sql, "DELETE FROM events WHERE created_at < ? AND archived = ?");
        assert_eq!(limited.sql, "DELETE FROM events WHERE created_at < ? LIMIT 10");
        assert_eq!(plain.sql, "DELETE FROM events WHERE created_at < ?");
        assert_eq!(archived.params.len(), 2);
        assert_eq!(plain.params.len(), 1);
    }

    #[test]
    fn nested_delete_keeps_canonical_markers() {
        let inner = DeleteBuilder::new("sessions")
            .eq("user_id", 7)
            .returning("user_id")
            .placeholder(Placeholder::Dollar);
        let built = DeleteBuilder::new("users")
            .prefix_expr(Expr::raw("WITH gone AS", ()))
            .prefix_expr(Expr::nested(inner))
            .and_where("id IN (SELECT user_id FROM gone) AND kind = ?", ("x",))
            .placeholder(Placeholder::Dollar)
            .to_sql()
            .unwrap();
        assert_eq!(
            built.sql,
            "WITH gone AS (DELETE FROM sessions WHERE user_id = $1 RETURNING user_id) \
             DELETE FROM users WHERE id IN (SELECT user_id FROM gone) AND kind = $2"
        );
    }
}
