//! Clause slots and the writer that renders them.

use crate::error::QbResult;
use crate::expr::Expr;
use crate::param::ParamList;
use crate::traits::BuiltQuery;

/// Ordered, named slots of a DELETE statement.
///
/// Each slot keeps fragments in call order. Scalar slots are `Option`s so that
/// an explicit zero is distinct from "never set".
#[derive(Clone, Debug, Default)]
pub(crate) struct Clauses {
    pub prefixes: Vec<Expr>,
    pub targets: Vec<String>,
    pub from: Option<String>,
    pub using: Vec<String>,
    pub joins: Vec<Expr>,
    pub wheres: Vec<Expr>,
    pub order_bys: Vec<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub suffixes: Vec<Expr>,
    pub returning: Vec<Expr>,
}

impl Clauses {
    /// Target tables that must be named between `DELETE` and `FROM`.
    ///
    /// Empty when there is no explicit FROM (targets then act as the source),
    /// or when the only target is the FROM source itself.
    pub fn named_targets(&self) -> &[String] {
        match self.from.as_deref() {
            Some(from) if !(self.targets.len() == 1 && self.targets[0] == from) => &self.targets,
            _ => &[],
        }
    }

    /// The text that follows `FROM`, if any.
    pub fn source(&self) -> Option<String> {
        match &self.from {
            Some(from) => Some(from.clone()),
            None if !self.targets.is_empty() => Some(self.targets.join(", ")),
            None => None,
        }
    }
}

/// Accumulates SQL text and parameters side by side.
///
/// Every clause method separates itself from previous output with a single
/// space and writes nothing at all when its slot is empty.
#[derive(Debug, Default)]
pub(crate) struct SqlWriter {
    sql: String,
    params: ParamList,
}

impl SqlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn space(&mut self) {
        if !self.sql.is_empty() {
            self.sql.push(' ');
        }
    }

    /// A bare keyword such as `DELETE`.
    pub fn keyword(&mut self, keyword: &str) {
        self.space();
        self.sql.push_str(keyword);
    }

    /// `KEYWORD item<sep>item...`, or `item<sep>item...` when `keyword` is empty.
    /// Empty items are skipped; a slot with only empty items writes nothing.
    pub fn list(&mut self, keyword: &str, items: &[String], sep: &str) {
        let mut items = items.iter().filter(|item| !item.is_empty()).peekable();
        if items.peek().is_none() {
            return;
        }
        self.space();
        if !keyword.is_empty() {
            self.sql.push_str(keyword);
            self.sql.push(' ');
        }
        for (i, item) in items.enumerate() {
            if i > 0 {
                self.sql.push_str(sep);
            }
            self.sql.push_str(item);
        }
    }

    /// Like [`SqlWriter::list`], for fragments carrying values.
    pub fn exprs(&mut self, keyword: &str, exprs: &[Expr], sep: &str) -> QbResult<()> {
        let mut exprs = exprs.iter().filter(|expr| !expr.is_blank()).peekable();
        if exprs.peek().is_none() {
            return Ok(());
        }
        self.space();
        if !keyword.is_empty() {
            self.sql.push_str(keyword);
            self.sql.push(' ');
        }
        for (i, expr) in exprs.enumerate() {
            if i > 0 {
                self.sql.push_str(sep);
            }
            expr.append_to(&mut self.sql, &mut self.params)?;
        }
        Ok(())
    }

    /// `KEYWORD n` when `value` is set. Zero is written.
    pub fn scalar(&mut self, keyword: &str, value: Option<u64>) {
        if let Some(n) = value {
            self.space();
            self.sql.push_str(keyword);
            self.sql.push(' ');
            self.sql.push_str(&n.to_string());
        }
    }

    pub fn finish(self) -> BuiltQuery {
        BuiltQuery::new(self.sql, self.params.into_vec())
    }
}
