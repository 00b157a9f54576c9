//! Placeholder formats.
//!
//! Every fragment is written with the canonical `?` marker. The marker is
//! rewritten into the dialect's syntax in one pass over the fully assembled
//! statement, so numbering always follows the final left-to-right order of the
//! text rather than the order fragments were added.

use std::fmt::Write;

/// The canonical, dialect-neutral marker.
pub const MARKER: char = '?';

/// Placeholder syntax of the target database.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `?` left untouched (MySQL, SQLite).
    #[default]
    Question,
    /// `$1, $2, ...` (PostgreSQL).
    Dollar,
    /// `:1, :2, ...` (Oracle).
    Colon,
    /// `@p1, @p2, ...` (SQL Server).
    AtP,
}

impl Placeholder {
    fn prefix(self) -> Option<&'static str> {
        match self {
            Placeholder::Question => None,
            Placeholder::Dollar => Some("$"),
            Placeholder::Colon => Some(":"),
            Placeholder::AtP => Some("@p"),
        }
    }

    /// Rewrite every `?` in `sql` into this format.
    ///
    /// The scan is naive: markers inside string literals or quoted identifiers
    /// are rewritten too.
    pub fn replace(self, sql: &str) -> String {
        let Some(prefix) = self.prefix() else {
            return sql.to_string();
        };

        let mut out = String::with_capacity(sql.len() + 4 * count(sql));
        let mut idx = 0usize;
        for ch in sql.chars() {
            if ch == MARKER {
                idx += 1;
                out.push_str(prefix);
                let _ = write!(out, "{idx}");
            } else {
                out.push(ch);
            }
        }
        out
    }
}

/// Count canonical markers in `sql`.
pub fn count(sql: &str) -> usize {
    sql.chars().filter(|&c| c == MARKER).count()
}
