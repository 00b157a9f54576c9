//! # sqlfrag
//!
//! A composable DELETE statement builder.
//!
//! ## Features
//!
//! - **Fragments, not ASTs**: every clause is raw SQL text plus its bound values
//! - **One marker everywhere**: fragments use `?`; the final statement is rewritten
//!   to `$N`, `:N` or `@pN` in a single left-to-right pass
//! - **Nested queries**: `RETURNING (SELECT ...) AS alias`, spliced at render time
//! - **Pluggable runners**: bind a [`PgRunner`], a [`PoolRunner`], or your own [`Runner`]
//! - **Cancellation**: every execution method has a `*_cancellable` variant
//!   taking a `tokio_util` [`CancellationToken`](tokio_util::sync::CancellationToken)
//!
//! ## Rendering
//!
//! ```ignore
//! use sqlfrag::{delete, Placeholder};
//!
//! let built = delete("users")
//!     .eq("status", "inactive")
//!     .lt("last_login", cutoff)
//!     .returning("id")
//!     .placeholder(Placeholder::Dollar)
//!     .to_sql()?;
//!
//! assert_eq!(
//!     built.sql,
//!     "DELETE FROM users WHERE status = $1 AND last_login < $2 RETURNING id"
//! );
//! ```
//!
//! ## Running
//!
//! ```ignore
//! use sqlfrag::{PgRunner, delete};
//!
//! let runner = PgRunner::new(client);
//! let removed = delete("sessions")
//!     .lt("expires_at", now)
//!     .run_with(&runner)
//!     .rows_affected()
//!     .exec()
//!     .await?;
//! ```

mod clause;
pub mod config;
pub mod delete;
pub mod error;
pub mod expr;
pub mod param;
pub mod placeholder;
pub mod postgres;
pub mod row;
pub mod runner;
pub mod statement;
pub mod traits;

pub use config::PgRunnerConfig;
pub use delete::DeleteBuilder;
pub use error::{QbError, QbResult};
pub use expr::Expr;
pub use param::{IntoParams, Param, ParamList};
pub use placeholder::Placeholder;
pub use postgres::PgRunner;
pub use row::FromRow;
pub use runner::{Decoration, ExecOutcome, ExecOutput, NoRunner, Runner};
pub use statement::StatementBuilder;
pub use traits::{BuiltQuery, Render};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{PoolRunner, create_pool, create_pool_with_config};

/// Start a DELETE on `table` with no runner and `?` markers.
pub fn delete(table: &str) -> DeleteBuilder {
    DeleteBuilder::new(table)
}
