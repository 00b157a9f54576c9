//! Row mapping traits

use crate::error::{QbError, QbResult};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Maps a runner's row into a Rust value.
///
/// `Row` defaults to `tokio_postgres::Row`; custom runners pick their own row
/// type and implement this for the values they want to scan into.
pub trait FromRow<R = Row>: Sized {
    fn from_row(row: &R) -> QbResult<Self>;
}

/// Scanning into nothing succeeds for any row.
impl<R> FromRow<R> for () {
    fn from_row(_row: &R) -> QbResult<Self> {
        Ok(())
    }
}

fn column<'a, T: FromSql<'a>>(row: &'a Row, idx: usize) -> QbResult<T> {
    row.try_get(idx)
        .map_err(|e| QbError::decode(idx.to_string(), e.to_string()))
}

macro_rules! impl_from_row_tuple {
    ($($name:ident => $idx:tt),+) => {
        impl<$($name),+> FromRow<Row> for ($($name,)+)
        where
            $($name: for<'a> FromSql<'a>),+
        {
            fn from_row(row: &Row) -> QbResult<Self> {
                Ok(($(column::<$name>(row, $idx)?,)+))
            }
        }
    };
}

impl_from_row_tuple!(A => 0);
impl_from_row_tuple!(A => 0, B => 1);
impl_from_row_tuple!(A => 0, B => 1, C => 2);
impl_from_row_tuple!(A => 0, B => 1, C => 2, D => 3);
impl_from_row_tuple!(A => 0, B => 1, C => 2, D => 3, E => 4);
impl_from_row_tuple!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
