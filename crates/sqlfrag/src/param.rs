//! Parameter storage using Arc for clone-friendly builders.

use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A clone-friendly bound value.
///
/// Builders are cloned to share partially built statements, so values are kept
/// behind an `Arc` instead of being copied.
#[derive(Clone)]
pub struct Param(pub(crate) Arc<dyn ToSql + Send + Sync>);

impl Param {
    /// Create a new parameter from any ToSql value.
    pub fn new<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Param(Arc::new(value))
    }

    /// Get a reference to the inner value as a ToSql trait object.
    pub fn as_ref(&self) -> &(dyn ToSql + Sync) {
        &*self.0 as &(dyn ToSql + Sync)
    }
}

impl std::fmt::Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // ToSql: Debug, so the bound value shows through.
        std::fmt::Debug::fmt(&*self.0, f)
    }
}

/// An ordered collection of parameters, aligned with the markers of the SQL
/// text being assembled next to it.
#[derive(Clone, Debug, Default)]
pub struct ParamList {
    params: Vec<Param>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Extend this list with parameters from an iterator.
    pub fn extend_params(&mut self, params: impl IntoIterator<Item = Param>) {
        self.params.extend(params);
    }

    pub fn into_vec(self) -> Vec<Param> {
        self.params
    }
}

/// Get all parameters as references for tokio-postgres.
pub fn as_refs(params: &[Param]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p.as_ref()).collect()
}

/// Conversion into the ordered argument list of a fragment.
///
/// Implemented for `()` (no arguments), tuples of up to eight `ToSql` values,
/// and `Vec<Param>` (see [`params!`](crate::params)).
pub trait IntoParams {
    fn into_params(self) -> Vec<Param>;
}

impl IntoParams for () {
    fn into_params(self) -> Vec<Param> {
        Vec::new()
    }
}

impl IntoParams for Vec<Param> {
    fn into_params(self) -> Vec<Param> {
        self
    }
}

impl IntoParams for Param {
    fn into_params(self) -> Vec<Param> {
        vec![self]
    }
}

macro_rules! impl_into_params_tuple {
    ($($name:ident),+) => {
        impl<$($name),+> IntoParams for ($($name,)+)
        where
            $($name: ToSql + Send + Sync + 'static),+
        {
            #[allow(non_snake_case)]
            fn into_params(self) -> Vec<Param> {
                let ($($name,)+) = self;
                vec![$(Param::new($name)),+]
            }
        }
    };
}

impl_into_params_tuple!(A);
impl_into_params_tuple!(A, B);
impl_into_params_tuple!(A, B, C);
impl_into_params_tuple!(A, B, C, D);
impl_into_params_tuple!(A, B, C, D, E);
impl_into_params_tuple!(A, B, C, D, E, F);
impl_into_params_tuple!(A, B, C, D, E, F, G);
impl_into_params_tuple!(A, B, C, D, E, F, G, H);

/// Build a `Vec<Param>` from heterogeneous values.
///
/// ```ignore
/// let params = sqlfrag::params![1_i64, "active", true];
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Param>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Param::new($value)),+]
    };
}
