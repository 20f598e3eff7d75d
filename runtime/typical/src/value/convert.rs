//! Conversions from Rust values into tuple slots.

use super::Datum;
use crate::handler::AnyValue;
use crate::typed::Typed;

/// A value that can occupy one tuple slot.
pub trait IntoDatum {
    fn into_datum(self) -> Datum;
}

impl<T: Typed> IntoDatum for T {
    #[inline]
    fn into_datum(self) -> Datum {
        Datum::new(self)
    }
}

impl IntoDatum for Datum {
    #[inline]
    fn into_datum(self) -> Datum {
        self
    }
}

impl IntoDatum for AnyValue {
    #[inline]
    fn into_datum(self) -> Datum {
        self.0
    }
}

/// Literal data accepted by `Dispatcher::data`.
///
/// A single `Typed` value is a one-slot tuple, `()` is the empty tuple, and
/// Rust tuples map slot for slot.
pub trait IntoData {
    fn into_data(self) -> Vec<Datum>;
}

impl<T: Typed> IntoData for T {
    fn into_data(self) -> Vec<Datum> {
        vec![Datum::new(self)]
    }
}

impl IntoData for () {
    fn into_data(self) -> Vec<Datum> {
        Vec::new()
    }
}

impl IntoData for Datum {
    fn into_data(self) -> Vec<Datum> {
        vec![self]
    }
}

impl IntoData for AnyValue {
    fn into_data(self) -> Vec<Datum> {
        vec![self.0]
    }
}

impl IntoData for Vec<Datum> {
    fn into_data(self) -> Vec<Datum> {
        self
    }
}

impl<const N: usize> IntoData for [Datum; N] {
    fn into_data(self) -> Vec<Datum> {
        self.into()
    }
}

macro_rules! impl_into_data_tuple {
    ($($name:ident),+) => {
        impl<$($name: IntoDatum),+> IntoData for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_data(self) -> Vec<Datum> {
                let ($($name,)+) = self;
                vec![$($name.into_datum()),+]
            }
        }
    };
}

impl_into_data_tuple!(A);
impl_into_data_tuple!(A, B);
impl_into_data_tuple!(A, B, C);
impl_into_data_tuple!(A, B, C, D);
impl_into_data_tuple!(A, B, C, D, E);
impl_into_data_tuple!(A, B, C, D, E, F);
impl_into_data_tuple!(A, B, C, D, E, F, G);
impl_into_data_tuple!(A, B, C, D, E, F, G, H);
