//! `Typed` implementations for standard library types.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::time::Duration;

use super::Typed;

macro_rules! impl_typed {
    ($($ty:ty),* $(,)?) => {
        $(impl Typed for $ty {})*
    };
}

impl_typed!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
    Duration,
);

crate::typed_error!(
    std::io::Error,
    std::fmt::Error,
    std::num::ParseIntError,
    std::num::ParseFloatError,
);

impl<T: Typed> Typed for Option<T> {
    fn is_nil(&self) -> bool {
        self.is_none()
    }
}

impl<T: Typed> Typed for Vec<T> {}

impl<K, V, S> Typed for HashMap<K, V, S>
where
    K: Typed + Eq + Hash,
    V: Typed,
    S: Send + Sync + 'static,
{
}

impl<K: Typed + Ord, V: Typed> Typed for BTreeMap<K, V> {}
