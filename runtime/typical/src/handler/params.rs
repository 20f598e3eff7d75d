//! Handler parameters: how a closure argument declares its kind and pulls
//! itself out of a tuple slot.

use std::error::Error;
use std::ops::Deref;
use std::sync::Arc;

use super::ParamKind;
use crate::capability::{Cap, Capability, CapabilityId, CapabilityTable};
use crate::typed::{TypeToken, Typed};
use crate::value::Datum;

/// One slot handed to a handler.
#[derive(Clone, Copy)]
pub struct Arg<'a> {
    datum: &'a Datum,
    error: Option<&'a Arc<dyn Error + Send + Sync>>,
    capabilities: &'a CapabilityTable,
}

impl<'a> Arg<'a> {
    #[inline]
    pub fn datum(&self) -> &'a Datum {
        self.datum
    }

    /// The error view of the slot, set only when dispatching an error.
    #[inline]
    pub fn error(&self) -> Option<&'a Arc<dyn Error + Send + Sync>> {
        self.error
    }

    #[inline]
    pub fn capabilities(&self) -> &'a CapabilityTable {
        self.capabilities
    }
}

/// The slots of a matched tuple, in order.
#[derive(Clone, Copy)]
pub struct Arguments<'a> {
    slots: &'a [Datum],
    error: Option<&'a Arc<dyn Error + Send + Sync>>,
    capabilities: &'a CapabilityTable,
}

impl<'a> Arguments<'a> {
    pub(crate) fn new(
        slots: &'a [Datum],
        error: Option<&'a Arc<dyn Error + Send + Sync>>,
        capabilities: &'a CapabilityTable,
    ) -> Self {
        Arguments {
            slots,
            error,
            capabilities,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether these are the arguments of an error dispatch.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn get(&self, index: usize) -> Option<Arg<'a>> {
        self.slots.get(index).map(|datum| self.arg(datum))
    }

    pub fn iter(&self) -> impl Iterator<Item = Arg<'a>> + 'a {
        let (error, capabilities) = (self.error, self.capabilities);
        self.slots.iter().map(move |datum| Arg {
            datum,
            error,
            capabilities,
        })
    }

    fn arg(&self, datum: &'a Datum) -> Arg<'a> {
        Arg {
            datum,
            error: self.error,
            capabilities: self.capabilities,
        }
    }
}

/// A type usable as a handler parameter.
///
/// `extract` is only called after the matcher accepted the slot's type for
/// `kind()`, so it returns `None` only when that invariant is broken.
pub trait Param: Sized + 'static {
    fn kind() -> ParamKind;

    fn extract(arg: Arg<'_>) -> Option<Self>;
}

/// Concrete types are received by value.
impl<T: Typed + Clone> Param for T {
    fn kind() -> ParamKind {
        ParamKind::Exact(TypeToken::of::<T>())
    }

    fn extract(arg: Arg<'_>) -> Option<Self> {
        arg.datum.downcast_ref::<T>().cloned()
    }
}

/// Shared access to a concrete value, for types that are not `Clone`.
impl<T: Typed> Param for Arc<T> {
    fn kind() -> ParamKind {
        ParamKind::Exact(TypeToken::of::<T>())
    }

    fn extract(arg: Arg<'_>) -> Option<Self> {
        arg.datum.downcast_arc::<T>()
    }
}

impl<C: Capability> Param for Cap<C> {
    fn kind() -> ParamKind {
        ParamKind::Capability(CapabilityId::of::<C>())
    }

    fn extract(arg: Arg<'_>) -> Option<Self> {
        // An error slot already carries its `dyn Error` view, even when the
        // concrete type never declared the capability.
        if let Some(error) = arg.error {
            let view: Box<dyn std::any::Any> = Box::new(Arc::clone(error));
            if let Ok(object) = view.downcast::<Arc<C::Object>>() {
                return Some(Cap::from_parts(*object, arg.datum.clone()));
            }
        }
        let object = arg.capabilities.upcast::<C>(arg.datum)?;
        Some(Cap::from_parts(object, arg.datum.clone()))
    }
}

/// A parameter accepting any slot, including absent ones.
#[derive(Clone, Debug)]
pub struct AnyValue(pub Datum);

impl AnyValue {
    pub fn new<T: Typed>(value: T) -> Self {
        AnyValue(Datum::new(value))
    }

    pub fn into_inner(self) -> Datum {
        self.0
    }
}

impl Deref for AnyValue {
    type Target = Datum;

    fn deref(&self) -> &Datum {
        &self.0
    }
}

impl Param for AnyValue {
    fn kind() -> ParamKind {
        ParamKind::Any
    }

    fn extract(arg: Arg<'_>) -> Option<Self> {
        Some(AnyValue(arg.datum.clone()))
    }
}

/// The trailing variadic parameter of a handler built with
/// `Handler::variadic`. Holds zero or more slots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rest<T>(pub Vec<T>);

impl<T> Rest<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> Deref for Rest<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> IntoIterator for Rest<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Rest<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
