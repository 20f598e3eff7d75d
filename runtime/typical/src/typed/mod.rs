//! Runtime type identity for tuple slots and handler parameters.
//!
//! Every type that can travel through a `Value` implements `Typed`. The trait
//! is deliberately opt-in: it is where a type declares whether an instance is
//! a typed nil and which capabilities it provides.

mod std_impls;

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::capability::{self, Capabilities, CapabilitySet};

/// Erasure helpers for `Typed` trait objects.
///
/// Implemented for every `Any + Send + Sync` type; never implement by hand.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A type that may occupy a tuple slot or be declared as a handler parameter.
///
/// ```text
/// #[derive(Clone, Debug)]
/// struct Celsius(f64);
///
/// impl Typed for Celsius {}
/// ```
///
/// Error types must declare the error capability. An error-variant value is
/// accepted by `AnyError` either way, but an error sitting in a data slot
/// only reaches `AnyError` (or any refined error capability) when its type
/// declares it. `typed_error!` writes the impl:
///
/// ```text
/// typed_error!(ParseFailure);
///
/// // equivalent to
/// impl Typed for ParseFailure {
///     fn capabilities(caps: &mut Capabilities<'_, Self>) {
///         caps.error();
///     }
/// }
/// ```
pub trait Typed: AsAny + fmt::Debug {
    /// Whether this instance is a typed nil (a present slot holding no value).
    fn is_nil(&self) -> bool {
        false
    }

    /// Declare the capabilities this type provides.
    fn capabilities(caps: &mut Capabilities<'_, Self>)
    where
        Self: Sized,
    {
        let _ = caps;
    }
}

/// Implements `Typed` for error types, declaring the error capability.
///
/// Use `Typed::capabilities` directly for errors that provide further
/// capabilities.
#[macro_export]
macro_rules! typed_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::Typed for $ty {
                fn capabilities(caps: &mut $crate::Capabilities<'_, Self>) {
                    caps.error();
                }
            }
        )*
    };
}

/// Process-stable identity of a `Typed` type.
///
/// Equality and hashing use the `TypeId` only; the name is for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeToken {
    id: TypeId,
    name: &'static str,
    describe: fn(&mut CapabilitySet),
}

impl TypeToken {
    /// The token for `T`.
    #[inline]
    pub fn of<T: Typed>() -> Self {
        TypeToken {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            describe: capability::describe::<T>,
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Collect the capabilities declared by this type into `set`.
    pub(crate) fn describe(&self, set: &mut CapabilitySet) {
        (self.describe)(set);
    }
}

impl PartialEq for TypeToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeToken {}

impl Hash for TypeToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
