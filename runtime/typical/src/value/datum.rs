//! Tuple slots.

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::typed::{AsAny, TypeToken, Typed};

/// One slot of a tuple.
///
/// `Absent` is an untyped nil: it has no runtime type and only matches `Any`
/// parameters. A present slot always knows its concrete type, even when the
/// value itself is a typed nil such as `None::<i64>`.
#[derive(Clone)]
pub enum Datum {
    Absent,
    Present {
        value: Arc<dyn Typed>,
        ty: TypeToken,
    },
}

impl Datum {
    /// Wrap a value.
    #[inline]
    pub fn new<T: Typed>(value: T) -> Self {
        Datum::from_arc(Arc::new(value))
    }

    /// Wrap an already shared value without copying it.
    #[inline]
    pub fn from_arc<T: Typed>(value: Arc<T>) -> Self {
        Datum::Present {
            value,
            ty: TypeToken::of::<T>(),
        }
    }

    /// The untyped nil.
    #[inline]
    pub fn absent() -> Self {
        Datum::Absent
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Datum::Absent)
    }

    /// Whether the slot holds no usable value: absent, or a typed nil.
    pub fn is_nil(&self) -> bool {
        match self {
            Datum::Absent => true,
            Datum::Present { value, .. } => value.is_nil(),
        }
    }

    /// The concrete runtime type, `None` for absent slots.
    #[inline]
    pub fn type_token(&self) -> Option<TypeToken> {
        match self {
            Datum::Absent => None,
            Datum::Present { ty, .. } => Some(*ty),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_token().map_or("absent", |ty| ty.name())
    }

    pub fn downcast_ref<T: Typed>(&self) -> Option<&T> {
        match self {
            Datum::Absent => None,
            Datum::Present { value, .. } => AsAny::as_any(&**value).downcast_ref::<T>(),
        }
    }

    pub fn downcast_arc<T: Typed>(&self) -> Option<Arc<T>> {
        self.as_any_arc()?.downcast::<T>().ok()
    }

    pub(crate) fn as_any_arc(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        match self {
            Datum::Absent => None,
            Datum::Present { value, .. } => Some(AsAny::into_any(Arc::clone(value))),
        }
    }
}

impl fmt::Debug for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Absent => f.write_str("absent"),
            Datum::Present { value, .. } => fmt::Debug::fmt(&**value, f),
        }
    }
}

/// The single slot of an error-variant `Value`.
///
/// Holds the concrete error (for exact-type matching and downcasts) together
/// with its `dyn Error` view.
#[derive(Clone)]
pub struct ErrorSlot {
    datum: Datum,
    error: Arc<dyn Error + Send + Sync>,
}

impl ErrorSlot {
    pub fn new<E: Error + Typed>(error: E) -> Self {
        let value = Arc::new(error);
        ErrorSlot {
            datum: Datum::from_arc(Arc::clone(&value)),
            error: value,
        }
    }

    pub(crate) fn from_parts(datum: Datum, error: Arc<dyn Error + Send + Sync>) -> Self {
        ErrorSlot { datum, error }
    }

    pub fn datum(&self) -> &Datum {
        &self.datum
    }

    pub fn error(&self) -> &Arc<dyn Error + Send + Sync> {
        &self.error
    }
}

impl fmt::Debug for ErrorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.datum.type_name(), self.error)
    }
}
