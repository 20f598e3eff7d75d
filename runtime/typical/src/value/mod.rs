//! The value model: an immutable tuple of typed slots, or a single error.
//!
//! Values are produced by a `Dispatcher` and keep a handle to it, so
//! `Value::s` can be chained without passing the dispatcher around.

mod convert;
mod datum;

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::capability::CapabilityTable;
use crate::dispatcher::Dispatcher;
use crate::errors::{InvalidHandlerError, PropagatedError};
use crate::handler::{Arguments, Handler};
use crate::signature::Signature;
use crate::typed::Typed;

pub use convert::{IntoData, IntoDatum};
pub use datum::{Datum, ErrorSlot};

#[derive(Clone)]
pub(crate) enum Repr {
    Data(Arc<[Datum]>),
    Error(ErrorSlot),
}

/// Either a data tuple or a single propagated error.
///
/// Cloning is cheap and never copies slots.
#[derive(Clone)]
pub struct Value {
    dispatcher: Dispatcher,
    repr: Repr,
    signature: Signature,
}

impl Value {
    pub(crate) fn new(dispatcher: Dispatcher, repr: Repr, signature: Signature) -> Self {
        Value {
            dispatcher,
            repr,
            signature,
        }
    }

    /// Invoke the first handler that matches this value and wrap its result.
    ///
    /// Handlers are tried strictly in order. If none matches, the value is
    /// returned unchanged so the chain can continue. A panic raised by the
    /// invoked handler propagates to the caller.
    pub fn s(&self, handlers: &[Handler]) -> Value {
        let _span = tracing::trace_span!(
            "switch",
            signature = ?self.signature,
            candidates = handlers.len()
        )
        .entered();
        for handler in handlers {
            if let Some(next) = self.dispatcher.dispatch(self, handler) {
                return next;
            }
        }
        self.clone()
    }

    /// Like `s`, for candidates supplied as data.
    ///
    /// Candidates are checked as the scan reaches them. A candidate that is
    /// not a `Handler` fails the call with `InvalidHandlerError::NotCallable`;
    /// candidates after a match are never inspected.
    pub fn s_dyn(&self, candidates: &[Datum]) -> Result<Value, InvalidHandlerError> {
        let _span = tracing::trace_span!(
            "switch",
            signature = ?self.signature,
            candidates = candidates.len()
        )
        .entered();
        for candidate in candidates {
            let handler = candidate.downcast_ref::<Handler>().ok_or(
                InvalidHandlerError::NotCallable {
                    type_name: candidate.type_name(),
                },
            )?;
            if let Some(next) = self.dispatcher.dispatch(self, handler) {
                return Ok(next);
            }
        }
        Ok(self.clone())
    }

    /// The first slot, `None` for the empty tuple.
    ///
    /// # Panics
    /// Panics with a `PropagatedError` payload on the Error variant.
    pub fn first(&self) -> Option<&Datum> {
        match self.first_err() {
            Ok(first) => first,
            Err(error) => std::panic::panic_any(error),
        }
    }

    /// All slots.
    ///
    /// # Panics
    /// Panics with a `PropagatedError` payload on the Error variant.
    pub fn all(&self) -> &[Datum] {
        match self.all_err() {
            Ok(all) => all,
            Err(error) => std::panic::panic_any(error),
        }
    }

    pub fn first_err(&self) -> Result<Option<&Datum>, PropagatedError> {
        self.all_err().map(<[Datum]>::first)
    }

    pub fn all_err(&self) -> Result<&[Datum], PropagatedError> {
        match &self.repr {
            Repr::Data(slots) => Ok(&slots[..]),
            Repr::Error(slot) => Err(PropagatedError::new(Arc::clone(slot.error()))),
        }
    }

    /// The error, `None` unless this is the Error variant.
    pub fn error(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.error_slot().map(|slot| &**slot.error())
    }

    pub fn error_slot(&self) -> Option<&ErrorSlot> {
        match &self.repr {
            Repr::Data(_) => None,
            Repr::Error(slot) => Some(slot),
        }
    }

    /// The error as its concrete type.
    pub fn downcast_error<E: Typed>(&self) -> Option<&E> {
        self.error_slot()?.datum().downcast_ref::<E>()
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self.repr, Repr::Error(_))
    }

    /// Number of slots; an error counts as one.
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Data(slots) => slots.len(),
            Repr::Error(_) => 1,
        }
    }

    /// Whether this is the empty tuple.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Whether both values share the same underlying tuple or error.
    pub fn is_same(&self, other: &Value) -> bool {
        match (&self.repr, &other.repr) {
            (Repr::Data(a), Repr::Data(b)) => Arc::ptr_eq(a, b),
            (Repr::Error(a), Repr::Error(b)) => Arc::ptr_eq(a.error(), b.error()),
            _ => false,
        }
    }

    pub(crate) fn arguments<'a>(&'a self, capabilities: &'a CapabilityTable) -> Arguments<'a> {
        match &self.repr {
            Repr::Data(slots) => Arguments::new(slots, None, capabilities),
            Repr::Error(slot) => Arguments::new(
                std::slice::from_ref(slot.datum()),
                Some(slot.error()),
                capabilities,
            ),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Data(slots) => {
                f.write_str("Data")?;
                let mut tuple = f.debug_tuple("");
                for slot in slots.iter() {
                    tuple.field(slot);
                }
                tuple.finish()
            }
            Repr::Error(slot) => f.debug_tuple("Error").field(slot).finish(),
        }
    }
}
