//! Error types.
//!
//! A candidate that does not match is not an error: `Value::s` simply tries
//! the next one and returns the original value when nothing matches.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// A supplied candidate cannot be used as a handler.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum InvalidHandlerError {
    #[error("candidate of type `{type_name}` is not callable")]
    NotCallable { type_name: &'static str },
    #[error("handler `{name}` takes {arity} parameters, expected a niladic function")]
    NotNiladic { name: &'static str, arity: usize },
}

/// `AcceleratedRegistry::register` was given a sample that is not a handler.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("cannot register accelerated shim: `{type_name}` is not callable")]
pub struct InvalidRegistrationError {
    pub type_name: &'static str,
}

/// The error carried by an Error-variant `Value`, surfaced by the data
/// accessors.
///
/// `Value::first` and `Value::all` raise it as a panic payload
/// (`std::panic::panic_any`), so callers that catch the unwind can downcast
/// the payload to `PropagatedError`.
#[derive(Clone, thiserror::Error)]
#[error("{0}")]
pub struct PropagatedError(Arc<dyn Error + Send + Sync>);

impl PropagatedError {
    pub(crate) fn new(error: Arc<dyn Error + Send + Sync>) -> Self {
        PropagatedError(error)
    }

    /// The propagated error.
    pub fn inner(&self) -> &Arc<dyn Error + Send + Sync> {
        &self.0
    }

    /// The propagated error as a concrete type.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }
}

impl fmt::Debug for PropagatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropagatedError").field(&self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages_name_the_offending_type() {
        let err = InvalidHandlerError::NotCallable { type_name: "i64" };
        assert_eq!(err.to_string(), "candidate of type `i64` is not callable");

        let err = InvalidHandlerError::NotNiladic {
            name: "adder",
            arity: 2,
        };
        assert_eq!(
            err.to_string(),
            "handler `adder` takes 2 parameters, expected a niladic function"
        );

        let err = InvalidRegistrationError { type_name: "String" };
        assert_eq!(
            err.to_string(),
            "cannot register accelerated shim: `String` is not callable"
        );
    }

    #[test]
    fn propagated_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = PropagatedError::new(Arc::new(io));
        assert_eq!(err.to_string(), "missing");
        assert_eq!(
            err.downcast_ref::<std::io::Error>().map(std::io::Error::kind),
            Some(std::io::ErrorKind::NotFound)
        );
        assert!(err.downcast_ref::<std::fmt::Error>().is_none());
    }
}
