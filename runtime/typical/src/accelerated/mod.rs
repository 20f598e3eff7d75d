//! Accelerated call path.
//!
//! A shim is a hand-written invocation for one exact callable type. When the
//! dispatcher invokes a handler whose callable type has a registered shim, it
//! calls the shim instead of the generic extraction path. A shim must behave
//! exactly like the generic path; returning `None` falls back to it.
//!
//! Shims are keyed by the callable's `TypeId`. Closures all have distinct
//! types, so in practice shims apply to function pointers such as
//! `fn(AnyError)`.

use std::any::TypeId;
use std::fmt;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::capability::AnyError;
use crate::errors::InvalidRegistrationError;
use crate::handler::{AnyValue, Arguments, Handler, Param, Rest};
use crate::outcome::{IntoOutcome, Outcome};
use crate::value::Datum;

/// Direct invocation of a handler with matched arguments.
pub type Shim = fn(&Handler, &Arguments<'_>) -> Option<Outcome>;

#[derive(Default)]
pub struct AcceleratedRegistry {
    shims: RwLock<FxHashMap<TypeId, Shim>>,
}

impl AcceleratedRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with shims for the common function shapes:
    /// `fn()`, `fn(AnyError)`, `fn() -> Result<(), AnyError>` and
    /// `fn(Rest<AnyValue>) -> Result<(), AnyError>`.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register_fn::<fn()>(call_unit);
        registry.register_fn::<fn(AnyError)>(call_error_sink);
        registry.register_fn::<fn() -> Result<(), AnyError>>(call_fallible);
        registry.register_fn::<fn(Rest<AnyValue>) -> Result<(), AnyError>>(call_variadic_fallible);
        registry
    }

    /// Register `shim` for the callable type of `sample`.
    pub fn register(&self, sample: &Datum, shim: Shim) -> Result<(), InvalidRegistrationError> {
        let handler = sample
            .downcast_ref::<Handler>()
            .ok_or(InvalidRegistrationError {
                type_name: sample.type_name(),
            })?;
        self.insert(handler.fn_type(), handler.name(), shim);
        Ok(())
    }

    /// Register `shim` for callables of type `F`.
    pub fn register_fn<F: 'static>(&self, shim: Shim) {
        self.insert(TypeId::of::<F>(), std::any::type_name::<F>(), shim);
    }

    pub fn get(&self, fn_type: TypeId) -> Option<Shim> {
        self.shims.read().get(&fn_type).copied()
    }

    pub fn len(&self) -> usize {
        self.shims.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shims.read().is_empty()
    }

    fn insert(&self, fn_type: TypeId, name: &'static str, shim: Shim) {
        tracing::debug!(callable = name, "registered accelerated shim");
        self.shims.write().insert(fn_type, shim);
    }
}

impl fmt::Debug for AcceleratedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcceleratedRegistry")
            .field("shims", &self.len())
            .finish()
    }
}

fn call_unit(handler: &Handler, _args: &Arguments<'_>) -> Option<Outcome> {
    let function = handler.function::<fn()>()?;
    function();
    Some(().into_outcome())
}

fn call_error_sink(handler: &Handler, args: &Arguments<'_>) -> Option<Outcome> {
    let function = handler.function::<fn(AnyError)>()?;
    let error = AnyError::extract(args.get(0)?)?;
    function(error);
    Some(().into_outcome())
}

fn call_fallible(handler: &Handler, _args: &Arguments<'_>) -> Option<Outcome> {
    let function = handler.function::<fn() -> Result<(), AnyError>>()?;
    Some(function().into_outcome())
}

fn call_variadic_fallible(handler: &Handler, args: &Arguments<'_>) -> Option<Outcome> {
    let function = handler.function::<fn(Rest<AnyValue>) -> Result<(), AnyError>>()?;
    let rest = args
        .iter()
        .map(AnyValue::extract)
        .collect::<Option<Vec<_>>>()?;
    Some(function(Rest(rest)).into_outcome())
}
