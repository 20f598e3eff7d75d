//! The dispatcher: the owning context of every `Value`.
//!
//! Holds the match cache, the capability table and the optional accelerated
//! registry. Values keep a handle to the dispatcher that produced them, so
//! all steps of one chain share the same caches.
//!
//! ```text
//! let dispatcher = Dispatcher::new();
//! let parsed = dispatcher
//!     .run(|| "42".parse::<i64>())
//!     .s(&[
//!         Handler::new(|n: i64| n * 2),
//!         Handler::new(|e: AnyError| e.to_string()),
//!     ]);
//! ```

mod builder;

use std::sync::Arc;

use crate::accelerated::AcceleratedRegistry;
use crate::cache::MatchCache;
use crate::capability::CapabilityTable;
use crate::errors::InvalidHandlerError;
use crate::handler::{Arguments, Handler};
use crate::matcher;
use crate::outcome::{IntoErrorSlot, IntoOutcome, Outcome, OutcomeKind};
use crate::signature::{data_signature, error_signature};
use crate::value::{Datum, IntoData, Repr, Value};

pub use builder::DispatcherBuilder;

struct Inner {
    cache: Arc<MatchCache>,
    capabilities: CapabilityTable,
    accelerated: Option<Arc<AcceleratedRegistry>>,
}

/// Creates values and dispatches them to handlers. Cloning is cheap.
#[derive(Clone)]
pub struct Dispatcher(Arc<Inner>);

impl Dispatcher {
    /// A dispatcher with a fresh cache and the default accelerated shims.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    fn from_parts(cache: Arc<MatchCache>, accelerated: Option<Arc<AcceleratedRegistry>>) -> Self {
        Dispatcher(Arc::new(Inner {
            cache,
            capabilities: CapabilityTable::new(),
            accelerated,
        }))
    }

    /// A Data-variant value over literal slots.
    pub fn data(&self, data: impl IntoData) -> Value {
        self.make_data(data.into_data(), None)
    }

    /// An Error-variant value, or the empty tuple when `error` is `None`.
    pub fn error<E: IntoErrorSlot>(&self, error: impl Into<Option<E>>) -> Value {
        match error.into() {
            Some(error) => self.wrap(Outcome::error(error.into_error_slot())),
            None => self.data(()),
        }
    }

    /// Call a niladic producer and wrap its result.
    pub fn run<F, R>(&self, producer: F) -> Value
    where
        F: FnOnce() -> R,
        R: IntoOutcome,
    {
        self.wrap(producer().into_outcome())
    }

    /// Call a niladic handler supplied at runtime and wrap its result.
    pub fn run_handler(&self, handler: &Handler) -> Result<Value, InvalidHandlerError> {
        let ty = handler.handler_type();
        if ty.arity() != 0 || ty.is_variadic() {
            return Err(InvalidHandlerError::NotNiladic {
                name: handler.name(),
                arity: ty.arity().saturating_add(usize::from(ty.is_variadic())),
            });
        }
        let args = Arguments::new(&[], None, &self.0.capabilities);
        Ok(match self.invoke(handler, &args) {
            Some(outcome) => self.wrap(outcome),
            None => {
                tracing::error!(handler = handler.name(), "niladic handler produced no outcome");
                self.data(())
            }
        })
    }

    pub fn cache(&self) -> &Arc<MatchCache> {
        &self.0.cache
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.0.capabilities
    }

    pub fn accelerated(&self) -> Option<&Arc<AcceleratedRegistry>> {
        self.0.accelerated.as_ref()
    }

    /// Try one candidate: `Some` with the handler's wrapped result if it
    /// matched, `None` to move on to the next candidate.
    pub(crate) fn dispatch(&self, value: &Value, handler: &Handler) -> Option<Value> {
        let signature = value.signature();
        let ty = handler.handler_type();
        let matched = self.0.cache.get_or_compute(signature, ty, |types| {
            matcher::matches(signature.is_error(), types, ty, &self.0.capabilities)
        });
        if !matched {
            return None;
        }

        tracing::trace!(handler = handler.name(), %ty, "selected handler");
        let args = value.arguments(&self.0.capabilities);
        match self.invoke(handler, &args) {
            Some(outcome) => Some(self.wrap(outcome)),
            None => {
                tracing::error!(
                    handler = handler.name(),
                    %ty,
                    "matched handler rejected its arguments"
                );
                None
            }
        }
    }

    fn invoke(&self, handler: &Handler, args: &Arguments<'_>) -> Option<Outcome> {
        let shim = self
            .0
            .accelerated
            .as_ref()
            .and_then(|registry| registry.get(handler.fn_type()));
        if let Some(outcome) = shim.and_then(|shim| shim(handler, args)) {
            return Some(outcome);
        }
        handler.call(args)
    }

    fn wrap(&self, outcome: Outcome) -> Value {
        match outcome.into_parts() {
            (OutcomeKind::Data(slots), static_key) => self.make_data(slots, static_key),
            (OutcomeKind::Error(slot), _) => {
                let signature = error_signature(&self.0.cache, &slot);
                Value::new(self.clone(), Repr::Error(slot), signature)
            }
        }
    }

    fn make_data(&self, slots: Vec<Datum>, static_key: Option<std::any::TypeId>) -> Value {
        let signature = data_signature(&self.0.cache, &slots, static_key);
        Value::new(self.clone(), Repr::Data(slots.into()), signature)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("cache", &self.0.cache)
            .field("capabilities", &self.0.capabilities)
            .field("accelerated", &self.0.accelerated)
            .finish()
    }
}
