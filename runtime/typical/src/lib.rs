#![deny(clippy::arithmetic_side_effects)]
//! Typical - runtime pattern-matching dispatch for Rust.
//!
//! A `Value` holds either a tuple of typed slots or a single error. Calling
//! `Value::s` with an ordered list of handlers invokes the first handler whose
//! declared parameters match the runtime types of the tuple, and wraps the
//! handler's result as a new `Value` so calls can be chained:
//!
//! ```text
//! let dispatcher = Dispatcher::new();
//! let total = dispatcher
//!     .data((1_i64, 2_i64))
//!     .s(&[
//!         Handler::new(|a: i64, b: i64| a + b),
//!         Handler::variadic(|rest: Rest<AnyValue>| rest.len()),
//!     ]);
//! assert_eq!(total.first().and_then(Datum::downcast_ref::<i64>), Some(&3));
//! ```
//!
//! # Architecture
//!
//! Data flows in one direction:
//! - a producer creates a `Value` (`Dispatcher::data`, `Dispatcher::error`,
//!   `Dispatcher::run`)
//! - the `Value` carries a `Signature` computed from its slot types
//! - `Value::s` asks the matcher, through the `MatchCache`, whether each
//!   handler's `HandlerType` accepts that signature
//! - the first match is invoked and its `Outcome` becomes the next `Value`
//! - if nothing matches, the original `Value` is returned unchanged
//!
//! # Assignability
//!
//! Handler parameters are `Exact` (a concrete `Typed` type), `Any`
//! (`AnyValue`, accepts every slot including absent ones) or a `Capability`
//! (`Cap<C>`, accepts every type that declares `C` in
//! `Typed::capabilities`). `AnyError` is the capability every error provides.

mod accelerated;
mod cache;
mod capability;
mod dispatcher;
mod errors;
mod handler;
mod leb128;
mod matcher;
mod outcome;
mod signature;
mod typed;
mod value;

pub use accelerated::{AcceleratedRegistry, Shim};
pub use cache::{CacheStats, MatchCache, MatchKey};
pub use capability::{
    AnyError, Cap, Capabilities, Capability, CapabilityId, CapabilitySet, CapabilityTable,
    ErrorCapability,
};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use errors::{InvalidHandlerError, InvalidRegistrationError, PropagatedError};
pub use handler::{
    AnyValue, Arg, Arguments, Handler, HandlerType, IntoHandler, IntoVariadicHandler, Param,
    ParamKind, Rest,
};
pub use outcome::{IntoErrorSlot, IntoOutcome, Outcome, OutputSlot};
pub use signature::{Signature, SignatureTag, TypeList};
pub use typed::{AsAny, TypeToken, Typed};
pub use value::{Datum, ErrorSlot, IntoData, IntoDatum, Value};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=typical=debug` or
/// `RUST_LOG=typical=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
