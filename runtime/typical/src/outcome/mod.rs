//! Handler results.
//!
//! Whatever a handler returns is turned into an `Outcome`, which the
//! dispatcher wraps as the next `Value`:
//!
//! - `()` is the empty tuple
//! - a single `Typed` value is a one-slot tuple
//! - a Rust tuple maps slot for slot
//! - `Result<T, E>` is the error channel: `Err(e)` becomes an Error-variant
//!   value, `Ok(t)` is whatever `t` would have been
//!
//! Returning an error type directly (not inside `Result`) yields ordinary
//! data. Only the error channel produces the Error variant.

use std::any::TypeId;

use crate::capability::AnyError;
use crate::handler::AnyValue;
use crate::typed::Typed;
use crate::value::{Datum, ErrorSlot};

#[derive(Clone, Debug)]
pub(crate) enum OutcomeKind {
    Data(Vec<Datum>),
    Error(ErrorSlot),
}

/// The interpreted result of one handler call.
#[derive(Clone, Debug)]
pub struct Outcome {
    kind: OutcomeKind,
    /// Output type of a handler whose slots are all concretely typed.
    static_key: Option<TypeId>,
}

impl Outcome {
    /// A data tuple with dynamically computed signature.
    pub fn data(slots: Vec<Datum>) -> Self {
        Outcome {
            kind: OutcomeKind::Data(slots),
            static_key: None,
        }
    }

    pub fn error(slot: ErrorSlot) -> Self {
        Outcome {
            kind: OutcomeKind::Error(slot),
            static_key: None,
        }
    }

    fn typed<T: 'static>(slots: Vec<Datum>) -> Self {
        Outcome {
            kind: OutcomeKind::Data(slots),
            static_key: Some(TypeId::of::<T>()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, OutcomeKind::Error(_))
    }

    pub fn static_key(&self) -> Option<TypeId> {
        self.static_key
    }

    pub(crate) fn into_parts(self) -> (OutcomeKind, Option<TypeId>) {
        (self.kind, self.static_key)
    }
}

/// A handler return type.
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for Outcome {
    fn into_outcome(self) -> Outcome {
        self
    }
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Outcome {
        Outcome::typed::<()>(Vec::new())
    }
}

impl<T: Typed> IntoOutcome for T {
    fn into_outcome(self) -> Outcome {
        Outcome::typed::<T>(vec![Datum::new(self)])
    }
}

/// The concrete type is only known at runtime, so the signature is computed
/// from the slot.
impl IntoOutcome for AnyValue {
    fn into_outcome(self) -> Outcome {
        Outcome::data(vec![self.0])
    }
}

impl IntoOutcome for Datum {
    fn into_outcome(self) -> Outcome {
        Outcome::data(vec![self])
    }
}

impl<T: IntoOutcome, E: IntoErrorSlot> IntoOutcome for Result<T, E> {
    fn into_outcome(self) -> Outcome {
        match self {
            Ok(value) => value.into_outcome(),
            Err(error) => Outcome::error(error.into_error_slot()),
        }
    }
}

/// One element of a tuple returned by a handler.
pub trait OutputSlot: 'static {
    /// Whether the slot type is concrete, which lets the tuple reuse a
    /// signature recorded for its type.
    const STATIC: bool;

    fn into_slot(self) -> Datum;
}

impl<T: Typed> OutputSlot for T {
    const STATIC: bool = true;

    fn into_slot(self) -> Datum {
        Datum::new(self)
    }
}

impl OutputSlot for AnyValue {
    const STATIC: bool = false;

    fn into_slot(self) -> Datum {
        self.0
    }
}

impl OutputSlot for Datum {
    const STATIC: bool = false;

    fn into_slot(self) -> Datum {
        self
    }
}

macro_rules! impl_into_outcome_tuple {
    ($($name:ident),+) => {
        impl<$($name: OutputSlot),+> IntoOutcome for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_outcome(self) -> Outcome {
                let ($($name,)+) = self;
                let slots = vec![$($name.into_slot()),+];
                if $(<$name as OutputSlot>::STATIC)&&+ {
                    Outcome::typed::<Self>(slots)
                } else {
                    Outcome::data(slots)
                }
            }
        }
    };
}

impl_into_outcome_tuple!(A);
impl_into_outcome_tuple!(A, B);
impl_into_outcome_tuple!(A, B, C);
impl_into_outcome_tuple!(A, B, C, D);
impl_into_outcome_tuple!(A, B, C, D, E);
impl_into_outcome_tuple!(A, B, C, D, E, F);
impl_into_outcome_tuple!(A, B, C, D, E, F, G);
impl_into_outcome_tuple!(A, B, C, D, E, F, G, H);

/// An error a handler may return through `Result`.
pub trait IntoErrorSlot {
    fn into_error_slot(self) -> ErrorSlot;
}

impl<E: std::error::Error + Typed> IntoErrorSlot for E {
    fn into_error_slot(self) -> ErrorSlot {
        ErrorSlot::new(self)
    }
}

/// Keeps the concrete error, so a re-raised `AnyError` still matches
/// handlers declaring its exact type.
impl IntoErrorSlot for AnyError {
    fn into_error_slot(self) -> ErrorSlot {
        let (error, datum) = self.into_parts();
        ErrorSlot::from_parts(datum, error)
    }
}

impl IntoErrorSlot for ErrorSlot {
    fn into_error_slot(self) -> ErrorSlot {
        self
    }
}
