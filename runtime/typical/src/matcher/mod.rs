//! Structural matching of a signature's type list against a handler type.
//!
//! Called by the dispatcher through `MatchCache::get_or_compute`, so every
//! decision here is a pure function of `(type list, handler type)`.
//!
//! # Error mode
//! The handler must take exactly one fixed parameter, and the error's type
//! must be assignable to it: the exact type, or a capability that refines
//! the error capability and is provided by the type. The universal
//! `AnyError` accepts every error.
//!
//! # Data mode
//! Fixed arity requires equal lengths. A variadic handler requires at least
//! its fixed parameters; trailing slots are checked against the element
//! kind. A slot is assignable when:
//! - the declared kind is `Any`, or
//! - the slot type equals the declared exact type, or
//! - the slot type provides the declared capability.
//!
//! Absent slots only satisfy `Any`. The first failing position ends the
//! evaluation.

use crate::capability::CapabilityTable;
use crate::handler::{HandlerType, ParamKind};
use crate::typed::TypeToken;

/// Whether `handler` accepts a tuple with runtime `types`.
pub(crate) fn matches(
    error_mode: bool,
    types: &[Option<TypeToken>],
    handler: &HandlerType,
    capabilities: &CapabilityTable,
) -> bool {
    if error_mode {
        matches_error(types, handler, capabilities)
    } else {
        matches_data(types, handler, capabilities)
    }
}

fn matches_error(
    types: &[Option<TypeToken>],
    handler: &HandlerType,
    capabilities: &CapabilityTable,
) -> bool {
    if handler.is_variadic() {
        return false;
    }
    let ([param], [Some(actual)]) = (handler.params(), types) else {
        return false;
    };
    match param {
        ParamKind::Exact(expected) => expected == actual,
        ParamKind::Capability(capability) => {
            capability.is_error()
                && (capability.is_universal_error() || capabilities.provides(actual, *capability))
        }
        ParamKind::Any => false,
    }
}

fn matches_data(
    types: &[Option<TypeToken>],
    handler: &HandlerType,
    capabilities: &CapabilityTable,
) -> bool {
    let params = handler.params();
    let fixed = params.len();

    match handler.variadic_element() {
        None if types.len() != fixed => return false,
        Some(_) if types.len() < fixed => return false,
        _ => {}
    }

    let (head, tail) = types.split_at(fixed);
    if !params
        .iter()
        .zip(head)
        .all(|(param, ty)| assignable(*param, ty.as_ref(), capabilities))
    {
        return false;
    }

    match handler.variadic_element() {
        None | Some(ParamKind::Any) => true,
        Some(element) => tail
            .iter()
            .all(|ty| assignable(element, ty.as_ref(), capabilities)),
    }
}

fn assignable(param: ParamKind, actual: Option<&TypeToken>, capabilities: &CapabilityTable) -> bool {
    match (param, actual) {
        (ParamKind::Any, _) => true,
        (_, None) => false,
        (ParamKind::Exact(expected), Some(actual)) => expected == *actual,
        (ParamKind::Capability(capability), Some(actual)) => capabilities.provides(actual, capability),
    }
}
