#![allow(clippy::arithmetic_side_effects)]

use super::*;
use crate::capability::{AnyError, CapabilityTable, ErrorCapability};
use crate::value::{Datum, ErrorSlot};
use pretty_assertions::assert_eq;

fn call(handler: &Handler, slots: &[Datum]) -> Option<Outcome> {
    let capabilities = CapabilityTable::new();
    handler.call(&Arguments::new(slots, None, &capabilities))
}

fn first_slot<T: Typed + Clone>(outcome: Outcome) -> Option<T> {
    match outcome.into_parts().0 {
        crate::outcome::OutcomeKind::Data(slots) => slots.first()?.downcast_ref::<T>().cloned(),
        crate::outcome::OutcomeKind::Error(_) => None,
    }
}

fn add(a: i64, b: i64) -> i64 {
    a + b
}

// === HandlerType ===

#[test]
fn parameter_kinds_are_captured_from_the_closure() {
    let handler = Handler::new(|_: i64, _: AnyValue, _: AnyError| {});
    assert_eq!(
        handler.handler_type().params(),
        &[
            ParamKind::Exact(TypeToken::of::<i64>()),
            ParamKind::Any,
            ParamKind::Capability(CapabilityId::of::<ErrorCapability>()),
        ]
    );
    assert!(!handler.handler_type().is_variadic());
    assert_eq!(handler.handler_type().arity(), 3);
}

#[test]
fn arc_parameters_are_exact() {
    let handler = Handler::new(|_: Arc<std::io::Error>| {});
    assert_eq!(
        handler.handler_type().params(),
        &[ParamKind::Exact(TypeToken::of::<std::io::Error>())]
    );
}

#[test]
fn variadic_handlers_record_the_element_kind() {
    let handler = Handler::variadic(|_: String, _: Rest<String>| {});
    let ty = handler.handler_type();
    assert!(ty.is_variadic());
    assert_eq!(ty.arity(), 1);
    assert_eq!(
        ty.variadic_element(),
        Some(ParamKind::Exact(TypeToken::of::<String>()))
    );
}

#[test]
fn handlers_with_equal_parameters_share_a_type() {
    let a = Handler::new(|x: i64, y: i64| x - y);
    let b = Handler::new(add);
    assert_eq!(a.handler_type(), b.handler_type());
    assert_ne!(a.fn_type(), b.fn_type());
}

#[test]
fn handler_type_display() {
    let handler = Handler::variadic(|_: i64, _: Rest<AnyValue>| {});
    assert_eq!(handler.handler_type().to_string(), "fn(i64, ...any)");
    let handler = Handler::new(|_: AnyError| {});
    assert_eq!(handler.handler_type().to_string(), "fn(error)");
    let handler = Handler::variadic(|_: Rest<bool>| {});
    assert_eq!(handler.handler_type().to_string(), "fn(...bool)");
    assert_eq!(HandlerType::fixed([]).to_string(), "fn()");
}

// === Invocation ===

#[test]
fn fixed_handler_receives_slots_in_order() {
    let handler = Handler::new(|a: i64, b: String| format!("{b}{a}"));
    let outcome = call(&handler, &[Datum::new(7_i64), Datum::new(String::from("n"))]).unwrap();
    assert_eq!(first_slot::<String>(outcome), Some(String::from("n7")));
}

#[test]
fn fn_items_are_handlers() {
    let handler = Handler::new(add);
    let outcome = call(&handler, &[Datum::new(2_i64), Datum::new(3_i64)]).unwrap();
    assert_eq!(first_slot::<i64>(outcome), Some(5));
    assert!(handler.function::<fn(i64, i64) -> i64>().is_none());

    let pointer = Handler::new(add as fn(i64, i64) -> i64);
    assert!(pointer.function::<fn(i64, i64) -> i64>().is_some());
}

#[test]
fn variadic_handler_collects_trailing_slots() {
    let handler = Handler::variadic(|first: String, rest: Rest<String>| {
        let mut all = vec![first];
        all.extend(rest);
        all.join(",")
    });
    let slots = [
        Datum::new(String::from("a")),
        Datum::new(String::from("b")),
        Datum::new(String::from("c")),
    ];
    let outcome = call(&handler, &slots).unwrap();
    assert_eq!(first_slot::<String>(outcome), Some(String::from("a,b,c")));

    let outcome = call(&handler, &slots[..1]).unwrap();
    assert_eq!(first_slot::<String>(outcome), Some(String::from("a")));
}

#[test]
fn any_value_keeps_absent_slots() {
    let handler = Handler::new(|v: AnyValue| v.is_absent());
    let outcome = call(&handler, &[Datum::absent()]).unwrap();
    assert_eq!(first_slot::<bool>(outcome), Some(true));
}

#[test]
fn extraction_failure_yields_none() {
    let handler = Handler::new(|a: i64| a);
    assert!(call(&handler, &[Datum::new(String::from("x"))]).is_none());
    assert!(call(&handler, &[]).is_none());
}

#[test]
fn cap_parameter_upcasts_in_data_mode() {
    let handler = Handler::new(|e: AnyError| e.to_string());
    let io = std::io::Error::other("boom");
    let outcome = call(&handler, &[Datum::new(io)]).unwrap();
    assert_eq!(first_slot::<String>(outcome), Some(String::from("boom")));
}

#[derive(Debug, thiserror::Error)]
#[error("plain")]
struct Plain;

impl Typed for Plain {}

#[test]
fn cap_parameter_uses_the_error_view_in_error_mode() {
    let handler = Handler::new(|e: AnyError| e.downcast_ref::<Plain>().is_some());
    let slot = ErrorSlot::new(Plain);
    let capabilities = CapabilityTable::new();
    let args = Arguments::new(
        std::slice::from_ref(slot.datum()),
        Some(slot.error()),
        &capabilities,
    );
    assert!(args.is_error());
    let outcome = handler.call(&args).unwrap();
    assert_eq!(first_slot::<bool>(outcome), Some(true));

    // Without the error view the undeclared capability cannot be produced.
    assert!(call(&handler, &[slot.datum().clone()]).is_none());
}

#[test]
fn arguments_expose_slots() {
    let capabilities = CapabilityTable::new();
    let slots = [Datum::new(1_u8), Datum::absent()];
    let args = Arguments::new(&slots, None, &capabilities);
    assert_eq!(args.len(), 2);
    assert!(!args.is_error());
    assert!(args.get(1).is_some_and(|arg| arg.datum().is_absent()));
    assert!(args.get(2).is_none());
    assert_eq!(args.iter().filter(|arg| arg.error().is_none()).count(), 2);
}

#[test]
fn handlers_are_typed_values() {
    let handler = Handler::new(|| {});
    let datum = Datum::new(handler.clone());
    let back = datum.downcast_ref::<Handler>().unwrap();
    assert_eq!(back.fn_type(), handler.fn_type());
    assert!(format!("{handler:?}").contains("fn()"));
}
