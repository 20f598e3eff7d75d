//! Property-based tests for handler selection.
//!
//! Random tuples of a few slot kinds are dispatched against a fixed handler
//! list; the selected handler must depend only on the slot types and the
//! list order.

use proptest::prelude::*;
use typical::{AnyValue, Datum, Dispatcher, Handler, Rest, Value};

// ============================================================================
// Strategies
// ============================================================================

#[derive(Clone, Debug)]
enum Slot {
    Int(i64),
    Text(String),
    Flag(bool),
    Absent,
}

impl Slot {
    fn datum(&self) -> Datum {
        match self {
            Slot::Int(n) => Datum::new(*n),
            Slot::Text(s) => Datum::new(s.clone()),
            Slot::Flag(b) => Datum::new(*b),
            Slot::Absent => Datum::absent(),
        }
    }
}

fn arb_slot() -> impl Strategy<Value = Slot> {
    prop_oneof![
        any::<i64>().prop_map(Slot::Int),
        "[a-z]{0,8}".prop_map(Slot::Text),
        any::<bool>().prop_map(Slot::Flag),
        Just(Slot::Absent),
    ]
}

fn arb_tuple() -> impl Strategy<Value = Vec<Slot>> {
    prop::collection::vec(arb_slot(), 0..5)
}

/// Every handler reports its own position in the list.
fn tagged_handlers() -> Vec<Handler> {
    vec![
        Handler::new(|_: i64, _: i64| 0_usize),
        Handler::new(|_: String| 1_usize),
        Handler::variadic(|_: bool, _: Rest<bool>| 2_usize),
        Handler::new(|_: AnyValue, _: i64| 3_usize),
        Handler::variadic(|_: Rest<AnyValue>| 4_usize),
    ]
}

fn selected(value: &Value) -> Option<usize> {
    value.first()?.downcast_ref::<usize>().copied()
}

/// The handler index a reader would pick by hand.
fn expected(slots: &[Slot]) -> usize {
    match slots {
        [Slot::Int(_), Slot::Int(_)] => 0,
        [Slot::Text(_)] => 1,
        [Slot::Flag(_), rest @ ..] if rest.iter().all(|s| matches!(s, Slot::Flag(_))) => 2,
        [_, Slot::Int(_)] => 3,
        _ => 4,
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The first matching handler in list order is the one invoked.
    #[test]
    fn first_match_in_order(slots in arb_tuple()) {
        let d = Dispatcher::new();
        let data: Vec<Datum> = slots.iter().map(Slot::datum).collect();
        let value = d.data(data).s(&tagged_handlers());
        prop_assert_eq!(selected(&value), Some(expected(&slots)));
    }

    /// Repeated dispatch of the same types picks the same handler, whatever
    /// the cache already holds and whatever the slot values are.
    #[test]
    fn selection_is_deterministic(first in arb_tuple(), again in arb_tuple()) {
        let d = Dispatcher::new();
        let handlers = tagged_handlers();
        let dispatch = |slots: &[Slot]| {
            let data: Vec<Datum> = slots.iter().map(Slot::datum).collect();
            selected(&d.data(data).s(&handlers))
        };

        let cold = dispatch(&first);
        let _ = dispatch(&again);
        let warm = dispatch(&first);
        prop_assert_eq!(cold, warm);

        let fresh = Dispatcher::new();
        let data: Vec<Datum> = first.iter().map(Slot::datum).collect();
        prop_assert_eq!(selected(&fresh.data(data).s(&handlers)), cold);
    }

    /// Values with the same slot types share a signature.
    #[test]
    fn signature_depends_on_types_only(a in any::<i64>(), b in any::<i64>(), s in "[a-z]{0,8}") {
        let d = Dispatcher::new();
        let left = d.data((a, s.clone()));
        let right = d.data((b, s + "!"));
        prop_assert_eq!(left.signature(), right.signature());
        let other = d.data((a, true));
        prop_assert_ne!(left.signature(), other.signature());
    }

    /// Both orders of two always-matching handlers pick the first one.
    #[test]
    fn earlier_handler_wins(a in any::<i32>(), b in any::<i32>()) {
        let d = Dispatcher::new();
        let value = d.data((a, b));
        let sum = Handler::new(|x: i32, y: i32| i64::from(x) + i64::from(y));
        let count = Handler::variadic(|rest: Rest<AnyValue>| rest.len());

        let picked = value.s(&[sum.clone(), count.clone()]);
        prop_assert_eq!(
            picked.first().and_then(|datum| datum.downcast_ref::<i64>()).copied(),
            Some(i64::from(a) + i64::from(b))
        );
        let picked = value.s(&[count, sum]);
        prop_assert_eq!(picked.first().and_then(|datum| datum.downcast_ref::<usize>()).copied(), Some(2));
    }
}
