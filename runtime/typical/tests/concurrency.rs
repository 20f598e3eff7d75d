//! Many chains dispatching through one shared dispatcher.

use std::sync::Arc;

use rayon::prelude::*;
use typical::{AnyError, AnyValue, Dispatcher, Handler, MatchCache, Rest};

fn handlers() -> Vec<Handler> {
    vec![
        Handler::new(|a: i64, b: i64| a + b),
        Handler::new(|s: String| s.len() as i64),
        Handler::new(|e: AnyError| e.to_string().len() as i64),
        Handler::variadic(|rest: Rest<AnyValue>| rest.len() as i64),
    ]
}

#[test]
fn parallel_chains_agree_with_sequential_ones() {
    let d = Dispatcher::new();
    let handlers = handlers();

    let run = |n: i64| -> i64 {
        let value = match n % 4 {
            0 => d.data((n, 1_i64)),
            1 => d.data(format!("{n}")),
            2 => d.run(|| format!("x{n}").parse::<i64>()),
            _ => d.data((n, 1_u8, true)),
        };
        let value = value.s(&handlers);
        *value.first().and_then(|datum| datum.downcast_ref::<i64>()).unwrap()
    };

    let sequential: Vec<i64> = (0..400).map(run).collect();
    let parallel: Vec<i64> = (0..400_i64).into_par_iter().map(run).collect();
    assert_eq!(sequential, parallel);
}

#[test]
fn shared_cache_is_consistent_under_contention() {
    let cache = Arc::new(MatchCache::new());
    let dispatchers: Vec<Dispatcher> = (0..4)
        .map(|_| Dispatcher::builder().cache(Arc::clone(&cache)).build())
        .collect();
    let handlers = handlers();

    (0..1000_usize).into_par_iter().for_each(|i| {
        let d = &dispatchers[i % dispatchers.len()];
        let value = d.data((2_i64, 3_i64)).s(&handlers);
        assert_eq!(value.first().and_then(|datum| datum.downcast_ref::<i64>()), Some(&5));
    });

    let stats = cache.stats();
    // One (signature, handler) pair; racing threads may each record a miss.
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits + stats.misses, 1000);
}

#[test]
fn dispatchers_and_values_cross_threads() {
    let d = Dispatcher::new();
    let value = d.data(String::from("moved"));
    let handle = std::thread::spawn(move || {
        value
            .s(&[Handler::new(|s: String| s.to_uppercase())])
            .first()
            .and_then(|datum| datum.downcast_ref::<String>().cloned())
    });
    assert_eq!(handle.join().unwrap(), Some(String::from("MOVED")));
}
