//! `DispatcherBuilder` for creating dispatchers with shared caches or custom
//! accelerated registries.

use std::sync::Arc;

use super::Dispatcher;
use crate::accelerated::AcceleratedRegistry;
use crate::cache::MatchCache;

/// Builder for `Dispatcher`.
///
/// By default the dispatcher gets a private `MatchCache` and an
/// `AcceleratedRegistry` with the default shims.
#[derive(Default)]
pub struct DispatcherBuilder {
    cache: Option<Arc<MatchCache>>,
    accelerated: Option<Arc<AcceleratedRegistry>>,
    without_acceleration: bool,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing match cache.
    ///
    /// Dispatchers sharing a cache also share its memoized decisions.
    #[must_use]
    pub fn cache(mut self, cache: Arc<MatchCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Use the given accelerated registry instead of the default one.
    #[must_use]
    pub fn accelerated(mut self, registry: Arc<AcceleratedRegistry>) -> Self {
        self.accelerated = Some(registry);
        self.without_acceleration = false;
        self
    }

    /// Always invoke handlers through the generic path.
    #[must_use]
    pub fn without_acceleration(mut self) -> Self {
        self.accelerated = None;
        self.without_acceleration = true;
        self
    }

    /// Build the dispatcher.
    pub fn build(self) -> Dispatcher {
        let cache = self.cache.unwrap_or_default();
        let accelerated = if self.without_acceleration {
            None
        } else {
            Some(
                self.accelerated
                    .unwrap_or_else(|| Arc::new(AcceleratedRegistry::with_defaults())),
            )
        };
        Dispatcher::from_parts(cache, accelerated)
    }
}
