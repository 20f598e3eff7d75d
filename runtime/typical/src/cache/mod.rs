//! Match cache.
//!
//! Memoizes `(Signature, HandlerType) -> bool` together with the tables that
//! signature computation fills in: type interning, the type list behind each
//! signature, and the signatures of statically typed handler outputs.
//!
//! # Thread Safety
//! Every table sits behind its own `RwLock`. Match results are computed
//! outside any lock. Two threads may compute the same entry concurrently;
//! both get the same answer and the first insert is kept. Nothing is ever
//! evicted: the key space is bounded by the distinct type combinations and
//! handler shapes of the program, not by input volume.

use std::any::TypeId;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::handler::HandlerType;
use crate::signature::{Signature, TypeList};
use crate::typed::TypeToken;

/// Cache key for one match decision.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub signature: Signature,
    pub handler: HandlerType,
}

/// Counters reported by `MatchCache::stats`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Memoized match decisions.
    pub entries: usize,
    /// Signatures with a recorded type list.
    pub signatures: usize,
}

#[derive(Default)]
pub struct MatchCache {
    /// Dense index per type, starting at 1. Index 0 encodes absent.
    types: RwLock<FxHashMap<TypeId, u64>>,
    type_lists: RwLock<FxHashMap<Signature, TypeList>>,
    statics: RwLock<FxHashMap<TypeId, Signature>>,
    matches: RwLock<FxHashMap<MatchKey, bool>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The memoized decision for `(signature, handler)`, computing it with
    /// `compute` on a miss.
    ///
    /// `compute` receives the signature's type list. A signature that was
    /// never recorded matches nothing, and that answer is not cached.
    pub fn get_or_compute(
        &self,
        signature: &Signature,
        handler: &HandlerType,
        compute: impl FnOnce(&[Option<TypeToken>]) -> bool,
    ) -> bool {
        let key = MatchKey {
            signature: signature.clone(),
            handler: handler.clone(),
        };

        // Fast path: decided before
        if let Some(&matched) = self.matches.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return matched;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let Some(types) = self.type_list(signature) else {
            tracing::error!(?signature, %handler, "signature has no recorded type list");
            return false;
        };

        let matched = compute(&types[..]);
        tracing::trace!(?signature, %handler, matched, "match cache miss");

        *self.matches.write().entry(key).or_insert(matched)
    }

    /// The type list recorded for `signature`.
    pub fn type_list(&self, signature: &Signature) -> Option<TypeList> {
        self.type_lists.read().get(signature).cloned()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.matches.read().len(),
            signatures: self.type_lists.read().len(),
        }
    }

    /// Number of memoized match decisions.
    pub fn len(&self) -> usize {
        self.matches.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.read().is_empty()
    }

    pub(crate) fn intern_type(&self, ty: &TypeToken) -> u64 {
        self.intern_type_id(ty.id())
    }

    pub(crate) fn intern_type_id(&self, id: TypeId) -> u64 {
        // Fast path: already interned
        if let Some(&index) = self.types.read().get(&id) {
            return index;
        }

        let mut guard = self.types.write();
        let next = u64::try_from(guard.len()).map_or(u64::MAX, |len| len.saturating_add(1));
        *guard.entry(id).or_insert(next)
    }

    pub(crate) fn record_types(&self, signature: &Signature, types: TypeList) {
        if self.type_lists.read().contains_key(signature) {
            return;
        }
        self.type_lists
            .write()
            .entry(signature.clone())
            .or_insert(types);
    }

    pub(crate) fn static_signature(&self, key: TypeId) -> Option<Signature> {
        self.statics.read().get(&key).cloned()
    }

    pub(crate) fn record_static(&self, key: TypeId, signature: Signature) {
        self.statics.write().entry(key).or_insert(signature);
    }
}

impl std::fmt::Debug for MatchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchCache")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
