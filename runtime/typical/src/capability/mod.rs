//! Capabilities: the assignability relation between concrete slot types and
//! abstract handler parameters.
//!
//! A concrete type is assignable to `Cap<C>` when its `Typed::capabilities`
//! declares `C`. The declaration carries an upcaster from `Arc<T>` to
//! `Arc<C::Object>`, which is how the handler receives the trait object.
//!
//! Capability sets are a pure function of the type, so they are computed once
//! per `TypeId` and memoized in a `CapabilityTable`.

use std::any::{type_name, Any, TypeId};
use std::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::typed::{TypeToken, Typed};
use crate::value::Datum;

/// An abstract capability a handler parameter may require.
pub trait Capability: 'static {
    /// The trait object handed to handlers, e.g. `dyn Error + Send + Sync`.
    type Object: ?Sized + Send + Sync + 'static;

    /// Whether this capability refines the error capability, which makes it
    /// eligible in error mode.
    const ERROR: bool = false;

    fn name() -> &'static str {
        type_name::<Self>()
    }
}

/// The universal error capability. Every error value provides it.
#[derive(Clone, Copy, Debug)]
pub struct ErrorCapability;

impl Capability for ErrorCapability {
    type Object = dyn Error + Send + Sync;

    const ERROR: bool = true;

    fn name() -> &'static str {
        "error"
    }
}

/// Identity of a `Capability`, used in parameter lists and cache keys.
#[derive(Clone, Copy)]
pub struct CapabilityId {
    id: TypeId,
    name: &'static str,
    error: bool,
}

impl CapabilityId {
    #[inline]
    pub fn of<C: Capability>() -> Self {
        CapabilityId {
            id: TypeId::of::<C>(),
            name: C::name(),
            error: C::ERROR,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this capability is or refines the error capability.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.error
    }

    /// Whether this is exactly `ErrorCapability`.
    #[inline]
    pub fn is_universal_error(&self) -> bool {
        self.id == TypeId::of::<ErrorCapability>()
    }
}

impl PartialEq for CapabilityId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CapabilityId {}

impl Hash for CapabilityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

type Upcast = Box<dyn Fn(Arc<dyn Any + Send + Sync>) -> Option<Box<dyn Any + Send>> + Send + Sync>;

/// The capabilities one concrete type provides, with their upcasters.
#[derive(Default)]
pub struct CapabilitySet {
    entries: FxHashMap<CapabilityId, Upcast>,
}

impl CapabilitySet {
    pub fn provides(&self, capability: CapabilityId) -> bool {
        self.entries.contains_key(&capability)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert a concrete value into the capability's trait object.
    pub(crate) fn upcast<C: Capability>(
        &self,
        value: Arc<dyn Any + Send + Sync>,
    ) -> Option<Arc<C::Object>> {
        let upcast = self.entries.get(&CapabilityId::of::<C>())?;
        let boxed = upcast(value)?;
        boxed.downcast::<Arc<C::Object>>().ok().map(|object| *object)
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// Builder handed to `Typed::capabilities`.
pub struct Capabilities<'a, T> {
    set: &'a mut CapabilitySet,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: Typed> Capabilities<'a, T> {
    fn new(set: &'a mut CapabilitySet) -> Self {
        Capabilities {
            set,
            _marker: PhantomData,
        }
    }

    /// Declare that `T` provides `C`, converting through `upcast`.
    pub fn provide<C: Capability>(&mut self, upcast: fn(Arc<T>) -> Arc<C::Object>) -> &mut Self {
        let erased: Upcast = Box::new(move |value: Arc<dyn Any + Send + Sync>| {
            let concrete = value.downcast::<T>().ok()?;
            Some(Box::new(upcast(concrete)) as Box<dyn Any + Send>)
        });
        self.set.entries.insert(CapabilityId::of::<C>(), erased);
        self
    }
}

impl<T: Typed + Error> Capabilities<'_, T> {
    /// Declare the error capability.
    pub fn error(&mut self) -> &mut Self {
        self.provide::<ErrorCapability>(|this: Arc<T>| this as Arc<dyn Error + Send + Sync>)
    }
}

/// Entry point stored in every `TypeToken`.
pub(crate) fn describe<T: Typed>(set: &mut CapabilitySet) {
    T::capabilities(&mut Capabilities::new(set));
}

/// Memoized capability sets, keyed by concrete type.
#[derive(Default)]
pub struct CapabilityTable {
    sets: RwLock<FxHashMap<TypeId, Arc<CapabilitySet>>>,
}

impl CapabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The capability set of `ty`, computing it on first use.
    pub fn capabilities_of(&self, ty: &TypeToken) -> Arc<CapabilitySet> {
        // Fast path: already described
        if let Some(set) = self.sets.read().get(&ty.id()) {
            return Arc::clone(set);
        }

        let mut set = CapabilitySet::default();
        ty.describe(&mut set);
        tracing::debug!(ty = ty.name(), capabilities = ?set, "described capabilities");

        let mut guard = self.sets.write();
        Arc::clone(guard.entry(ty.id()).or_insert_with(|| Arc::new(set)))
    }

    /// Whether `ty` is assignable to a parameter requiring `capability`.
    pub fn provides(&self, ty: &TypeToken, capability: CapabilityId) -> bool {
        self.capabilities_of(ty).provides(capability)
    }

    /// View a present datum through capability `C`.
    pub(crate) fn upcast<C: Capability>(&self, datum: &Datum) -> Option<Arc<C::Object>> {
        let ty = datum.type_token()?;
        let value = datum.as_any_arc()?;
        self.capabilities_of(&ty).upcast::<C>(value)
    }

    /// Number of types described so far.
    pub fn len(&self) -> usize {
        self.sets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.read().is_empty()
    }
}

impl fmt::Debug for CapabilityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityTable")
            .field("types", &self.len())
            .finish()
    }
}

/// A handler parameter accepting any slot whose type provides `C`.
///
/// The original datum is kept next to the trait object, so the concrete value
/// can still be recovered with `downcast_ref`.
pub struct Cap<C: Capability> {
    object: Arc<C::Object>,
    datum: Datum,
}

/// A parameter accepting any error value, in data or error mode.
pub type AnyError = Cap<ErrorCapability>;

impl<C: Capability> Cap<C> {
    pub(crate) fn from_parts(object: Arc<C::Object>, datum: Datum) -> Self {
        Cap { object, datum }
    }

    /// The shared trait object.
    pub fn shared(&self) -> Arc<C::Object> {
        Arc::clone(&self.object)
    }

    /// The datum this capability was extracted from.
    pub fn datum(&self) -> &Datum {
        &self.datum
    }

    /// The concrete value, if it is a `T`.
    pub fn downcast_ref<T: Typed>(&self) -> Option<&T> {
        self.datum.downcast_ref::<T>()
    }

    pub(crate) fn into_parts(self) -> (Arc<C::Object>, Datum) {
        (self.object, self.datum)
    }
}

impl AnyError {
    /// Wrap a concrete error.
    pub fn new<E: Error + Typed>(error: E) -> Self {
        let value = Arc::new(error);
        let datum = Datum::from_arc(Arc::clone(&value));
        Cap::from_parts(value as Arc<dyn Error + Send + Sync>, datum)
    }
}

impl<C: Capability> Clone for Cap<C> {
    fn clone(&self) -> Self {
        Cap {
            object: Arc::clone(&self.object),
            datum: self.datum.clone(),
        }
    }
}

impl<C: Capability> Deref for Cap<C> {
    type Target = C::Object;

    fn deref(&self) -> &Self::Target {
        &self.object
    }
}

impl<C: Capability> fmt::Debug for Cap<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cap<{}>({:?})", C::name(), self.datum)
    }
}

impl fmt::Display for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.object, f)
    }
}
