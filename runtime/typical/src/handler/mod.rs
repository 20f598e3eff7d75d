//! Candidate handlers.
//!
//! A `Handler` is a type-erased closure together with the `HandlerType` it
//! declares: the kind of every positional parameter plus, for variadic
//! handlers, the kind of the trailing elements. Kinds are captured from the
//! closure's parameter types when the handler is built, so matching never
//! has to introspect the closure itself.
//!
//! ```text
//! Handler::new(|a: i64, b: i64| a + b)                  // fn(i64, i64)
//! Handler::new(|e: AnyError| e.to_string())             // fn(error)
//! Handler::variadic(|first: String, rest: Rest<String>| ...) // fn(String, ...String)
//! ```

mod arity;
mod params;

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::capability::CapabilityId;
use crate::outcome::Outcome;
use crate::typed::{TypeToken, Typed};

pub use arity::{IntoHandler, IntoVariadicHandler};
pub use params::{AnyValue, Arg, Arguments, Param, Rest};

/// What a single declared parameter accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Exactly this concrete type.
    Exact(TypeToken),
    /// Every slot, including absent ones.
    Any,
    /// Every concrete type that provides the capability.
    Capability(CapabilityId),
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Exact(ty) => f.write_str(ty.name()),
            ParamKind::Any => f.write_str("any"),
            ParamKind::Capability(capability) => f.write_str(capability.name()),
        }
    }
}

#[derive(PartialEq, Eq, Hash)]
struct Shape {
    params: SmallVec<[ParamKind; 4]>,
    variadic: Option<ParamKind>,
}

/// The declared parameter list of a handler; the handler identity used by
/// the match cache.
///
/// Two handlers with the same parameter kinds share a `HandlerType`, and so
/// share cached match decisions.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct HandlerType(Arc<Shape>);

impl HandlerType {
    /// A fixed-arity parameter list.
    pub fn fixed(params: impl IntoIterator<Item = ParamKind>) -> Self {
        HandlerType(Arc::new(Shape {
            params: params.into_iter().collect(),
            variadic: None,
        }))
    }

    /// Fixed parameters followed by zero or more `element`s.
    pub fn variadic(params: impl IntoIterator<Item = ParamKind>, element: ParamKind) -> Self {
        HandlerType(Arc::new(Shape {
            params: params.into_iter().collect(),
            variadic: Some(element),
        }))
    }

    /// The fixed parameters.
    #[inline]
    pub fn params(&self) -> &[ParamKind] {
        &self.0.params
    }

    /// The element kind of the trailing variadic parameter.
    #[inline]
    pub fn variadic_element(&self) -> Option<ParamKind> {
        self.0.variadic
    }

    #[inline]
    pub fn is_variadic(&self) -> bool {
        self.0.variadic.is_some()
    }

    /// Number of fixed parameters.
    #[inline]
    pub fn arity(&self) -> usize {
        self.0.params.len()
    }
}

impl fmt::Display for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, param) in self.params().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        if let Some(element) = self.variadic_element() {
            if self.arity() > 0 {
                f.write_str(", ")?;
            }
            write!(f, "...{element}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

type Invoke = fn(&(dyn Any + Send + Sync), &Arguments<'_>) -> Option<Outcome>;

struct HandlerInner {
    ty: HandlerType,
    name: &'static str,
    fn_type: TypeId,
    function: Box<dyn Any + Send + Sync>,
    invoke: Invoke,
}

/// A type-erased candidate handler. Cloning is cheap.
#[derive(Clone)]
pub struct Handler(Arc<HandlerInner>);

impl Handler {
    /// Wrap a closure or function of up to eight parameters.
    pub fn new<Args, F: IntoHandler<Args>>(function: F) -> Self {
        function.into_handler()
    }

    /// Wrap a closure whose last parameter is `Rest<T>`.
    pub fn variadic<Args, F: IntoVariadicHandler<Args>>(function: F) -> Self {
        function.into_variadic_handler()
    }

    pub(crate) fn from_parts<F: Send + Sync + 'static>(
        ty: HandlerType,
        function: F,
        invoke: Invoke,
    ) -> Self {
        Handler(Arc::new(HandlerInner {
            ty,
            name: std::any::type_name::<F>(),
            fn_type: TypeId::of::<F>(),
            function: Box::new(function),
            invoke,
        }))
    }

    #[inline]
    pub fn handler_type(&self) -> &HandlerType {
        &self.0.ty
    }

    /// Type name of the wrapped callable.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.0.name
    }

    /// `TypeId` of the wrapped callable, the key of accelerated shims.
    #[inline]
    pub fn fn_type(&self) -> TypeId {
        self.0.fn_type
    }

    /// The wrapped callable, if it is an `F`.
    pub fn function<F: 'static>(&self) -> Option<&F> {
        self.0.function.downcast_ref::<F>()
    }

    /// Call through the generic path. `None` means an argument could not be
    /// extracted.
    pub(crate) fn call(&self, args: &Arguments<'_>) -> Option<Outcome> {
        (self.0.invoke)(&*self.0.function, args)
    }
}

impl Typed for Handler {}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("type", &self.0.ty)
            .field("name", &self.0.name)
            .finish()
    }
}

#[cfg(test)]
mod tests;
