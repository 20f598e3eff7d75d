//! `Fn` arities accepted by `Handler::new` and `Handler::variadic`.
//!
//! `Args` is a marker tuple of the parameter types. It keeps the impls for
//! different arities apart; callers never name it.

use std::any::Any;

use smallvec::{smallvec, SmallVec};

use super::{Arguments, Handler, HandlerType, Param, ParamKind, Rest};
use crate::outcome::{IntoOutcome, Outcome};

/// A callable with fixed parameters.
pub trait IntoHandler<Args>: Send + Sync + 'static {
    fn into_handler(self) -> Handler;
}

/// A callable whose last parameter is `Rest<T>`.
pub trait IntoVariadicHandler<Args>: Send + Sync + 'static {
    fn into_variadic_handler(self) -> Handler;
}

macro_rules! impl_into_handler {
    ($($param:ident),*) => {
        impl<Func, Ret, $($param,)*> IntoHandler<($($param,)*)> for Func
        where
            Func: Fn($($param),*) -> Ret + Send + Sync + 'static,
            Ret: IntoOutcome,
            $($param: Param,)*
        {
            fn into_handler(self) -> Handler {
                #[allow(non_snake_case, unused_mut, unused_variables)]
                fn invoke<Func, Ret, $($param,)*>(
                    function: &(dyn Any + Send + Sync),
                    args: &Arguments<'_>,
                ) -> Option<Outcome>
                where
                    Func: Fn($($param),*) -> Ret + 'static,
                    Ret: IntoOutcome,
                    $($param: Param,)*
                {
                    let function = function.downcast_ref::<Func>()?;
                    let mut slots = args.iter();
                    $(let $param = <$param as Param>::extract(slots.next()?)?;)*
                    Some(function($($param),*).into_outcome())
                }

                let params: SmallVec<[ParamKind; 4]> = smallvec![$(<$param as Param>::kind()),*];
                let ty = HandlerType::fixed(params);
                Handler::from_parts(ty, self, invoke::<Func, Ret, $($param,)*>)
            }
        }
    };
}

impl_into_handler!();
impl_into_handler!(A);
impl_into_handler!(A, B);
impl_into_handler!(A, B, C);
impl_into_handler!(A, B, C, D);
impl_into_handler!(A, B, C, D, E);
impl_into_handler!(A, B, C, D, E, F);
impl_into_handler!(A, B, C, D, E, F, G);
impl_into_handler!(A, B, C, D, E, F, G, H);

macro_rules! impl_into_variadic_handler {
    ($($param:ident),*) => {
        impl<Func, Ret, $($param,)* V> IntoVariadicHandler<($($param,)* Rest<V>,)> for Func
        where
            Func: Fn($($param,)* Rest<V>) -> Ret + Send + Sync + 'static,
            Ret: IntoOutcome,
            $($param: Param,)*
            V: Param,
        {
            fn into_variadic_handler(self) -> Handler {
                #[allow(non_snake_case, unused_mut)]
                fn invoke<Func, Ret, $($param,)* V>(
                    function: &(dyn Any + Send + Sync),
                    args: &Arguments<'_>,
                ) -> Option<Outcome>
                where
                    Func: Fn($($param,)* Rest<V>) -> Ret + 'static,
                    Ret: IntoOutcome,
                    $($param: Param,)*
                    V: Param,
                {
                    let function = function.downcast_ref::<Func>()?;
                    let mut slots = args.iter();
                    $(let $param = <$param as Param>::extract(slots.next()?)?;)*
                    let rest = slots.map(V::extract).collect::<Option<Vec<V>>>()?;
                    Some(function($($param,)* Rest(rest)).into_outcome())
                }

                let params: SmallVec<[ParamKind; 4]> = smallvec![$(<$param as Param>::kind()),*];
                let ty = HandlerType::variadic(params, V::kind());
                Handler::from_parts(ty, self, invoke::<Func, Ret, $($param,)* V>)
            }
        }
    };
}

impl_into_variadic_handler!();
impl_into_variadic_handler!(A);
impl_into_variadic_handler!(A, B);
impl_into_variadic_handler!(A, B, C);
impl_into_variadic_handler!(A, B, C, D);
impl_into_variadic_handler!(A, B, C, D, E);
impl_into_variadic_handler!(A, B, C, D, E, F);
