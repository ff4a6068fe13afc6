//! The kinds of callable a delegate can be bound to.
//!
//! Every kind implements [`Callable`] for an argument tuple, so a [`CallableWrapper`](crate::CallableWrapper)
//! can erase the concrete type and invoke it uniformly. Which kind (and for function objects, which
//! ownership mode) is used is always chosen by the caller when binding:
//!
//! - [`FreeFunction`] wraps a plain function or a stateless `Fn` closure
//! - [`BoundMethod`] pairs a receiver the caller owns with a method taking that receiver first. With
//!   [`BoundMethod::converting`] the method's parameter and result types only need to convert (via [`Into`])
//!   from and to the signal's argument and result types
//! - [`FunctionObject`] either borrows a caller-owned closure or takes ownership of one

use std::marker::PhantomData;

/// Something that can be called with the argument tuple `Args`, producing `R`.
pub trait Callable<Args, R> {
    fn call(&mut self, args: Args) -> R;
}

/// A plain function: a fn item, a fn pointer, or a closure with nothing to mutate.
#[derive(Debug, Clone, Copy)]
pub struct FreeFunction<F>(pub F);

/// A closure or other function object.
///
/// `Borrowed` leaves the callable with the caller, who gets it back (with whatever state it accumulated)
/// once the binding's lifetime ends. `Owned` moves the callable into the wrapper, which drops it exactly
/// once when the binding is dropped.
pub enum FunctionObject<'a, F> {
    Borrowed(&'a mut F),
    Owned(F),
}

impl<'a, F> FunctionObject<'a, F> {
    pub fn is_owned(&self) -> bool { matches!(self, FunctionObject::Owned(_)) }
}

impl<'a, F> std::fmt::Debug for FunctionObject<'a, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionObject::Borrowed(_) => f.write_str("FunctionObject::Borrowed"),
            FunctionObject::Owned(_) => f.write_str("FunctionObject::Owned"),
        }
    }
}

/// A method bound to an instance the caller owns.
///
/// `Recv` is `&'a mut T` for methods taking `&mut self` and `&'a T` for methods taking `&self`.
/// The instance is never owned by the binding.
///
/// ```
/// use ankurah_delegates::BoundMethod;
///
/// struct Meter(u32);
/// impl Meter {
///     fn add(&mut self, amount: u32) -> u32 { self.0 += amount; self.0 }
///     fn read(&self) -> u32 { self.0 }
/// }
///
/// let mut meter = Meter(0);
/// let _mutable = BoundMethod::new(&mut meter, Meter::add);
/// let meter = Meter(1);
/// let _read_only = BoundMethod::new(&meter, Meter::read);
/// ```
pub struct BoundMethod<Recv, M> {
    receiver: Recv,
    method: M,
}

impl<Recv, M> BoundMethod<Recv, M> {
    pub fn new(receiver: Recv, method: M) -> Self { Self { receiver, method } }
}

impl<Recv, M, Params, MR> BoundMethod<Recv, Converted<M, Params, MR>> {
    /// Binds a method whose signature differs from the call shape. Each call-time argument is converted
    /// into the method's parameter type and the method's result into the expected result type.
    ///
    /// ```
    /// use ankurah_delegates::*;
    ///
    /// struct Meter(i64);
    /// impl Meter {
    ///     fn wide(&self, delta: i64) -> i32 { (self.0 + delta) as i32 }
    /// }
    ///
    /// let meter = Meter(40);
    /// let signal: Signal<(i32,), i64> = Signal::new();
    /// signal.bind(BoundMethod::converting(&meter, Meter::wide), Priority::new(1));
    /// assert_eq!(signal.invoke_until(|_: &i64| true, (2,)), Some(42));
    /// ```
    pub fn converting(receiver: Recv, method: M) -> Self { Self::new(receiver, Converted::new(method)) }
}

impl<Recv, M> std::fmt::Debug for BoundMethod<Recv, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("BoundMethod").finish_non_exhaustive() }
}

/// Adapts a method whose parameters are `Params` and whose result is `MR` to any argument tuple whose
/// elements convert into `Params`, and any result type `MR` converts into.
pub struct Converted<M, Params, MR> {
    method: M,
    shape: PhantomData<fn(Params) -> MR>,
}

impl<M, Params, MR> Converted<M, Params, MR> {
    pub fn new(method: M) -> Self { Self { method, shape: PhantomData } }
}

/// A method selector: anything callable with a receiver of type `Recv` followed by `Args`.
pub trait MethodSelector<Recv, Args, R> {
    fn select(&mut self, receiver: &mut Recv, args: Args) -> R;
}

impl<Recv, M, Args, R> Callable<Args, R> for BoundMethod<Recv, M>
where M: MethodSelector<Recv, Args, R>
{
    fn call(&mut self, args: Args) -> R { self.method.select(&mut self.receiver, args) }
}

macro_rules! impl_callables {
    ($($ty:ident $param:ident $var:ident),*) => {
        impl<F, R, $($ty,)*> Callable<($($ty,)*), R> for FreeFunction<F>
        where F: Fn($($ty),*) -> R
        {
            fn call(&mut self, ($($var,)*): ($($ty,)*)) -> R { (self.0)($($var),*) }
        }

        impl<'a, F, R, $($ty,)*> Callable<($($ty,)*), R> for FunctionObject<'a, F>
        where F: FnMut($($ty),*) -> R
        {
            fn call(&mut self, ($($var,)*): ($($ty,)*)) -> R {
                match self {
                    FunctionObject::Borrowed(callable) => (**callable)($($var),*),
                    FunctionObject::Owned(callable) => callable($($var),*),
                }
            }
        }

        impl<'r, T, M, R, $($ty,)*> MethodSelector<&'r mut T, ($($ty,)*), R> for M
        where M: FnMut(&mut T $(, $ty)*) -> R
        {
            fn select(&mut self, receiver: &mut &'r mut T, ($($var,)*): ($($ty,)*)) -> R { self(&mut **receiver $(, $var)*) }
        }

        impl<'r, T, M, R, $($ty,)*> MethodSelector<&'r T, ($($ty,)*), R> for M
        where M: FnMut(&T $(, $ty)*) -> R
        {
            fn select(&mut self, receiver: &mut &'r T, ($($var,)*): ($($ty,)*)) -> R { self(*receiver $(, $var)*) }
        }

        impl<'r, T, M, R, MR, $($ty: Into<$param>, $param,)*> MethodSelector<&'r mut T, ($($ty,)*), R> for Converted<M, ($($param,)*), MR>
        where
            M: FnMut(&mut T $(, $param)*) -> MR,
            MR: Into<R>,
        {
            fn select(&mut self, receiver: &mut &'r mut T, ($($var,)*): ($($ty,)*)) -> R {
                (self.method)(&mut **receiver $(, $var.into())*).into()
            }
        }

        impl<'r, T, M, R, MR, $($ty: Into<$param>, $param,)*> MethodSelector<&'r T, ($($ty,)*), R> for Converted<M, ($($param,)*), MR>
        where
            M: FnMut(&T $(, $param)*) -> MR,
            MR: Into<R>,
        {
            fn select(&mut self, receiver: &mut &'r T, ($($var,)*): ($($ty,)*)) -> R { (self.method)(*receiver $(, $var.into())*).into() }
        }
    };
}

// Up to four curried values ahead of up to six call-time arguments
impl_callables!();
impl_callables!(A1 B1 a1);
impl_callables!(A1 B1 a1, A2 B2 a2);
impl_callables!(A1 B1 a1, A2 B2 a2, A3 B3 a3);
impl_callables!(A1 B1 a1, A2 B2 a2, A3 B3 a3, A4 B4 a4);
impl_callables!(A1 B1 a1, A2 B2 a2, A3 B3 a3, A4 B4 a4, A5 B5 a5);
impl_callables!(A1 B1 a1, A2 B2 a2, A3 B3 a3, A4 B4 a4, A5 B5 a5, A6 B6 a6);
impl_callables!(A1 B1 a1, A2 B2 a2, A3 B3 a3, A4 B4 a4, A5 B5 a5, A6 B6 a6, A7 B7 a7);
impl_callables!(A1 B1 a1, A2 B2 a2, A3 B3 a3, A4 B4 a4, A5 B5 a5, A6 B6 a6, A7 B7 a7, A8 B8 a8);
impl_callables!(A1 B1 a1, A2 B2 a2, A3 B3 a3, A4 B4 a4, A5 B5 a5, A6 B6 a6, A7 B7 a7, A8 B8 a8, A9 B9 a9);
impl_callables!(A1 B1 a1, A2 B2 a2, A3 B3 a3, A4 B4 a4, A5 B5 a5, A6 B6 a6, A7 B7 a7, A8 B8 a8, A9 B9 a9, A10 B10 a10);
