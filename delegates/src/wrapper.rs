use crate::callable::Callable;

/// Prepends a curried payload tuple to a call-time argument tuple.
///
/// Implemented for payloads of up to four values ahead of up to six call-time arguments. Payload values
/// are cloned on every call, so the payload itself is never consumed.
pub trait Prepend<Args> {
    type Output;
    fn prepend(&self, args: Args) -> Self::Output;
}

/// Object-safe invocation over the call-time argument tuple
trait Invoke<Args, R> {
    fn invoke(&mut self, args: Args) -> R;
}

struct Plain<C>(C);

impl<Args, R, C> Invoke<Args, R> for Plain<C>
where C: Callable<Args, R>
{
    fn invoke(&mut self, args: Args) -> R { self.0.call(args) }
}

struct Curried<C, P> {
    callable: C,
    payload: P,
}

impl<Args, R, C, P> Invoke<Args, R> for Curried<C, P>
where
    P: Prepend<Args>,
    C: Callable<P::Output, R>,
{
    fn invoke(&mut self, args: Args) -> R { self.callable.call(self.payload.prepend(args)) }
}

/// A type-erased callable, invocable with the argument tuple `Args`.
///
/// Holds exactly one callable and, when built with [`CallableWrapper::curried`], the payload that is
/// prepended to every call. The lifetime `'a` bounds whatever the callable borrows.
pub struct CallableWrapper<'a, Args, R = ()>(Box<dyn Invoke<Args, R> + 'a>);

impl<'a, Args, R> CallableWrapper<'a, Args, R> {
    pub fn new<C>(callable: C) -> Self
    where C: Callable<Args, R> + 'a {
        Self(Box::new(Plain(callable)))
    }

    /// Wrap a callable whose leading parameters are filled from `payload` on every call
    pub fn curried<C, P>(callable: C, payload: P) -> Self
    where
        P: Prepend<Args> + 'a,
        C: Callable<P::Output, R> + 'a,
    {
        Self(Box::new(Curried { callable, payload }))
    }

    pub fn invoke(&mut self, args: Args) -> R { self.0.invoke(args) }
}

impl<'a, Args, R> std::fmt::Debug for CallableWrapper<'a, Args, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("CallableWrapper").finish_non_exhaustive() }
}

macro_rules! impl_prepend {
    (($($p:ident $pv:ident),*) ($($a:ident $av:ident),*)) => {
        impl<$($p: Clone,)* $($a,)*> Prepend<($($a,)*)> for ($($p,)*) {
            type Output = ($($p,)* $($a,)*);

            #[allow(clippy::unused_unit)]
            fn prepend(&self, ($($av,)*): ($($a,)*)) -> Self::Output {
                let ($($pv,)*) = self;
                ($($pv.clone(),)* $($av,)*)
            }
        }
    };
}

macro_rules! impl_prepend_payload {
    ($payload:tt) => {
        impl_prepend!($payload ());
        impl_prepend!($payload (A1 a1));
        impl_prepend!($payload (A1 a1, A2 a2));
        impl_prepend!($payload (A1 a1, A2 a2, A3 a3));
        impl_prepend!($payload (A1 a1, A2 a2, A3 a3, A4 a4));
        impl_prepend!($payload (A1 a1, A2 a2, A3 a3, A4 a4, A5 a5));
        impl_prepend!($payload (A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6));
    };
}

impl_prepend_payload!(());
impl_prepend_payload!((P1 p1));
impl_prepend_payload!((P1 p1, P2 p2));
impl_prepend_payload!((P1 p1, P2 p2, P3 p3));
impl_prepend_payload!((P1 p1, P2 p2, P3 p3, P4 p4));
