use crate::{
    callable::Callable,
    error::DelegateError,
    priority::Priority,
    wrapper::{CallableWrapper, Prepend},
};

/// A single bound-callable slot with a priority.
///
/// A delegate exclusively owns at most one [`CallableWrapper`]. It cannot be cloned; [`Delegate::take`]
/// moves the wrapper and priority out and leaves the source unbound. Delegates compare by priority only.
pub struct Delegate<'a, Args, R = ()> {
    wrapper: Option<CallableWrapper<'a, Args, R>>,
    priority: Priority,
}

impl<'a, Args, R> Default for Delegate<'a, Args, R> {
    fn default() -> Self { Self { wrapper: None, priority: Priority::UNSET } }
}

impl<'a, Args, R> Delegate<'a, Args, R> {
    /// Creates an unbound delegate
    pub fn new() -> Self { Self::default() }

    pub fn bind<C>(&mut self, callable: C, priority: Priority) -> Result<(), DelegateError>
    where C: Callable<Args, R> + 'a {
        self.ensure_unbound()?;
        self.bind_wrapper(CallableWrapper::new(callable), priority)
    }

    /// Bind a callable whose leading parameters are filled from `payload` on every call
    pub fn bind_curried<C, P>(&mut self, callable: C, priority: Priority, payload: P) -> Result<(), DelegateError>
    where
        P: Prepend<Args> + 'a,
        C: Callable<P::Output, R> + 'a,
    {
        self.ensure_unbound()?;
        self.bind_wrapper(CallableWrapper::curried(callable, payload), priority)
    }

    pub fn bind_wrapper(&mut self, wrapper: CallableWrapper<'a, Args, R>, priority: Priority) -> Result<(), DelegateError> {
        self.ensure_unbound()?;
        self.wrapper = Some(wrapper);
        self.priority = priority;
        Ok(())
    }

    /// Releases the bound wrapper, if any. The priority is kept.
    pub fn unbind(&mut self) -> Option<CallableWrapper<'a, Args, R>> { self.wrapper.take() }

    pub fn invoke(&mut self, args: Args) -> Result<R, DelegateError> {
        match self.wrapper.as_mut() {
            Some(wrapper) => Ok(wrapper.invoke(args)),
            None => Err(DelegateError::NotBound),
        }
    }

    pub fn is_bound(&self) -> bool { self.wrapper.is_some() }

    pub fn priority(&self) -> Priority { self.priority }

    /// Moves the wrapper and priority into a new delegate, leaving this one unbound
    pub fn take(&mut self) -> Self { std::mem::take(self) }

    /// Exchanges wrapper and priority with `other`
    pub fn swap(&mut self, other: &mut Self) { std::mem::swap(self, other) }

    fn ensure_unbound(&self) -> Result<(), DelegateError> {
        if self.is_bound() {
            return Err(DelegateError::AlreadyBound);
        }
        Ok(())
    }
}

impl<'a, Args, R> PartialEq for Delegate<'a, Args, R> {
    fn eq(&self, other: &Self) -> bool { self.priority == other.priority }
}

impl<'a, Args, R> Eq for Delegate<'a, Args, R> {}

impl<'a, Args, R> PartialOrd for Delegate<'a, Args, R> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> { Some(self.cmp(other)) }
}

impl<'a, Args, R> Ord for Delegate<'a, Args, R> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering { self.priority.cmp(&other.priority) }
}

impl<'a, Args, R> std::fmt::Debug for Delegate<'a, Args, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delegate").field("bound", &self.is_bound()).field("priority", &self.priority).finish()
    }
}
