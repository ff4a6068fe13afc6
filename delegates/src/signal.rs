use std::cell::{Cell, RefCell};
use std::collections::BinaryHeap;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::{
    callable::Callable,
    connection::{Connection, DelegateId, Detach, SignalId},
    priority::Priority,
    wrapper::{CallableWrapper, Prepend},
};

/// A bound callable owned by a signal, tagged with its identity
struct Entry<'a, A, R> {
    id: DelegateId,
    priority: Priority,
    wrapper: CallableWrapper<'a, A, R>,
}

impl<'a, A, R> PartialEq for Entry<'a, A, R> {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl<'a, A, R> Eq for Entry<'a, A, R> {}

impl<'a, A, R> PartialOrd for Entry<'a, A, R> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> { Some(self.cmp(other)) }
}

impl<'a, A, R> Ord for Entry<'a, A, R> {
    // BinaryHeap pops the greatest entry: lowest priority value first, then earliest bound
    fn cmp(&self, other: &Self) -> std::cmp::Ordering { other.priority.cmp(&self.priority).then_with(|| other.id.cmp(&self.id)) }
}

/// A delegate that is being called right now
struct Executing {
    id: DelegateId,
    detached: bool,
}

struct Inner<'a, A, R> {
    /// Delegates not yet visited by the innermost dispatch, in dispatch order
    pending: RefCell<BinaryHeap<Entry<'a, A, R>>>,
    /// One collection of already-visited delegates per active dispatch, outermost first
    visited: RefCell<Vec<Vec<Entry<'a, A, R>>>>,
    executing: RefCell<Vec<Executing>>,
    next_id: Cell<u64>,
}

impl<'a, A, R> Inner<'a, A, R> {
    fn allocate_id(&self) -> DelegateId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        DelegateId::new(id)
    }

    /// Takes the entry out of whichever collection holds it. Borrows are released before returning so the
    /// caller can drop the entry, which may run arbitrary drop code.
    fn take_entry(&self, id: DelegateId) -> Option<Entry<'a, A, R>> {
        {
            let mut pending = self.pending.borrow_mut();
            if pending.iter().any(|entry| entry.id == id) {
                let mut removed = None;
                let remaining: BinaryHeap<_> = std::mem::take(&mut *pending)
                    .into_iter()
                    .filter_map(|entry| {
                        if entry.id == id {
                            removed = Some(entry);
                            None
                        } else {
                            Some(entry)
                        }
                    })
                    .collect();
                *pending = remaining;
                return removed;
            }
        }
        let mut visited = self.visited.borrow_mut();
        for frame in visited.iter_mut() {
            if let Some(index) = frame.iter().position(|entry| entry.id == id) {
                return Some(frame.remove(index));
            }
        }
        None
    }

    fn mark_executing_detached(&self, id: DelegateId) -> bool {
        let mut executing = self.executing.borrow_mut();
        match executing.iter_mut().find(|executing| executing.id == id && !executing.detached) {
            Some(executing) => {
                executing.detached = true;
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        let pending = self.pending.borrow().len();
        let visited: usize = self.visited.borrow().iter().map(Vec::len).sum();
        let executing = self.executing.borrow().iter().filter(|executing| !executing.detached).count();
        pending + visited + executing
    }
}

impl<'a, A, R> Detach for Inner<'a, A, R> {
    fn detach(&self, id: DelegateId) -> bool {
        if let Some(entry) = self.take_entry(id) {
            trace!("Signal detached delegate {}", id);
            drop(entry);
            return true;
        }
        if self.mark_executing_detached(id) {
            trace!("Signal detached delegate {} while it is executing", id);
            return true;
        }
        false
    }

    fn contains(&self, id: DelegateId) -> bool {
        self.pending.borrow().iter().any(|entry| entry.id == id)
            || self.visited.borrow().iter().flatten().any(|entry| entry.id == id)
            || self.executing.borrow().iter().any(|executing| executing.id == id && !executing.detached)
    }
}

/// The visited collection of one dispatch. Merges its delegates back into `pending` when dropped,
/// including while unwinding from a panicking callable.
struct Frame<'s, 'a, A, R> {
    inner: &'s Inner<'a, A, R>,
    depth: usize,
}

impl<'s, 'a, A, R> Frame<'s, 'a, A, R> {
    fn open(inner: &'s Inner<'a, A, R>) -> Self {
        let mut visited = inner.visited.borrow_mut();
        let depth = visited.len();
        visited.push(Vec::new());
        Self { inner, depth }
    }

    fn retain(&self, entry: Entry<'a, A, R>) {
        let mut visited = self.inner.visited.borrow_mut();
        match visited.get_mut(self.depth) {
            Some(frame) => frame.push(entry),
            None => self.inner.pending.borrow_mut().push(entry),
        }
    }
}

impl<'s, 'a, A, R> Drop for Frame<'s, 'a, A, R> {
    fn drop(&mut self) {
        let frames = {
            let mut visited = self.inner.visited.borrow_mut();
            let depth = self.depth.min(visited.len());
            visited.split_off(depth)
        };
        self.inner.pending.borrow_mut().extend(frames.into_iter().flatten());
    }
}

/// The delegate currently being called by one dispatch. If the call unwinds, the delegate is put back
/// unless it was disconnected meanwhile.
struct InFlight<'s, 'a, A, R> {
    inner: &'s Inner<'a, A, R>,
    id: DelegateId,
    entry: Option<Entry<'a, A, R>>,
}

impl<'s, 'a, A, R> InFlight<'s, 'a, A, R> {
    fn start(inner: &'s Inner<'a, A, R>, id: DelegateId) -> Self {
        inner.executing.borrow_mut().push(Executing { id, detached: false });
        Self { inner, id, entry: None }
    }

    fn call(&mut self, entry: Entry<'a, A, R>, args: A) -> R { self.entry.insert(entry).wrapper.invoke(args) }

    /// Ends the call, returning the entry unless it was disconnected during the call
    fn finish(mut self) -> Option<Entry<'a, A, R>> {
        let entry = self.entry.take();
        if self.end() {
            entry
        } else {
            trace!("Signal dropping delegate {} disconnected during its own call", self.id);
            drop(entry);
            None
        }
    }

    /// Removes the executing record; false if the delegate was detached
    fn end(&self) -> bool {
        let mut executing = self.inner.executing.borrow_mut();
        match executing.iter().rposition(|executing| executing.id == self.id) {
            Some(index) => !executing.remove(index).detached,
            None => true,
        }
    }
}

impl<'s, 'a, A, R> Drop for InFlight<'s, 'a, A, R> {
    fn drop(&mut self) {
        if let Some(entry) = self.entry.take() {
            warn!("Signal delegate {} panicked; restoring it", self.id);
            if self.end() {
                self.inner.pending.borrow_mut().push(entry);
            }
        }
    }
}

/// A multicast dispatcher over the argument tuple `A`, whose delegates produce `R`.
///
/// Delegates are visited in ascending [`Priority`], delegates of equal priority in bind order, and
/// [`Priority::UNSET`] last. Callables may bind, disconnect, and fire on the signal that is calling them:
///
/// - a delegate bound during a dispatch is visited by that same dispatch
/// - a delegate disconnected during a dispatch is not visited afterwards; disconnecting the delegate
///   that is currently being called drops it once its call returns
/// - a nested dispatch visits the delegates the outer dispatch has not visited yet, after which the outer
///   dispatch continues with whatever is still pending
///
/// A panicking callable does not poison the signal. The panic propagates out of [`Signal::invoke`], and every
/// delegate that the interrupted dispatch had taken, the panicking one included, stays bound in its place.
///
/// Cloning a `Signal` shares the same delegates. The delegates are dropped with the last clone; use
/// [`Signal::downgrade`] to refer to a signal from one of its own callables.
pub struct Signal<'a, A, R = ()>(Rc<Inner<'a, A, R>>);

/// A non-owning reference to a [`Signal`]
pub struct WeakSignal<'a, A, R = ()>(Weak<Inner<'a, A, R>>);

impl<'a, A, R> Clone for Signal<'a, A, R> {
    fn clone(&self) -> Self { Self(Rc::clone(&self.0)) }
}

impl<'a, A, R> Clone for WeakSignal<'a, A, R> {
    fn clone(&self) -> Self { Self(Weak::clone(&self.0)) }
}

impl<'a, A, R> WeakSignal<'a, A, R> {
    pub fn upgrade(&self) -> Option<Signal<'a, A, R>> { self.0.upgrade().map(Signal) }
}

impl<'a, A: 'a, R: 'a> Default for Signal<'a, A, R> {
    fn default() -> Self { Self::new() }
}

impl<'a, A: 'a, R: 'a> Signal<'a, A, R> {
    pub fn new() -> Self {
        Self(Rc::new(Inner {
            pending: RefCell::new(BinaryHeap::new()),
            visited: RefCell::new(Vec::new()),
            executing: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }))
    }

    /// Get the unique identifier for this signal
    pub fn id(&self) -> SignalId { SignalId::from_ptr(Rc::as_ptr(&self.0)) }

    pub fn downgrade(&self) -> WeakSignal<'a, A, R> { WeakSignal(Rc::downgrade(&self.0)) }

    /// Binds a callable, returning the connection that detaches it again
    pub fn bind<C>(&self, callable: C, priority: Priority) -> Connection<'a>
    where C: Callable<A, R> + 'a {
        self.bind_wrapper(CallableWrapper::new(callable), priority)
    }

    /// Binds a callable without an explicit priority. It is dispatched after every prioritized delegate,
    /// in bind order among the other unprioritized ones.
    pub fn bind_unprioritized<C>(&self, callable: C) -> Connection<'a>
    where C: Callable<A, R> + 'a {
        self.bind(callable, Priority::UNSET)
    }

    /// Binds a callable whose leading parameters are filled from `payload` on every call
    pub fn bind_curried<C, P>(&self, callable: C, priority: Priority, payload: P) -> Connection<'a>
    where
        P: Prepend<A> + 'a,
        C: Callable<P::Output, R> + 'a,
    {
        self.bind_wrapper(CallableWrapper::curried(callable, payload), priority)
    }

    pub fn bind_wrapper(&self, wrapper: CallableWrapper<'a, A, R>, priority: Priority) -> Connection<'a> {
        let id = self.0.allocate_id();
        self.0.pending.borrow_mut().push(Entry { id, priority, wrapper });
        trace!("Signal {} bound delegate {} with priority {}", self.id(), id, priority);

        let signal: Weak<dyn Detach + 'a> = Rc::downgrade(&self.0) as Weak<dyn Detach + 'a>;
        Connection::new(signal, id)
    }

    /// Whether any delegate is bound
    pub fn is_bound(&self) -> bool { self.len() > 0 }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// The number of bound delegates, including those taking part in an ongoing dispatch
    pub fn len(&self) -> usize { self.0.len() }

    /// Disconnects every delegate. Outstanding connections become no-ops.
    pub fn clear(&self) {
        let pending = std::mem::take(&mut *self.0.pending.borrow_mut());
        let visited: Vec<Entry<'a, A, R>> = self.0.visited.borrow_mut().iter_mut().flat_map(std::mem::take).collect();
        for executing in self.0.executing.borrow_mut().iter_mut() {
            executing.detached = true;
        }
        debug!("Signal {} cleared {} delegates", self.id(), pending.len() + visited.len());
        drop(pending);
        drop(visited);
    }
}

impl<'a, A: Clone + 'a, R: 'a> Signal<'a, A, R> {
    /// Calls every delegate with `args`, ignoring the results
    pub fn invoke(&self, args: A) { self.dispatch(&args, |_| false); }

    /// Calls delegates with `args` until `predicate` accepts a result.
    ///
    /// The delegate whose result was accepted stays bound; delegates after it are not called. Returns the
    /// accepted result, or `None` if every delegate was called without one being accepted.
    pub fn invoke_until<P>(&self, predicate: P, args: A) -> Option<R>
    where P: FnMut(&R) -> bool {
        self.dispatch(&args, predicate)
    }

    fn dispatch(&self, args: &A, mut accept: impl FnMut(&R) -> bool) -> Option<R> {
        let inner = &*self.0;
        let frame = Frame::open(inner);
        let mut visits = 0usize;

        loop {
            let next = inner.pending.borrow_mut().pop();
            let Some(entry) = next else { break };
            let id = entry.id;
            trace!("Signal {} dispatching to delegate {} (priority {})", self.id(), id, entry.priority);

            let mut in_flight = InFlight::start(inner, id);
            let result = in_flight.call(entry, args.clone());
            visits += 1;

            if let Some(entry) = in_flight.finish() {
                frame.retain(entry);
            }
            if accept(&result) {
                debug!("Signal {} dispatch accepted the result of delegate {} after {} calls", self.id(), id, visits);
                return Some(result);
            }
        }

        debug!("Signal {} dispatch finished after {} calls", self.id(), visits);
        None
    }
}

impl<'a, A, R> std::fmt::Debug for Signal<'a, A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal").field("delegates", &self.0.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::{FreeFunction, FunctionObject};

    #[test]
    fn test_entries_pop_by_priority_then_bind_order() {
        let signal: Signal<(), u32> = Signal::new();
        for (tag, priority) in [(1, 5), (2, 1), (3, 5), (4, u32::MAX), (5, 1)] {
            signal.bind(FreeFunction(move || tag), Priority::new(priority));
        }

        let mut order = Vec::new();
        while let Some(mut entry) = signal.0.pending.borrow_mut().pop() {
            order.push(entry.wrapper.invoke(()));
        }
        assert_eq!(order, [2, 5, 1, 3, 4]);
    }

    #[test]
    fn test_collections_are_restored_after_dispatch() {
        let signal: Signal<(i32,), i32> = Signal::new();
        signal.bind(FunctionObject::Owned(|value: i32| value), Priority::new(1));
        signal.bind(FunctionObject::Owned(|value: i32| value + 1), Priority::new(2));

        signal.invoke((1,));
        assert_eq!(signal.0.pending.borrow().len(), 2);
        assert!(signal.0.visited.borrow().is_empty());
        assert!(signal.0.executing.borrow().is_empty());

        assert_eq!(signal.invoke_until(|result: &i32| *result == 1, (1,)), Some(1));
        assert_eq!(signal.0.pending.borrow().len(), 2);
        assert!(signal.0.visited.borrow().is_empty());
    }

    #[test]
    fn test_clear_disconnects_everything() {
        let signal: Signal<(), ()> = Signal::new();
        let first = signal.bind(FreeFunction(|| ()), Priority::UNSET);
        let _second = signal.bind(FreeFunction(|| ()), Priority::UNSET);
        assert_eq!(signal.len(), 2);

        signal.clear();
        assert!(signal.is_empty());
        assert!(!signal.is_bound());
        assert_eq!(first.disconnect(), Ok(false));
    }
}
