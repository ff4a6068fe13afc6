use std::rc::Weak;

use crate::error::ConnectionError;

/// Identity of a delegate bound to a signal. Allocated by the signal, never reused by it.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct DelegateId(u64);

impl DelegateId {
    pub(crate) fn new(id: u64) -> Self { Self(id) }
}

impl std::fmt::Display for DelegateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

/// A unique identifier for a signal, usable for comparison only.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SignalId(usize);

impl SignalId {
    pub(crate) fn from_ptr<T: ?Sized>(ptr: *const T) -> Self { Self(ptr as *const () as usize) }
}

impl std::fmt::Display for SignalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{:#x}", self.0) }
}

/// The signal-side half of a connection, with the signal's argument and result types erased
pub(crate) trait Detach {
    /// Removes the delegate, returning whether it was still bound
    fn detach(&self, id: DelegateId) -> bool;

    fn contains(&self, id: DelegateId) -> bool;
}

/// A capability to detach one specific delegate from the signal that issued it.
///
/// A connection does not keep its signal alive. Disconnecting after the signal is gone reports
/// [`ConnectionError::SignalDropped`]. The default connection is associated with no signal and
/// disconnecting it does nothing.
#[derive(Clone, Default)]
pub struct Connection<'a> {
    signal: Option<Weak<dyn Detach + 'a>>,
    id: DelegateId,
}

impl<'a> Connection<'a> {
    pub(crate) fn new(signal: Weak<dyn Detach + 'a>, id: DelegateId) -> Self { Self { signal: Some(signal), id } }

    /// Detaches the delegate from its signal.
    ///
    /// Returns `Ok(true)` if the delegate was removed and `Ok(false)` if there was nothing to remove:
    /// the connection is the default one, or the delegate was already disconnected.
    pub fn disconnect(&self) -> Result<bool, ConnectionError> {
        let Some(signal) = self.signal.as_ref() else {
            return Ok(false);
        };
        match signal.upgrade() {
            Some(signal) => Ok(signal.detach(self.id)),
            None => Err(ConnectionError::SignalDropped),
        }
    }

    /// Whether the designated delegate is still bound to a live signal
    pub fn is_connected(&self) -> bool {
        self.signal.as_ref().and_then(Weak::upgrade).map(|signal| signal.contains(self.id)).unwrap_or(false)
    }

    pub fn delegate_id(&self) -> DelegateId { self.id }

    /// The signal this connection was issued by, if any. Still reported after the signal is dropped.
    pub fn signal_id(&self) -> Option<SignalId> { self.signal.as_ref().map(|signal| SignalId::from_ptr(signal.as_ptr())) }

    /// Wrap this connection in a guard that disconnects when dropped
    pub fn guard(self) -> ConnectionGuard<'a> { ConnectionGuard(self) }
}

impl<'a> std::fmt::Debug for Connection<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").field("signal", &self.signal_id()).field("delegate", &self.id).finish()
    }
}

/// A connection that disconnects automatically when it goes out of scope.
#[must_use = "dropping the guard disconnects immediately"]
pub struct ConnectionGuard<'a>(Connection<'a>);

impl<'a> ConnectionGuard<'a> {
    pub fn connection(&self) -> &Connection<'a> { &self.0 }

    /// Dissolves the guard without disconnecting
    pub fn release(self) -> Connection<'a> {
        let mut guard = std::mem::ManuallyDrop::new(self);
        std::mem::take(&mut guard.0)
    }
}

impl<'a> From<Connection<'a>> for ConnectionGuard<'a> {
    fn from(connection: Connection<'a>) -> Self { connection.guard() }
}

impl<'a> Drop for ConnectionGuard<'a> {
    fn drop(&mut self) {
        if let Err(e) = self.0.disconnect() {
            tracing::trace!("ConnectionGuard dropped for delegate {}: {}", self.0.id, e);
        }
    }
}

impl<'a> std::fmt::Debug for ConnectionGuard<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_tuple("ConnectionGuard").field(&self.0).finish() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Registry(RefCell<Vec<DelegateId>>);

    impl Detach for Registry {
        fn detach(&self, id: DelegateId) -> bool {
            let mut ids = self.0.borrow_mut();
            let before = ids.len();
            ids.retain(|bound| *bound != id);
            ids.len() != before
        }
        fn contains(&self, id: DelegateId) -> bool { self.0.borrow().contains(&id) }
    }

    fn connect(registry: &Rc<Registry>, id: u64) -> Connection<'static> {
        registry.0.borrow_mut().push(DelegateId::new(id));
        let weak: Weak<dyn Detach> = Rc::downgrade(registry) as Weak<dyn Detach>;
        Connection::new(weak, DelegateId::new(id))
    }

    #[test]
    fn test_default_connection_is_a_noop() {
        let connection = Connection::default();
        assert_eq!(connection.disconnect(), Ok(false));
        assert_eq!(connection.disconnect(), Ok(false));
        assert!(!connection.is_connected());
        assert_eq!(connection.signal_id(), None);
    }

    #[test]
    fn test_disconnect_targets_one_identity() {
        let registry = Rc::new(Registry::default());
        let first = connect(&registry, 1);
        let second = connect(&registry, 2);

        assert_eq!(first.disconnect(), Ok(true));
        assert_eq!(first.disconnect(), Ok(false));
        assert!(!first.is_connected());
        assert!(second.is_connected());
        assert_eq!(first.signal_id(), second.signal_id());
    }

    #[test]
    fn test_dropped_signal_is_reported() {
        let registry = Rc::new(Registry::default());
        let connection = connect(&registry, 1);
        drop(registry);
        assert_eq!(connection.disconnect(), Err(ConnectionError::SignalDropped));
        assert!(!connection.is_connected());
        assert!(connection.signal_id().is_some());
    }

    #[test]
    fn test_guard_disconnects_on_drop_unless_released() {
        let registry = Rc::new(Registry::default());
        {
            let _guard = connect(&registry, 1).guard();
            assert!(registry.contains(DelegateId::new(1)));
        }
        assert!(!registry.contains(DelegateId::new(1)));

        let released = connect(&registry, 2).guard().release();
        assert!(released.is_connected());
    }
}
