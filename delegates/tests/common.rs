use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    let level = std::env::var("LOG_LEVEL").ok().and_then(|level| Level::from_str(&level).ok()).unwrap_or(Level::INFO);
    let _ = tracing_subscriber::fmt().with_max_level(level).with_test_writer().try_init();
}

/// Shared record of the calls made by delegates under test
#[allow(unused)]
pub struct CallLog<T>(Rc<RefCell<Vec<T>>>);

impl<T> Clone for CallLog<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

#[allow(unused)]
impl<T> CallLog<T> {
    pub fn new() -> Self { Self(Rc::new(RefCell::new(Vec::new()))) }

    pub fn record(&self, call: T) { self.0.borrow_mut().push(call); }

    /// Drains everything recorded so far
    pub fn take(&self) -> Vec<T> { self.0.borrow_mut().drain(..).collect() }
}
