/*!
Prioritized, single-threaded signals with detachable connections.

A [`Signal`] holds delegates, each wrapping one callable, and calls all of them in priority order when
invoked. Binding returns a [`Connection`] that later detaches exactly that delegate, without having to
name the signal's argument or result types.

# Design requirements:
- Callable kinds are explicit at the call site: [`FreeFunction`], [`BoundMethod`] (mutable or read-only
  receiver), [`FunctionObject`] (borrowed or owned)
- Curried payload values are prepended to call-time arguments on every call
- Lower [`Priority`] values are dispatched first; [`Priority::UNSET`] is dispatched last; ties go in bind order
- Callables may bind, disconnect and invoke on the signal that is calling them
- Connections never keep a signal alive, and report a dropped signal instead of touching it

# Basic usage

```rust
use ankurah_delegates::*;
use std::cell::RefCell;

fn announce(city: &str, degrees: i32) -> String { format!("{city}: {degrees}") }

let seen = RefCell::new(Vec::new());
let signal: Signal<(i32,), String> = Signal::new();

// curried: "Oslo" is prepended to every call
signal.bind_curried(FreeFunction(announce), Priority::new(2), ("Oslo",));
let logger = signal.bind(
    FunctionObject::Owned(|degrees: i32| {
        seen.borrow_mut().push(degrees);
        String::from("logged")
    }),
    Priority::new(1),
);

signal.invoke((21,));
assert_eq!(*seen.borrow(), [21]);

// stop at the first result that mentions a city
let found = signal.invoke_until(|result: &String| result.contains(':'), (-3,));
assert_eq!(found.as_deref(), Some("Oslo: -3"));

logger.disconnect().unwrap();
signal.invoke((5,));
assert_eq!(*seen.borrow(), [21, -3]);
```

# Reentrancy

```rust
use ankurah_delegates::*;
use std::cell::Cell;
use std::rc::Rc;

let calls = Rc::new(Cell::new(0));
let signal: Signal<()> = Signal::new();
let weak = signal.downgrade();
let late = calls.clone();
signal.bind(
    FunctionObject::Owned(move || {
        if let Some(signal) = weak.upgrade() {
            let late = late.clone();
            // bound during dispatch, and still called by it
            signal.bind(FunctionObject::Owned(move || late.set(late.get() + 1)), Priority::UNSET);
        }
    }),
    Priority::new(0),
);

signal.invoke(());
assert_eq!(calls.get(), 1);
```
*/

mod callable;
mod channel;
mod connection;
mod delegate;
mod error;
mod priority;
mod signal;
mod wrapper;

pub use callable::*;
pub use connection::*;
pub use delegate::*;
pub use error::*;
pub use priority::*;
pub use signal::*;
pub use wrapper::*;
