/// Dispatch priority of a delegate. Lower values are dispatched first.
///
/// [`Priority::UNSET`] (the default) marks a binding made without an explicit priority; it sorts after
/// every explicit priority. Delegates of equal priority are dispatched in the order they were bound.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Priority(u32);

impl Priority {
    /// No priority was supplied
    pub const UNSET: Priority = Priority(u32::MAX);

    pub const fn new(value: u32) -> Self { Self(value) }

    pub const fn value(self) -> u32 { self.0 }

    pub const fn is_unset(self) -> bool { self.0 == u32::MAX }
}

impl Default for Priority {
    fn default() -> Self { Self::UNSET }
}

impl From<u32> for Priority {
    fn from(value: u32) -> Self { Self(value) }
}

impl From<Priority> for u32 {
    fn from(priority: Priority) -> Self { priority.0 }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unset() {
            write!(f, "unset")
        } else {
            write!(f, "{}", self.value())
        }
    }
}
