use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegateError {
    #[error("delegate not bound")]
    NotBound,
    #[error("delegate already bound")]
    AlreadyBound,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionError {
    /// The signal this connection was issued by no longer exists
    #[error("signal already dropped")]
    SignalDropped,
}
