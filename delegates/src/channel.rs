//! Channel senders as callables: each call forwards its single argument into the channel.

use crate::callable::Callable;

impl<T> Callable<(T,), ()> for std::sync::mpsc::Sender<T> {
    fn call(&mut self, (value,): (T,)) {
        if let Err(e) = self.send(value) {
            tracing::trace!("Channel delegate discarding a value: {}", e);
        }
    }
}

#[cfg(feature = "tokio")]
impl<T> Callable<(T,), ()> for tokio::sync::mpsc::UnboundedSender<T> {
    fn call(&mut self, (value,): (T,)) {
        if let Err(e) = self.send(value) {
            tracing::trace!("Channel delegate discarding a value: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Priority, Signal};

    #[test]
    fn test_std_sender_receives_every_value() {
        let (tx, rx) = std::sync::mpsc::channel::<u32>();
        let signal: Signal<(u32,)> = Signal::new();
        signal.bind(tx, Priority::UNSET);

        signal.invoke((1,));
        signal.invoke((2,));
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), [1, 2]);

        // a closed receiver does not disturb the signal
        drop(rx);
        signal.invoke((3,));
        assert_eq!(signal.len(), 1);
    }

    #[test]
    #[cfg(feature = "tokio")]
    fn test_tokio_sender_receives_every_value() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<&'static str>();
        let signal: Signal<(&'static str,)> = Signal::new();
        let connection = signal.bind(tx, Priority::new(0));

        signal.invoke(("hello",));
        assert_eq!(rx.try_recv(), Ok("hello"));

        connection.disconnect().unwrap();
        signal.invoke(("ignored",));
        // the sender was dropped along with its delegate
        assert!(rx.try_recv().is_err());
    }

    #[test]
    #[cfg(feature = "tokio")]
    fn test_closed_tokio_receiver_keeps_the_delegate_bound() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<u8>();
        let signal: Signal<(u8,)> = Signal::new();
        signal.bind(tx, Priority::UNSET);

        drop(rx);
        signal.invoke((1,));
        signal.invoke((2,));
        assert_eq!(signal.len(), 1);
    }
}
