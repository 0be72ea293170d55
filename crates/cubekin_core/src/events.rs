use std::sync::mpsc;

use tracing::debug;

/// Sending half of a background-to-frame event queue.
pub struct EventSender<T> {
    tx: mpsc::Sender<T>,
}

/// Receiving half, polled once per frame by the simulation thread.
pub struct EventReceiver<T> {
    rx: mpsc::Receiver<T>,
}

pub fn channel<T>() -> (EventSender<T>, EventReceiver<T>) {
    let (tx, rx) = mpsc::channel();
    (EventSender { tx }, EventReceiver { rx })
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> EventSender<T> {
    /// Returns `false` when the receiving side is gone; the event is dropped.
    pub fn send(&self, event: T) -> bool {
        if self.tx.send(event).is_err() {
            debug!("Event receiver dropped, discarding event");
            return false;
        }
        true
    }
}

impl<T> EventReceiver<T> {
    pub fn try_recv(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Takes every event queued so far without blocking.
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }

    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<T> {
        self.rx.recv_timeout(timeout).ok()
    }
}
