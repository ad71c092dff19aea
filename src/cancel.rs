use tokio::sync::watch;

/// Shared flag checked before each new backend call is issued.
#[derive(Debug, Clone)]
pub struct Cancellation {
    receiver: watch::Receiver<bool>,
}

/// Owning side of a [`Cancellation`]; flips the flag once.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

pub fn channel() -> (CancelHandle, Cancellation) {
    let (sender, receiver) = watch::channel(false);
    (CancelHandle { sender }, Cancellation { receiver })
}

impl Cancellation {
    /// A signal that is never raised.
    #[cfg(test)]
    pub fn never() -> Self {
        channel().1
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once the flag is raised; pends forever if it never can be.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        let raised = receiver.wait_for(|cancelled| *cancelled).await.map(|_| ());
        if raised.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn cancel_is_visible_to_every_clone() {
        let (handle, signal) = channel();
        let other = signal.clone();
        assert!(!signal.is_cancelled());
        handle.cancel();
        assert!(signal.is_cancelled());
        assert!(other.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let (handle, signal) = channel();
        let waiter = tokio::spawn(async move { signal.cancelled().await });
        handle.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn never_does_not_resolve() {
        let signal = Cancellation::never();
        let waited = tokio::time::timeout(Duration::from_millis(20), signal.cancelled()).await;
        assert!(waited.is_err());
    }

    #[test]
    fn never_stays_clear() {
        assert!(!Cancellation::never().is_cancelled());
    }
}
