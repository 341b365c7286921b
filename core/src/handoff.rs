//! Rendezvous channel between the observation loop and the publisher.
//!
//! A send only completes once the receiving side has taken the value, so the
//! producer never runs ahead of the consumer by more than the value in hand.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("handoff receiver dropped before taking the value")]
pub struct Closed;

pub struct HandoffSender<T> {
    inner: mpsc::Sender<(T, oneshot::Sender<()>)>,
}

pub struct HandoffReceiver<T> {
    inner: mpsc::Receiver<(T, oneshot::Sender<()>)>,
}

pub fn channel<T>() -> (HandoffSender<T>, HandoffReceiver<T>) {
    let (tx, rx) = mpsc::channel(1);
    (HandoffSender { inner: tx }, HandoffReceiver { inner: rx })
}

impl<T> Clone for HandoffSender<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> HandoffSender<T> {
    /// Waits until the receiver has taken `value`.
    pub async fn send(&self, value: T) -> Result<(), Closed> {
        let (taken_tx, taken_rx) = oneshot::channel();
        self.inner
            .send((value, taken_tx))
            .await
            .map_err(|_| Closed)?;
        taken_rx.await.map_err(|_| Closed)
    }
}

impl<T> HandoffReceiver<T> {
    /// Takes the next value, releasing its sender. `None` once every sender is gone.
    ///
    /// Cancel safe: a value is only taken when the future completes.
    pub async fn recv(&mut self) -> Option<T> {
        let (value, taken) = self.inner.recv().await?;
        let _ = taken.send(());
        Some(value)
    }
}
