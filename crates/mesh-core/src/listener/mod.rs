//! Notification transport seams.
//!
//! A [`ListenerConnector`] opens a fresh [`NotificationListener`] for every
//! (re)subscription; the processor owns the listener until it closes it.
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("listener closed")]
    Closed,
}

/// Raw notification as delivered by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub channel: String,
    pub payload: String,
}

#[async_trait]
pub trait NotificationListener: Send {
    /// Subscribe to `channel`.
    async fn listen(&mut self, channel: &str) -> Result<(), ListenerError>;

    /// Liveness check of the underlying connection.
    async fn ping(&mut self) -> Result<(), ListenerError>;

    async fn close(&mut self) -> Result<(), ListenerError>;

    /// Wait for the next notification.
    ///
    /// Must be cancel safe: the processor drops a pending call when it pings or stops.
    async fn recv(&mut self) -> Result<Notification, ListenerError>;
}

#[async_trait]
pub trait ListenerConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn NotificationListener>, ListenerError>;
}
