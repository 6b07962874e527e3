use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgListener};
use tracing::debug;

use mesh_core::{ListenerConnector, ListenerError, Notification, NotificationListener};

fn transport(e: sqlx::Error) -> ListenerError {
    ListenerError::Transport(e.to_string())
}

/// One dedicated `LISTEN` connection.
pub struct PgNotificationListener {
    inner: PgListener,
}

#[async_trait]
impl NotificationListener for PgNotificationListener {
    async fn listen(&mut self, channel: &str) -> Result<(), ListenerError> {
        self.inner.listen(channel).await.map_err(transport)
    }

    async fn ping(&mut self) -> Result<(), ListenerError> {
        sqlx::query("SELECT 1")
            .execute(&mut self.inner)
            .await
            .map(drop)
            .map_err(transport)
    }

    async fn close(&mut self) -> Result<(), ListenerError> {
        self.inner.unlisten_all().await.map_err(transport)
    }

    /// `try_recv` reports a lost connection as `None`; notifications sent
    /// meanwhile are gone, so the loss is surfaced instead of silently reconnecting.
    async fn recv(&mut self) -> Result<Notification, ListenerError> {
        match self.inner.try_recv().await.map_err(transport)? {
            Some(n) => {
                debug!(channel = n.channel(), bytes = n.payload().len(), "notification received");
                Ok(Notification {
                    channel: n.channel().to_string(),
                    payload: n.payload().to_string(),
                })
            }
            None => Err(ListenerError::Transport(
                "listener connection lost".to_string(),
            )),
        }
    }
}

/// Opens listeners with the pool's connect options.
#[derive(Clone)]
pub struct PgListenerConnector {
    pool: PgPool,
}

impl PgListenerConnector {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListenerConnector for PgListenerConnector {
    async fn connect(&self) -> Result<Box<dyn NotificationListener>, ListenerError> {
        let inner = PgListener::connect_with(&self.pool).await.map_err(transport)?;
        Ok(Box::new(PgNotificationListener { inner }))
    }
}
