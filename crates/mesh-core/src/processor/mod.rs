//! Sequential consumer of change notifications.
//!
//! One processor owns one listener connection at a time. Notifications are
//! handled strictly one after another; a handler that has started always runs to
//! completion, cancellation is only observed between notifications. Failed events
//! are logged and dropped, the transport has no redelivery.
mod state;
pub use state::ProcessorState;

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, watch},
    time::MissedTickBehavior,
};
use taskvisor::BackoffPolicy;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn};

use mesh_model::{BackoffStrategy, NotificationEnvelope};

use crate::{
    config::ProcessorConfig,
    error::CoreError,
    listener::{ListenerConnector, ListenerError, Notification, NotificationListener},
    map::to_backoff_policy,
    metrics::{MetricsHandle, NotificationOutcome, noop_metrics},
    registry::HandlerRegistry,
};

/// Why the listening loop returned.
enum Exit {
    Cancelled,
    Disconnected(ListenerError),
}

/// What woke the listening loop up.
enum Wake {
    Cancelled,
    Ping,
    Received(Result<Notification, ListenerError>),
}

pub struct NotificationProcessor {
    registry: Arc<HandlerRegistry>,
    connector: Arc<dyn ListenerConnector>,
    cfg: ProcessorConfig,
    metrics: MetricsHandle,
    state: watch::Sender<ProcessorState>,
    running: Mutex<()>,
}

impl NotificationProcessor {
    pub fn new(
        registry: Arc<HandlerRegistry>,
        connector: Arc<dyn ListenerConnector>,
        cfg: ProcessorConfig,
    ) -> Self {
        let (state, _) = watch::channel(ProcessorState::Idle);
        Self {
            registry,
            connector,
            cfg,
            metrics: noop_metrics(),
            state,
            running: Mutex::new(()),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Watch the processor state.
    pub fn state(&self) -> watch::Receiver<ProcessorState> {
        self.state.subscribe()
    }

    fn set_state(&self, next: ProcessorState) {
        let prev = self.state.send_replace(next);
        if prev != next {
            debug!(from = %prev, to = %next, "processor state changed");
        }
    }

    /// Consume notifications until `cancel` fires.
    ///
    /// Transport failures never end the loop: the listener is closed, the
    /// reconnect delay is awaited and every channel is subscribed again.
    /// Fails only if the processor is already running or has nothing to listen to.
    #[instrument(level = "info", skip_all, name = "processor")]
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), CoreError> {
        let _running = self.running.try_lock().map_err(|_| {
            CoreError::InvalidConfiguration("notification processor is already running".into())
        })?;

        let channels = self.registry.channels();
        if channels.is_empty() {
            return Err(CoreError::InvalidConfiguration(
                "no notification handlers registered".into(),
            ));
        }

        let mut backoff = ReconnectBackoff::new(&self.cfg.reconnect);
        loop {
            if cancel.is_cancelled() {
                break;
            }

            self.set_state(ProcessorState::Subscribing);
            let mut listener = match self.subscribe(&channels).await {
                Ok(listener) => {
                    backoff.reset();
                    listener
                }
                Err(e) => {
                    warn!(error = %e, "failed to subscribe to notification channels");
                    self.set_state(ProcessorState::Disconnected);
                    if !self.wait_reconnect(&cancel, &mut backoff).await {
                        break;
                    }
                    continue;
                }
            };

            info!(channels = ?channels, "listening for notifications");
            self.set_state(ProcessorState::Listening);
            let exit = self.listen(listener.as_mut(), &cancel).await;

            if let Err(e) = listener.close().await {
                debug!(error = %e, "failed to close listener");
            }

            match exit {
                Exit::Cancelled => break,
                Exit::Disconnected(e) => {
                    warn!(error = %e, "notification listener disconnected");
                    self.metrics.record_reconnect();
                    self.set_state(ProcessorState::Disconnected);
                    if !self.wait_reconnect(&cancel, &mut backoff).await {
                        break;
                    }
                }
            }
        }

        info!("notification processor stopped");
        self.set_state(ProcessorState::Stopped);
        Ok(())
    }

    /// Open a fresh listener and subscribe it to every channel.
    async fn subscribe(
        &self,
        channels: &[String],
    ) -> Result<Box<dyn NotificationListener>, ListenerError> {
        let mut listener = self.connector.connect().await?;
        for channel in channels {
            if let Err(e) = listener.listen(channel).await {
                if let Err(close_err) = listener.close().await {
                    debug!(error = %close_err, "failed to close listener");
                }
                return Err(e);
            }
            debug!(channel = %channel, "subscribed");
        }
        Ok(listener)
    }

    async fn listen(
        &self,
        listener: &mut dyn NotificationListener,
        cancel: &CancellationToken,
    ) -> Exit {
        let period = Duration::from_millis(self.cfg.ping_interval_ms.max(1));
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let wake = tokio::select! {
                biased;
                _ = cancel.cancelled() => Wake::Cancelled,
                _ = ticker.tick() => Wake::Ping,
                res = listener.recv() => Wake::Received(res),
            };

            match wake {
                Wake::Cancelled => return Exit::Cancelled,
                Wake::Ping => {
                    trace!("pinging listener connection");
                    if let Err(e) = listener.ping().await {
                        return Exit::Disconnected(e);
                    }
                }
                Wake::Received(Ok(notification)) => self.dispatch(notification).await,
                Wake::Received(Err(e)) => return Exit::Disconnected(e),
            }
        }
    }

    /// Decode, route and handle one notification. Never fails: problems are logged and counted.
    async fn dispatch(&self, notification: Notification) {
        let envelope = match NotificationEnvelope::decode(&notification.channel, &notification.payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(channel = %notification.channel, error = %e, "dropping undecodable notification");
                self.metrics
                    .record_notification("unknown", "unknown", NotificationOutcome::Undecodable);
                return;
            }
        };

        let kind = envelope.kind.as_str();
        let operation = envelope.operation.as_str();
        let key = envelope.key();

        let Some(handler) = self.registry.get(&key) else {
            warn!(key = %key, operation, "no handler registered, dropping notification");
            self.metrics
                .record_notification(kind, operation, NotificationOutcome::Unrouted);
            return;
        };

        debug!(key = %key, operation, handler = handler.name(), "handling notification");
        match handler.handle(envelope.operation, &envelope.payload).await {
            Ok(()) => {
                self.metrics
                    .record_notification(kind, operation, NotificationOutcome::Handled);
            }
            Err(e) => {
                error!(key = %key, operation, handler = handler.name(), error = %e, "failed to handle notification, event dropped");
                self.metrics
                    .record_notification(kind, operation, NotificationOutcome::Failed);
            }
        }
    }

    /// Sleep the reconnect delay. Returns `false` if cancelled meanwhile.
    async fn wait_reconnect(&self, cancel: &CancellationToken, backoff: &mut ReconnectBackoff) -> bool {
        let delay = backoff.next();
        info!(attempt = backoff.attempt, delay_ms = delay.as_millis() as u64, "reconnecting notification listener");

        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}

/// Reconnect delays of one processor run; restarts from `first` after a successful subscribe.
struct ReconnectBackoff {
    policy: BackoffPolicy,
    prev: Option<Duration>,
    attempt: u32,
}

impl ReconnectBackoff {
    fn new(strategy: &BackoffStrategy) -> Self {
        Self {
            policy: to_backoff_policy(strategy),
            prev: None,
            attempt: 0,
        }
    }

    fn next(&mut self) -> Duration {
        let delay = self.policy.next(self.prev);
        self.prev = Some(delay);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    fn reset(&mut self) {
        self.prev = None;
        self.attempt = 0;
    }
}
