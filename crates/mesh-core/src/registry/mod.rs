//! Immutable routing table from [`HandlerKey`] to [`NotificationHandler`].
//!
//! Built once at startup through [`HandlerRegistryBuilder`]; a key may be registered only once.
use std::{collections::BTreeMap, sync::Arc};

use mesh_model::HandlerKey;
use tracing::debug;

use crate::{error::CoreError, handler::NotificationHandler};

#[derive(Default)]
pub struct HandlerRegistryBuilder {
    handlers: BTreeMap<HandlerKey, Arc<dyn NotificationHandler>>,
}

impl HandlerRegistryBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `key`.
    ///
    /// Fails with [`CoreError::DuplicateHandler`] if the key is already taken;
    /// the first registration is kept.
    pub fn register(
        &mut self,
        key: HandlerKey,
        handler: Arc<dyn NotificationHandler>,
    ) -> Result<(), CoreError> {
        if self.handlers.contains_key(&key) {
            return Err(CoreError::DuplicateHandler(key));
        }
        debug!(key = %key, handler = handler.name(), "handler registered");
        self.handlers.insert(key, handler);
        Ok(())
    }

    /// Chaining form of [`register`](Self::register).
    pub fn with(
        mut self,
        key: HandlerKey,
        handler: Arc<dyn NotificationHandler>,
    ) -> Result<Self, CoreError> {
        self.register(key, handler)?;
        Ok(self)
    }

    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
        }
    }
}

/// Read-only handler table shared by the processor.
pub struct HandlerRegistry {
    handlers: BTreeMap<HandlerKey, Arc<dyn NotificationHandler>>,
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::new()
    }

    pub fn get(&self, key: &HandlerKey) -> Option<&Arc<dyn NotificationHandler>> {
        self.handlers.get(key)
    }

    /// Distinct channels referenced by the registered keys, sorted.
    pub fn channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.handlers.keys().map(|k| k.channel.clone()).collect();
        channels.dedup();
        channels
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHandler;
    use mesh_model::ResourceKind;

    #[test]
    fn duplicate_key_is_rejected() {
        let mut b = HandlerRegistryBuilder::new();
        let key = HandlerKey::new("events", ResourceKind::Label);

        b.register(key.clone(), Arc::new(RecordingHandler::default()))
            .unwrap();
        let err = b
            .register(key.clone(), Arc::new(RecordingHandler::default()))
            .unwrap_err();

        match err {
            CoreError::DuplicateHandler(k) => assert_eq!(k, key),
            other => panic!("expected DuplicateHandler, got {other:?}"),
        }
        assert_eq!(b.build().len(), 1);
    }

    #[test]
    fn channels_are_sorted_and_distinct() {
        let registry = HandlerRegistry::builder()
            .with(
                HandlerKey::new("events", ResourceKind::Runtime),
                Arc::new(RecordingHandler::default()),
            )
            .unwrap()
            .with(
                HandlerKey::new("audit", ResourceKind::Label),
                Arc::new(RecordingHandler::default()),
            )
            .unwrap()
            .with(
                HandlerKey::new("events", ResourceKind::Label),
                Arc::new(RecordingHandler::default()),
            )
            .unwrap()
            .build();

        assert_eq!(registry.channels(), vec!["audit", "events"]);
    }

    #[test]
    fn lookup_is_by_channel_and_kind() {
        let registry = HandlerRegistry::builder()
            .with(
                HandlerKey::new("events", ResourceKind::Application),
                Arc::new(RecordingHandler::default()),
            )
            .unwrap()
            .build();

        assert!(
            registry
                .get(&HandlerKey::new("events", ResourceKind::Application))
                .is_some()
        );
        assert!(
            registry
                .get(&HandlerKey::new("other", ResourceKind::Application))
                .is_none()
        );
        assert!(
            registry
                .get(&HandlerKey::new("events", ResourceKind::Runtime))
                .is_none()
        );
    }
}
