mod envelope;
pub use envelope::NotificationEnvelope;

mod key;
pub use key::HandlerKey;
