use std::fmt;

/// Lifecycle state of a [`NotificationProcessor`](super::NotificationProcessor).
///
/// `Idle -> Subscribing -> Listening -> (Disconnected -> Subscribing)* -> Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Idle,
    Subscribing,
    Listening,
    Disconnected,
    Stopped,
}

impl ProcessorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessorState::Idle => "idle",
            ProcessorState::Subscribing => "subscribing",
            ProcessorState::Listening => "listening",
            ProcessorState::Disconnected => "disconnected",
            ProcessorState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ProcessorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
