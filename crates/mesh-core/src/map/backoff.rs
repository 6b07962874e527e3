use std::time::Duration;

use mesh_model::{BackoffStrategy, JitterStrategy};
use taskvisor::{BackoffPolicy, JitterPolicy};

/// Growth, cap and jitter of retry delays.
pub fn to_backoff_policy(s: &BackoffStrategy) -> BackoffPolicy {
    let jitter = match s.jitter {
        JitterStrategy::None => JitterPolicy::None,
        JitterStrategy::Full => JitterPolicy::Full,
        JitterStrategy::Equal => JitterPolicy::Equal,
        JitterStrategy::Decorrelated => JitterPolicy::Decorrelated,
    };

    BackoffPolicy {
        first: Duration::from_millis(s.first_ms),
        max: Duration::from_millis(s.max_ms),
        jitter,
        factor: s.factor,
    }
}
