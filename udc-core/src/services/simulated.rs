//! Simulated remote calls
//!
//! Every mutator that used to talk to a server waits for an artificial
//! latency first and raises a loading flag while it is in flight.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Count of in-flight simulated calls
#[derive(Clone, Default)]
pub struct LoadingFlag {
    in_flight: Arc<AtomicUsize>,
}

impl LoadingFlag {
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Raise the flag until the returned guard is dropped
    pub fn begin(&self) -> LoadingGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        LoadingGuard {
            in_flight: self.in_flight.clone(),
        }
    }
}

pub struct LoadingGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Wait out the simulated latency.
///
/// A zero latency still yields once so callers always see the call suspend.
pub async fn network_delay(latency: Duration) {
    if latency.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(latency).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_lowers_flag_on_drop() {
        let flag = LoadingFlag::default();
        assert!(!flag.is_loading());

        let first = flag.begin();
        let second = flag.begin();
        assert!(flag.is_loading());

        drop(first);
        assert!(flag.is_loading());
        drop(second);
        assert!(!flag.is_loading());
    }
}
