// =============================================================================
// Clock — wall-clock time and blocking delays for the poll loop
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};

/// Source of "now" and of delays between polls.
///
/// Tests substitute an implementation whose `sleep` returns immediately.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    async fn sleep(&self, duration: Duration);
}

/// Local wall clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn system_clock_sleeps_for_the_requested_time() {
        let start = tokio::time::Instant::now();
        SystemClock.sleep(Duration::from_secs(300)).await;
        assert!(start.elapsed() >= Duration::from_secs(300));
    }
}
