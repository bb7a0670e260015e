//! Sliding-window call throttle.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Quota of calls allowed per period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Calls allowed inside any window of `period`.
    pub max_calls: usize,

    /// Length of the sliding window.
    pub period: Duration,
}

impl RateLimit {
    /// Shortcut REST API quota.
    pub const SHORTCUT: Self = Self {
        max_calls: 25,
        period: Duration::from_secs(10),
    };

    /// ZenHub REST API quota.
    pub const ZENHUB: Self = Self {
        max_calls: 100,
        period: Duration::from_secs(60),
    };
}

/// Tracks recent calls and makes callers wait once the quota is used up.
///
/// The window slides: a call is allowed as soon as the oldest recorded call
/// falls out of the last `period`.
#[derive(Debug)]
pub struct SlidingWindow {
    limit: RateLimit,
    calls: VecDeque<Instant>,
}

impl SlidingWindow {
    /// Creates an empty window for the given quota.
    #[must_use]
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            calls: VecDeque::with_capacity(limit.max_calls),
        }
    }

    /// Returns how long a call made at `now` would have to wait, or `None` if a slot is free.
    pub fn delay_at(&mut self, now: Instant) -> Option<Duration> {
        while let Some(&oldest) = self.calls.front() {
            if now.duration_since(oldest) >= self.limit.period {
                self.calls.pop_front();
            } else {
                break;
            }
        }

        if self.calls.len() < self.limit.max_calls {
            return None;
        }

        self.calls
            .front()
            .map(|&oldest| (oldest + self.limit.period).saturating_duration_since(now))
    }

    /// Records a call made at `now`.
    pub fn record(&mut self, now: Instant) {
        self.calls.push_back(now);
    }

    /// Waits until a slot is free, then claims it.
    pub async fn acquire(&mut self) {
        loop {
            let now = Instant::now();
            match self.delay_at(now) {
                None => {
                    self.record(now);
                    return;
                }
                Some(wait) => {
                    debug!(
                        wait_ms = wait.as_millis() as u64,
                        max_calls = self.limit.max_calls,
                        "Call quota used up, waiting"
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}
