use std::time::Duration;

use quanta::Clock;

use crate::bucket::Bucket;
use crate::bucket::Level;
use crate::bucket::Refill;

/// Refill policy that snaps the level back to full capacity at the start of
/// each interval. Tokens only ever decrease within a window.
#[derive(Debug)]
pub struct FixedRefill;

/// A simple window-based bucket.
///
/// At the start of every interval the bucket is filled to capacity. This
/// produces a hard cliff: full burst capacity the instant a window opens,
/// and no smoothing within the window.
pub type FixedWindow = Bucket<FixedRefill>;

impl FixedWindow {
    /// Creates a new `FixedWindow` strategy.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The maximum number of tokens the bucket can hold.
    /// * `interval` - The duration of the fixed time window.
    pub fn new(capacity: u64, interval: Duration) -> Self {
        Self::with_clock(capacity, interval, Clock::new())
    }

    /// As [`FixedWindow::new`], with an injected clock.
    pub fn with_clock(capacity: u64, interval: Duration, clock: Clock) -> Self {
        Bucket::from_parts(capacity, interval, FixedRefill, clock)
    }
}

impl Refill for FixedRefill {
    fn refill(&self, capacity: u64, interval: u64, level: &mut Level, now: u64) {
        if now < level.next_refill {
            return;
        }

        level.tokens = capacity;
        level.next_refill = now + interval;
    }
}
