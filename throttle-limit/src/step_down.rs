use std::time::Duration;

use quanta::Clock;

use crate::ConfigError;
use crate::bucket::Bucket;
use crate::bucket::Level;
use crate::bucket::Refill;

/// Refill policy where the interval starts full and the token *ceiling*
/// leaks away in discrete steps, independent of consumption timing.
///
/// The leak is a ceiling on the level, not a separate subtraction:
/// consumption can only lower the level further, and the ceiling never
/// raises it back up mid-interval.
#[derive(Debug)]
pub struct StepDownRefill {
    step_tokens: u64,
    step_interval: u64,
}

/// A leaky bucket which is filled to capacity at the start of each interval
/// and leaks tokens at a constant step rate until the next interval.
///
/// Within an interval the level is monotonically non-increasing regardless
/// of query cadence; it resets to full only at interval boundaries.
pub type StepDownLeaky = Bucket<StepDownRefill>;

impl StepDownLeaky {
    /// Creates a new `StepDownLeaky` strategy.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The maximum number of tokens the bucket can hold.
    /// * `interval` - The period after which the bucket refills to capacity.
    /// * `step_tokens` - Tokens leaked at every step.
    /// * `step_interval` - The period of one step.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroStepInterval`] if `step_interval` is zero.
    pub fn new(
        capacity: u64,
        interval: Duration,
        step_tokens: u64,
        step_interval: Duration,
    ) -> Result<Self, ConfigError> {
        Self::with_clock(capacity, interval, step_tokens, step_interval, Clock::new())
    }

    /// As [`StepDownLeaky::new`], with an injected clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroStepInterval`] if `step_interval` is zero.
    pub fn with_clock(
        capacity: u64,
        interval: Duration,
        step_tokens: u64,
        step_interval: Duration,
        clock: Clock,
    ) -> Result<Self, ConfigError> {
        if step_interval.is_zero() {
            return Err(ConfigError::ZeroStepInterval);
        }

        let refill = StepDownRefill {
            step_tokens,
            step_interval: step_interval.as_nanos() as u64,
        };
        Ok(Bucket::from_parts(capacity, interval, refill, clock))
    }
}

impl Refill for StepDownRefill {
    fn refill(&self, capacity: u64, interval: u64, level: &mut Level, now: u64) {
        if now >= level.next_refill {
            level.tokens = capacity;
            level.next_refill = now + interval;
            return;
        }

        let remaining = level.next_refill - now;
        let steps_left = remaining / self.step_interval;
        let mut ceiling = steps_left.saturating_mul(self.step_tokens);
        // A partially elapsed step has not finished leaking yet.
        if remaining % self.step_interval > 0 {
            ceiling = ceiling.saturating_add(self.step_tokens);
        }

        level.tokens = level.tokens.min(ceiling);
    }
}
