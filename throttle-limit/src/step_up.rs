use std::time::Duration;

use quanta::Clock;

use crate::ConfigError;
use crate::bucket::Bucket;
use crate::bucket::Level;
use crate::bucket::Refill;

/// Refill policy where the interval starts nearly empty and tokens
/// accumulate in discrete steps up to capacity.
///
/// Accumulation is a pure function of elapsed time: away from exact step
/// boundaries, frequent and infrequent polling yield the same level at a
/// given instant.
#[derive(Debug)]
pub struct StepUpRefill {
    step_tokens: u64,
    step_interval: u64,
}

/// A leaky bucket which is gradually filled with tokens over each interval.
///
/// A new interval starts with one step's worth of tokens already present,
/// then gains `step_tokens` per `step_interval` until capacity is reached;
/// at the interval boundary the cycle restarts.
pub type StepUpLeaky = Bucket<StepUpRefill>;

impl StepUpLeaky {
    /// Creates a new `StepUpLeaky` strategy.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The maximum number of tokens the bucket can hold.
    /// * `interval` - The period after which the cycle restarts.
    /// * `step_tokens` - Tokens added at every step.
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

    /// As [`StepUpLeaky::new`], with an injected clock.
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

        let refill = StepUpRefill {
            step_tokens,
            step_interval: step_interval.as_nanos() as u64,
        };
        Ok(Bucket::from_parts(capacity, interval, refill, clock))
    }
}

impl Refill for StepUpRefill {
    fn refill(&self, capacity: u64, interval: u64, level: &mut Level, now: u64) {
        if now >= level.next_refill {
            // A new interval starts one step ahead, not empty.
            level.tokens = self.step_tokens;
            level.last_activity = now;
            level.next_refill = now + interval;
            return;
        }

        let elapsed = now - level.last_activity;
        let steps = elapsed / self.step_interval;
        level.tokens = level.tokens.saturating_add(steps.saturating_mul(self.step_tokens));
        // An elapsed time landing exactly on a step boundary also counts the
        // step beginning there.
        if elapsed % self.step_interval == 0 {
            level.tokens = level.tokens.saturating_add(self.step_tokens);
        }
        level.tokens = level.tokens.min(capacity);

        level.last_activity = now;
    }
}

#[cfg(test)]
mod tests {
    use more_asserts::assert_le;

    use crate::Strategy;

    use super::*;

    const CAPACITY: u64 = 10;
    const INTERVAL: Duration = Duration::from_millis(5000);
    const STEP_TOKENS: u64 = 2;
    const STEP_INTERVAL: Duration = Duration::from_millis(1000);

    fn mock_bucket() -> (StepUpLeaky, std::sync::Arc<quanta::Mock>) {
        let (clock, mock) = Clock::mock();
        let rl = StepUpLeaky::with_clock(CAPACITY, INTERVAL, STEP_TOKENS, STEP_INTERVAL, clock)
            .unwrap();
        (rl, mock)
    }

    #[test]
    fn test_zero_step_interval_is_rejected() {
        let result = StepUpLeaky::new(CAPACITY, INTERVAL, STEP_TOKENS, Duration::ZERO);
        assert_eq!(result.unwrap_err(), ConfigError::ZeroStepInterval);
    }

    #[test]
    fn test_interval_starts_with_one_step() {
        let (rl, _mock) = mock_bucket();

        assert_eq!(rl.available(), STEP_TOKENS);
    }

    #[test]
    fn test_level_rises_per_step() {
        let (rl, mock) = mock_bucket();

        // Stay just off the exact step boundaries.
        assert_eq!(rl.available(), 2);
        for expected in [4, 6, 8] {
            mock.increment(Duration::from_millis(1100));
            assert_eq!(rl.available(), expected);
        }
    }

    #[test]
    fn test_level_clamps_at_capacity() {
        let (clock, mock) = Clock::mock();
        let rl =
            StepUpLeaky::with_clock(4, INTERVAL, STEP_TOKENS, STEP_INTERVAL, clock).unwrap();

        assert_eq!(rl.available(), 2);
        mock.increment(Duration::from_millis(1100));
        assert_eq!(rl.available(), 4);
        mock.increment(Duration::from_millis(1100));
        assert_eq!(rl.available(), 4);
    }

    #[test]
    fn test_accumulation_is_poll_frequency_independent() {
        let (polled, polled_mock) = mock_bucket();
        let (lazy, lazy_mock) = mock_bucket();

        // Touch the polled bucket every 100ms through the first step.
        for _ in 0..9 {
            polled_mock.increment(Duration::from_millis(100));
            let _ = polled.available();
        }
        polled_mock.increment(Duration::from_millis(100));
        lazy_mock.increment(Duration::from_millis(1000));

        assert_eq!(polled.available(), lazy.available());
    }

    #[test]
    fn test_exact_step_boundary_grants_an_extra_step() {
        let (rl, mock) = mock_bucket();

        assert_eq!(rl.available(), 2);

        // One whole step elapsed, plus the step beginning at the boundary.
        mock.increment(STEP_INTERVAL);
        assert_eq!(rl.available(), 6);
    }

    #[test]
    fn test_cycle_restarts_with_one_step() {
        let (rl, mock) = mock_bucket();

        assert!(rl.process_n(2).is_continue());
        mock.increment(Duration::from_millis(1));
        assert_eq!(rl.available(), 0);

        mock.increment(INTERVAL);
        assert_eq!(rl.available(), STEP_TOKENS);
    }

    #[test]
    fn test_consuming_each_step_keeps_level_at_zero() {
        let (rl, mock) = mock_bucket();

        assert!(rl.process_n(STEP_TOKENS).is_continue());

        for _ in 0..3 {
            // Sampling off the step boundary: a drained step stays drained.
            mock.increment(Duration::from_millis(1));
            assert_eq!(rl.available(), 0);
            mock.increment(Duration::from_millis(1));
            assert!(rl.process().is_break());

            mock.increment(Duration::from_millis(1098));
            assert!(rl.process_n(STEP_TOKENS).is_continue());
        }
    }

    #[test]
    fn test_time_to_release_reports_interval_end() {
        let (rl, mock) = mock_bucket();

        assert!(rl.process_n(2).is_continue());
        mock.increment(Duration::from_millis(500));

        // The next step would land sooner, but release is quoted against
        // the interval end.
        assert_eq!(rl.time_to_release(CAPACITY), Duration::from_millis(4500));
        assert_eq!(rl.time_to_release(0), Duration::ZERO);
    }

    #[test]
    fn test_capacity_bound_holds() {
        let (rl, mock) = mock_bucket();

        for i in 0..100u64 {
            let _ = rl.process_n(i % 3);
            assert_le!(rl.available(), rl.capacity());
            mock.increment(Duration::from_millis(333));
        }
    }
}
