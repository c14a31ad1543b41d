//! # throttle-limit
//!
//! `throttle-limit` provides strategy driven token bucket throttling.
//!
//! ## Core Philosophy
//!
//! Token levels are never maintained by background threads or timers. Each
//! bucket recomputes its level lazily, against a monotonic clock, as a side
//! effect of being queried. "Waiting" is always a `Duration` handed back to
//! the caller; no call ever blocks or parks.
//!
//! ## Key Concepts
//!
//! * **Lazy Evaluation**: tokens are recalculated at the moment of the
//!   request, eliminating the need for background worker threads.
//! * **Strategy Trait**: a unified interface over the refill policies, so a
//!   policy can be swapped without changing call sites.
//! * **Per-Bucket Locking**: every bucket guards its own level with its own
//!   mutex. Admission is check-then-consume under one lock acquisition, so
//!   concurrent callers can never over-draw a bucket, and unrelated buckets
//!   never contend.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use throttle_limit::FixedWindow;
//! use throttle_limit::Strategy;
//!
//! let bucket = FixedWindow::new(100, Duration::from_secs(60));
//!
//! if bucket.process().is_continue() {
//!     // Request allowed
//! }
//! ```

use std::fmt::Debug;
use std::ops::ControlFlow;
use std::time::Duration;

mod bucket;
mod fixed_window;
mod step_down;
mod step_up;
mod throttle;

pub use bucket::Bucket;
pub use bucket::Level;
pub use bucket::Refill;
pub use fixed_window::FixedRefill;
pub use fixed_window::FixedWindow;
pub use step_down::StepDownLeaky;
pub use step_down::StepDownRefill;
pub use step_up::StepUpLeaky;
pub use step_up::StepUpRefill;
pub use throttle::Throttle;

/// Reasons why a request might be rejected by a strategy.
#[derive(Debug, PartialEq)]
pub enum Reason {
    /// Not enough tokens were available at decision time. `retry_after` is
    /// the time remaining until the bucket's current cycle ends.
    Throttled { retry_after: Duration },
}

/// Errors raised when a strategy is constructed with unusable parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Step based strategies divide the interval by the step period, so the
    /// step period must be non-zero.
    #[error("step interval must be non-zero")]
    ZeroStepInterval,
}

/// The core trait for all throttling strategies.
///
/// Strategies must be `Send` and `Sync` to allow sharing across thread
/// boundaries via `Arc`.
pub trait Strategy: Debug {
    /// Attempts to admit a single request, consuming one token.
    ///
    /// # Errors
    ///
    /// Returns `Reason` if the rate limit has been reached.
    fn process(&self) -> ControlFlow<Reason> {
        self.process_n(1)
    }

    /// Attempts to admit a request of the given weight, consuming `weight`
    /// tokens at once.
    ///
    /// The level is recomputed for the current instant first. On rejection
    /// the level is left untouched. A weight of zero is always admitted.
    ///
    /// # Errors
    ///
    /// Returns `Reason` if fewer than `weight` tokens are available.
    fn process_n(&self, weight: u64) -> ControlFlow<Reason>;

    /// The configured capacity. Does not recompute the level.
    fn capacity(&self) -> u64;

    /// Recomputes and returns the current token level without consuming
    /// anything.
    fn available(&self) -> u64;

    /// Time until a request of the given weight could be admitted.
    ///
    /// Returns [`Duration::ZERO`] when the request would be admitted right
    /// now. Callers own the decision of whether to sleep or retry; this
    /// call never blocks.
    fn time_to_release(&self, weight: u64) -> Duration;
}
