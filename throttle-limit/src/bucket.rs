use std::fmt::Debug;
use std::ops::ControlFlow;
use std::time::Duration;

use parking_lot::Mutex;
use quanta::Clock;
use quanta::Instant;

use crate::Reason;
use crate::Strategy;

/// Mutable bucket bookkeeping, guarded by the owning bucket's mutex.
///
/// All instants are nanoseconds relative to the bucket's anchor.
#[derive(Debug)]
pub struct Level {
    /// Tokens currently available.
    pub tokens: u64,
    /// Instant at which the current cycle ends and a new one begins.
    /// Starts at zero so the first query always opens a fresh cycle.
    pub next_refill: u64,
    /// Instant token accounting was last advanced. Only step-wise
    /// accumulating policies read this.
    pub last_activity: u64,
}

/// A refill policy: brings a bucket [`Level`] up to date for `now`.
///
/// Implementations run under the owning bucket's lock. `capacity` and
/// `interval` are the bucket's immutable geometry; `interval` is in
/// nanoseconds, as is `now`.
pub trait Refill: Debug {
    fn refill(&self, capacity: u64, interval: u64, level: &mut Level, now: u64);
}

/// Shared token bucket engine.
///
/// Owns the bookkeeping every refill policy needs and implements the
/// admission procedure once; the policy type `R` only decides how the level
/// is recomputed. The named strategies ([`FixedWindow`], [`StepDownLeaky`],
/// [`StepUpLeaky`]) are aliases of this type.
///
/// [`FixedWindow`]: crate::FixedWindow
/// [`StepDownLeaky`]: crate::StepDownLeaky
/// [`StepUpLeaky`]: crate::StepUpLeaky
#[derive(Debug)]
pub struct Bucket<R> {
    capacity: u64,
    interval: u64,
    level: Mutex<Level>,
    refill: R,
    clock: Clock,
    anchor: Instant,
}

impl<R> Bucket<R>
where
    R: Refill,
{
    /// Build a bucket from its parts. The named strategies wrap this; it is
    /// public so custom [`Refill`] policies can be mounted on the same
    /// engine.
    pub fn from_parts(capacity: u64, interval: Duration, refill: R, clock: Clock) -> Self {
        let anchor = clock.now();
        Self {
            capacity,
            interval: interval.as_nanos() as u64,
            level: Mutex::new(Level {
                tokens: 0,
                next_refill: 0,
                last_activity: 0,
            }),
            refill,
            clock,
            anchor,
        }
    }

    fn now(&self) -> u64 {
        self.clock.now().duration_since(self.anchor).as_nanos() as u64
    }

    fn update(&self, level: &mut Level, now: u64) {
        self.refill.refill(self.capacity, self.interval, level, now);
    }
}

impl<R> Strategy for Bucket<R>
where
    R: Refill,
{
    fn process_n(&self, weight: u64) -> ControlFlow<Reason> {
        let mut level = self.level.lock();
        let now = self.now();
        self.update(&mut level, now);

        if level.tokens < weight {
            ControlFlow::Break(Reason::Throttled {
                retry_after: Duration::from_nanos(level.next_refill.saturating_sub(now)),
            })
        } else {
            level.tokens -= weight;
            ControlFlow::Continue(())
        }
    }

    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn available(&self) -> u64 {
        let mut level = self.level.lock();
        let now = self.now();
        self.update(&mut level, now);
        level.tokens
    }

    fn time_to_release(&self, weight: u64) -> Duration {
        let mut level = self.level.lock();
        loop {
            self.update(&mut level, self.now());
            if level.tokens >= weight {
                return Duration::ZERO;
            }

            // The clock may cross the refill boundary between the update and
            // this read; recompute rather than report a stale remainder.
            let now = self.now();
            if now <= level.next_refill {
                return Duration::from_nanos(level.next_refill - now);
            }
        }
    }
}
