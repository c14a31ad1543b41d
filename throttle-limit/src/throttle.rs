use std::sync::Arc;
use std::time::Duration;

use crate::Strategy;

/// Bridge to enable throttling with a caller supplied strategy.
///
/// A thin, cloneable facade over [`Strategy`]: callers that only ever ask
/// "may this request proceed?" and "how long until it may?" need nothing
/// else from the trait.
///
/// ## Example
///
/// ```rust
/// use std::time::Duration;
///
/// use throttle_limit::FixedWindow;
/// use throttle_limit::Throttle;
///
/// let throttle = Throttle::new(FixedWindow::new(10, Duration::from_secs(1)));
///
/// if !throttle.can_proceed() {
///     let wait = throttle.wait_time();
///     // sleep or reschedule, then try again
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Throttle {
    strategy: Arc<dyn Strategy + Send + Sync>,
}

impl Throttle {
    /// Wrap a strategy in the two-method facade.
    pub fn new<S>(strategy: S) -> Self
    where
        S: Strategy + Send + Sync + 'static,
    {
        Self {
            strategy: Arc::new(strategy),
        }
    }

    /// True when the request was admitted; a token has been consumed.
    pub fn can_proceed(&self) -> bool {
        self.strategy.process().is_continue()
    }

    /// Time until a single request would be admitted. Never blocks.
    pub fn wait_time(&self) -> Duration {
        self.strategy.time_to_release(1)
    }
}

impl From<Arc<dyn Strategy + Send + Sync>> for Throttle {
    fn from(strategy: Arc<dyn Strategy + Send + Sync>) -> Self {
        Self { strategy }
    }
}
