use std::sync::Arc;

use throttle_limit::Strategy;
use tower::Layer;

use crate::service::ThrottleService;

/// Applies a throttling strategy to requests.
#[derive(Debug)]
pub struct ThrottleLayer<L>
where
    L: ?Sized,
{
    strategy: Arc<L>,
    weight: u64,
}

impl<L> Clone for ThrottleLayer<L>
where
    L: ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            strategy: Arc::clone(&self.strategy),
            weight: self.weight,
        }
    }
}

impl<L> ThrottleLayer<L>
where
    L: Strategy + ?Sized,
{
    /// Create a ThrottleLayer consuming one token per request.
    pub fn new(strategy: Arc<L>) -> Self {
        ThrottleLayer {
            strategy,
            weight: 1,
        }
    }

    /// Set the number of tokens each request consumes.
    ///
    /// Useful when some endpoints are substantially more expensive than
    /// others sharing the same bucket.
    pub fn with_weight(mut self, weight: u64) -> Self {
        self.weight = weight;
        self
    }
}

impl<L, S> Layer<S> for ThrottleLayer<L>
where
    L: ?Sized,
{
    type Service = ThrottleService<L, S>;

    fn layer(&self, service: S) -> Self::Service {
        ThrottleService::new(service, self.strategy.clone()).with_weight(self.weight)
    }
}
