use std::fmt::Display;
use std::future::Future;
use std::ops::ControlFlow;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;

use pin_project_lite::pin_project;
use tower::Service;

use throttle_limit::Reason;
use throttle_limit::Strategy;

use crate::error::ThrottleError;

/// Applies a throttling strategy to each request, failing fast when the
/// strategy rejects.
///
/// Admission is decided in `call`: an admitted request is forwarded to the
/// inner service, a throttled one resolves immediately to
/// [`ThrottleError::RateLimited`] without touching the inner service.
#[derive(Debug)]
pub struct ThrottleService<L, S>
where
    L: ?Sized,
{
    inner: S,
    strategy: Arc<L>,
    weight: u64,
}

impl<L, S> Clone for ThrottleService<L, S>
where
    L: ?Sized,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            strategy: Arc::clone(&self.strategy),
            weight: self.weight,
        }
    }
}

impl<L, S> ThrottleService<L, S>
where
    L: ?Sized,
{
    pub fn new(inner: S, strategy: Arc<L>) -> Self {
        Self {
            inner,
            strategy,
            weight: 1,
        }
    }

    /// Set the number of tokens each request consumes.
    pub fn with_weight(mut self, weight: u64) -> Self {
        self.weight = weight;
        self
    }
}

pin_project! {
    /// The response future: either the inner service's future, or an
    /// immediate rejection.
    #[project = ResponseFutureProj]
    pub enum ResponseFuture<F> {
        Forwarded {
            #[pin]
            future: F,
        },
        Rejected {
            error: Option<ThrottleError>,
        },
    }
}

impl<F, T, E> Future for ResponseFuture<F>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    type Output = Result<T, ThrottleError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            ResponseFutureProj::Forwarded { future } => match future.poll(cx) {
                Poll::Ready(Ok(res)) => Poll::Ready(Ok(res)),
                Poll::Ready(Err(e)) => Poll::Ready(Err(ThrottleError::Inner(e.to_string()))),
                Poll::Pending => Poll::Pending,
            },
            ResponseFutureProj::Rejected { error } => {
                // Futures must not be polled after completion.
                Poll::Ready(Err(error.take().expect("polled after completion")))
            }
        }
    }
}

impl<L, S, Req> Service<Req> for ThrottleService<L, S>
where
    L: Strategy + ?Sized,
    S: Service<Req>,
    S::Error: Display,
{
    type Response = S::Response;
    type Error = ThrottleError;
    type Future = ResponseFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner
            .poll_ready(cx)
            .map_err(|e| ThrottleError::Inner(e.to_string()))
    }

    fn call(&mut self, req: Req) -> Self::Future {
        match self.strategy.process_n(self.weight) {
            ControlFlow::Continue(()) => {
                tracing::trace!(weight = self.weight, "request admitted");
                ResponseFuture::Forwarded {
                    future: self.inner.call(req),
                }
            }
            ControlFlow::Break(Reason::Throttled { retry_after }) => {
                tracing::debug!(?retry_after, "request throttled");
                ResponseFuture::Rejected {
                    error: Some(ThrottleError::RateLimited { retry_after }),
                }
            }
        }
    }
}
