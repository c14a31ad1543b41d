//! # Tower Throttle
//!
//! `tower-throttle` applies a [`throttle_limit::Strategy`] to requests
//! flowing through a [Tower](https://github.com/tower-rs/tower) service
//! stack.
//!
//! ## Fail Fast
//!
//! The middleware never queues, sleeps, or parks. A request either acquires
//! its tokens and is forwarded to the inner service, or it is rejected
//! immediately with [`ThrottleError::RateLimited`] carrying the duration the
//! client should wait before retrying. Callers own the decision of whether
//! to sleep, reschedule, or surface the rejection.
//!
//! ## Weighted Requests
//!
//! A layer can be configured with a per-request weight, draining more than
//! one token per call for expensive endpoints.
//!
//! ## Feature Flags
//!
//! - `axum`: Enables `IntoResponse` for [`ThrottleError`], allowing
//!   automatic conversion to HTTP status codes (429, 500).

mod error;
mod layer;
mod service;


pub use error::ThrottleError;
pub use layer::ThrottleLayer;
pub use service::ResponseFuture;
pub use service::ThrottleService;
