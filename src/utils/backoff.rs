//! Retry strategy for resolver implementations.

use std::time::Duration;

use tokio_retry::strategy::ExponentialBackoff;

use crate::constants::{MAX_RESOLVER_RETRIES, MAX_RETRY_DELAY_MS, STARTING_RETRY_DELAY_MS};

/// The backoff schedule resolver implementations should apply to
/// rate-limit responses: 1s, 2s, 4s, then give up.
///
/// The scheduler itself never retries; pair this with
/// `tokio_retry::Retry::spawn` inside a [`FieldResolver`] wrapping a
/// provider HTTP client.
///
/// [`FieldResolver`]: crate::resolver::FieldResolver
pub fn resolver_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(STARTING_RETRY_DELAY_MS / 2)
        .max_delay(Duration::from_millis(MAX_RETRY_DELAY_MS))
        .take(MAX_RESOLVER_RETRIES)
}
