// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Retry logic with a fixed backoff schedule for Rancher API calls.
//!
//! Transport failures and 5xx responses are retried; authentication, authorization,
//! other 4xx statuses and undecodable bodies fail immediately. See
//! [`RancherError::is_retryable`].

use crate::constants::{
    RANCHER_BACKOFF_FIRST_MILLIS, RANCHER_BACKOFF_LATER_MILLIS, RANCHER_BACKOFF_SECOND_MILLIS,
    RANCHER_MAX_ATTEMPTS,
};
use crate::errors::RancherError;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Delay before the next attempt after `attempt` (1-based) has failed.
///
/// The schedule is 250ms, 600ms, then 1.2s for every later attempt.
#[must_use]
pub const fn backoff_for_attempt(attempt: u32) -> Duration {
    match attempt {
        0 | 1 => Duration::from_millis(RANCHER_BACKOFF_FIRST_MILLIS),
        2 => Duration::from_millis(RANCHER_BACKOFF_SECOND_MILLIS),
        _ => Duration::from_millis(RANCHER_BACKOFF_LATER_MILLIS),
    }
}

/// Run a Rancher request with up to [`RANCHER_MAX_ATTEMPTS`] attempts.
///
/// The sleep between attempts is a `tokio` timer, so dropping the returned future
/// cancels a pending retry as well as the in-flight request.
///
/// # Errors
///
/// Returns the first non-retryable error, or the last error once all attempts failed.
pub async fn retry_request<T, F, Fut>(
    mut operation: F,
    operation_name: &str,
    url: &str,
) -> Result<T, RancherError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RancherError>>,
{
    let start_time = Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        operation = operation_name,
                        url = %url,
                        attempt = attempt,
                        elapsed = ?start_time.elapsed(),
                        "Rancher API call succeeded after retries"
                    );
                }
                return Ok(value);
            }
            Err(e) => {
                if !e.is_retryable() {
                    debug!(
                        operation = operation_name,
                        url = %url,
                        error = %e,
                        "Non-retryable Rancher API error, failing immediately"
                    );
                    return Err(e);
                }

                if attempt >= RANCHER_MAX_ATTEMPTS {
                    error!(
                        operation = operation_name,
                        url = %url,
                        attempt = attempt,
                        elapsed = ?start_time.elapsed(),
                        error = %e,
                        "Rancher API retries exhausted, giving up"
                    );
                    return Err(e);
                }

                let duration = backoff_for_attempt(attempt);
                warn!(
                    operation = operation_name,
                    url = %url,
                    attempt = attempt,
                    retry_after = ?duration,
                    error = %e,
                    "Retryable Rancher API error, will retry"
                );
                tokio::time::sleep(duration).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
