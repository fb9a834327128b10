// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Waiting for an object's pending transactions to finish.
//!
//! Operations such as startup or shutdown are carried out asynchronously by
//! the API. Callers that must not act on a device while one of them is in
//! flight repeatedly search for PENDING/COMMENCED transactions on the device
//! until none are left. The delay between searches is fixed.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::config::SdkConfig;
use crate::error::{Result, SdkError};
use crate::transaction::{ObjectType, TransactionFilter, TransactionPage};

/// Anything that can run a transaction search.
#[async_trait]
pub trait TransactionSearch: Send + Sync {
    async fn search_transactions(&self, filter: &TransactionFilter) -> Result<TransactionPage>;
}

/// How to wait for pending transactions.
#[derive(Debug, Clone)]
pub struct QuiescenceOptions {
    /// Delay between two searches.
    pub poll_interval: Duration,
    /// Give up once this much time has passed. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Stop waiting when this token is cancelled.
    pub cancel: Option<CancellationToken>,
}

impl Default for QuiescenceOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: None,
            cancel: None,
        }
    }
}

impl QuiescenceOptions {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            ..Self::default()
        }
    }

    /// Interval and timeout taken from the SDK configuration.
    pub fn from_config(config: &SdkConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            timeout: config.poll_timeout,
            cancel: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Block until no transaction on `object_id` is PENDING or COMMENCED.
///
/// Returns as soon as a search reports zero matches; otherwise sleeps
/// `poll_interval` and searches again. Search errors are returned
/// immediately. The deadline bounds each search and is checked before every
/// sleep; cancellation is observed during searches and sleeps.
#[instrument(skip(search, options), fields(object_type = %object_type, object_id = %object_id))]
pub async fn await_quiescence<S>(
    search: &S,
    object_type: ObjectType,
    object_id: &str,
    options: &QuiescenceOptions,
) -> Result<()>
where
    S: TransactionSearch + ?Sized,
{
    if object_id.is_empty() {
        return Err(SdkError::InvalidInput("object id is required".to_string()));
    }

    let filter = TransactionFilter::pending_for(object_type, object_id);
    let started = Instant::now();
    let cancel = options.cancel.as_ref();
    let deadline = options.timeout.map(|timeout| started + timeout);
    let cancelled = || SdkError::Cancelled {
        object_id: object_id.to_string(),
    };
    let timed_out = || SdkError::PollTimeout {
        object_id: object_id.to_string(),
        waited_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    };
    let mut polls: u32 = 0;

    loop {
        if cancel.is_some_and(|t| t.is_cancelled()) {
            return Err(cancelled());
        }

        let page = until_cancelled(cancel, before(deadline, search.search_transactions(&filter)))
            .await
            .ok_or_else(cancelled)?
            .ok_or_else(timed_out)??;
        polls += 1;

        if page.matches == 0 {
            debug!(polls, "No pending transactions");
            return Ok(());
        }
        debug!(matches = page.matches, polls, "Transactions still pending");

        let wake = Instant::now() + options.poll_interval;
        if deadline.is_some_and(|deadline| wake > deadline) {
            return Err(timed_out());
        }

        until_cancelled(cancel, tokio::time::sleep_until(wake))
            .await
            .ok_or_else(cancelled)?;
    }
}

/// Run `fut` to completion unless `deadline` passes first.
async fn before<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, fut).await.ok(),
        None => Some(fut.await),
    }
}

/// Run `fut` to completion unless `cancel` fires first.
async fn until_cancelled<F: Future>(
    cancel: Option<&CancellationToken>,
    fut: F,
) -> Option<F::Output> {
    match cancel {
        Some(token) => tokio::select! {
            biased;

            _ = token.cancelled() => None,
            out = fut => Some(out),
        },
        None => Some(fut.await),
    }
}
