// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Tests for waiting on pending transactions.
//!
//! All tests run on a paused tokio clock, so poll sleeps are virtual and
//! elapsed times are exact.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use rackcorp_sdk::{
    CancellationToken, ObjectType, QuiescenceOptions, SdkError, TransactionFilter,
    TransactionPage, TransactionSearch, TransactionStatus, await_quiescence,
};

/// Answers each search with the next scripted match count.
///
/// Once the script runs out every search reports one pending transaction.
struct ScriptedSearch {
    script: Mutex<VecDeque<rackcorp_sdk::Result<u64>>>,
    calls: Mutex<Vec<(Instant, TransactionFilter)>>,
}

impl ScriptedSearch {
    fn new(script: Vec<rackcorp_sdk::Result<u64>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn matches(counts: &[u64]) -> Self {
        Self::new(counts.iter().map(|&c| Ok(c)).collect())
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

#[async_trait]
impl TransactionSearch for ScriptedSearch {
    async fn search_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> rackcorp_sdk::Result<TransactionPage> {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), filter.clone()));
        let matches = self.script.lock().unwrap().pop_front().unwrap_or(Ok(1))?;
        Ok(TransactionPage {
            transactions: Vec::new(),
            matches,
        })
    }
}

/// A search whose round trip never finishes in reasonable time.
struct StalledSearch {
    latency: Duration,
}

#[async_trait]
impl TransactionSearch for StalledSearch {
    async fn search_transactions(
        &self,
        _filter: &TransactionFilter,
    ) -> rackcorp_sdk::Result<TransactionPage> {
        tokio::time::sleep(self.latency).await;
        Ok(TransactionPage::default())
    }
}

const INTERVAL: Duration = Duration::from_secs(2);

#[tokio::test(start_paused = true)]
async fn test_returns_immediately_when_nothing_pending() {
    let search = ScriptedSearch::matches(&[0]);
    let started = Instant::now();

    await_quiescence(
        &search,
        ObjectType::Device,
        "42",
        &QuiescenceOptions::new(INTERVAL),
    )
    .await
    .unwrap();

    assert_eq!(search.call_count(), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_polls_k_plus_one_times() {
    let search = ScriptedSearch::matches(&[3, 2, 1, 0]);
    let started = Instant::now();

    await_quiescence(
        &search,
        ObjectType::Device,
        "42",
        &QuiescenceOptions::new(INTERVAL),
    )
    .await
    .unwrap();

    assert_eq!(search.call_count(), 4);
    assert_eq!(started.elapsed(), INTERVAL * 3);

    let times = search.call_times();
    for pair in times.windows(2) {
        assert_eq!(pair[1] - pair[0], INTERVAL);
    }
}

#[tokio::test(start_paused = true)]
async fn test_searches_with_pending_filter() {
    let search = ScriptedSearch::matches(&[1, 0]);

    await_quiescence(
        &search,
        ObjectType::Device,
        "5075",
        &QuiescenceOptions::new(INTERVAL),
    )
    .await
    .unwrap();

    let calls = search.calls.lock().unwrap();
    for (_, filter) in calls.iter() {
        assert_eq!(filter.object_type, ObjectType::Device);
        assert_eq!(filter.object_ids, vec!["5075".to_string()]);
        assert_eq!(
            filter.status,
            vec![TransactionStatus::Pending, TransactionStatus::Commenced]
        );
        assert_eq!(filter.result_window, 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_search_error_is_returned_immediately() {
    let search = ScriptedSearch::new(vec![
        Ok(1),
        Err(SdkError::Transport {
            action: "rctransaction.getall".to_string(),
            message: "connection reset".to_string(),
        }),
        Ok(0),
    ]);

    let err = await_quiescence(
        &search,
        ObjectType::Device,
        "42",
        &QuiescenceOptions::new(INTERVAL),
    )
    .await
    .unwrap_err();

    assert!(err.is_transport_error());
    assert_eq!(search.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_times_out() {
    let search = ScriptedSearch::matches(&[]);
    let started = Instant::now();

    let err = await_quiescence(
        &search,
        ObjectType::Device,
        "42",
        &QuiescenceOptions::new(INTERVAL).with_timeout(Duration::from_secs(5)),
    )
    .await
    .unwrap_err();

    match err {
        SdkError::PollTimeout {
            object_id,
            waited_ms,
        } => {
            assert_eq!(object_id, "42");
            assert_eq!(waited_ms, 4_000);
        }
        other => panic!("expected PollTimeout, got {:?}", other),
    }
    // searches at 0s, 2s and 4s; the next would land past the deadline
    assert_eq!(search.call_count(), 3);
    assert!(started.elapsed() <= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_bounds_slow_search() {
    let search = StalledSearch {
        latency: Duration::from_secs(60),
    };
    let started = Instant::now();

    let err = await_quiescence(
        &search,
        ObjectType::Device,
        "42",
        &QuiescenceOptions::new(INTERVAL).with_timeout(Duration::from_secs(5)),
    )
    .await
    .unwrap_err();

    match err {
        SdkError::PollTimeout {
            object_id,
            waited_ms,
        } => {
            assert_eq!(object_id, "42");
            assert_eq!(waited_ms, 5_000);
        }
        other => panic!("expected PollTimeout, got {:?}", other),
    }
    assert_eq!(started.elapsed(), Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_already_cancelled_does_not_search() {
    let search = ScriptedSearch::matches(&[0]);
    let token = CancellationToken::new();
    token.cancel();

    let err = await_quiescence(
        &search,
        ObjectType::Device,
        "42",
        &QuiescenceOptions::new(INTERVAL).with_cancellation(token),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SdkError::Cancelled { object_id } if object_id == "42"));
    assert_eq!(search.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_during_sleep() {
    let search = ScriptedSearch::matches(&[]);
    let token = CancellationToken::new();
    let options = QuiescenceOptions::new(INTERVAL).with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        token.cancel();
    });

    let started = Instant::now();
    let err = await_quiescence(&search, ObjectType::Device, "42", &options)
        .await
        .unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, SdkError::Cancelled { .. }));
    // searches at 0s and 2s, cancelled during the second sleep
    assert_eq!(search.call_count(), 2);
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test]
async fn test_requires_object_id() {
    let search = ScriptedSearch::matches(&[0]);

    let err = await_quiescence(
        &search,
        ObjectType::Device,
        "",
        &QuiescenceOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SdkError::InvalidInput(_)));
    assert_eq!(search.call_count(), 0);
}
