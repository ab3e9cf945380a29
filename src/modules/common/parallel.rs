// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::future::Future;

use futures::{future::join_all, stream, StreamExt, TryStreamExt};

use crate::modules::error::GmailerResult;

/// Runs `f` over `items` in consecutive groups of `batch_size`.
///
/// Every future of a group is polled concurrently and the whole group is joined
/// before the next one starts, so at most `batch_size` calls are ever in flight.
/// Results come back in input order regardless of completion order.
pub async fn run_in_batches<Item, Fut, F, O>(batch_size: usize, items: Vec<Item>, f: F) -> Vec<O>
where
    F: Fn(Item) -> Fut,
    Fut: Future<Output = O>,
{
    let batch_size = batch_size.max(1);
    let mut results = Vec::with_capacity(items.len());
    let mut iter = items.into_iter();
    loop {
        let batch: Vec<Item> = iter.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }
        results.extend(join_all(batch.into_iter().map(&f)).await);
    }
    results
}

/// Runs `f` over `iter` with at most `concurrency` futures pending at once,
/// keeping input order. Stops at the first error and drops the pending work.
pub async fn run_with_limit<I, Item, Fut, F, O>(
    concurrency: usize,
    iter: I,
    f: F,
) -> GmailerResult<Vec<O>>
where
    I: IntoIterator<Item = Item>,
    Fut: Future<Output = GmailerResult<O>>,
    F: Fn(Item) -> Fut,
{
    stream::iter(iter)
        .map(f)
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{modules::error::code::ErrorCode, raise_error};
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
        time::Duration,
    };

    #[tokio::test]
    async fn test_batches_never_overlap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let started = Arc::new(Mutex::new(Vec::new()));

        let items: Vec<usize> = (0..7).collect();
        let results = run_in_batches(3, items, |i| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            let started = started.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                started.lock().unwrap().push((i, now));
                // later items of a group finish first
                tokio::time::sleep(Duration::from_millis(30 - (i % 3) as u64 * 10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                i * 10
            }
        })
        .await;

        assert_eq!(results, vec![0, 10, 20, 30, 40, 50, 60]);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
        // the first item of every group starts with nothing else in flight
        let started = started.lock().unwrap();
        for (i, now) in started.iter() {
            if i % 3 == 0 {
                assert_eq!(*now, 1, "item {} started while a previous group was running", i);
            }
        }
    }

    #[tokio::test]
    async fn test_batches_with_zero_size_runs_one_by_one() {
        let results = run_in_batches(0, vec![1, 2, 3], |i| async move { i + 1 }).await;
        assert_eq!(results, vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_run_with_limit_keeps_order_and_fails_fast() {
        let ok = run_with_limit(2, vec![3u64, 1, 2], |i| async move {
            tokio::time::sleep(Duration::from_millis(i * 5)).await;
            Ok(i)
        })
        .await
        .unwrap();
        assert_eq!(ok, vec![3, 1, 2]);

        let err = run_with_limit(2, vec![1, 2, 3], |i| async move {
            if i == 2 {
                Err(raise_error!("two".into(), ErrorCode::InternalError))
            } else {
                Ok(i)
            }
        })
        .await
        .unwrap_err();
        assert_eq!(err.message(), "two");
    }
}
