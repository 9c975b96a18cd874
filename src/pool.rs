//! Bounded-concurrency execution of independent request tasks.
//!
//! The pool runs an ordered sequence of tasks with at most `concurrency`
//! in flight at any instant. Admission is greedy: as one task completes,
//! the next queued task is started, so a slow request never blocks the
//! rest of the batch behind a fixed round.
//!
//! Each task captures its input index at submission and writes its outcome
//! to that index, so the returned sequence always lines up with the input
//! regardless of completion order. No slot is shared between tasks and no
//! slot is ever left unfilled: the executor contract is infallible.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::debug;
use uuid::Uuid;

use crate::models::Outcome;
use crate::task::Task;
use crate::transport::ExecuteTask;

/// Runs batches of tasks with bounded concurrency.
pub struct RequestPool {
    executor: Arc<dyn ExecuteTask>,
    concurrency: usize,
}

impl RequestPool {
    /// Create a pool over the given executor. `concurrency` is clamped to
    /// at least 1.
    pub fn new(executor: Arc<dyn ExecuteTask>, concurrency: usize) -> Self {
        Self {
            executor,
            concurrency: concurrency.max(1),
        }
    }

    /// Get the configured concurrency limit.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Execute every task, returning one outcome per task in input order.
    ///
    /// An empty batch returns immediately without invoking the executor.
    /// Individual failures are captured into their own slot and never
    /// affect sibling tasks or the batch as a whole.
    pub async fn execute(&self, tasks: Vec<Task>) -> Vec<Outcome> {
        if tasks.is_empty() {
            return Vec::new();
        }

        let batch_id = Uuid::new_v4();
        let total = tasks.len();
        debug!(
            %batch_id,
            total,
            concurrency = self.concurrency,
            "dispatching request batch"
        );

        let mut slots: Vec<Option<Outcome>> = std::iter::repeat_with(|| None).take(total).collect();

        let mut completions = stream::iter(tasks.into_iter().enumerate().map(|(index, task)| {
            let executor = Arc::clone(&self.executor);
            async move { (index, executor.execute(task).await) }
        }))
        .buffer_unordered(self.concurrency);

        while let Some((index, outcome)) = completions.next().await {
            slots[index] = Some(outcome);
        }

        let outcomes: Vec<Outcome> = slots
            .into_iter()
            .map(|slot| slot.expect("every task writes exactly one outcome slot"))
            .collect();

        debug!(
            %batch_id,
            failed = outcomes.iter().filter(|o| o.is_failure()).count(),
            "request batch complete"
        );

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::error::NylasError;
    use crate::task::Method;
    use async_trait::async_trait;
    use serde_json::json;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Closure-backed executor for exercising the pool without a network.
    struct LambdaExecutor<F>(F);

    #[async_trait]
    impl<F, Fut> ExecuteTask for LambdaExecutor<F>
    where
        F: Fn(Task) -> Fut + Send + Sync,
        Fut: Future<Output = Outcome> + Send,
    {
        async fn execute(&self, task: Task) -> Outcome {
            (self.0)(task).await
        }
    }

    fn tasks(n: usize) -> Vec<Task> {
        (0..n)
            .map(|i| Task::new(Method::Get, api::ONE_EVENT).path_param(format!("evt_{i}")))
            .collect()
    }

    #[tokio::test]
    async fn empty_batch_makes_no_calls() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let pool = RequestPool::new(
            Arc::new(LambdaExecutor(move |_task| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Outcome::Success(json!(null))
                }
            })),
            4,
        );

        let outcomes = pool.execute(Vec::new()).await;
        assert!(outcomes.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn results_follow_input_order_under_adversarial_completion() {
        // Task 0 finishes last, task 4 first.
        let pool = RequestPool::new(
            Arc::new(LambdaExecutor(|task: Task| async move {
                let index: u64 = task.resolve_path()["/events/evt_".len()..].parse().unwrap();
                tokio::time::sleep(Duration::from_millis((5 - index) * 20)).await;
                Outcome::Success(json!(index))
            })),
            5,
        );

        let outcomes = pool.execute(tasks(5)).await;
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.payload(), Some(&json!(i as u64)));
        }
    }

    #[tokio::test]
    async fn in_flight_requests_never_exceed_limit() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (active_ref, peak_ref) = (Arc::clone(&active), Arc::clone(&peak));

        let pool = RequestPool::new(
            Arc::new(LambdaExecutor(move |_task| {
                let active = Arc::clone(&active_ref);
                let peak = Arc::clone(&peak_ref);
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Outcome::Success(json!(null))
                }
            })),
            2,
        );

        let outcomes = pool.execute(tasks(5)).await;
        assert_eq!(outcomes.len(), 5);
        assert!(peak.load(Ordering::SeqCst) <= 2, "more than 2 in flight");
    }

    #[tokio::test]
    async fn one_failure_leaves_siblings_untouched() {
        let pool = RequestPool::new(
            Arc::new(LambdaExecutor(|task: Task| async move {
                if task.resolve_path().ends_with("evt_1") {
                    Outcome::failure(NylasError::api(404, "not found"))
                } else {
                    Outcome::Success(json!("ok"))
                }
            })),
            3,
        );

        let outcomes = pool.execute(tasks(3)).await;
        assert!(outcomes[0].is_success());
        assert_eq!(outcomes[1].status(), Some(404));
        assert!(outcomes[2].is_success());
    }

    #[tokio::test]
    async fn zero_concurrency_is_clamped_to_one() {
        let pool = RequestPool::new(
            Arc::new(LambdaExecutor(|_task| async {
                Outcome::Success(json!(null))
            })),
            0,
        );
        assert_eq!(pool.concurrency(), 1);

        let outcomes = pool.execute(tasks(2)).await;
        assert_eq!(outcomes.len(), 2);
    }
}
