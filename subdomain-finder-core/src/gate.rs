//! Counting admission gate shared by brute force and verification.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};

use crate::error::{CoreError, CoreResult};

/// Caps the number of tasks in flight.
///
/// A task must hold a permit for its whole lifetime; dropping the permit (on success,
/// failure or panic) frees the slot.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    permits: Arc<Semaphore>,
    limit: usize,
}

impl AdmissionGate {
    /// Gate admitting at most `limit` tasks at once.
    ///
    /// # Errors
    ///
    /// [`CoreError::ValidationError`] if `limit` is zero or above the semaphore maximum.
    pub fn new(limit: usize) -> CoreResult<Self> {
        if limit == 0 || limit > Semaphore::MAX_PERMITS {
            return Err(CoreError::ValidationError(format!(
                "Concurrency limit must be between 1 and {}, got {limit}",
                Semaphore::MAX_PERMITS
            )));
        }
        Ok(Self {
            permits: Arc::new(Semaphore::new(limit)),
            limit,
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Free slots right now.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait for a free slot.
    ///
    /// # Errors
    ///
    /// [`CoreError::GateClosed`] if the gate was closed.
    pub async fn admit(&self) -> CoreResult<OwnedSemaphorePermit> {
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| CoreError::GateClosed)
    }

    /// Stop admitting; pending and future [`admit`](Self::admit) calls fail.
    pub fn close(&self) {
        self.permits.close();
    }

    /// Run `task` for every item with bounded concurrency and collect the outputs in
    /// completion order.
    ///
    /// # Errors
    ///
    /// [`CoreError::GateClosed`] if the gate is closed mid-run.
    pub async fn run_all<I, F, Fut, T>(&self, items: I, task: F) -> CoreResult<Vec<T>>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut results = Vec::new();
        self.for_each_completed(items, task, |output| results.push(output))
            .await?;
        Ok(results)
    }

    /// Like [`run_all`](Self::run_all) but hands each output to `sink` as soon as it is
    /// joined instead of buffering it.
    ///
    /// Items are pulled lazily: the next one is produced only after a slot is free,
    /// so at most `limit` tasks exist at any time. A panicking task is logged and
    /// skipped.
    ///
    /// # Errors
    ///
    /// [`CoreError::GateClosed`] if the gate is closed mid-run. Tasks already spawned
    /// are still drained first.
    pub async fn for_each_completed<I, F, Fut, T, S>(
        &self,
        items: I,
        mut task: F,
        mut sink: S,
    ) -> CoreResult<()>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        S: FnMut(T),
    {
        let mut running = JoinSet::new();
        let mut outcome = Ok(());

        for item in items {
            let permit = match self.admit().await {
                Ok(permit) => permit,
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            };
            let fut = task(item);
            running.spawn(async move {
                let output = fut.await;
                drop(permit);
                output
            });
            while let Some(joined) = running.try_join_next() {
                deliver(joined, &mut sink);
            }
        }

        while let Some(joined) = running.join_next().await {
            deliver(joined, &mut sink);
        }
        outcome
    }
}

fn deliver<T>(joined: Result<T, JoinError>, sink: &mut impl FnMut(T)) {
    match joined {
        Ok(output) => sink(output),
        Err(e) => log::error!("[gate] task failed: {e}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[test]
    fn zero_limit_is_rejected() {
        assert!(matches!(
            AdmissionGate::new(0),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn permits_are_released_on_drop() {
        let gate = AdmissionGate::new(2).unwrap();
        let first = gate.admit().await.unwrap();
        let _second = gate.admit().await.unwrap();
        assert_eq!(gate.available(), 0);
        drop(first);
        assert_eq!(gate.available(), 1);
    }

    #[tokio::test]
    async fn closed_gate_refuses() {
        let gate = AdmissionGate::new(1).unwrap();
        gate.close();
        assert!(matches!(gate.admit().await, Err(CoreError::GateClosed)));
        let result = gate.run_all(0..3, |i| async move { i }).await;
        assert!(matches!(result, Err(CoreError::GateClosed)));
    }

    #[tokio::test]
    async fn run_all_collects_every_output() {
        let gate = AdmissionGate::new(3).unwrap();
        let mut out = gate.run_all(0..20, |i| async move { i * 2 }).await.unwrap();
        out.sort_unstable();
        assert_eq!(out, (0..20).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn run_all_never_exceeds_limit() {
        let gate = AdmissionGate::new(4).unwrap();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        gate.run_all(0..40, |_| {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await
        .unwrap();

        let peak = peak.load(Ordering::SeqCst);
        assert!(peak <= 4, "peak {peak} exceeded limit");
        assert!(peak > 1, "tasks never overlapped");
    }

    #[tokio::test]
    async fn panicking_task_does_not_abort_siblings() {
        let gate = AdmissionGate::new(2).unwrap();
        let out = gate
            .run_all(0..5, |i| async move {
                assert!(i != 2, "boom");
                i
            })
            .await
            .unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(gate.available(), 2);
    }

    #[tokio::test]
    async fn for_each_completed_sees_every_item() {
        let gate = AdmissionGate::new(2).unwrap();
        let produced = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&produced);
        let items = (0..10).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let mut seen = 0;
        gate.for_each_completed(items, |i| async move { i }, |_| seen += 1)
            .await
            .unwrap();
        assert_eq!(seen, 10);
        assert_eq!(produced.load(Ordering::SeqCst), 10);
    }
}
