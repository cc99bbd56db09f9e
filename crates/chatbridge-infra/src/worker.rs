//! Bounded pool for blocking adapter calls.
//!
//! SDK- and framework-style adapters make synchronous HTTP calls. They run on
//! tokio's blocking thread pool, gated by a semaphore so a burst of slow calls
//! cannot exhaust it and stall unrelated conversations.

use std::sync::Arc;

use tokio::sync::Semaphore;

use chatbridge_types::error::ProviderError;

#[derive(Debug, Clone)]
pub struct BlockingPool {
    permits: Arc<Semaphore>,
}

impl BlockingPool {
    /// A pool allowing at most `max_concurrent` blocking calls at once (minimum 1).
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Run `task` on the blocking pool once a permit is available.
    ///
    /// The permit moves into the worker thread, so a call abandoned by its
    /// caller keeps its slot until the thread actually returns.
    pub async fn run<T, F>(&self, task: F) -> Result<T, ProviderError>
    where
        F: FnOnce() -> Result<T, ProviderError> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| ProviderError::worker("blocking pool is closed"))?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            task()
        })
        .await
            .map_err(|e| ProviderError::worker(format!("blocking worker failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn runs_task_and_returns_result() {
        let pool = BlockingPool::new(2);
        let value = pool.run(|| Ok::<_, ProviderError>(21 * 2)).await.unwrap();
        assert_eq!(value, 42);
        assert_eq!(pool.permits.available_permits(), 2);
    }

    #[tokio::test]
    async fn task_error_is_propagated() {
        let pool = BlockingPool::new(1);
        let err = pool
            .run(|| Err::<(), _>(ProviderError::empty_response("nothing")))
            .await
            .unwrap_err();
        assert_eq!(err.message, "nothing");
    }

    #[tokio::test]
    async fn panic_becomes_worker_error() {
        let pool = BlockingPool::new(1);
        let err = pool
            .run(|| -> Result<(), ProviderError> { panic!("adapter exploded") })
            .await
            .unwrap_err();
        assert_eq!(err.kind, chatbridge_types::error::ProviderErrorKind::Worker);
        assert_eq!(pool.permits.available_permits(), 1);
    }

    #[tokio::test]
    async fn abandoned_call_keeps_its_permit_until_the_thread_returns() {
        let pool = BlockingPool::new(1);
        let (started_tx, started_rx) = tokio::sync::oneshot::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        let caller = {
            let pool = pool.clone();
            tokio::spawn(async move {
                pool.run(move || {
                    let _ = started_tx.send(());
                    let _ = release_rx.recv();
                    Ok(())
                })
                .await
            })
        };
        started_rx.await.unwrap();
        caller.abort();
        assert!(caller.await.unwrap_err().is_cancelled());

        // The worker thread is still parked, so the slot stays taken.
        assert_eq!(pool.permits.available_permits(), 0);

        release_tx.send(()).unwrap();
        let permit = tokio::time::timeout(Duration::from_secs(5), pool.permits.acquire())
            .await
            .expect("permit was never returned");
        assert!(permit.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrency_is_bounded() {
        let pool = BlockingPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let pool = pool.clone();
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            handles.push(tokio::spawn(async move {
                pool.run(move || {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(20));
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                })
                .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }
}
