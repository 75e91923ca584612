use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use super::interface::SpeechError;

/// Concurrency-limited async queue for utterances.
///
/// Keeps overlapping nudges from talking over each other: with one permit,
/// utterances play strictly one after another.
pub struct SpeechQueue {
    semaphore: Arc<Semaphore>,
}

impl SpeechQueue {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Enqueue a speech task. The task will execute once a semaphore permit
    /// is acquired, limiting concurrency to `max_concurrent`.
    pub fn enqueue<F, Fut>(&self, task: F) -> JoinHandle<Result<(), SpeechError>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<(), SpeechError>> + Send + 'static,
    {
        let semaphore = self.semaphore.clone();
        tokio::spawn(async move {
            let _permit = semaphore
                .acquire()
                .await
                .map_err(|_| SpeechError::QueueClosed)?;
            task().await
        })
    }

    /// Number of currently available permits (free slots).
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn single_permit_serializes_tasks() {
        let queue = SpeechQueue::new(1);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let active = active.clone();
                let peak = peak.clone();
                queue.enqueue(move || async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(queue.available_permits(), 1);
    }

    #[tokio::test]
    async fn zero_is_clamped_to_one_slot() {
        let queue = SpeechQueue::new(0);
        assert_eq!(queue.available_permits(), 1);
        let result = queue.enqueue(|| async { Ok(()) }).await.unwrap();
        assert!(result.is_ok());
    }
}
