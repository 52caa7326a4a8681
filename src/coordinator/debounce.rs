use std::{future::Future, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{Instant, sleep_until},
};

/// Runs a task once a quiet period has passed since it was last scheduled.
///
/// At most one task is pending at a time: scheduling a new task cancels any
/// pending one that has not yet fired. Once the delay elapses the task is
/// spawned on its own, so cancelling afterwards never interrupts work that
/// has already started.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// A debouncer with the given quiet period.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedule `task` to start after the quiet period, replacing any
    /// pending task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        // the deadline is fixed now, not when the timer task is first polled
        let deadline = Instant::now() + self.delay;
        self.pending = Some(tokio::spawn(async move {
            sleep_until(deadline).await;
            tokio::spawn(task);
        }));
    }

    /// Cancel the pending task, if it has not fired yet.
    ///
    /// Returns `true` if a task was cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Whether a task is waiting for its quiet period to end.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use tokio::time::advance;

    use super::*;

    fn counter_task(counter: Arc<AtomicUsize>, value: usize) -> impl Future<Output = ()> {
        async move {
            counter.store(value, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_last_task_in_a_burst_runs() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.schedule(counter_task(Arc::clone(&fired), 1));
        advance(Duration::from_millis(100)).await;
        debouncer.schedule(counter_task(Arc::clone(&fired), 2));
        advance(Duration::from_millis(100)).await;
        debouncer.schedule(counter_task(Arc::clone(&fired), 3));
        assert!(debouncer.is_pending());

        advance(Duration::from_millis(499)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(10)).await;
        tokio::task::yield_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 3);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_the_task() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(50));

        debouncer.schedule(counter_task(Arc::clone(&fired), 1));
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_after_the_deadline_does_not_stop_started_work() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(10));

        let slow = {
            let fired = Arc::clone(&fired);
            async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                fired.store(7, Ordering::SeqCst);
            }
        };
        debouncer.schedule(slow);

        tokio::time::sleep(Duration::from_millis(20)).await;
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 7);
    }
}
