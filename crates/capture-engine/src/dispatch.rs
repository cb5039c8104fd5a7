//! UI-thread handoff.
//!
//! Observer callbacks must run on the thread that owns display state. The
//! pipeline funnels every delivery through a `UiDispatcher`; the enclosing
//! UI supplies one that targets its event loop.

/// A task queued for the UI thread.
pub type UiTask = Box<dyn FnOnce() + Send>;

/// Serialized executor for display-state mutations.
pub trait UiDispatcher: Send + Sync {
    /// Enqueue a task. Tasks run in submission order on the dispatcher's
    /// drain context.
    fn dispatch(&self, task: UiTask);
}

/// Runs tasks immediately on the calling thread. Only suitable when the
/// caller's context already is the UI thread.
pub struct InlineDispatcher;

impl UiDispatcher for InlineDispatcher {
    fn dispatch(&self, task: UiTask) {
        task();
    }
}

/// FIFO dispatcher backed by an unbounded channel. The paired
/// [`DispatchQueue`] is drained by exactly one thread, which becomes the
/// UI thread for everything dispatched here.
pub struct QueueDispatcher {
    tx: tokio::sync::mpsc::UnboundedSender<UiTask>,
}

/// Receiving half of a [`QueueDispatcher`].
pub struct DispatchQueue {
    rx: tokio::sync::mpsc::UnboundedReceiver<UiTask>,
}

impl QueueDispatcher {
    pub fn new() -> (Self, DispatchQueue) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (Self { tx }, DispatchQueue { rx })
    }
}

impl UiDispatcher for QueueDispatcher {
    fn dispatch(&self, task: UiTask) {
        // The queue half may already be gone during shutdown; the task is
        // dropped with it.
        let _ = self.tx.send(task);
    }
}

impl DispatchQueue {
    /// Run every task currently queued, in order. Returns how many ran.
    pub fn drain(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Run tasks as they arrive until every dispatcher handle is dropped.
    pub async fn run_until_closed(&mut self) {
        while let Some(task) = self.rx.recv().await {
            task();
        }
    }

    /// Await and run the next task. Returns `false` once the queue closed.
    pub async fn run_one(&mut self) -> bool {
        match self.rx.recv().await {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn queue_preserves_submission_order() {
        let (dispatcher, mut queue) = QueueDispatcher::new();
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));

        for i in 0..8 {
            let log = log.clone();
            dispatcher.dispatch(Box::new(move || log.lock().unwrap().push(i)));
        }

        assert_eq!(queue.drain(), 8);
        assert_eq!(*log.lock().unwrap(), (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn inline_dispatcher_runs_immediately() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        InlineDispatcher.dispatch(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn run_one_reports_closure() {
        let (dispatcher, mut queue) = QueueDispatcher::new();
        dispatcher.dispatch(Box::new(|| {}));
        assert!(queue.run_one().await);
        drop(dispatcher);
        assert!(!queue.run_one().await);
    }
}
