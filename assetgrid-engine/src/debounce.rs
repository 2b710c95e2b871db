//! Cancellable debounce timer for auto-save.
//!
//! Rapid successive keystrokes to one cell must coalesce into a single
//! persistence call. The timer is an explicit, abortable scheduled task
//! rather than a free-floating callback, so rescheduling is a cancel plus a
//! fresh arm and tests can drive it with a paused tokio clock.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A resettable one-shot timer.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Creates a timer with the given quiet window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            handle: None,
        }
    }

    /// The configured quiet window.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Arms the timer, cancelling any previously scheduled task. `task` runs
    /// once the window elapses without another `schedule` or `cancel`.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let window = self.window;
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            task.await;
        }));
    }

    /// Cancels the scheduled task, if one is armed.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// True while a task is armed and has not fired.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
