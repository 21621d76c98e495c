//! Cancellable one-shot timer for the PTT window.
//!
//! Arming spawns a task that sleeps until the deadline and then posts
//! [`PageEvent::WindowElapsed`] into the owning page's inbox.  Cancelling (or
//! dropping) the timer aborts that task, so at most one armed timer per
//! window can ever post.  A post that was already queued when the timer was
//! replaced is recognised by its stale [`TimerId`] and ignored by the window.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::channel::{PageEvent, PageOutbox, TimerId};

#[derive(Debug)]
pub struct WindowTimer {
    id: TimerId,
    deadline: Instant,
    task: JoinHandle<()>,
}

impl WindowTimer {
    /// Arm a timer that posts `WindowElapsed(id)` to `outbox` after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(id: TimerId, delay: Duration, outbox: PageOutbox) -> Self {
        let deadline = Instant::now() + delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // The page may already be gone; nothing to do then.
            let _ = outbox.send(PageEvent::WindowElapsed(id));
        });
        Self { id, deadline, task }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Abort the pending post.
    pub fn cancel(self) {
        self.task.abort();
    }
}

impl Drop for WindowTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
