//! The cross-thread command queue.
//!
//! The only shared mutable resource between the control thread and the
//! render thread. Producers push under the lock and never wait for the
//! GPU; the consumer swaps the whole queue contents out, so the two
//! sides contend only for the duration of the swap.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};

use crate::command::RenderCommand;

/// Mutex-guarded command queue with a shutdown flag.
#[derive(Debug, Default)]
pub struct CommandQueue {
    /// Pending commands in submission order.
    commands: Mutex<Vec<RenderCommand>>,
    /// Wakes the consumer for "non-empty or shutdown".
    condvar: Condvar,
    /// Cooperative shutdown flag. Checked before draining, so pending
    /// commands are dropped on shutdown rather than executed.
    shutdown: AtomicBool,
}

impl CommandQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command and wakes the consumer. Never blocks on GPU
    /// completion.
    pub fn submit(&self, command: RenderCommand) {
        let mut commands = self.commands.lock();
        commands.push(command);
        self.condvar.notify_one();
    }

    /// Blocks until shutdown is requested or the queue is non-empty.
    ///
    /// Returns `None` on shutdown without draining; otherwise swaps the
    /// entire queue contents out and returns them in submission order.
    pub fn wait_drain(&self) -> Option<Vec<RenderCommand>> {
        let mut commands = self.commands.lock();
        loop {
            if self.shutdown.load(Ordering::Acquire) {
                return None;
            }
            if !commands.is_empty() {
                return Some(std::mem::take(&mut *commands));
            }
            self.condvar.wait(&mut commands);
        }
    }

    /// Swaps the queue contents out without blocking. Used by tests and
    /// diagnostics; the render thread uses [`CommandQueue::wait_drain`].
    #[must_use]
    pub fn drain_now(&self) -> Vec<RenderCommand> {
        std::mem::take(&mut *self.commands.lock())
    }

    /// Requests shutdown and wakes the consumer. The flag is set under
    /// the queue lock so the consumer cannot miss the wakeup.
    pub fn shutdown(&self) {
        let _commands = self.commands.lock();
        self.shutdown.store(true, Ordering::Release);
        self.condvar.notify_all();
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Number of pending commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.lock().len()
    }

    /// Returns whether no commands are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_submission_order() {
        let queue = CommandQueue::new();
        queue.submit(RenderCommand::Clear);
        queue.submit(RenderCommand::DrawRect {
            x: 0.0,
            y: 0.0,
            w: 10.0,
            h: 10.0,
        });

        let batch = queue.drain_now();
        assert_eq!(batch.len(), 2);
        assert!(matches!(batch[0], RenderCommand::Clear));
        assert!(matches!(batch[1], RenderCommand::DrawRect { .. }));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_wait_drain_returns_pending_batch() {
        let queue = CommandQueue::new();
        queue.submit(RenderCommand::Clear);
        let batch = queue.wait_drain().unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_shutdown_wins_over_pending_commands() {
        let queue = CommandQueue::new();
        queue.submit(RenderCommand::Clear);
        queue.shutdown();
        // Shutdown exits without draining; pending commands drop.
        assert!(queue.wait_drain().is_none());
        assert!(queue.is_shut_down());
    }

    #[test]
    fn test_wait_drain_wakes_on_cross_thread_submit() {
        use std::sync::Arc;

        let queue = Arc::new(CommandQueue::new());
        let producer = Arc::clone(&queue);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            producer.submit(RenderCommand::Clear);
        });

        let batch = queue.wait_drain().unwrap();
        assert_eq!(batch.len(), 1);
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_drain_wakes_on_cross_thread_shutdown() {
        use std::sync::Arc;

        let queue = Arc::new(CommandQueue::new());
        let stopper = Arc::clone(&queue);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            stopper.shutdown();
        });

        assert!(queue.wait_drain().is_none());
        handle.join().unwrap();
    }
}
