//! Fixed-window request rate limiting.
//!
//! One counter shared across all callers. When the window elapses the
//! counter resets; within a window, requests past the limit are
//! rejected without doing any work.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// State of the current window.
struct WindowState {
    /// When the current window opened.
    window_start: Instant,
    /// Requests admitted in the current window.
    count: u32,
}

/// A fixed-window rate limiter.
pub struct FixedWindowLimiter {
    /// Maximum requests admitted per window.
    max_per_window: u32,
    /// Window length.
    window: Duration,
    /// Shared counter, its own lock.
    state: Mutex<WindowState>,
}

impl FixedWindowLimiter {
    /// Creates a limiter admitting `max_per_window` requests per
    /// `window`.
    #[must_use]
    pub fn new(max_per_window: u32, window: Duration) -> Self {
        Self {
            max_per_window,
            window,
            state: Mutex::new(WindowState {
                window_start: Instant::now(),
                count: 0,
            }),
        }
    }

    /// Creates a limiter with a one-second window.
    #[must_use]
    pub fn per_second(max_per_second: u32) -> Self {
        Self::new(max_per_second, Duration::from_secs(1))
    }

    /// Tries to admit one request. Returns `false` when the window's
    /// budget is exhausted.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();
        let now = Instant::now();
        if now.duration_since(state.window_start) >= self.window {
            state.window_start = now;
            state.count = 0;
        }
        if state.count >= self.max_per_window {
            return false;
        }
        state.count += 1;
        true
    }

    /// The configured per-window budget.
    #[inline]
    #[must_use]
    pub const fn max_per_window(&self) -> u32 {
        self.max_per_window
    }
}
