use std::time::{Duration, Instant};

use crate::kernel::ProgressIndicator;

/// Wall-clock deadline for a single kernel fill.
///
/// The guard does not stop the kernel itself: it answers the kernel's
/// cancellation polls, so a computation between two polls runs on past the
/// deadline. Once expired, every later poll reports a break.
#[derive(Debug)]
pub struct TimeoutGuard {
    started_at: Instant,
    expire_at: Option<Instant>,
    expired: bool,
}

impl TimeoutGuard {
    /// Starts the clock. A timeout of zero means no deadline.
    #[must_use]
    pub fn new(timeout_millis: u32) -> Self {
        let started_at = Instant::now();
        let expire_at = (timeout_millis > 0)
            .then(|| started_at + Duration::from_millis(u64::from(timeout_millis)));
        Self {
            started_at,
            expire_at,
            expired: false,
        }
    }

    /// Runs one kernel invocation, handing it the guard as its progress
    /// indicator when a deadline is set.
    pub fn run<T>(&mut self, f: impl FnOnce(Option<&mut dyn ProgressIndicator>) -> T) -> T {
        if self.expire_at.is_some() {
            let progress: &mut dyn ProgressIndicator = self;
            f(Some(progress))
        } else {
            f(None)
        }
    }

    /// Returns `true` if the deadline passed during a poll.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expired
    }

    /// Seconds since the guard was created.
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

impl ProgressIndicator for TimeoutGuard {
    fn user_break(&mut self) -> bool {
        if self.expired {
            return true;
        }
        match self.expire_at {
            Some(deadline) if Instant::now() >= deadline => {
                self.expired = true;
                true
            }
            _ => false,
        }
    }
}
