//! Cancellable timer for debouncing free-text input
//!
//! Holds at most one pending action. Scheduling again replaces (and so cancels)
//! whatever was pending, which gives "fire once per quiet window" semantics.
//! The timer is polled from the owning event loop rather than driving callbacks.

use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct Pending<A> {
    action: A,
    deadline: Instant,
}

/// Single-slot timer: the slot itself is the cancellation handle
#[derive(Debug, Clone)]
pub struct CancellableTimer<A> {
    pending: Option<Pending<A>>,
}

impl<A> Default for CancellableTimer<A> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<A> CancellableTimer<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to fire after `delay`, replacing any pending action
    pub fn schedule(&mut self, delay: Duration, action: A) {
        self.schedule_at(Instant::now(), delay, action);
    }

    pub fn schedule_at(&mut self, now: Instant, delay: Duration, action: A) {
        if self.pending.is_some() {
            debug!("debounce rescheduled");
        }
        self.pending = Some(Pending {
            action,
            deadline: now + delay,
        });
    }

    /// Drop the pending action. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time until the pending action is due (None if nothing is pending)
    pub fn time_until_ready(&self) -> Option<Duration> {
        self.time_until_ready_at(Instant::now())
    }

    pub fn time_until_ready_at(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.deadline.saturating_duration_since(now))
    }

    /// Take the pending action if its deadline has passed
    pub fn poll(&mut self) -> Option<A> {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> Option<A> {
        match &self.pending {
            Some(p) if now >= p.deadline => {
                debug!("debounce fired");
                self.pending.take().map(|p| p.action)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    #[test]
    fn test_not_ready_before_window() {
        let start = Instant::now();
        let mut timer = CancellableTimer::new();
        timer.schedule_at(start, WINDOW, "a");

        assert!(timer.is_pending());
        assert_eq!(timer.poll_at(start + Duration::from_millis(299)), None);
        assert_eq!(
            timer.time_until_ready_at(start + Duration::from_millis(100)),
            Some(Duration::from_millis(200))
        );
    }

    #[test]
    fn test_fires_once_after_window() {
        let start = Instant::now();
        let mut timer = CancellableTimer::new();
        timer.schedule_at(start, WINDOW, "a");

        assert_eq!(timer.poll_at(start + WINDOW), Some("a"));
        assert!(!timer.is_pending());
        assert_eq!(timer.poll_at(start + WINDOW * 2), None);
        assert_eq!(timer.time_until_ready_at(start), None);
    }

    #[test]
    fn test_reschedule_replaces_pending_action() {
        let start = Instant::now();
        let mut timer = CancellableTimer::new();

        // Keystrokes 100ms apart never let the window elapse
        timer.schedule_at(start, WINDOW, "g");
        timer.schedule_at(start + Duration::from_millis(100), WINDOW, "gr");
        assert_eq!(timer.poll_at(start + Duration::from_millis(350)), None);
        timer.schedule_at(start + Duration::from_millis(200), WINDOW, "gre");

        assert_eq!(timer.poll_at(start + Duration::from_millis(450)), None);
        assert_eq!(timer.poll_at(start + Duration::from_millis(500)), Some("gre"));
        assert_eq!(timer.poll_at(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut timer = CancellableTimer::new();
        assert!(!timer.cancel());

        timer.schedule_at(start, WINDOW, 1);
        assert!(timer.cancel());
        assert!(!timer.is_pending());
        assert_eq!(timer.poll_at(start + WINDOW), None);
    }

    #[test]
    fn test_overdue_reports_zero() {
        let start = Instant::now();
        let mut timer = CancellableTimer::new();
        timer.schedule_at(start, WINDOW, ());
        assert_eq!(timer.time_until_ready_at(start + WINDOW * 3), Some(Duration::ZERO));
    }
}
