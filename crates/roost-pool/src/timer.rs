//! One-shot expiry timers driven by simulation time.
//!
//! [`ExpiryTimers`] is the pool engine's timer collaborator: lifetime-limited
//! instances get a one-shot timer armed on activation, and the registry
//! drains due timers once per tick via [`advance`](ExpiryTimers::advance),
//! auto-returning the named instances. There is no wall clock involved --
//! time only moves when the simulation tells it to, which keeps expiry fully
//! deterministic and testable.
//!
//! Each armed timer fires at most once: firing removes it from the queue.
//! Cancellation by [`TimerHandle`] is how explicit returns and pool teardown
//! prevent a stale callback from ever touching a reused instance.

use serde::{Deserialize, Serialize};
use tracing::debug;

// ---------------------------------------------------------------------------
// TimerHandle / ExpiryEvent
// ---------------------------------------------------------------------------

/// Opaque handle to one armed timer. Monotonically allocated, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

/// What a fired timer means: the named instance of `kind` has outlived its
/// configured lifespan and must return to its pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryEvent {
    pub kind: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// ExpiryTimers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct ArmedTimer {
    handle: TimerHandle,
    deadline: f64,
    event: ExpiryEvent,
}

/// The one-shot timer queue.
///
/// Pool sizes are small and timers few, so the queue is a plain vector
/// scanned on each advance rather than a heap.
#[derive(Debug, Default)]
pub struct ExpiryTimers {
    now: f64,
    next_handle: u64,
    armed: Vec<ArmedTimer>,
}

impl ExpiryTimers {
    /// Create an empty queue at simulation time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot timer firing `duration` seconds from now.
    pub fn arm(&mut self, duration: f32, event: ExpiryEvent) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.armed.push(ArmedTimer {
            handle,
            deadline: self.now + duration as f64,
            event,
        });
        handle
    }

    /// Cancel a pending timer. Returns `false` if the handle already fired
    /// or was cancelled before -- a common, harmless race with the drain.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.armed.len();
        self.armed.retain(|t| t.handle != handle);
        let cancelled = self.armed.len() < before;
        if !cancelled {
            debug!(?handle, "cancel on a timer that already fired");
        }
        cancelled
    }

    /// Advance simulation time by `dt` and drain every timer now due.
    ///
    /// Due timers are returned ordered by (deadline, handle) so that firing
    /// order is deterministic even when several timers share a deadline.
    pub fn advance(&mut self, dt: f64) -> Vec<ExpiryEvent> {
        self.now += dt;
        let now = self.now;

        let mut due: Vec<ArmedTimer> = Vec::new();
        self.armed.retain(|t| {
            if t.deadline <= now {
                due.push(t.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| {
            a.deadline
                .total_cmp(&b.deadline)
                .then(a.handle.0.cmp(&b.handle.0))
        });
        due.into_iter().map(|t| t.event).collect()
    }

    /// Current simulation time in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of armed, not-yet-fired timers.
    pub fn pending_count(&self) -> usize {
        self.armed.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str) -> ExpiryEvent {
        ExpiryEvent {
            kind: "Bullet".to_owned(),
            name: name.to_owned(),
        }
    }

    #[test]
    fn timer_fires_once_at_deadline() {
        let mut timers = ExpiryTimers::new();
        timers.arm(1.0, event("Bullet_1"));

        assert!(timers.advance(0.5).is_empty());
        let fired = timers.advance(0.5);
        assert_eq!(fired, vec![event("Bullet_1")]);
        // One-shot: nothing left to fire.
        assert!(timers.advance(10.0).is_empty());
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut timers = ExpiryTimers::new();
        let h = timers.arm(1.0, event("Bullet_1"));
        assert!(timers.cancel(h));
        assert!(timers.advance(2.0).is_empty());
    }

    #[test]
    fn cancel_after_fire_returns_false() {
        let mut timers = ExpiryTimers::new();
        let h = timers.arm(0.5, event("Bullet_1"));
        timers.advance(1.0);
        assert!(!timers.cancel(h));
    }

    #[test]
    fn firing_order_is_deterministic() {
        let mut timers = ExpiryTimers::new();
        timers.arm(2.0, event("Bullet_2"));
        timers.arm(1.0, event("Bullet_1"));
        timers.arm(2.0, event("Bullet_3"));

        let fired = timers.advance(3.0);
        // Deadline order first, then arm order for equal deadlines.
        assert_eq!(
            fired,
            vec![event("Bullet_1"), event("Bullet_2"), event("Bullet_3")]
        );
    }

    #[test]
    fn time_accumulates_across_advances() {
        let mut timers = ExpiryTimers::new();
        timers.advance(0.25);
        timers.advance(0.25);
        assert_eq!(timers.now(), 0.5);
        timers.arm(0.5, event("Bullet_1"));
        assert!(timers.advance(0.25).is_empty());
        assert_eq!(timers.advance(0.25), vec![event("Bullet_1")]);
    }

    #[test]
    fn zero_duration_fires_on_next_advance() {
        let mut timers = ExpiryTimers::new();
        timers.arm(0.0, event("Bullet_1"));
        assert_eq!(timers.advance(0.0), vec![event("Bullet_1")]);
    }
}
