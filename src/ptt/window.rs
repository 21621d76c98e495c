//! Per-page PTT window state machine.
//!
//! Turns a stream of trigger pulses into exactly one synthetic key-down and
//! one key-up per burst.
//!
//! ```text
//!            pulse (shortcut enabled)
//!            └─ key-down, ends_at = now + initial_delay, arm(initial_delay)
//!   Idle ──────────────────────────────────────────────▶ Active
//!    ▲                                                     │ pulse
//!    │                                                     │ └─ cancel, arm(max(min_gap, ends_at - now))
//!    │              timer fires                            │
//!    └──────── key-up (captured snapshot) ◀────────────────┘
//! ```
//!
//! `ends_at` stays anchored to the first pulse of the burst; repeated pulses
//! only move the timer.  Once the burst runs past `ends_at`, each pulse keeps
//! the key held for `min_gap` more, so the key is released at most `min_gap`
//! after pulses stop.

use std::time::Duration;

use tokio::time::Instant;

use crate::channel::{PageOutbox, TimerId};
use crate::shortcut::{KeyEvent, PttShortcut};

use super::sink::{KeyDirection, KeySink};
use super::timer::WindowTimer;

/// Externally visible state of a [`PttWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Idle,
    Active,
}

#[derive(Debug)]
struct ActiveWindow {
    ends_at: Instant,
    snapshot: KeyEvent,
    timer: WindowTimer,
}

/// The debounce window of one page.
pub struct PttWindow<S: KeySink> {
    sink: S,
    shortcut: PttShortcut,
    initial_delay: Duration,
    min_gap: Duration,
    active: Option<ActiveWindow>,
    outbox: PageOutbox,
    next_timer: TimerId,
}

impl<S: KeySink> PttWindow<S> {
    /// Create an idle window with no shortcut armed.
    ///
    /// * `outbox`: the owning page's inbox; timer expiries are posted there
    ///   and must be fed back through [`on_timer`](Self::on_timer).
    pub fn new(sink: S, outbox: PageOutbox, initial_delay: Duration, min_gap: Duration) -> Self {
        Self {
            sink,
            shortcut: PttShortcut::Disabled,
            initial_delay,
            min_gap,
            active: None,
            outbox,
            next_timer: 0,
        }
    }

    pub fn state(&self) -> WindowState {
        if self.active.is_some() {
            WindowState::Active
        } else {
            WindowState::Idle
        }
    }

    /// Deadline anchored at activation, while active.
    pub fn ends_at(&self) -> Option<Instant> {
        self.active.as_ref().map(|a| a.ends_at)
    }

    /// Instant the pending timer will fire, while active.
    pub fn release_at(&self) -> Option<Instant> {
        self.active.as_ref().map(|a| a.timer.deadline())
    }

    pub fn shortcut(&self) -> &PttShortcut {
        &self.shortcut
    }

    /// Arm a new shortcut for the *next* window.  An active window keeps the
    /// snapshot it was opened with.
    pub fn set_shortcut(&mut self, shortcut: PttShortcut) {
        self.shortcut = shortcut;
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Change the initial delay used by the next activation.
    pub fn set_initial_delay(&mut self, delay: Duration) {
        self.initial_delay = delay;
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn arm(&mut self, delay: Duration) -> WindowTimer {
        self.next_timer += 1;
        WindowTimer::arm(self.next_timer, delay, self.outbox.clone())
    }

    /// Handle one trigger pulse.
    pub fn trigger_pulse(&mut self) {
        let now = Instant::now();

        if let Some(active) = self.active.take() {
            let ActiveWindow {
                ends_at,
                snapshot,
                timer,
            } = active;
            timer.cancel();

            let delay = ends_at.saturating_duration_since(now).max(self.min_gap);
            let timer = self.arm(delay);
            log::trace!("ptt: pulse while active, release in {delay:?}");
            self.active = Some(ActiveWindow {
                ends_at,
                snapshot,
                timer,
            });
            return;
        }

        let Some(spec) = self.shortcut.spec() else {
            log::trace!("ptt: pulse ignored, shortcut disabled");
            return;
        };
        let Some(snapshot) = spec.key_event() else {
            log::debug!("ptt: pulse ignored, shortcut {spec} has more than one non-modifier key");
            return;
        };

        if let Err(e) = self.sink.dispatch(KeyDirection::Down, &snapshot) {
            // No key-down went out, so no key-up is owed.
            log::warn!("ptt: key-down for {spec} failed: {e}");
            return;
        }

        log::debug!("ptt: key-down {spec}, window {:?}", self.initial_delay);
        let timer = self.arm(self.initial_delay);
        self.active = Some(ActiveWindow {
            ends_at: now + self.initial_delay,
            snapshot,
            timer,
        });
    }

    /// Handle expiry of the timer armed with `id`.
    pub fn on_timer(&mut self, id: TimerId) {
        let current = self.active.as_ref().map(|a| a.timer.id());
        if current != Some(id) {
            log::debug!("ptt: stale timer {id} ignored");
            return;
        }

        let Some(active) = self.active.take() else {
            return;
        };
        let ActiveWindow { snapshot, timer, .. } = active;
        drop(timer);

        log::debug!("ptt: key-up");
        if let Err(e) = self.sink.dispatch(KeyDirection::Up, &snapshot) {
            log::warn!("ptt: key-up failed: {e}");
        }
    }

    /// Cancel any pending timer without dispatching anything further.
    pub fn teardown(&mut self) {
        if let Some(active) = self.active.take() {
            active.timer.cancel();
            log::debug!("ptt: torn down while active, key-up suppressed");
        }
    }
}

impl<S: KeySink> Drop for PttWindow<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
