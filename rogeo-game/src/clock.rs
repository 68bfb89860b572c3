//! Virtual-time driver for a [`GameSession`].
//!
//! The session itself never waits. `GameLoop` keeps the two deferred tasks
//! (the next countdown tick and the pending reveal) on a virtual timeline and
//! fires them in order as time is advanced, so tests and bots can play whole
//! games instantly while real-time hosts only need to sleep until
//! [`GameLoop::next_deadline`].

use std::time::Duration;

use crate::result::GameSummary;
use crate::session::{GameSession, GameSnapshot, RevealTicket, Transition};
use crate::settings::{GameMode, Settings, Timing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScheduledReveal {
    ticket: RevealTicket,
    due: Duration,
}

#[derive(Debug, Clone)]
pub struct GameLoop {
    session: GameSession,
    timing: Timing,
    now: Duration,
    next_tick: Option<Duration>,
    tick_epoch: u64,
    reveal: Option<ScheduledReveal>,
}

impl GameLoop {
    #[must_use]
    pub fn new(session: GameSession, timing: Timing) -> Self {
        let mut game = Self {
            session,
            timing,
            now: Duration::ZERO,
            next_tick: None,
            tick_epoch: 0,
            reveal: None,
        };
        game.resync();
        game
    }

    /// Move virtual time forward by `dt`, firing every event that falls due.
    pub fn advance(&mut self, dt: Duration) -> Vec<Transition> {
        let target = self.now.saturating_add(dt);
        let mut fired = Vec::new();
        while let Some(transition) = self.fire_next_before(target) {
            fired.push(transition);
        }
        self.now = target;
        fired
    }

    /// Jump straight to the next scheduled event and fire it.
    pub fn step(&mut self) -> Option<Transition> {
        let due = self.next_deadline()?;
        self.fire_next_before(due)
    }

    /// Step until nothing is scheduled or `max_events` have fired.
    pub fn run_until_idle(&mut self, max_events: usize) -> Vec<Transition> {
        let mut fired = Vec::new();
        while fired.len() < max_events {
            match self.step() {
                Some(transition) => fired.push(transition),
                None => break,
            }
        }
        fired
    }

    /// Earliest virtual time at which something is due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        let reveal = self.reveal.map(|scheduled| scheduled.due);
        match (reveal, self.next_tick) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Time left until [`Self::next_deadline`], saturating at zero.
    #[must_use]
    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|due| due.saturating_sub(self.now))
    }

    // Forwarded player actions. Each one re-syncs the schedule so a reveal
    // queued by an earlier resolution can never fire over a newer one.

    pub fn submit_guess(&mut self, text: &str) -> Transition {
        let transition = self.session.submit_guess(text);
        self.resync();
        transition
    }

    pub fn select_option(&mut self, label: &str) -> Transition {
        let transition = self.session.select_option(label);
        self.resync();
        transition
    }

    pub fn skip(&mut self) -> Transition {
        let transition = self.session.skip();
        self.resync();
        transition
    }

    pub fn restart(&mut self) -> Transition {
        let transition = self.session.restart();
        self.resync();
        transition
    }

    pub fn apply_settings(&mut self, settings: Settings) {
        self.session.apply_settings(settings);
        self.resync();
    }

    pub fn set_mode(&mut self, mode: GameMode) {
        self.session.set_mode(mode);
        self.resync();
    }

    pub fn set_timer_enabled(&mut self, enabled: bool) {
        self.session.set_timer_enabled(enabled);
        self.resync();
    }

    pub fn set_time_limit(&mut self, time_limit: u32) {
        self.session.set_time_limit(time_limit);
        self.resync();
    }

    pub fn set_zoom_level(&mut self, zoom_level: u8) {
        self.session.set_zoom_level(zoom_level);
        self.resync();
    }

    pub fn set_max_lives(&mut self, max_lives: u8) {
        self.session.set_max_lives(max_lives);
        self.resync();
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    #[must_use]
    pub const fn timing(&self) -> Timing {
        self.timing
    }

    #[must_use]
    pub const fn session(&self) -> &GameSession {
        &self.session
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        self.session.snapshot()
    }

    #[must_use]
    pub fn summary(&self) -> GameSummary {
        self.session.summary()
    }

    #[must_use]
    pub fn into_session(self) -> GameSession {
        self.session
    }

    fn fire_next_before(&mut self, limit: Duration) -> Option<Transition> {
        let reveal_due = self.reveal.filter(|scheduled| scheduled.due <= limit);
        let tick_due = self.next_tick.filter(|due| *due <= limit);
        let transition = match (reveal_due, tick_due) {
            (Some(scheduled), tick) if tick.is_none_or(|due| scheduled.due <= due) => {
                self.now = self.now.max(scheduled.due);
                self.reveal = None;
                self.session.on_reveal_elapsed(scheduled.ticket)
            }
            (_, Some(due)) => {
                self.now = self.now.max(due);
                self.next_tick = Some(due + self.timing.tick_interval);
                self.session.tick()
            }
            _ => return None,
        };
        self.resync();
        Some(transition)
    }

    fn resync(&mut self) {
        if self.session.timer_running() {
            let epoch = self.session.timer_epoch();
            if self.next_tick.is_none() || epoch != self.tick_epoch {
                self.next_tick = Some(self.now + self.timing.tick_interval);
                self.tick_epoch = epoch;
            }
        } else {
            self.next_tick = None;
        }

        self.reveal = match self.session.pending_reveal() {
            Some(pending) => match self.reveal {
                Some(scheduled) if scheduled.ticket == pending.ticket => Some(scheduled),
                _ => Some(ScheduledReveal {
                    ticket: pending.ticket,
                    due: self.now + self.timing.reveal_delay,
                }),
            },
            None => None,
        };
    }
}
