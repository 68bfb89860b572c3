//! Per-round countdown.
use serde::{Deserialize, Serialize};

/// Result of feeding one tick to the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting; carries the seconds left.
    Running(u32),
    /// Reached zero on this tick. Raised at most once per arm.
    Expired,
    /// Paused, stopped, or already expired.
    Inert,
}

/// Single-threaded countdown rearmed at the start of every round.
///
/// The countdown has no notion of phase; the session decides when it runs
/// and calls [`Countdown::pause`] / [`Countdown::stop`] accordingly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    limit: u32,
    left: u32,
    running: bool,
    expired: bool,
    /// Bumped on every rearm so drivers can realign their tick schedule.
    epoch: u64,
}

impl Countdown {
    #[must_use]
    pub const fn new(limit: u32) -> Self {
        Self {
            limit,
            left: limit,
            running: false,
            expired: false,
            epoch: 0,
        }
    }

    /// Reset to `limit` and start counting.
    pub const fn rearm(&mut self, limit: u32) {
        self.limit = limit;
        self.left = limit;
        self.running = true;
        self.expired = false;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Freeze the remaining time; a later rearm restarts it.
    pub const fn pause(&mut self) {
        self.running = false;
    }

    /// Stop for good until rearmed.
    pub const fn stop(&mut self) {
        self.running = false;
        self.left = 0;
    }

    /// Change the limit without restarting, keeping `left <= limit`.
    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit;
        self.left = self.left.min(limit);
    }

    pub const fn tick(&mut self) -> TickOutcome {
        if !self.running || self.expired {
            return TickOutcome::Inert;
        }
        self.left = self.left.saturating_sub(1);
        if self.left == 0 {
            self.expired = true;
            self.running = false;
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.left)
        }
    }

    #[must_use]
    pub const fn time_left(&self) -> u32 {
        self.left
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Remaining time as a whole percentage of the limit, for progress bars.
    #[must_use]
    pub const fn remaining_pct(&self) -> u32 {
        if self.limit == 0 {
            0
        } else {
            self.left * 100 / self.limit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_and_expires_once() {
        let mut timer = Countdown::new(5);
        assert_eq!(timer.tick(), TickOutcome::Inert);
        timer.rearm(3);
        assert_eq!(timer.tick(), TickOutcome::Running(2));
        assert_eq!(timer.tick(), TickOutcome::Running(1));
        assert_eq!(timer.tick(), TickOutcome::Expired);
        assert_eq!(timer.tick(), TickOutcome::Inert);
        assert_eq!(timer.time_left(), 0);
    }

    #[test]
    fn pause_freezes_and_rearm_restarts() {
        let mut timer = Countdown::new(10);
        timer.rearm(10);
        timer.tick();
        timer.pause();
        assert_eq!(timer.tick(), TickOutcome::Inert);
        assert_eq!(timer.time_left(), 9);
        let epoch = timer.epoch();
        timer.rearm(10);
        assert_eq!(timer.epoch(), epoch + 1);
        assert_eq!(timer.time_left(), 10);
        assert!(timer.is_running());
    }

    #[test]
    fn lowering_limit_clamps_time_left() {
        let mut timer = Countdown::new(30);
        timer.rearm(30);
        timer.set_limit(10);
        assert_eq!(timer.time_left(), 10);
        timer.set_limit(60);
        assert_eq!(timer.time_left(), 10);
        assert_eq!(timer.remaining_pct(), 16);
    }

    #[test]
    fn stop_zeroes_and_goes_inert() {
        let mut timer = Countdown::new(20);
        timer.rearm(20);
        timer.stop();
        assert_eq!(timer.time_left(), 0);
        assert_eq!(timer.tick(), TickOutcome::Inert);
    }
}
