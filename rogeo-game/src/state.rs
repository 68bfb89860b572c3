use serde::{Deserialize, Serialize};
use std::fmt;

use crate::selector::ChoiceOptions;

/// Stage of the round state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Guessing,
    RevealingAnswer,
    GameOver,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guessing => "guessing",
            Self::RevealingAnswer => "revealing_answer",
            Self::GameOver => "game_over",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a round cost a life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissReason {
    WrongAnswer,
    Timeout,
    Skipped,
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongAnswer => write!(f, "wrong_answer"),
            Self::Timeout => write!(f, "timeout"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// How the most recent round was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundOutcome {
    Correct { gained: u32 },
    Missed { reason: MissReason },
}

/// Per-run answer counters, cleared on restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub correct: u32,
    pub wrong: u32,
    pub timeouts: u32,
    pub skips: u32,
}

impl RunStats {
    #[must_use]
    pub const fn answered(&self) -> u32 {
        self.correct + self.wrong + self.timeouts
    }

    #[must_use]
    pub const fn misses(&self) -> u32 {
        self.wrong + self.timeouts + self.skips
    }

    pub(crate) const fn record_miss(&mut self, reason: MissReason) {
        match reason {
            MissReason::WrongAnswer => self.wrong += 1,
            MissReason::Timeout => self.timeouts += 1,
            MissReason::Skipped => self.skips += 1,
        }
    }
}

/// Mutable round progress, owned exclusively by the session.
///
/// The current spot is held as an index into the session's catalog rather
/// than as an owned value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub round: u32,
    pub spot: usize,
    pub lives: u8,
    pub streak: u32,
    pub best_streak: u32,
    pub score: u32,
    pub phase: Phase,
    #[serde(default)]
    pub options: ChoiceOptions,
    #[serde(default)]
    pub last_outcome: Option<RoundOutcome>,
    #[serde(default)]
    pub stats: RunStats,
}

impl RoundState {
    #[must_use]
    pub fn new(spot: usize, lives: u8) -> Self {
        Self {
            round: 1,
            spot,
            lives,
            streak: 0,
            best_streak: 0,
            score: 0,
            phase: Phase::Guessing,
            options: ChoiceOptions::new(),
            last_outcome: None,
            stats: RunStats::default(),
        }
    }

    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver)
    }

    #[must_use]
    pub const fn is_guessing(&self) -> bool {
        matches!(self.phase, Phase::Guessing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_round_state_starts_guessing() {
        let state = RoundState::new(4, 3);
        assert_eq!(state.round, 1);
        assert_eq!(state.lives, 3);
        assert!(state.is_guessing());
        assert!(!state.is_game_over());
        assert!(state.options.is_empty());
    }

    #[test]
    fn stats_split_misses_by_reason() {
        let mut stats = RunStats::default();
        stats.record_miss(MissReason::WrongAnswer);
        stats.record_miss(MissReason::Timeout);
        stats.record_miss(MissReason::Skipped);
        stats.correct = 2;
        assert_eq!(stats.misses(), 3);
        assert_eq!(stats.answered(), 4);
    }

    #[test]
    fn outcome_serializes_with_kind_tag() {
        let json = serde_json::to_string(&RoundOutcome::Missed {
            reason: MissReason::Timeout,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"missed","reason":"timeout"}"#);
    }
}
