//! End-of-run summary
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::settings::{GameMode, Settings};
use crate::state::{MissReason, Phase, RoundOutcome, RoundState, RunStats};

/// Statistics of one run, as shown on the game-over screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub mode: GameMode,
    /// Rounds reached, including the one that ended the run
    pub rounds: u32,
    pub score: u32,
    pub best_streak: u32,
    pub lives_left: u8,
    pub max_lives: u8,
    pub game_over: bool,
    /// What cost the final life, once the run is over
    pub ending: Option<MissReason>,
    pub stats: RunStats,
    /// Correct answers over answered rounds, 0.0 when nothing was answered
    pub accuracy: f64,
}

impl GameSummary {
    #[must_use]
    pub fn from_state(state: &RoundState, settings: &Settings) -> Self {
        let game_over = state.phase == Phase::GameOver;
        let ending = match state.last_outcome {
            Some(RoundOutcome::Missed { reason }) if game_over => Some(reason),
            _ => None,
        };
        Self {
            mode: settings.mode,
            rounds: state.round,
            score: state.score,
            best_streak: state.best_streak,
            lives_left: state.lives,
            max_lives: settings.max_lives,
            game_over,
            ending,
            stats: state.stats,
            accuracy: accuracy(&state.stats),
        }
    }
}

fn accuracy(stats: &RunStats) -> f64 {
    let answered = stats.answered();
    if answered == 0 {
        0.0
    } else {
        f64::from(stats.correct) / f64::from(answered)
    }
}

impl fmt::Display for GameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pts over {} rounds, best streak {}, {:.0}% accuracy",
            self.score,
            self.rounds,
            self.best_streak,
            self.accuracy * 100.0
        )?;
        if let Some(ending) = self.ending {
            write!(f, " (ended by {ending})")?;
        }
        Ok(())
    }
}
