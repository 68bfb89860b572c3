use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rogeo_game::GameSnapshot;
use serde::{Deserialize, Serialize};

/// Text no catalog entry normalizes to.
pub const WRONG_GUESS: &str = "definitely not a map";

/// What a bot does on its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    Guess(String),
    Choose(String),
    Skip,
    /// Let the countdown run.
    Wait,
}

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub action: PlayerAction,
    /// Virtual time spent before acting.
    pub think_time: Duration,
    pub rationale: &'static str,
}

impl PolicyDecision {
    #[must_use]
    pub const fn new(action: PlayerAction, think_time: Duration, rationale: &'static str) -> Self {
        Self {
            action,
            think_time,
            rationale,
        }
    }
}

/// Policy interface for automated play.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Pick an action for the current guessing round. `answer` is the
    /// canonical name of the spot on screen.
    fn decide(&mut self, view: &GameSnapshot, answer: &str) -> PolicyDecision;
}

/// Built-in bot behaviours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GameplayStrategy {
    /// Always right, instantly.
    Perfect,
    /// Right most of the time, with some hesitation.
    Sloppy,
    /// Always wrong.
    Hopeless,
    /// Never answers and lets the timer expire.
    Idle,
    /// Skips every picture.
    Skipper,
}

impl GameplayStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect",
            Self::Sloppy => "Sloppy",
            Self::Hopeless => "Hopeless",
            Self::Idle => "Idle",
            Self::Skipper => "Skipper",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Perfect => Box::new(PerfectPolicy),
            Self::Sloppy => Box::new(SloppyPolicy::new(seed, 0.7)),
            Self::Hopeless => Box::new(HopelessPolicy),
            Self::Idle => Box::new(IdlePolicy),
            Self::Skipper => Box::new(SkipperPolicy),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct PerfectPolicy;
struct HopelessPolicy;
struct IdlePolicy;
struct SkipperPolicy;

struct SloppyPolicy {
    rng: ChaCha20Rng,
    accuracy: f64,
}

impl SloppyPolicy {
    fn new(seed: u64, accuracy: f64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            accuracy,
        }
    }
}

fn answer_action(view: &GameSnapshot, answer: &str) -> PlayerAction {
    if view.mode.is_multiple_choice() {
        PlayerAction::Choose(answer.to_string())
    } else {
        PlayerAction::Guess(answer.to_string())
    }
}

fn wrong_action(view: &GameSnapshot, answer: &str) -> PlayerAction {
    if view.mode.is_multiple_choice()
        && let Some(option) = view.options.iter().find(|option| *option != answer)
    {
        return PlayerAction::Choose(option.clone());
    }
    PlayerAction::Guess(WRONG_GUESS.to_string())
}

impl PlayerPolicy for PerfectPolicy {
    fn name(&self) -> &'static str {
        "Perfect"
    }

    fn decide(&mut self, view: &GameSnapshot, answer: &str) -> PolicyDecision {
        PolicyDecision::new(answer_action(view, answer), Duration::ZERO, "knows every map")
    }
}

impl PlayerPolicy for SloppyPolicy {
    fn name(&self) -> &'static str {
        "Sloppy"
    }

    fn decide(&mut self, view: &GameSnapshot, answer: &str) -> PolicyDecision {
        let think_time = Duration::from_millis(self.rng.gen_range(0..4_000));
        if self.rng.gen_bool(self.accuracy) {
            PolicyDecision::new(answer_action(view, answer), think_time, "recognized it")
        } else {
            PolicyDecision::new(wrong_action(view, answer), think_time, "misremembered")
        }
    }
}

impl PlayerPolicy for HopelessPolicy {
    fn name(&self) -> &'static str {
        "Hopeless"
    }

    fn decide(&mut self, view: &GameSnapshot, answer: &str) -> PolicyDecision {
        PolicyDecision::new(wrong_action(view, answer), Duration::ZERO, "never right")
    }
}

impl PlayerPolicy for IdlePolicy {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn decide(&mut self, view: &GameSnapshot, _answer: &str) -> PolicyDecision {
        if view.timer_enabled {
            PolicyDecision::new(PlayerAction::Wait, Duration::ZERO, "waiting out the clock")
        } else {
            PolicyDecision::new(PlayerAction::Skip, Duration::ZERO, "no clock to wait on")
        }
    }
}

impl PlayerPolicy for SkipperPolicy {
    fn name(&self) -> &'static str {
        "Skipper"
    }

    fn decide(&mut self, _view: &GameSnapshot, _answer: &str) -> PolicyDecision {
        PolicyDecision::new(PlayerAction::Skip, Duration::ZERO, "skips everything")
    }
}
