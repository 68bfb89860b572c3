//! Player-facing game settings.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_MAX_LIVES, DEFAULT_TIME_LIMIT, DEFAULT_ZOOM, MAX_LIVES_MAX, MAX_LIVES_MIN,
    REVEAL_DELAY_MS, TICK_INTERVAL_MS, TIME_LIMIT_MAX, TIME_LIMIT_MIN, ZOOM_MAX, ZOOM_MIN,
};
use crate::selector::CropFormula;

/// How the player answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Type the location name.
    #[default]
    #[serde(alias = "classic")]
    FreeText,
    /// Pick one of four labels.
    #[serde(alias = "mc")]
    MultipleChoice,
}

impl GameMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FreeText => "free_text",
            Self::MultipleChoice => "multiple_choice",
        }
    }

    #[must_use]
    pub const fn is_multiple_choice(self) -> bool {
        matches!(self, Self::MultipleChoice)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free_text" | "classic" => Ok(Self::FreeText),
            "multiple_choice" | "mc" => Ok(Self::MultipleChoice),
            _ => Err(()),
        }
    }
}

/// Configuration bag read by the session and changed only by the player.
///
/// Out-of-range values are clamped rather than rejected; see
/// [`Settings::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: GameMode,
    pub timer_enabled: bool,
    pub time_limit: u32,
    pub zoom_level: u8,
    pub max_lives: u8,
    pub crop_formula: CropFormula,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GameMode::FreeText,
            timer_enabled: true,
            time_limit: DEFAULT_TIME_LIMIT,
            zoom_level: DEFAULT_ZOOM,
            max_lives: DEFAULT_MAX_LIVES,
            crop_formula: CropFormula::Symmetric,
        }
    }
}

impl Settings {
    /// Parse settings from JSON, clamping every range afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::clamped)
    }

    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            time_limit: clamp_time_limit(self.time_limit),
            zoom_level: clamp_zoom(self.zoom_level),
            max_lives: clamp_max_lives(self.max_lives),
            ..self
        }
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: GameMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn with_timer(mut self, enabled: bool, time_limit: u32) -> Self {
        self.timer_enabled = enabled;
        self.time_limit = clamp_time_limit(time_limit);
        self
    }

    #[must_use]
    pub const fn with_zoom(mut self, zoom_level: u8) -> Self {
        self.zoom_level = clamp_zoom(zoom_level);
        self
    }

    #[must_use]
    pub const fn with_max_lives(mut self, max_lives: u8) -> Self {
        self.max_lives = clamp_max_lives(max_lives);
        self
    }
}

#[must_use]
pub const fn clamp_time_limit(value: u32) -> u32 {
    if value < TIME_LIMIT_MIN {
        TIME_LIMIT_MIN
    } else if value > TIME_LIMIT_MAX {
        TIME_LIMIT_MAX
    } else {
        value
    }
}

#[must_use]
pub const fn clamp_zoom(value: u8) -> u8 {
    if value < ZOOM_MIN {
        ZOOM_MIN
    } else if value > ZOOM_MAX {
        ZOOM_MAX
    } else {
        value
    }
}

#[must_use]
pub const fn clamp_max_lives(value: u8) -> u8 {
    if value < MAX_LIVES_MIN {
        MAX_LIVES_MIN
    } else if value > MAX_LIVES_MAX {
        MAX_LIVES_MAX
    } else {
        value
    }
}

/// Durations of the two deferred tasks a driver schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// Pause showing the answer before the next round starts.
    pub reveal_delay: Duration,
    /// Interval between countdown ticks.
    pub tick_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            reveal_delay: Duration::from_millis(REVEAL_DELAY_MS),
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
        }
    }
}

impl Timing {
    /// Same proportions as the default timing, divided by `factor`.
    #[must_use]
    pub fn compressed(factor: u32) -> Self {
        let factor = factor.max(1);
        let base = Self::default();
        Self {
            reveal_delay: base.reveal_delay / factor,
            tick_interval: base.tick_interval / factor,
        }
    }
}
