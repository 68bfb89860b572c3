//! Centralized balance and tuning constants for the quiz engine.

// Scoring ------------------------------------------------------------------
pub(crate) const SCORE_BASE: u32 = 100;
pub(crate) const SCORE_TIME_BONUS_MAX: u32 = 50;
pub(crate) const SCORE_ZOOM_STEP: u32 = 10;
pub(crate) const SCORE_STREAK_STEP: u32 = 10;

// Setting ranges -----------------------------------------------------------
pub const TIME_LIMIT_MIN: u32 = 5;
pub const TIME_LIMIT_MAX: u32 = 60;
pub const ZOOM_MIN: u8 = 1;
pub const ZOOM_MAX: u8 = 5;
pub const MAX_LIVES_MIN: u8 = 1;
pub const MAX_LIVES_MAX: u8 = 5;

// Setting defaults ---------------------------------------------------------
pub(crate) const DEFAULT_TIME_LIMIT: u32 = 20;
pub(crate) const DEFAULT_ZOOM: u8 = 2;
pub(crate) const DEFAULT_MAX_LIVES: u8 = 5;

// Timing -------------------------------------------------------------------
pub(crate) const REVEAL_DELAY_MS: u64 = 900;
pub(crate) const TICK_INTERVAL_MS: u64 = 1_000;

// Crop anchor --------------------------------------------------------------
pub(crate) const CROP_LCG_MULTIPLIER: u64 = 9_301;
pub(crate) const CROP_LCG_INCREMENT: u64 = 49_297;
pub(crate) const CROP_LCG_MODULUS: u64 = 233_280;
pub(crate) const CROP_LEGACY_Y_DIVISOR: u64 = 133_280;
pub(crate) const CROP_SPAN_PCT: f64 = 60.0;
pub(crate) const CROP_MIN_PCT: f64 = 20.0;
pub(crate) const CROP_MAX_PCT: f64 = 80.0;

// Multiple choice / autocomplete -------------------------------------------
pub(crate) const CHOICE_DISTRACTORS: usize = 3;
pub const SUGGESTION_LIMIT: usize = 8;
