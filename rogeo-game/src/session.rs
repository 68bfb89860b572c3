//! Round, lives and score state machine.
//!
//! [`GameSession`] owns the mutable [`RoundState`] and every transition
//! between `Guessing`, `RevealingAnswer` and `GameOver`. It never sleeps or
//! spawns anything: the reveal delay is represented by a [`RevealTicket`] the
//! caller hands back through [`GameSession::on_reveal_elapsed`] once the delay
//! has passed, and countdown ticks arrive through [`GameSession::tick`]. The
//! [`crate::clock::GameLoop`] driver does both on a virtual clock.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::constants::{
    SCORE_BASE, SCORE_STREAK_STEP, SCORE_TIME_BONUS_MAX, SCORE_ZOOM_STEP, SUGGESTION_LIMIT,
};
use crate::data::{Spot, SpotCatalog};
use crate::matcher::{matches, suggest};
use crate::result::GameSummary;
use crate::selector::{ChoiceOptions, CropView, multiple_choice_options, pick_next};
use crate::settings::{
    GameMode, Settings, clamp_max_lives, clamp_time_limit, clamp_zoom,
};
use crate::state::{MissReason, Phase, RoundOutcome, RoundState, RunStats};
use crate::timer::{Countdown, TickOutcome};

/// Handle of a pending "advance to next round" task.
///
/// Tickets are generation-numbered; only the most recently issued one is
/// honoured, so a reveal scheduled before a restart or skip is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevealTicket(u64);

impl RevealTicket {
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// The deferred advance currently waiting on the reveal delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReveal {
    pub ticket: RevealTicket,
    /// Points credited when the advance fires.
    pub gained: u32,
}

/// Why an operation left the state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    EmptyGuess,
    NotGuessing,
    WrongMode,
    UnknownOption,
    TimerDisabled,
    TimerIdle,
    StaleTicket,
}

/// What a session operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    Ignored { reason: IgnoreReason },
    Ticked { time_left: u32 },
    Correct { gained: u32, ticket: RevealTicket },
    Missed { reason: MissReason, lives: u8, ticket: RevealTicket },
    Skipped { lives: u8, round: u32 },
    GameOver { reason: MissReason, score: u32 },
    Advanced { round: u32, score: u32 },
    Restarted,
}

impl Transition {
    #[must_use]
    pub const fn ignored(reason: IgnoreReason) -> Self {
        Self::Ignored { reason }
    }

    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored { .. })
    }

    /// Ticket to schedule, if this transition started a reveal.
    #[must_use]
    pub const fn reveal_ticket(&self) -> Option<RevealTicket> {
        match self {
            Self::Correct { ticket, .. } | Self::Missed { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }
}

/// Points for a correct answer given the state before the streak increments.
#[must_use]
pub fn score_for_correct(settings: &Settings, time_left: u32, streak_before: u32) -> u32 {
    let time_bonus = if settings.timer_enabled {
        (time_left * SCORE_TIME_BONUS_MAX).div_ceil(settings.time_limit.max(1))
    } else {
        0
    };
    let zoom_bonus = u32::from(settings.zoom_level.saturating_sub(1)) * SCORE_ZOOM_STEP;
    SCORE_BASE + time_bonus + zoom_bonus + streak_before.saturating_mul(SCORE_STREAK_STEP)
}

/// Read-only view of the session for renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub round: u32,
    pub phase: Phase,
    pub lives: u8,
    pub max_lives: u8,
    pub streak: u32,
    pub best_streak: u32,
    pub score: u32,
    pub time_left: u32,
    pub time_limit: u32,
    pub timer_enabled: bool,
    pub timer_pct: u32,
    pub mode: GameMode,
    pub zoom_level: u8,
    pub spot_id: String,
    pub image: String,
    /// Attribution for the screenshot, when the catalog has one.
    pub credit: Option<String>,
    /// Only present once the round is resolved.
    pub answer_label: Option<String>,
    pub options: ChoiceOptions,
    pub crop: CropView,
    pub last_outcome: Option<RoundOutcome>,
    pub stats: RunStats,
}

/// Single owner of one player's game.
#[derive(Debug, Clone)]
pub struct GameSession {
    catalog: Arc<SpotCatalog>,
    settings: Settings,
    state: RoundState,
    timer: Countdown,
    rng: ChaCha20Rng,
    seed: u64,
    pending: Option<PendingReveal>,
    tickets_issued: u64,
}

impl GameSession {
    /// Start a session on round 1 with a random spot drawn from `seed`.
    #[must_use]
    pub fn new(catalog: Arc<SpotCatalog>, settings: Settings, seed: u64) -> Self {
        let settings = settings.clamped();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let spot = pick_next(&catalog, None, &mut rng);
        let mut session = Self {
            state: RoundState::new(spot, settings.max_lives),
            timer: Countdown::new(settings.time_limit),
            catalog,
            settings,
            rng,
            seed,
            pending: None,
            tickets_issued: 0,
        };
        session.begin_round();
        session
    }

    // --- player actions --------------------------------------------------

    /// Evaluate a typed guess against the current spot.
    pub fn submit_guess(&mut self, text: &str) -> Transition {
        if !self.state.is_guessing() {
            return Transition::ignored(IgnoreReason::NotGuessing);
        }
        if text.trim().is_empty() {
            return Transition::ignored(IgnoreReason::EmptyGuess);
        }
        if matches(text, self.current_spot()) {
            self.resolve_correct()
        } else {
            self.resolve_miss(MissReason::WrongAnswer)
        }
    }

    /// Evaluate one of the offered multiple-choice labels.
    pub fn select_option(&mut self, label: &str) -> Transition {
        if !self.state.is_guessing() {
            return Transition::ignored(IgnoreReason::NotGuessing);
        }
        if !self.settings.mode.is_multiple_choice() {
            return Transition::ignored(IgnoreReason::WrongMode);
        }
        if !self.state.options.iter().any(|option| option == label) {
            return Transition::ignored(IgnoreReason::UnknownOption);
        }
        if matches(label, self.current_spot()) {
            self.resolve_correct()
        } else {
            self.resolve_miss(MissReason::WrongAnswer)
        }
    }

    /// Give up on the current picture for one life and move straight on.
    pub fn skip(&mut self) -> Transition {
        if !self.state.is_guessing() {
            return Transition::ignored(IgnoreReason::NotGuessing);
        }
        self.pending = None;
        self.state.lives = self.state.lives.saturating_sub(1);
        self.state.stats.record_miss(MissReason::Skipped);
        self.state.last_outcome = Some(RoundOutcome::Missed {
            reason: MissReason::Skipped,
        });
        if self.state.lives == 0 {
            return self.enter_game_over(MissReason::Skipped);
        }
        log::debug!(
            "round {} skipped, {} lives left",
            self.state.round,
            self.state.lives
        );
        self.advance_round(0);
        Transition::Skipped {
            lives: self.state.lives,
            round: self.state.round,
        }
    }

    /// Reset the run. Valid from any phase.
    pub fn restart(&mut self) -> Transition {
        self.pending = None;
        let spot = pick_next(&self.catalog, None, &mut self.rng);
        let best_streak = self.state.best_streak;
        self.state = RoundState {
            best_streak,
            ..RoundState::new(spot, self.settings.max_lives)
        };
        self.begin_round();
        log::info!("session restarted with {} lives", self.state.lives);
        Transition::Restarted
    }

    // --- clock events ----------------------------------------------------

    /// One countdown step; expires the round when it reaches zero.
    pub fn tick(&mut self) -> Transition {
        if !self.settings.timer_enabled {
            return Transition::ignored(IgnoreReason::TimerDisabled);
        }
        if !self.state.is_guessing() {
            return Transition::ignored(IgnoreReason::NotGuessing);
        }
        match self.timer.tick() {
            TickOutcome::Running(time_left) => Transition::Ticked { time_left },
            TickOutcome::Expired => self.on_timer_expired(),
            TickOutcome::Inert => Transition::ignored(IgnoreReason::TimerIdle),
        }
    }

    /// Treat the round as a timeout miss.
    pub fn on_timer_expired(&mut self) -> Transition {
        if !self.settings.timer_enabled {
            return Transition::ignored(IgnoreReason::TimerDisabled);
        }
        if !self.state.is_guessing() {
            return Transition::ignored(IgnoreReason::NotGuessing);
        }
        self.resolve_miss(MissReason::Timeout)
    }

    /// Finish the reveal started by `ticket` and begin the next round.
    pub fn on_reveal_elapsed(&mut self, ticket: RevealTicket) -> Transition {
        match self.pending {
            Some(pending)
                if pending.ticket == ticket && self.state.phase == Phase::RevealingAnswer =>
            {
                self.pending = None;
                self.advance_round(pending.gained);
                Transition::Advanced {
                    round: self.state.round,
                    score: self.state.score,
                }
            }
            _ => {
                log::debug!("discarding stale reveal ticket {}", ticket.id());
                Transition::ignored(IgnoreReason::StaleTicket)
            }
        }
    }

    // --- settings --------------------------------------------------------

    pub fn set_mode(&mut self, mode: GameMode) {
        self.settings.mode = mode;
        self.refresh_options();
    }

    /// Rearms the countdown only when the value actually changes.
    pub fn set_timer_enabled(&mut self, enabled: bool) {
        if enabled == self.settings.timer_enabled {
            return;
        }
        self.settings.timer_enabled = enabled;
        self.rearm_if_guessing();
    }

    pub fn set_time_limit(&mut self, time_limit: u32) {
        let time_limit = clamp_time_limit(time_limit);
        if time_limit == self.settings.time_limit {
            return;
        }
        self.settings.time_limit = time_limit;
        self.timer.set_limit(self.settings.time_limit);
        self.rearm_if_guessing();
    }

    pub fn set_zoom_level(&mut self, zoom_level: u8) {
        self.settings.zoom_level = clamp_zoom(zoom_level);
    }

    /// Lowering the maximum clamps current lives; raising it never refills.
    pub fn set_max_lives(&mut self, max_lives: u8) {
        self.settings.max_lives = clamp_max_lives(max_lives);
        self.state.lives = self.state.lives.min(self.settings.max_lives);
    }

    /// Apply every changed field through its setter.
    pub fn apply_settings(&mut self, settings: Settings) {
        let settings = settings.clamped();
        let current = self.settings;
        self.settings.crop_formula = settings.crop_formula;
        if settings.mode != current.mode {
            self.set_mode(settings.mode);
        }
        if settings.zoom_level != current.zoom_level {
            self.set_zoom_level(settings.zoom_level);
        }
        if settings.max_lives != current.max_lives {
            self.set_max_lives(settings.max_lives);
        }
        if settings.time_limit != current.time_limit {
            self.set_time_limit(settings.time_limit);
        }
        if settings.timer_enabled != current.timer_enabled {
            self.set_timer_enabled(settings.timer_enabled);
        }
    }

    // --- queries ---------------------------------------------------------

    #[must_use]
    pub fn current_spot(&self) -> &Spot {
        &self.catalog.spots()[self.state.spot]
    }

    #[must_use]
    pub const fn state(&self) -> &RoundState {
        &self.state
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn catalog(&self) -> &SpotCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn pending_reveal(&self) -> Option<PendingReveal> {
        self.pending
    }

    #[must_use]
    pub const fn time_left(&self) -> u32 {
        self.timer.time_left()
    }

    /// Whether a driver should currently deliver ticks.
    #[must_use]
    pub const fn timer_running(&self) -> bool {
        self.settings.timer_enabled && self.state.is_guessing() && self.timer.is_running()
    }

    #[must_use]
    pub const fn timer_epoch(&self) -> u64 {
        self.timer.epoch()
    }

    /// Autocomplete entries for a partially typed guess.
    #[must_use]
    pub fn suggestions(&self, query: &str) -> Vec<String> {
        suggest(&self.catalog, query, SUGGESTION_LIMIT)
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let spot = self.current_spot();
        GameSnapshot {
            round: self.state.round,
            phase: self.state.phase,
            lives: self.state.lives,
            max_lives: self.settings.max_lives,
            streak: self.state.streak,
            best_streak: self.state.best_streak,
            score: self.state.score,
            time_left: self.timer.time_left(),
            time_limit: self.settings.time_limit,
            timer_enabled: self.settings.timer_enabled,
            timer_pct: self.timer.remaining_pct(),
            mode: self.settings.mode,
            zoom_level: self.settings.zoom_level,
            spot_id: spot.id.clone(),
            image: spot.image.clone(),
            credit: spot.credit.clone(),
            answer_label: (!self.state.is_guessing()).then(|| spot.answer_label()),
            options: self.state.options.clone(),
            crop: CropView::new(
                self.state.round,
                self.settings.zoom_level,
                self.settings.crop_formula,
            ),
            last_outcome: self.state.last_outcome,
            stats: self.state.stats,
        }
    }

    #[must_use]
    pub fn summary(&self) -> GameSummary {
        GameSummary::from_state(&self.state, &self.settings)
    }

    // --- internals -------------------------------------------------------

    fn resolve_correct(&mut self) -> Transition {
        let streak_before = self.state.streak;
        let gained = score_for_correct(&self.settings, self.timer.time_left(), streak_before);
        self.state.streak += 1;
        self.state.best_streak = self.state.best_streak.max(self.state.streak);
        self.state.stats.correct += 1;
        self.state.last_outcome = Some(RoundOutcome::Correct { gained });
        self.state.phase = Phase::RevealingAnswer;
        self.timer.pause();
        let ticket = self.schedule_reveal(gained);
        log::debug!(
            "round {} correct: +{gained} pending, streak {}",
            self.state.round,
            self.state.streak
        );
        Transition::Correct { gained, ticket }
    }

    fn resolve_miss(&mut self, reason: MissReason) -> Transition {
        self.state.streak = 0;
        self.state.lives = self.state.lives.saturating_sub(1);
        self.state.stats.record_miss(reason);
        self.state.last_outcome = Some(RoundOutcome::Missed { reason });
        if self.state.lives == 0 {
            return self.enter_game_over(reason);
        }
        self.state.phase = Phase::RevealingAnswer;
        self.timer.pause();
        let ticket = self.schedule_reveal(0);
        log::debug!(
            "round {} missed ({reason}), {} lives left",
            self.state.round,
            self.state.lives
        );
        Transition::Missed {
            reason,
            lives: self.state.lives,
            ticket,
        }
    }

    fn enter_game_over(&mut self, reason: MissReason) -> Transition {
        self.pending = None;
        self.state.phase = Phase::GameOver;
        self.timer.stop();
        log::info!(
            "game over after round {} ({reason}), score {}",
            self.state.round,
            self.state.score
        );
        Transition::GameOver {
            reason,
            score: self.state.score,
        }
    }

    fn schedule_reveal(&mut self, gained: u32) -> RevealTicket {
        self.tickets_issued += 1;
        let ticket = RevealTicket(self.tickets_issued);
        self.pending = Some(PendingReveal { ticket, gained });
        ticket
    }

    fn advance_round(&mut self, gained: u32) {
        self.state.round = self.state.round.saturating_add(1);
        self.state.score = self.state.score.saturating_add(gained);
        self.state.spot = pick_next(&self.catalog, Some(self.state.spot), &mut self.rng);
        self.begin_round();
    }

    fn begin_round(&mut self) {
        self.state.phase = Phase::Guessing;
        self.refresh_options();
        self.timer.rearm(self.settings.time_limit);
        if !self.settings.timer_enabled {
            self.timer.pause();
        }
    }

    fn rearm_if_guessing(&mut self) {
        if !self.state.is_guessing() {
            return;
        }
        if self.settings.timer_enabled {
            self.timer.rearm(self.settings.time_limit);
        } else {
            self.timer.pause();
        }
    }

    fn refresh_options(&mut self) {
        self.state.options = if self.settings.mode.is_multiple_choice() {
            multiple_choice_options(&self.catalog, self.state.spot, &mut self.rng)
        } else {
            ChoiceOptions::new()
        };
    }
}
