use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ValueEnum;
use rogeo_game::{
    GameLoop, GameSession, GameSnapshot, GameSummary, Phase, Settings, SpotCatalog, Timing,
    Transition, spawn_session,
};
use serde::{Deserialize, Serialize};

use crate::logic::policy::{GameplayStrategy, PlayerAction, PlayerPolicy};

/// How a simulated game is clocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// Virtual time; a whole game runs instantly.
    Clock,
    /// Real tokio actor with compressed timing.
    Actor,
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clock => f.write_str("clock"),
            Self::Actor => f.write_str("actor"),
        }
    }
}

/// Real-time divisor used by the actor driver.
pub const ACTOR_TIME_COMPRESSION: u32 = 100;
const STEP_BUDGET_PER_ROUND: usize = 200;

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// # Errors
    ///
    /// Returns the expectation's failure.
    pub fn check(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// What to play and what to expect from it.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub settings: Settings,
    pub strategy: GameplayStrategy,
    /// Stop once this many rounds have been played.
    pub max_rounds: u32,
    /// Restart this many times after reaching game over.
    pub restarts: u32,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(settings: Settings, strategy: GameplayStrategy) -> Self {
        Self {
            settings,
            strategy,
            max_rounds: 30,
            restarts: 0,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    #[must_use]
    pub const fn with_restarts(mut self, restarts: u32) -> Self {
        self.restarts = restarts;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Everything observed while playing one seed.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub driver: Driver,
    pub strategy: GameplayStrategy,
    pub transitions: Vec<Transition>,
    /// Longest streak seen within each run, one entry per run.
    pub run_streaks: Vec<u32>,
    pub restarts: u32,
    pub final_snapshot: GameSnapshot,
    pub result: GameSummary,
    pub violations: Vec<String>,
}

impl SimulationSummary {
    /// Points credited by each correct answer, in order.
    #[must_use]
    pub fn gains(&self) -> Vec<u32> {
        self.transitions
            .iter()
            .filter_map(|t| match t {
                Transition::Correct { gained, .. } => Some(*gained),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn count(&self, predicate: impl Fn(&Transition) -> bool) -> usize {
        self.transitions.iter().filter(|t| predicate(t)).count()
    }
}

/// Checks the session invariants against every observed snapshot.
#[derive(Debug, Default)]
pub struct InvariantChecker {
    last_score: u32,
    last_round: u32,
    last_spot: Option<String>,
    run_best: u32,
    run_streaks: Vec<u32>,
    violations: Vec<String>,
}

impl InvariantChecker {
    pub fn observe(&mut self, view: &GameSnapshot) {
        let mut fail = |msg: String| {
            self.violations
                .push(format!("round {} ({}): {msg}", view.round, view.phase));
        };

        if view.lives > view.max_lives {
            fail(format!("lives {} exceed max {}", view.lives, view.max_lives));
        }
        if (view.phase == Phase::GameOver) != (view.lives == 0) {
            fail(format!("phase {} with {} lives", view.phase, view.lives));
        }
        if view.score < self.last_score {
            fail(format!("score fell from {} to {}", self.last_score, view.score));
        }
        if view.time_left > view.time_limit {
            fail(format!(
                "time left {} above limit {}",
                view.time_left, view.time_limit
            ));
        }
        if view.phase == Phase::Guessing && view.answer_label.is_some() {
            fail("answer visible while guessing".to_string());
        }
        if view.mode.is_multiple_choice()
            && view.phase == Phase::Guessing
            && view.options.is_empty()
        {
            fail("multiple choice round without options".to_string());
        }
        if view.round == self.last_round + 1
            && self.last_spot.as_deref() == Some(view.spot_id.as_str())
        {
            fail(format!("spot {} repeated across rounds", view.spot_id));
        }

        self.last_score = view.score;
        self.last_round = view.round;
        self.last_spot = Some(view.spot_id.clone());
        self.run_best = self.run_best.max(view.streak);
    }

    /// Verify a fresh run and reset the monotonic baselines.
    pub fn observe_restart(&mut self, view: &GameSnapshot) {
        if view.score != 0 || view.round != 1 || view.lives != view.max_lives {
            self.violations.push(format!(
                "restart left score {} round {} lives {}/{}",
                view.score, view.round, view.lives, view.max_lives
            ));
        }
        self.run_streaks.push(self.run_best);
        self.run_best = 0;
        self.last_score = 0;
        self.last_round = view.round;
        self.last_spot = Some(view.spot_id.clone());
    }

    pub fn violation(&mut self, msg: impl Into<String>) {
        self.violations.push(msg.into());
    }

    fn finish(mut self) -> (Vec<u32>, Vec<String>) {
        self.run_streaks.push(self.run_best);
        (self.run_streaks, self.violations)
    }
}

fn answer_for(catalog: &SpotCatalog, view: &GameSnapshot) -> String {
    catalog
        .by_id(&view.spot_id)
        .map(|spot| spot.name.clone())
        .unwrap_or_default()
}

/// Play `plan` on the virtual clock.
#[must_use]
pub fn run_clock(plan: &SimulationPlan, catalog: Arc<SpotCatalog>, seed: u64) -> SimulationSummary {
    let mut policy = plan.strategy.create_policy(seed);
    let mut game = GameLoop::new(
        GameSession::new(catalog.clone(), plan.settings, seed),
        Timing::default(),
    );
    let mut checker = InvariantChecker::default();
    let mut transitions = Vec::new();
    let mut restarts = 0;
    let budget = plan.max_rounds as usize * STEP_BUDGET_PER_ROUND;

    for _ in 0..budget {
        let view = game.snapshot();
        checker.observe(&view);
        match view.phase {
            Phase::GameOver if restarts < plan.restarts => {
                restarts += 1;
                transitions.push(game.restart());
                checker.observe_restart(&game.snapshot());
                continue;
            }
            Phase::GameOver => break,
            Phase::RevealingAnswer => {
                transitions.extend(game.step());
                continue;
            }
            Phase::Guessing => {}
        }
        if view.round > plan.max_rounds {
            break;
        }

        let decision = policy.decide(&view, &answer_for(&catalog, &view));
        log::trace!("{} -> {:?} ({})", policy.name(), decision.action, decision.rationale);
        transitions.extend(game.advance(decision.think_time));
        let now = game.snapshot();
        if now.round != view.round || now.phase != Phase::Guessing {
            continue;
        }
        let transition = match decision.action {
            PlayerAction::Guess(text) => game.submit_guess(&text),
            PlayerAction::Choose(label) => game.select_option(&label),
            PlayerAction::Skip => game.skip(),
            PlayerAction::Wait => match game.step() {
                Some(transition) => transition,
                None => {
                    checker.violation("waiting with nothing scheduled");
                    break;
                }
            },
        };
        transitions.push(transition);
    }

    let final_snapshot = game.snapshot();
    checker.observe(&final_snapshot);
    let (run_streaks, violations) = checker.finish();
    SimulationSummary {
        seed,
        driver: Driver::Clock,
        strategy: plan.strategy,
        transitions,
        run_streaks,
        restarts,
        result: game.summary(),
        final_snapshot,
        violations,
    }
}

/// Play `plan` against a session actor in compressed real time.
///
/// # Errors
///
/// Returns an error if the actor shuts down unexpectedly.
pub async fn run_actor(
    plan: &SimulationPlan,
    catalog: Arc<SpotCatalog>,
    seed: u64,
) -> Result<SimulationSummary> {
    let timing = Timing::compressed(ACTOR_TIME_COMPRESSION);
    let mut policy = plan.strategy.create_policy(seed);
    let handle = spawn_session(GameLoop::new(
        GameSession::new(catalog.clone(), plan.settings, seed),
        timing,
    ));
    let mut checker = InvariantChecker::default();
    let mut transitions = Vec::new();
    let mut restarts = 0;
    let budget = plan.max_rounds as usize * STEP_BUDGET_PER_ROUND;
    let mut exhausted = true;

    for _ in 0..budget {
        transitions.extend(handle.take_events().await?);
        let view = handle.snapshot().await?;
        checker.observe(&view);
        match view.phase {
            Phase::GameOver if restarts < plan.restarts => {
                restarts += 1;
                transitions.push(handle.restart().await?);
                checker.observe_restart(&handle.snapshot().await?);
                continue;
            }
            Phase::GameOver => {
                exhausted = false;
                break;
            }
            Phase::RevealingAnswer => {
                tokio::time::sleep(timing.reveal_delay).await;
                continue;
            }
            Phase::Guessing => {}
        }
        if view.round > plan.max_rounds {
            exhausted = false;
            break;
        }

        let decision = policy.decide(&view, &answer_for(&catalog, &view));
        tokio::time::sleep(decision.think_time / ACTOR_TIME_COMPRESSION).await;
        let transition = match decision.action {
            PlayerAction::Guess(text) => handle.submit_guess(text).await?,
            PlayerAction::Choose(label) => handle.select_option(label).await?,
            PlayerAction::Skip => handle.skip().await?,
            PlayerAction::Wait => {
                tokio::time::sleep(timing.tick_interval).await;
                continue;
            }
        };
        transitions.push(transition);
    }
    if exhausted {
        checker.violation("step budget exhausted");
    }

    transitions.extend(handle.take_events().await?);
    let final_snapshot = handle.snapshot().await?;
    checker.observe(&final_snapshot);
    let result = handle
        .shutdown()
        .await
        .context("session actor stopped before shutdown")?;
    let (run_streaks, violations) = checker.finish();
    Ok(SimulationSummary {
        seed,
        driver: Driver::Actor,
        strategy: plan.strategy,
        transitions,
        run_streaks,
        restarts,
        final_snapshot,
        result,
        violations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rogeo_game::{EmbeddedCatalog, GameEngine, MissReason};

    fn catalog() -> Arc<SpotCatalog> {
        GameEngine::new(EmbeddedCatalog).load_catalog().unwrap()
    }

    #[test]
    fn perfect_clock_run_reaches_round_limit() {
        let plan = SimulationPlan::new(Settings::default(), GameplayStrategy::Perfect)
            .with_max_rounds(10);
        let summary = run_clock(&plan, catalog(), 5);
        assert!(summary.violations.is_empty(), "{:?}", summary.violations);
        assert_eq!(summary.gains().len(), 10);
        assert_eq!(summary.final_snapshot.round, 11);
        assert_eq!(summary.result.lives_left, 5);
    }

    #[test]
    fn idle_clock_run_times_out_every_life() {
        let settings = Settings::default().with_timer(true, 5).with_max_lives(3);
        let plan = SimulationPlan::new(settings, GameplayStrategy::Idle);
        let summary = run_clock(&plan, catalog(), 8);
        assert!(summary.violations.is_empty(), "{:?}", summary.violations);
        assert_eq!(summary.result.stats.timeouts, 3);
        assert_eq!(summary.result.ending, Some(MissReason::Timeout));
    }

    #[test]
    fn restarts_are_counted_and_checked() {
        let plan = SimulationPlan::new(Settings::default().with_max_lives(2), GameplayStrategy::Skipper)
            .with_restarts(2);
        let summary = run_clock(&plan, catalog(), 1);
        assert!(summary.violations.is_empty(), "{:?}", summary.violations);
        assert_eq!(summary.restarts, 2);
        assert_eq!(summary.run_streaks.len(), 3);
        assert_eq!(summary.count(|t| *t == Transition::Restarted), 2);
    }

    #[test]
    fn checker_flags_broken_snapshots() {
        let session = GameEngine::new(EmbeddedCatalog)
            .create_session(1, Settings::default())
            .unwrap();
        let mut view = session.snapshot();
        let mut checker = InvariantChecker::default();
        checker.observe(&view);
        view.lives = 0;
        checker.observe(&view);
        let (_, violations) = checker.finish();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("0 lives"));
    }

    #[test]
    fn actor_run_plays_to_game_over() {
        let plan = SimulationPlan::new(Settings::default().with_max_lives(2), GameplayStrategy::Hopeless);
        let summary = tokio_test::block_on(run_actor(&plan, catalog(), 4)).unwrap();
        assert!(summary.violations.is_empty(), "{:?}", summary.violations);
        assert_eq!(summary.driver, Driver::Actor);
        assert!(summary.result.game_over);
        assert_eq!(summary.result.stats.wrong, 2);
    }
}
