use anyhow::{Result, ensure};
use rogeo_game::{GameMode, IgnoreReason, MissReason, Settings, Transition};

use crate::logic::{Driver, GameplayStrategy, SimulationPlan, SimulationSummary};

// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

fn no_invalid_choices(summary: &SimulationSummary) -> Result<()> {
    let bad = summary.count(|t| {
        matches!(
            t,
            Transition::Ignored {
                reason: IgnoreReason::UnknownOption | IgnoreReason::WrongMode
            }
        )
    });
    ensure!(bad == 0, "{bad} choice(s) were rejected by the session");
    Ok(())
}

fn every_gain_earns_base_points(summary: &SimulationSummary) -> Result<()> {
    if let Some(low) = summary.gains().into_iter().find(|g| *g < 100) {
        anyhow::bail!("correct answer credited only {low} points");
    }
    ensure!(
        summary.result.stats.correct as usize == summary.gains().len(),
        "stats report {} correct answers but {} were credited",
        summary.result.stats.correct,
        summary.gains().len()
    );
    Ok(())
}

fn smoke_scenario() -> TestScenario {
    TestScenario::new(
        "Smoke Test",
        SimulationPlan::new(Settings::default(), GameplayStrategy::Perfect)
            .with_max_rounds(5)
            .with_expectation(|summary: &SimulationSummary| {
                ensure!(summary.gains().len() == 5, "expected five correct rounds");
                ensure!(!summary.result.game_over, "perfect play should not lose");
                ensure!(
                    summary.result.lives_left == summary.result.max_lives,
                    "perfect play should keep every life"
                );
                Ok(())
            }),
    )
}

/// Zoom 1 and a 20s limit: an instant answer is worth 150 plus 10 per streak step.
fn perfect_run_scenario() -> TestScenario {
    let settings = Settings::default().with_zoom(1).with_timer(true, 20);
    TestScenario::new(
        "Perfect Run",
        SimulationPlan::new(settings, GameplayStrategy::Perfect)
            .with_max_rounds(10)
            .with_expectation(|summary: &SimulationSummary| {
                let gains = summary.gains();
                ensure!(gains.len() == 10, "expected ten gains, got {}", gains.len());
                for (streak, gained) in (0_u32..).zip(gains) {
                    let top = 150 + streak * 10;
                    match summary.driver {
                        Driver::Clock => {
                            ensure!(gained == top, "round {}: gained {gained}, expected {top}", streak + 1);
                        }
                        // Real time passes between rounds, so a tick may land first.
                        Driver::Actor => {
                            ensure!(
                                (top - 50..=top).contains(&gained),
                                "round {}: gained {gained}, expected at most {top}",
                                streak + 1
                            );
                        }
                    }
                }
                ensure!(summary.result.best_streak == 10, "streak should reach 10");
                Ok(())
            }),
    )
}

fn wrong_answers_scenario() -> TestScenario {
    TestScenario::new(
        "Wrong Answers",
        SimulationPlan::new(Settings::default().with_max_lives(3), GameplayStrategy::Hopeless)
            .with_expectation(|summary: &SimulationSummary| {
                let result = &summary.result;
                ensure!(result.game_over, "three misses should end the game");
                ensure!(result.stats.wrong == 3, "expected 3 wrong, got {}", result.stats.wrong);
                ensure!(result.score == 0, "hopeless play scored {}", result.score);
                ensure!(result.rounds == 3, "game should end on round 3");
                ensure!(result.ending == Some(MissReason::WrongAnswer), "wrong ending");
                Ok(())
            }),
    )
}

fn timeouts_scenario() -> TestScenario {
    TestScenario::new(
        "Timeouts",
        SimulationPlan::new(Settings::default().with_timer(true, 5), GameplayStrategy::Idle)
            .with_expectation(|summary: &SimulationSummary| {
                let result = &summary.result;
                ensure!(result.game_over, "running out the clock should end the game");
                ensure!(
                    result.stats.timeouts == u32::from(result.max_lives),
                    "expected {} timeouts, got {}",
                    result.max_lives,
                    result.stats.timeouts
                );
                ensure!(result.ending == Some(MissReason::Timeout), "wrong ending");
                let ticks = summary.count(|t| matches!(t, Transition::Ticked { .. }));
                ensure!(ticks > 0, "no countdown ticks were observed");
                Ok(())
            }),
    )
}

fn skip_drain_scenario() -> TestScenario {
    TestScenario::new(
        "Skip Drain",
        SimulationPlan::new(Settings::default().with_max_lives(1), GameplayStrategy::Skipper)
            .with_expectation(|summary: &SimulationSummary| {
                let result = &summary.result;
                ensure!(result.game_over, "skipping the last life should end the game");
                ensure!(result.rounds == 1, "game should end on round 1");
                ensure!(result.stats.skips == 1, "expected one skip");
                ensure!(result.ending == Some(MissReason::Skipped), "wrong ending");
                let reveals = summary.count(|t| t.reveal_ticket().is_some());
                ensure!(reveals == 0, "skipping should never reveal the answer");
                Ok(())
            }),
    )
}

fn multiple_choice_scenario() -> TestScenario {
    let settings = Settings::default().with_mode(GameMode::MultipleChoice);
    TestScenario::new(
        "Multiple Choice",
        SimulationPlan::new(settings, GameplayStrategy::Sloppy)
            .with_expectation(no_invalid_choices)
            .with_expectation(every_gain_earns_base_points),
    )
}

fn sloppy_scenario() -> TestScenario {
    TestScenario::new(
        "Sloppy Player",
        SimulationPlan::new(Settings::default(), GameplayStrategy::Sloppy)
            .with_expectation(every_gain_earns_base_points),
    )
}

fn restart_cycle_scenario() -> TestScenario {
    TestScenario::new(
        "Restart Cycle",
        SimulationPlan::new(Settings::default().with_max_lives(2), GameplayStrategy::Sloppy)
            .with_max_rounds(200)
            .with_restarts(2)
            .with_expectation(|summary: &SimulationSummary| {
                ensure!(summary.restarts == 2, "expected 2 restarts, got {}", summary.restarts);
                ensure!(summary.run_streaks.len() == 3, "expected three runs");
                let best = summary.run_streaks.iter().copied().max().unwrap_or(0);
                ensure!(
                    summary.result.best_streak == best,
                    "best streak {} should carry across restarts (runs: {:?})",
                    summary.result.best_streak,
                    summary.run_streaks
                );
                Ok(())
            }),
    )
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    match name.to_lowercase().as_str() {
        "smoke" => Some(smoke_scenario()),
        "perfect-run" | "perfect" => Some(perfect_run_scenario()),
        "wrong-answers" | "wrong" => Some(wrong_answers_scenario()),
        "timeouts" | "timeout" => Some(timeouts_scenario()),
        "skip-drain" | "skip" => Some(skip_drain_scenario()),
        "multiple-choice" | "mc" => Some(multiple_choice_scenario()),
        "sloppy" => Some(sloppy_scenario()),
        "restart-cycle" | "restart" => Some(restart_cycle_scenario()),
        _ => None,
    }
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Smoke Test"),
        ("perfect-run", "Perfect Run - exact scoring"),
        ("wrong-answers", "Wrong Answers - lives drain to game over"),
        ("timeouts", "Timeouts - countdown expiry costs lives"),
        ("skip-drain", "Skip Drain - skip on the last life"),
        ("multiple-choice", "Multiple Choice - sloppy bot picks options"),
        ("sloppy", "Sloppy Player - mixed free-text answers"),
        ("restart-cycle", "Restart Cycle - best streak survives restarts"),
    ]
}
