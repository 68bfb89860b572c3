use anyhow::Result;
use colored::Colorize;
use rogeo_game::SpotCatalog;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::logic::simulation::{Driver, SimulationPlan, SimulationSummary, run_actor, run_clock};
use crate::scenario::TestScenario;
use crate::util::{artifacts_dir, write_failure_artifacts};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub driver: Driver,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    pub mean_score: f64,
    pub mean_rounds: f64,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester {
    catalog: Arc<SpotCatalog>,
    driver: Driver,
    verbose: bool,
    artifacts: Option<PathBuf>,
}

impl LogicTester {
    pub const fn new(catalog: Arc<SpotCatalog>, driver: Driver, verbose: bool) -> Self {
        Self {
            catalog,
            driver,
            verbose,
            artifacts: None,
        }
    }

    #[must_use]
    pub fn with_artifacts(mut self, dir: Option<PathBuf>) -> Self {
        self.artifacts = dir;
        self
    }

    pub async fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (strategy: {} driver: {} seed: {})",
                    scenario.name.bright_white(),
                    scenario.plan.strategy,
                    self.driver,
                    seed
                );
            }

            results.push(self.run_single_scenario(scenario, seed, iterations).await);
        }

        results
    }

    async fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();
        let mut total_score = 0_u64;
        let mut total_rounds = 0_u64;

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let summary = match self.simulate(&scenario.plan, iteration_seed).await {
                Ok(summary) => summary,
                Err(err) => {
                    failures.push(format!("Iteration {} (seed {iteration_seed}): {err:#}", i + 1));
                    continue;
                }
            };
            total_score += u64::from(summary.result.score);
            total_rounds += u64::from(summary.result.rounds);

            if let Err(err) = evaluate_expectations(&scenario.plan, &summary) {
                failures.push(format!(
                    "Iteration {} (strategy {}, seed {}, rounds {}, score {}, lives {}/{}): {err}",
                    i + 1,
                    summary.strategy,
                    summary.seed,
                    summary.result.rounds,
                    summary.result.score,
                    summary.result.lives_left,
                    summary.result.max_lives,
                ));
                self.dump_artifacts(&scenario.name, &summary, &err);

                if self.verbose {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        err.to_string().red()
                    );
                }
            } else {
                successes += 1;
                let duration = start_time.elapsed();
                performance_data.push(duration);

                if self.verbose {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) {}",
                        i + 1,
                        iterations,
                        summary.result
                    );
                }
            }
        }

        let avg_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };
        let runs = iterations.max(1) as f64;

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            driver: self.driver,
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            mean_score: total_score as f64 / runs,
            mean_rounds: total_rounds as f64 / runs,
            average_duration: avg_duration,
            performance_data,
        }
    }

    async fn simulate(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        match self.driver {
            Driver::Clock => Ok(run_clock(plan, self.catalog.clone(), seed)),
            Driver::Actor => run_actor(plan, self.catalog.clone(), seed).await,
        }
    }

    fn dump_artifacts(&self, scenario: &str, summary: &SimulationSummary, err: &anyhow::Error) {
        let Some(base) = &self.artifacts else {
            return;
        };
        let dir = artifacts_dir(base, scenario, summary.seed);
        let snapshot = serde_json::to_value(&summary.final_snapshot).unwrap_or_default();
        let transitions = serde_json::to_value(&summary.transitions).unwrap_or_default();
        if let Err(write_err) =
            write_failure_artifacts(&dir, &snapshot, &transitions, &format!("{err:#}"))
        {
            log::warn!("could not write artifacts to {}: {write_err:#}", dir.display());
        }
    }
}

/// Invariant violations fail a run before any scenario-specific check.
fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Result<()> {
    if let Some(first) = summary.violations.first() {
        anyhow::bail!(
            "{} invariant violation(s), first: {first}",
            summary.violations.len()
        );
    }
    for expectation in &plan.expectations {
        expectation.check(summary)?;
    }
    Ok(())
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::get_scenario;
    use rogeo_game::{EmbeddedCatalog, GameEngine};

    fn tester(driver: Driver) -> LogicTester {
        let catalog = GameEngine::new(EmbeddedCatalog).load_catalog().unwrap();
        LogicTester::new(catalog, driver, false)
    }

    #[test]
    fn smoke_scenario_passes_on_clock() {
        let scenario = get_scenario("smoke").unwrap();
        let results = tokio_test::block_on(tester(Driver::Clock).run_scenario(&scenario, &[1, 2], 3));
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed), "{results:?}");
        assert!(results.iter().all(|r| r.successful_iterations == 3));
        assert!(results[0].mean_score > 0.0);
    }

    #[test]
    fn failing_expectation_is_reported() {
        let scenario = TestScenario::new(
            "Always Fails",
            SimulationPlan::new(rogeo_game::Settings::default(), crate::logic::GameplayStrategy::Skipper)
                .with_expectation(|_: &SimulationSummary| -> Result<()> { anyhow::bail!("nope") }),
        );
        let results = tokio_test::block_on(tester(Driver::Clock).run_scenario(&scenario, &[9], 2));
        assert!(!results[0].passed);
        assert_eq!(results[0].failures.len(), 2);
        assert!(results[0].failures[0].contains("nope"));
    }

    #[test]
    fn scenario_result_serializes_durations_as_millis() {
        let result = ScenarioResult {
            scenario_name: "Smoke".to_string(),
            driver: Driver::Clock,
            seed: 1,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            mean_score: 150.0,
            mean_rounds: 2.0,
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12)],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 12);
        assert_eq!(json["driver"], "clock");
        let back: ScenarioResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.performance_data, vec![Duration::from_millis(12)]);
    }
}
