use anyhow::{Result, ensure};
use losttheplot_game::GameConfig;
use losttheplot_game::constants::ROW_LABELS;

use crate::logic::{GameplayStrategy, SimulationPlan, SimulationSummary};

const MAX_PLOT_ROWS: usize = ROW_LABELS.len();

/// A named plan the tester runs against every seed.
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

fn clean_run(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.metrics.gate_breaches == 0,
        "dug {} time(s) before talking to anyone",
        summary.metrics.gate_breaches
    );
    ensure!(
        summary.metrics.stuck_shakes == 0,
        "camera still shaking after {} dig(s)",
        summary.metrics.stuck_shakes
    );
    ensure!(
        summary.metrics.reclosed == 0,
        "{} grave(s) closed again",
        summary.metrics.reclosed
    );
    Ok(())
}

fn everyone_answered(summary: &SimulationSummary) -> Result<()> {
    let levels = usize::try_from(summary.levels_completed).unwrap_or(usize::MAX);
    let expected = summary.roster_size.saturating_mul(levels);
    let guesses = usize::try_from(summary.guesses()).unwrap_or(usize::MAX);
    ensure!(
        guesses == expected,
        "expected {expected} verdicts, got {guesses}"
    );
    Ok(())
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    clean_run(summary)?;
    ensure!(summary.levels_completed == 1, "first level not cleared");
    ensure!(
        summary.metrics.talk_first_blocks == 1,
        "digging before talking was not refused"
    );
    ensure!(summary.metrics.incorrect == 0, "oracle answered wrongly");
    everyone_answered(summary)
}

fn progression_expectation(summary: &SimulationSummary) -> Result<()> {
    clean_run(summary)?;
    everyone_answered(summary)?;
    ensure!(
        summary.final_level == summary.levels_completed + 1,
        "ended on level {} after clearing {}",
        summary.final_level,
        summary.levels_completed
    );
    let per_level = &summary.metrics.graves_per_level;
    let first = per_level.first().copied().unwrap_or_default();
    for (idx, &count) in per_level.iter().enumerate() {
        // One more row of graves per level until the row letters run out.
        let expected = first * (idx + 1).min(MAX_PLOT_ROWS);
        ensure!(
            count == expected,
            "level {} has {count} graves, expected {expected}",
            idx + 1
        );
    }
    Ok(())
}

fn deduction_expectation(summary: &SimulationSummary) -> Result<()> {
    clean_run(summary)?;
    everyone_answered(summary)?;
    ensure!(
        summary.metrics.unsound_deductions == 0,
        "{} visitor(s) described a grave that matched nothing",
        summary.metrics.unsound_deductions
    );
    ensure!(
        summary.metrics.forced_misses == 0,
        "{} unambiguous deduction(s) were judged wrong",
        summary.metrics.forced_misses
    );
    let total: usize = summary.metrics.graves_per_level.iter().sum();
    let opened = usize::try_from(summary.metrics.graves_opened).unwrap_or(usize::MAX);
    ensure!(opened == total, "opened {opened} of {total} graves");
    Ok(())
}

fn mistakes_expectation(summary: &SimulationSummary) -> Result<()> {
    clean_run(summary)?;
    everyone_answered(summary)?;
    ensure!(
        summary.levels_completed == 2,
        "wrong answers stalled the game on level {}",
        summary.final_level
    );
    Ok(())
}

fn dig_loop_expectation(summary: &SimulationSummary) -> Result<()> {
    clean_run(summary)?;
    ensure!(
        summary.metrics.max_dig_count >= 14,
        "only reached {} digs on one grave",
        summary.metrics.max_dig_count
    );
    Ok(())
}

fn deterministic_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.replay_digest == Some(summary.digest),
        "replay digest {:?} differs from {:#018x}",
        summary.replay_digest,
        summary.digest
    );
    Ok(())
}

fn long_haul_expectation(summary: &SimulationSummary) -> Result<()> {
    progression_expectation(summary)?;
    ensure!(
        summary.metrics.max_plot_rows == MAX_PLOT_ROWS,
        "plot rows peaked at {}",
        summary.metrics.max_plot_rows
    );
    Ok(())
}

fn fast_single_visitor(config: &mut GameConfig) {
    config.roster_size = 1;
    config.transition_delay_ms = 0;
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let scenario = match name.to_lowercase().as_str() {
        "smoke" => TestScenario::new(
            "Smoke Test",
            SimulationPlan::new(GameplayStrategy::Oracle).with_expectation(smoke_expectation),
        ),
        "progression" | "levels" => TestScenario::new(
            "Level Progression",
            SimulationPlan::new(GameplayStrategy::Oracle)
                .with_levels(4)
                .with_expectation(progression_expectation),
        ),
        "deduction" | "deductive" => TestScenario::new(
            "Deduction From Opened Graves",
            SimulationPlan::new(GameplayStrategy::Deductive)
                .with_levels(2)
                .with_expectation(deduction_expectation),
        ),
        "mistakes" | "careless" => TestScenario::new(
            "Careless Guessing",
            SimulationPlan::new(GameplayStrategy::Careless)
                .with_levels(2)
                .with_expectation(mistakes_expectation),
        ),
        "dig-loop" | "overdig" => TestScenario::new(
            "Digging Past The Bottom",
            SimulationPlan::new(GameplayStrategy::Oracle)
                .with_extra_digs(4)
                .with_expectation(dig_loop_expectation),
        ),
        "deterministic" | "replay" => TestScenario::new(
            "Deterministic Replay",
            SimulationPlan::new(GameplayStrategy::Careless)
                .with_levels(2)
                .with_replay()
                .with_expectation(deterministic_expectation),
        ),
        "long-haul" => TestScenario::new(
            "Long Haul",
            SimulationPlan::new(GameplayStrategy::Oracle)
                .with_levels(10)
                .with_setup(fast_single_visitor)
                .with_expectation(long_haul_expectation),
        ),
        _ => return None,
    };
    Some(scenario)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Smoke Test"),
        ("progression", "Level Progression"),
        ("deduction", "Deduction From Opened Graves"),
        ("mistakes", "Careless Guessing"),
        ("dig-loop", "Digging Past The Bottom"),
        ("deterministic", "Deterministic Replay"),
        ("long-haul", "Long Haul"),
    ]
}
