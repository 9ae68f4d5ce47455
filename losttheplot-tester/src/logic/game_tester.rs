use anyhow::{Context, Result, bail, ensure};
use losttheplot_game::dialogue::label_rect;
use losttheplot_game::{FrameInput, GameConfig, GameEvent, GameState, Outcome, Point};
use serde::Serialize;
use std::hash::Hasher;
use std::sync::Arc;
use std::time::Duration;
use twox_hash::XxHash64;

use crate::logic::policy::{GameplayStrategy, Guess, PlotPolicy};

pub const FRAME: Duration = Duration::from_millis(16);

/// Screen point every world click is panned to.
const CLICK_ANCHOR: Point = Point::new(160, 80);

/// Declarative plan for an automated play-through.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: GameplayStrategy,
    pub levels: u32,
    pub extra_digs: u32,
    pub replay: bool,
    pub setup: Option<fn(&mut GameConfig)>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(strategy: GameplayStrategy) -> Self {
        Self {
            strategy,
            levels: 1,
            extra_digs: 0,
            replay: false,
            setup: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_levels(mut self, levels: u32) -> Self {
        self.levels = levels;
        self
    }

    /// Keep digging the first grave this many times after it opens.
    #[must_use]
    pub const fn with_extra_digs(mut self, extra_digs: u32) -> Self {
        self.extra_digs = extra_digs;
        self
    }

    /// Play the same seed twice and record both digests.
    #[must_use]
    pub const fn with_replay(mut self) -> Self {
        self.replay = true;
        self
    }

    #[must_use]
    pub fn with_setup(mut self, setup: fn(&mut GameConfig)) -> Self {
        self.setup = Some(setup);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a play-through completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Counters gathered while playing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlayMetrics {
    pub frames: u64,
    pub clicks: u64,
    pub digs: u32,
    pub graves_opened: u32,
    pub talks: u32,
    pub correct: u32,
    pub incorrect: u32,
    /// Digs refused because nobody had been talked to yet.
    pub talk_first_blocks: u32,
    /// Digs that went through before anybody was talked to.
    pub gate_breaches: u32,
    /// Guesses made without the real grave among the candidates.
    pub unsound_deductions: u32,
    /// Wrong answers given when only one grave fitted the hints.
    pub forced_misses: u32,
    pub ambiguous_guesses: u32,
    /// Graves that closed again after being opened.
    pub reclosed: u32,
    /// Digs after which the camera was still offset once the shake should have settled.
    pub stuck_shakes: u32,
    pub max_dig_count: u32,
    pub max_plot_rows: usize,
    pub graves_per_level: Vec<usize>,
}

/// Everything an expectation can inspect after a run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub levels_completed: u32,
    pub final_level: u32,
    pub roster_size: usize,
    pub metrics: PlayMetrics,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    pub digest: u64,
    pub replay_digest: Option<u64>,
    /// Set when the run stopped early.
    pub error: Option<String>,
}

impl SimulationSummary {
    #[must_use]
    pub const fn guesses(&self) -> u32 {
        self.metrics.correct + self.metrics.incorrect
    }
}

/// Runs plans against fresh games built from one base config.
#[derive(Debug, Clone)]
pub struct GameTester {
    config: GameConfig,
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub const fn new(config: GameConfig, verbose: bool) -> Self {
        Self { config, verbose }
    }

    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        let mut config = self.config.clone();
        if let Some(setup) = plan.setup {
            setup(&mut config);
        }

        let mut summary = self.play(plan, config.clone(), seed);
        if plan.replay && summary.error.is_none() {
            let replay = self.play(plan, config, seed);
            summary.replay_digest = Some(replay.digest);
        }
        summary
    }

    fn play(&self, plan: &SimulationPlan, config: GameConfig, seed: u64) -> SimulationSummary {
        let roster_size = config.roster_size;
        let mut summary = SimulationSummary {
            seed,
            strategy: plan.strategy,
            levels_completed: 0,
            final_level: 0,
            roster_size,
            metrics: PlayMetrics::default(),
            events: Vec::new(),
            digest: 0,
            replay_digest: None,
            error: None,
        };

        let mut session = match PlaySession::new(config, seed) {
            Ok(session) => session,
            Err(err) => {
                summary.error = Some(format!("{err:#}"));
                return summary;
            }
        };
        if self.verbose {
            println!(
                "🎮 Starting play-through | seed:{seed} strategy:{} levels:{}",
                plan.strategy.label(),
                plan.levels
            );
        }

        let mut policy = plan.strategy.create_policy(seed);
        for _ in 0..plan.levels {
            let level = session.game.level();
            let result = session
                .play_level(plan, policy.as_mut())
                .and_then(|()| session.wait_for_next_level(level));
            if let Err(err) = result {
                summary.error = Some(format!("level {level}: {err:#}"));
                break;
            }
            summary.levels_completed += 1;
            if self.verbose {
                log_level(level, &session.metrics, policy.name());
            }
        }

        summary.final_level = session.game.level();
        summary.digest = session.digest();
        summary.metrics = session.metrics;
        summary.events = session.events;
        summary
    }
}

fn log_level(level: u32, metrics: &PlayMetrics, policy: &str) {
    println!(
        "  🪦 Level {level} done [{policy}] | correct:{} incorrect:{} digs:{} opened:{}",
        metrics.correct, metrics.incorrect, metrics.digs, metrics.graves_opened
    );
}

/// Events recorded from index `before` on.
fn events_since(events: &[GameEvent], before: usize) -> &[GameEvent] {
    events.get(before..).unwrap_or(&[])
}

/// One game driven frame by frame through screen clicks.
struct PlaySession {
    game: GameState,
    now: Duration,
    events: Vec<GameEvent>,
    metrics: PlayMetrics,
}

impl PlaySession {
    fn new(config: GameConfig, seed: u64) -> Result<Self> {
        let game = GameState::new(config, seed).context("game config rejected")?;
        Ok(Self {
            game,
            now: Duration::ZERO,
            events: Vec::new(),
            metrics: PlayMetrics::default(),
        })
    }

    fn frame(&mut self, input: FrameInput) -> usize {
        let before = self.events.len();
        let outcome = self.game.update(input);
        self.events.extend(outcome.events);
        self.now += FRAME;
        self.metrics.frames += 1;
        if input.pressed {
            self.metrics.clicks += 1;
        }
        before
    }

    fn idle(&mut self, frames: u32) {
        for _ in 0..frames {
            self.frame(FrameInput::idle(self.now));
        }
    }

    /// Pan the camera so `world` sits under the anchor, then click it.
    fn click_world(&mut self, world: Point) -> usize {
        let camera = self.game.camera_mut();
        camera.set_position(
            f64::from(world.x - CLICK_ANCHOR.x),
            f64::from(world.y - CLICK_ANCHOR.y),
        );
        let screen = self.game.camera().to_screen(world);
        self.frame(FrameInput::click(self.now, screen))
    }

    fn click_screen(&mut self, screen: Point) -> usize {
        self.frame(FrameInput::click(self.now, screen))
    }

    fn shake_frames(&self) -> u32 {
        let config = self.game.config();
        let span = config.shake_interval() * (config.shake_steps + 1);
        let frames = span.as_millis() / FRAME.as_millis() + 2;
        u32::try_from(frames).unwrap_or(u32::MAX)
    }

    fn talk(&mut self, visitor: usize) -> Result<()> {
        let hitbox = self
            .game
            .roster()
            .get(visitor)
            .and_then(|v| v.hitbox)
            .with_context(|| format!("visitor {visitor} has no hitbox"))?;
        let before = self.click_world(hitbox.center());
        let talked = events_since(&self.events, before)
            .iter()
            .any(|e| matches!(e, GameEvent::TalkedTo { visitor: v } if *v == visitor));
        ensure!(talked, "clicking visitor {visitor} did not start a conversation");
        self.metrics.talks += 1;
        for event in events_since(&self.events, before) {
            if let GameEvent::PlotInputOpened { rows } = event {
                self.metrics.max_plot_rows = self.metrics.max_plot_rows.max(*rows);
            }
        }
        Ok(())
    }

    /// Click a grave once and let any shake play out.
    fn dig(&mut self, grave: usize) -> Result<()> {
        let hitbox = self
            .game
            .graveyard()
            .grave(grave)
            .map(|g| g.hitbox())
            .with_context(|| format!("grave {grave} does not exist"))?;
        let was_open = self.game.graveyard().grave(grave).is_some_and(|g| g.is_open());
        let talked = self.game.player().talked_to_visitors;

        let before = self.click_world(hitbox.center());
        let mut dug = false;
        for event in events_since(&self.events, before) {
            match event {
                GameEvent::Dug { count, opened, .. } => {
                    dug = true;
                    self.metrics.max_dig_count = self.metrics.max_dig_count.max(*count);
                    if *opened {
                        self.metrics.graves_opened += 1;
                    }
                }
                GameEvent::TalkFirst { .. } => self.metrics.talk_first_blocks += 1,
                _ => {}
            }
        }
        if dug {
            self.metrics.digs += 1;
            if !talked {
                self.metrics.gate_breaches += 1;
            }
        } else if talked {
            bail!("clicking grave {grave} did not dig");
        }

        self.idle(self.shake_frames());
        if self.game.camera().is_shaking() {
            self.metrics.stuck_shakes += 1;
        }
        let open = self.game.graveyard().grave(grave).is_some_and(|g| g.is_open());
        if was_open && !open {
            self.metrics.reclosed += 1;
        }
        Ok(())
    }

    fn dig_open(&mut self, grave: usize) -> Result<()> {
        let depth = self
            .game
            .graveyard()
            .grave(grave)
            .map_or(0, |g| g.dig_progress().depth());
        for _ in 0..depth {
            if self.game.graveyard().grave(grave).is_some_and(|g| g.is_open()) {
                break;
            }
            self.dig(grave)?;
        }
        ensure!(
            self.game.graveyard().grave(grave).is_some_and(|g| g.is_open()),
            "grave {grave} still closed after {depth} digs"
        );
        Ok(())
    }

    fn submit(&mut self, visitor: usize, guess: Guess) -> Result<Outcome> {
        ensure!(
            self.game.dialogue().plot_input_open(),
            "plot input closed for visitor {visitor}"
        );
        self.click_screen(label_rect(guess.row, false).center());
        self.click_screen(label_rect(guess.column, true).center());
        let before = self.frame(FrameInput::idle(self.now));
        events_since(&self.events, before)
            .iter()
            .find_map(|event| match event {
                GameEvent::Guessed {
                    visitor: v,
                    outcome,
                    ..
                } if *v == visitor => Some(*outcome),
                _ => None,
            })
            .with_context(|| format!("no verdict from visitor {visitor}"))
    }

    fn play_level(&mut self, plan: &SimulationPlan, policy: &mut dyn PlotPolicy) -> Result<()> {
        self.metrics.graves_per_level.push(self.game.graveyard().len());

        // Digging is refused until somebody has been talked to.
        self.dig(0)?;
        self.talk(0)?;

        if plan.strategy.digs_everything() {
            for grave in 0..self.game.graveyard().len() {
                self.dig_open(grave)?;
            }
        } else {
            self.dig(0)?;
        }
        if plan.extra_digs > 0 {
            self.dig_open(0)?;
            for _ in 0..plan.extra_digs {
                self.dig(0)?;
            }
        }

        for visitor in 0..self.game.roster().len() {
            self.talk(visitor)?;
            let guess = policy.guess(&self.game, visitor);
            if !guess.sound {
                self.metrics.unsound_deductions += 1;
            }
            if guess.candidates > 1 {
                self.metrics.ambiguous_guesses += 1;
            }
            match self.submit(visitor, guess)? {
                Outcome::Correct => self.metrics.correct += 1,
                Outcome::Incorrect => {
                    self.metrics.incorrect += 1;
                    if guess.candidates == 1 && plan.strategy.digs_everything() {
                        self.metrics.forced_misses += 1;
                    }
                }
            }
        }
        ensure!(
            self.game.roster().all_resolved(),
            "visitors left waiting after every answer"
        );
        Ok(())
    }

    fn wait_for_next_level(&mut self, level: u32) -> Result<()> {
        let delay = self.game.config().transition_delay();
        let frames = delay.as_millis() / FRAME.as_millis() + 4;
        for _ in 0..frames {
            if self.game.level() > level {
                return Ok(());
            }
            self.idle(1);
        }
        ensure!(
            self.game.level() > level,
            "level {level} did not advance within {delay:?}"
        );
        Ok(())
    }

    fn digest(&self) -> u64 {
        let bytes = serde_json::to_vec(&self.game.snapshot()).unwrap_or_default();
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&bytes);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tester() -> GameTester {
        GameTester::new(GameConfig::default(), false)
    }

    #[test]
    fn oracle_clears_two_levels() {
        let plan = SimulationPlan::new(GameplayStrategy::Oracle).with_levels(2);
        let summary = tester().run_plan(&plan, 1337);
        assert_eq!(summary.error, None);
        assert_eq!(summary.levels_completed, 2);
        assert_eq!(summary.final_level, 3);
        assert_eq!(summary.metrics.correct, 10);
        assert_eq!(summary.metrics.incorrect, 0);
        assert_eq!(summary.metrics.graves_per_level, vec![5, 10]);
        assert_eq!(summary.metrics.talk_first_blocks, 2);
        assert_eq!(summary.metrics.gate_breaches, 0);
    }

    #[test]
    fn deduction_never_loses_the_real_grave() {
        let plan = SimulationPlan::new(GameplayStrategy::Deductive).with_levels(2);
        let summary = tester().run_plan(&plan, 7);
        assert_eq!(summary.error, None);
        assert_eq!(summary.metrics.graves_opened, 15);
        assert_eq!(summary.metrics.unsound_deductions, 0);
        assert_eq!(summary.metrics.forced_misses, 0);
        assert_eq!(summary.metrics.stuck_shakes, 0);
    }

    #[test]
    fn careless_guesses_still_progress() {
        let plan = SimulationPlan::new(GameplayStrategy::Careless).with_levels(2);
        let summary = tester().run_plan(&plan, 99);
        assert_eq!(summary.error, None);
        assert_eq!(summary.guesses(), 10);
        assert_eq!(summary.final_level, 3);
    }

    #[test]
    fn dig_and_talk_events_feed_the_metrics() {
        let plan = SimulationPlan::new(GameplayStrategy::Oracle).with_extra_digs(4);
        let summary = tester().run_plan(&plan, 21);
        assert_eq!(summary.error, None);
        assert_eq!(summary.metrics.talk_first_blocks, 1);
        assert_eq!(summary.metrics.digs, 14);
        assert_eq!(summary.metrics.max_dig_count, 14);
        assert_eq!(summary.metrics.graves_opened, 1);
        assert_eq!(summary.metrics.max_plot_rows, 1);
    }

    #[test]
    fn replay_reproduces_the_digest() {
        let plan = SimulationPlan::new(GameplayStrategy::Careless).with_replay();
        let summary = tester().run_plan(&plan, 4);
        assert_eq!(summary.replay_digest, Some(summary.digest));
    }

    #[test]
    fn setup_hook_adjusts_config() {
        fn single_visitor(config: &mut GameConfig) {
            config.roster_size = 1;
            config.transition_delay_ms = 0;
        }
        let plan = SimulationPlan::new(GameplayStrategy::Oracle)
            .with_levels(3)
            .with_setup(single_visitor);
        let summary = tester().run_plan(&plan, 3);
        assert_eq!(summary.roster_size, 1);
        assert_eq!(summary.metrics.correct, 3);
        assert_eq!(summary.final_level, 4);
    }

    #[test]
    fn invalid_config_is_reported_not_panicked() {
        fn broken(config: &mut GameConfig) {
            config.plot_width = 0;
        }
        let plan = SimulationPlan::new(GameplayStrategy::Oracle).with_setup(broken);
        let summary = tester().run_plan(&plan, 1);
        assert!(summary.error.is_some());
        assert_eq!(summary.levels_completed, 0);
    }
}
