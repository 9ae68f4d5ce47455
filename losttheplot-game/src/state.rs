//! The running game: one graveyard, its visitors, the player and the
//! deferred work between frames.
use serde::Serialize;
use std::time::Duration;

use crate::camera::Camera;
use crate::config::{ConfigError, GameConfig};
use crate::dialogue::{Dialogue, OPENING_LINE, PlotPick, TALK_FIRST_LINE, submission_line};
use crate::dig::DigOutcome;
use crate::geometry::Point;
use crate::grave::GridRef;
use crate::graveyard::Graveyard;
use crate::level::{LevelPhase, LevelProgression};
use crate::player::Player;
use crate::rng::RngBundle;
use crate::scheduler::{Deferred, TickScheduler};
use crate::traits::TraitCatalog;
use crate::visitor::{MatchEngine, Outcome, Roster};

/// What the host hands the game each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Monotonic time since boot.
    pub now: Duration,
    /// Pointer position in screen pixels.
    pub pointer: Point,
    /// True only on the frame the button went down.
    pub pressed: bool,
}

impl FrameInput {
    #[must_use]
    pub const fn idle(now: Duration) -> Self {
        Self {
            now,
            pointer: Point::ZERO,
            pressed: false,
        }
    }

    #[must_use]
    pub const fn click(now: Duration, pointer: Point) -> Self {
        Self {
            now,
            pointer,
            pressed: true,
        }
    }
}

/// Something that happened during a frame, for hosts and harnesses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GameEvent {
    /// A grave was clicked before any visitor was talked to.
    TalkFirst { grave: GridRef },
    Dug {
        grave: GridRef,
        count: u32,
        opened: bool,
    },
    TalkedTo { visitor: usize },
    PlotInputOpened { rows: usize },
    PlotPicked { label: &'static str },
    Guessed {
        visitor: usize,
        row: &'static str,
        column: &'static str,
        outcome: Outcome,
    },
    WalkTo { x: i32, y: i32 },
    LevelComplete { fires_at_ms: u64 },
    LevelStarted { level: u32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    pub events: Vec<GameEvent>,
}

/// Read-only view of the game for snapshots.
#[derive(Debug, Serialize)]
pub struct GameSnapshot<'a> {
    pub seed: u64,
    pub level: u32,
    pub phase: LevelPhase,
    pub graveyard: &'a Graveyard,
    pub roster: &'a Roster,
    pub dialogue: &'a Dialogue,
    pub player: &'a Player,
    pub camera: &'a Camera,
}

#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    catalog: TraitCatalog,
    rng: RngBundle,
    scheduler: TickScheduler,
    progression: LevelProgression,
    graveyard: Graveyard,
    roster: Roster,
    dialogue: Dialogue,
    player: Player,
    camera: Camera,
}

impl GameState {
    /// Start level 1 with the standard trait catalog.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `config` fails validation.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_catalog(config, TraitCatalog::standard().clone(), seed)
    }

    /// Start level 1 with a custom catalog.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `config` or `catalog` fails validation.
    pub fn with_catalog(
        config: GameConfig,
        catalog: TraitCatalog,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        catalog.validate()?;
        Self::build(config, catalog, seed)
    }

    fn build(config: GameConfig, catalog: TraitCatalog, seed: u64) -> Result<Self, ConfigError> {
        let mut rng = RngBundle::from_user_seed(seed);
        let progression = LevelProgression::new();
        let graveyard = Graveyard::generate(progression.level(), &config, &catalog, rng.layout());
        let roster = Roster::generate(config.roster_size, graveyard.len(), rng.roster()).ok_or(
            ConfigError::EmptyGraveyard {
                plot_width: graveyard.width(),
                rows: graveyard.rows(),
            },
        )?;
        let mut dialogue = Dialogue::default();
        dialogue.player_say(OPENING_LINE);
        log::debug!(
            "game | seed {seed} level {} with {} graves",
            progression.level(),
            graveyard.len()
        );
        Ok(Self {
            config,
            catalog,
            rng,
            scheduler: TickScheduler::new(),
            progression,
            graveyard,
            roster,
            dialogue,
            player: Player::default(),
            camera: Camera::default(),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    #[must_use]
    pub const fn level(&self) -> u32 {
        self.progression.level()
    }

    #[must_use]
    pub const fn progression(&self) -> &LevelProgression {
        &self.progression
    }

    #[must_use]
    pub const fn graveyard(&self) -> &Graveyard {
        &self.graveyard
    }

    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub const fn dialogue(&self) -> &Dialogue {
        &self.dialogue
    }

    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    #[must_use]
    pub const fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The host moves the camera; the game only adds shake.
    pub const fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    #[must_use]
    pub const fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot<'_> {
        GameSnapshot {
            seed: self.seed(),
            level: self.level(),
            phase: self.progression.phase(),
            graveyard: &self.graveyard,
            roster: &self.roster,
            dialogue: &self.dialogue,
            player: &self.player,
            camera: &self.camera,
        }
    }

    /// Pick a row letter on the open plot panel.
    pub fn select_plot_row(&mut self, label: &str) -> bool {
        self.dialogue
            .plot_mut()
            .is_some_and(|plot| plot.select_row(label))
    }

    /// Pick a column number on the open plot panel.
    pub fn select_plot_column(&mut self, label: &str) -> bool {
        self.dialogue
            .plot_mut()
            .is_some_and(|plot| plot.select_column(label))
    }

    /// Advance one frame.
    pub fn update(&mut self, input: FrameInput) -> FrameOutcome {
        let mut events = Vec::new();
        self.fire_due(input.now, &mut events);
        self.submit_plot(&mut events);
        if input.pressed {
            self.dispatch_click(input.pointer, input.now, &mut events);
        }
        self.player.step();
        if let Some(fires_at) = self.progression.check_all_resolved(
            &self.roster,
            input.now,
            self.config.transition_delay(),
            &mut self.scheduler,
        ) {
            events.push(GameEvent::LevelComplete {
                fires_at_ms: u64::try_from(fires_at.as_millis()).unwrap_or(u64::MAX),
            });
        }
        FrameOutcome { events }
    }

    fn fire_due(&mut self, now: Duration, events: &mut Vec<GameEvent>) {
        for action in self.scheduler.drain_due(now) {
            match action {
                Deferred::ShakeStep => {
                    self.camera
                        .nudge(self.config.shake_amplitude, self.rng.shake());
                }
                // A newer dig's steps keep the camera shaking.
                Deferred::ShakeSettle => {
                    if !self.scheduler.is_pending(Deferred::ShakeStep) {
                        self.camera.settle();
                    }
                }
                Deferred::AdvanceLevel => {
                    let level = self.start_next_level();
                    events.push(GameEvent::LevelStarted { level });
                }
            }
        }
    }

    fn start_next_level(&mut self) -> u32 {
        let level = self.progression.advance();
        self.graveyard = Graveyard::generate(level, &self.config, &self.catalog, self.rng.layout());
        // Later levels never hold fewer graves than the validated first one.
        if let Some(roster) = Roster::generate(
            self.config.roster_size,
            self.graveyard.len(),
            self.rng.roster(),
        ) {
            self.roster = roster;
        }
        self.player.reset_flags();
        let (visitor_speech, player_line) = self.progression.new_day_narration();
        self.dialogue.visitor_say(visitor_speech);
        self.dialogue.player_say("");
        self.dialogue.player_say(player_line);
        level
    }

    fn submit_plot(&mut self, events: &mut Vec<GameEvent>) {
        let Some((row, column)) = self.dialogue.plot().and_then(|plot| plot.complete()) else {
            return;
        };
        self.dialogue.player_say("");
        self.dialogue.player_say(submission_line(row, column));

        let Some(idx) = self.roster.current() else {
            return;
        };
        let Some(visitor) = self.roster.get_mut(idx) else {
            return;
        };
        if visitor.is_resolved() {
            return;
        }
        let Some(grave) = self.graveyard.grave(visitor.grave) else {
            return;
        };
        let outcome = MatchEngine::evaluate(visitor, grave, column, row);
        self.dialogue.visitor_say(visitor.react(outcome));
        events.push(GameEvent::Guessed {
            visitor: idx,
            row,
            column,
            outcome,
        });
    }

    fn dispatch_click(&mut self, pointer: Point, now: Duration, events: &mut Vec<GameEvent>) {
        if self.dialogue.plot_input_open() && Dialogue::panel_rect().contains(pointer) {
            if let Some(plot) = self.dialogue.plot_mut()
                && let Some(pick) = plot.pick_at(pointer)
            {
                plot.apply(pick);
                let label = match pick {
                    PlotPick::Row(label) | PlotPick::Column(label) => label,
                };
                events.push(GameEvent::PlotPicked { label });
            }
            return;
        }

        let camera = self.camera.offset();
        if let Some(idx) = self.graveyard.hit_test(pointer, camera) {
            self.dig_grave(idx, now, events);
        } else if let Some(idx) = self.roster.hit_test(pointer + camera) {
            self.talk_to(idx, events);
        } else {
            let (x, y) = self.player.walk_to(pointer + camera);
            self.dialogue.clear_visitor();
            self.dialogue.player_say("");
            #[allow(clippy::cast_possible_truncation)]
            let (x, y) = (x as i32, y as i32);
            events.push(GameEvent::WalkTo { x, y });
        }
    }

    fn dig_grave(&mut self, idx: usize, now: Duration, events: &mut Vec<GameEvent>) {
        let Some(grave) = self.graveyard.grave_mut(idx) else {
            return;
        };
        if !self.player.talked_to_visitors {
            self.dialogue.player_say(TALK_FIRST_LINE);
            events.push(GameEvent::TalkFirst { grave: grave.grid });
            return;
        }

        self.player.done_some_digging = true;
        let outcome = grave.dig(self.rng.narration());
        let line = grave.dig_line(&outcome);
        events.push(GameEvent::Dug {
            grave: grave.grid,
            count: grave.dig_progress().count(),
            opened: matches!(outcome, DigOutcome::Uncovered),
        });
        self.dialogue.clear_visitor();
        self.dialogue.player_say(line);
        if outcome.shakes_camera() {
            self.schedule_shake(now);
        }
    }

    fn schedule_shake(&mut self, now: Duration) {
        let interval = self.config.shake_interval();
        let mut at = now;
        for _ in 0..self.config.shake_steps {
            at = at.saturating_add(interval);
            self.scheduler.schedule(at, Deferred::ShakeStep);
        }
        self.scheduler
            .schedule(at.saturating_add(interval), Deferred::ShakeSettle);
    }

    fn talk_to(&mut self, idx: usize, events: &mut Vec<GameEvent>) {
        let Some(visitor) = self.roster.get(idx) else {
            return;
        };
        let Some(grave) = self.graveyard.grave(visitor.grave) else {
            return;
        };
        self.dialogue.visitor_say(visitor.ask(grave));
        self.roster.set_current(Some(idx));
        self.player.talked_to_visitors = true;
        events.push(GameEvent::TalkedTo { visitor: idx });

        if self.player.done_some_digging {
            let rows = self.graveyard.plot_rows();
            self.dialogue.enable_plot_input(rows);
            events.push(GameEvent::PlotInputOpened { rows });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::NEW_DAY_LINE;

    fn game(seed: u64) -> GameState {
        GameState::new(GameConfig::default(), seed).expect("default config is valid")
    }

    fn centre_of_visitor(game: &GameState, idx: usize) -> Point {
        let hitbox = game.roster().get(idx).and_then(|v| v.hitbox).unwrap();
        hitbox.center() - game.camera().offset()
    }

    fn centre_of_grave(game: &GameState, idx: usize) -> Point {
        game.graveyard().grave(idx).unwrap().hitbox().center() - game.camera().offset()
    }

    #[test]
    fn opens_with_the_first_level() {
        let game = game(1);
        assert_eq!(game.level(), 1);
        assert_eq!(game.graveyard().rows(), 8);
        assert_eq!(game.roster().len(), 5);
        assert_eq!(game.dialogue().player_line(), OPENING_LINE);
    }

    #[test]
    fn digging_needs_a_conversation_first() {
        let mut game = game(2);
        let click = centre_of_grave(&game, 0);
        let outcome = game.update(FrameInput::click(Duration::ZERO, click));
        assert!(matches!(outcome.events[..], [GameEvent::TalkFirst { .. }]));
        assert_eq!(game.dialogue().player_line(), TALK_FIRST_LINE);
        assert_eq!(game.graveyard().grave(0).unwrap().dig_progress().count(), 0);
    }

    #[test]
    fn dig_shakes_then_settles() {
        let mut game = game(3);
        let visitor = centre_of_visitor(&game, 0);
        game.update(FrameInput::click(Duration::ZERO, visitor));
        let grave = centre_of_grave(&game, 1);
        let outcome = game.update(FrameInput::click(Duration::from_millis(10), grave));
        assert!(matches!(
            outcome.events[..],
            [GameEvent::Dug {
                count: 1,
                opened: false,
                ..
            }]
        ));
        assert!(game.dialogue().visitor_speech().is_empty());
        assert_eq!(game.scheduler().len(), 11);

        game.update(FrameInput::idle(Duration::from_millis(100)));
        game.update(FrameInput::idle(Duration::from_millis(500)));
        assert!(game.scheduler().is_empty());
        assert!(!game.camera().is_shaking());
    }

    #[test]
    fn overlapping_shakes_settle_after_the_last_step() {
        let mut game = game(3);
        game.update(FrameInput::click(Duration::ZERO, centre_of_visitor(&game, 0)));
        game.update(FrameInput::click(
            Duration::from_millis(10),
            centre_of_grave(&game, 1),
        ));
        // First shake: steps at 26..=170 ms, settle at 186 ms.
        game.update(FrameInput::idle(Duration::from_millis(42)));
        game.update(FrameInput::click(
            Duration::from_millis(58),
            centre_of_grave(&game, 1),
        ));
        assert_eq!(game.graveyard().grave(1).unwrap().dig_progress().count(), 2);

        // Second shake still has steps at 202 and 218 ms.
        game.update(FrameInput::idle(Duration::from_millis(190)));
        assert!(game.scheduler().is_pending(Deferred::ShakeStep));
        assert!(game.camera().is_shaking());

        game.update(FrameInput::idle(Duration::from_millis(300)));
        assert!(game.scheduler().is_empty());
        assert!(!game.camera().is_shaking());
    }

    #[test]
    fn ten_digs_open_the_grave_without_a_final_shake() {
        let mut game = game(4);
        game.update(FrameInput::click(Duration::ZERO, centre_of_visitor(&game, 0)));
        let grave = centre_of_grave(&game, 2);
        let mut now = Duration::ZERO;
        for _ in 0..10 {
            now += Duration::from_secs(1);
            game.update(FrameInput::click(now, grave));
        }
        let dug = game.graveyard().grave(2).unwrap();
        assert!(dug.is_open());
        assert_eq!(
            game.dialogue().player_line(),
            format!("That's got you, {}", dug.grid)
        );
        assert!(game.scheduler().is_empty());
    }

    #[test]
    fn talking_after_digging_opens_plot_input_and_guess_resolves() {
        let mut game = game(5);
        game.update(FrameInput::click(Duration::ZERO, centre_of_visitor(&game, 0)));
        assert!(!game.dialogue().plot_input_open());
        game.update(FrameInput::click(
            Duration::from_millis(20),
            centre_of_grave(&game, 0),
        ));
        let outcome = game.update(FrameInput::click(
            Duration::from_secs(1),
            centre_of_visitor(&game, 0),
        ));
        assert!(outcome
            .events
            .contains(&GameEvent::PlotInputOpened { rows: 1 }));

        let target = game.roster().get(0).unwrap().grave;
        let grid = game.graveyard().grave(target).unwrap().grid;
        assert!(game.select_plot_row(grid.row_label()));
        assert!(game.select_plot_column(grid.column_label()));
        let outcome = game.update(FrameInput::idle(Duration::from_secs(2)));
        assert!(matches!(
            outcome.events[..],
            [GameEvent::Guessed {
                outcome: Outcome::Correct,
                ..
            }]
        ));
        assert!(!game.dialogue().plot_input_open());
        assert!(game.dialogue().player_line().starts_with("They're 100% in "));
        assert_eq!(game.dialogue().visitor_speech().speaker, "Happy Visitor 1");
        assert!(game.roster().get(0).unwrap().hitbox.is_none());
    }

    #[test]
    fn clicking_empty_ground_walks_and_clears_speech() {
        let mut game = game(6);
        let outcome = game.update(FrameInput::click(Duration::ZERO, Point::new(20, 60)));
        assert_eq!(outcome.events, vec![GameEvent::WalkTo { x: 40, y: 40 }]);
        assert_eq!(game.dialogue().player_line(), "");
        assert_eq!(game.player().position(), (126.0, 126.0));
    }

    #[test]
    fn level_advances_after_every_visitor_leaves() {
        let config = GameConfig {
            roster_size: 1,
            ..GameConfig::default()
        };
        let mut game = GameState::new(config, 7).unwrap();
        game.update(FrameInput::click(Duration::ZERO, centre_of_visitor(&game, 0)));
        game.update(FrameInput::click(
            Duration::from_millis(20),
            centre_of_grave(&game, 0),
        ));
        game.update(FrameInput::click(
            Duration::from_secs(1),
            centre_of_visitor(&game, 0),
        ));
        assert!(game.select_plot_row("A"));
        assert!(game.select_plot_column("1"));
        let outcome = game.update(FrameInput::idle(Duration::from_secs(2)));
        assert!(outcome.events.contains(&GameEvent::LevelComplete {
            fires_at_ms: 8_000
        }));

        game.update(FrameInput::idle(Duration::from_millis(7_999)));
        assert_eq!(game.level(), 1);
        let outcome = game.update(FrameInput::idle(Duration::from_secs(8)));
        assert!(outcome.events.contains(&GameEvent::LevelStarted { level: 2 }));
        assert_eq!(game.graveyard().rows(), 12);
        assert_eq!(game.roster().len(), 1);
        assert!(!game.player().talked_to_visitors);
        assert_eq!(game.dialogue().player_line(), NEW_DAY_LINE);
        assert_eq!(game.dialogue().visitor_speech().speaker, "Level 2");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig {
            roster_size: 0,
            ..GameConfig::default()
        };
        assert!(GameState::new(config, 1).is_err());

        let config = GameConfig {
            plot_width: 3,
            ..GameConfig::default()
        };
        assert!(matches!(
            GameState::new(config, 1),
            Err(ConfigError::EmptyGraveyard { plot_width: 3, .. })
        ));
    }
}
