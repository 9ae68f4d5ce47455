//! Top-level mode controller the host drives once per frame.
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, GameConfig};
use crate::state::{FrameInput, FrameOutcome, GameState};
use crate::traits::TraitCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CartridgeMode {
    #[default]
    TitleSetup,
    Title,
    GameSetup,
    Game,
}

impl CartridgeMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TitleSetup => "title_setup",
            Self::Title => "title",
            Self::GameSetup => "game_setup",
            Self::Game => "game",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Cartridge {
    mode: CartridgeMode,
    config: GameConfig,
    catalog: TraitCatalog,
    seed: u64,
    game: Option<GameState>,
}

impl Cartridge {
    /// # Errors
    ///
    /// Returns `ConfigError` when `config` fails validation, before any
    /// frame runs.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            mode: CartridgeMode::TitleSetup,
            config,
            catalog: TraitCatalog::standard().clone(),
            seed,
            game: None,
        })
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Catalog` when `catalog` breaks a category
    /// invariant.
    pub fn with_catalog(mut self, catalog: TraitCatalog) -> Result<Self, ConfigError> {
        catalog.validate()?;
        self.catalog = catalog;
        Ok(self)
    }

    #[must_use]
    pub const fn mode(&self) -> CartridgeMode {
        self.mode
    }

    #[must_use]
    pub const fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    pub const fn game_mut(&mut self) -> Option<&mut GameState> {
        self.game.as_mut()
    }

    /// Run one frame of whichever mode is active.
    pub fn update(&mut self, input: FrameInput) -> FrameOutcome {
        match self.mode {
            CartridgeMode::TitleSetup => {
                self.enter(CartridgeMode::Title);
                FrameOutcome::default()
            }
            CartridgeMode::Title => {
                if input.pressed {
                    self.enter(CartridgeMode::GameSetup);
                }
                FrameOutcome::default()
            }
            CartridgeMode::GameSetup => {
                match GameState::with_catalog(self.config.clone(), self.catalog.clone(), self.seed)
                {
                    Ok(game) => {
                        self.game = Some(game);
                        self.enter(CartridgeMode::Game);
                    }
                    Err(err) => {
                        log::error!("cartridge | game setup failed: {err}");
                        self.enter(CartridgeMode::Title);
                    }
                }
                FrameOutcome::default()
            }
            CartridgeMode::Game => self
                .game
                .as_mut()
                .map(|game| game.update(input))
                .unwrap_or_default(),
        }
    }

    fn enter(&mut self, mode: CartridgeMode) {
        log::debug!("cartridge | {} -> {}", self.mode.as_str(), mode.as_str());
        self.mode = mode;
    }
}
