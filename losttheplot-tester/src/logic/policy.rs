use losttheplot_game::{GameState, Grave, Presentation, Trait};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// How the auto-player answers visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameplayStrategy {
    /// Reads the answer straight from the roster.
    Oracle,
    /// Opens every grave and matches the visitor's hints against what it sees.
    Deductive,
    /// Picks any plot at random.
    Careless,
}

impl GameplayStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Oracle => "oracle",
            Self::Deductive => "deductive",
            Self::Careless => "careless",
        }
    }

    /// Whether the player opens every grave before answering anyone.
    #[must_use]
    pub const fn digs_everything(self) -> bool {
        matches!(self, Self::Deductive)
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlotPolicy> {
        match self {
            Self::Oracle => Box::new(OraclePolicy),
            Self::Deductive => Box::new(DeductivePolicy::new(seed)),
            Self::Careless => Box::new(CarelessPolicy::new(seed)),
        }
    }
}

/// A plot the policy wants to submit, by row and column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guess {
    pub row: usize,
    pub column: usize,
    /// Graves the policy considered plausible.
    pub candidates: usize,
    /// False when the real grave was not among the candidates.
    pub sound: bool,
}

pub trait PlotPolicy {
    fn name(&self) -> &'static str;

    /// Called with the plot input open for `visitor`.
    fn guess(&mut self, game: &GameState, visitor: usize) -> Guess;
}

fn target_grave(game: &GameState, visitor: usize) -> Option<(usize, &Grave)> {
    let idx = game.roster().get(visitor)?.grave;
    game.graveyard().grave(idx).map(|grave| (idx, grave))
}

pub struct OraclePolicy;

impl PlotPolicy for OraclePolicy {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn guess(&mut self, game: &GameState, visitor: usize) -> Guess {
        let grid = target_grave(game, visitor).map(|(_, grave)| grave.grid);
        Guess {
            row: grid.map_or(0, |g| g.row()),
            column: grid.map_or(0, |g| g.column()),
            candidates: 1,
            sound: grid.is_some(),
        }
    }
}

pub struct DeductivePolicy {
    rng: ChaCha20Rng,
}

impl DeductivePolicy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed ^ 0xd3d0_c710),
        }
    }
}

impl PlotPolicy for DeductivePolicy {
    fn name(&self) -> &'static str {
        "deductive"
    }

    fn guess(&mut self, game: &GameState, visitor: usize) -> Guess {
        let hints = hinted_traits(&game.dialogue().visitor_speech().text);
        let graves = game.graveyard().graves();
        let candidates = matching_graves(graves, &hints);
        let sound = target_grave(game, visitor).is_some_and(|(idx, _)| candidates.contains(&idx));
        let pick = candidates
            .choose(&mut self.rng)
            .and_then(|&idx| graves.get(idx))
            .map(|grave| grave.grid);
        Guess {
            row: pick.map_or(0, |g| g.row()),
            column: pick.map_or(0, |g| g.column()),
            candidates: candidates.len(),
            sound,
        }
    }
}

pub struct CarelessPolicy {
    rng: ChaCha20Rng,
}

impl CarelessPolicy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed ^ 0xca2e_1e55),
        }
    }
}

impl PlotPolicy for CarelessPolicy {
    fn name(&self) -> &'static str {
        "careless"
    }

    fn guess(&mut self, game: &GameState, _visitor: usize) -> Guess {
        let (rows, columns) = game
            .dialogue()
            .plot()
            .map_or((1, 1), |plot| (plot.row_labels().len(), plot.column_labels().len()));
        Guess {
            row: self.rng.gen_range(0..rows.max(1)),
            column: self.rng.gen_range(0..columns.max(1)),
            candidates: rows * columns,
            sound: true,
        }
    }
}

/// Traits a visitor mentioned, read back out of their speech.
#[must_use]
pub fn hinted_traits(text: &str) -> Vec<Trait> {
    Trait::ALL
        .iter()
        .copied()
        .filter(|like| text.contains(like.hint()))
        .collect()
}

/// Whether an opened grave shows what `hint` describes.
#[must_use]
pub fn look_matches(grave: &Grave, hint: Trait) -> bool {
    let look = grave.look;
    match hint.presentation() {
        Presentation::Headstone(code) => look.headstone == code,
        Presentation::Body(options) => options.contains(&look.body),
        Presentation::Worn(pair) => look.worn == pair,
        Presentation::Marker(options) => options.contains(&look.marker),
    }
}

/// Indices of opened graves consistent with every hint.
#[must_use]
pub fn matching_graves(graves: &[Grave], hints: &[Trait]) -> Vec<usize> {
    graves
        .iter()
        .enumerate()
        .filter(|(_, grave)| grave.is_open() && hints.iter().all(|&hint| look_matches(grave, hint)))
        .map(|(idx, _)| idx)
        .collect()
}
