//! Grave generation: relation, the three hinted traits, and the tile look
//! derived from them.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::constants::{
    COLUMN_LABELS, DIG_DEPTH, GRAVE_HEIGHT_TILES, GRAVE_WIDTH_TILES, ROW_LABELS, TILE_PX,
};
use crate::dig::{DigOutcome, DigProgress};
use crate::geometry::{Point, Rect};
use crate::traits::{
    DEFAULT_BODIES, DEFAULT_HEADSTONE, DEFAULT_MARKER, DEFAULT_WORN, Presentation, Trait,
    TraitCatalog, TraitCategory,
};

/// Number of categories hinted per grave; one category is always left out.
pub const HINTED_CATEGORIES: usize = 3;

/// The hinted traits of one grave, in the order the categories were drawn.
pub type Likes = SmallVec<[Trait; HINTED_CATEGORIES]>;

pub const RELATIONS: [&str; 13] = [
    "ancient ancestor",
    "great aunt",
    "great uncle",
    "great grandfather",
    "second cousin",
    "favourite barber",
    "favourite celebrity",
    "old teacher",
    "old neighbour",
    "evil twin",
    "old accountant",
    "old dentist",
    "disgraced plastic surgeon",
];

/// Plot coordinate: column `1..=5`, row `A..=I`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridRef {
    column: u8,
    row: u8,
}

impl GridRef {
    /// Build from zero-based indices; `None` when outside the alphabets.
    #[must_use]
    pub fn new(column: usize, row: usize) -> Option<Self> {
        if column >= COLUMN_LABELS.len() || row >= ROW_LABELS.len() {
            return None;
        }
        Some(Self {
            column: u8::try_from(column).ok()?,
            row: u8::try_from(row).ok()?,
        })
    }

    /// Parse the literal labels a player submits.
    #[must_use]
    pub fn from_labels(column: &str, row: &str) -> Option<Self> {
        let column = COLUMN_LABELS.iter().position(|label| *label == column)?;
        let row = ROW_LABELS.iter().position(|label| *label == row)?;
        Self::new(column, row)
    }

    #[must_use]
    pub const fn column(self) -> usize {
        self.column as usize
    }

    #[must_use]
    pub const fn row(self) -> usize {
        self.row as usize
    }

    #[must_use]
    pub const fn column_label(self) -> &'static str {
        COLUMN_LABELS[self.column as usize]
    }

    #[must_use]
    pub const fn row_label(self) -> &'static str {
        ROW_LABELS[self.row as usize]
    }

    /// Row letter followed by column number, e.g. `C3`.
    #[must_use]
    pub fn label(self) -> String {
        format!("{}{}", self.row_label(), self.column_label())
    }
}

impl fmt::Display for GridRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_label(), self.column_label())
    }
}

/// Tile-sheet offsets a grave is painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraveLook {
    pub headstone: u8,
    pub body: u8,
    pub worn: [u8; 2],
    pub marker: u8,
    /// Closed-grave mound variant, purely cosmetic.
    pub mound: u8,
}

impl GraveLook {
    fn from_likes<R: Rng + ?Sized>(likes: &[Trait], rng: &mut R) -> Self {
        let mut headstone = DEFAULT_HEADSTONE;
        let mut bodies = DEFAULT_BODIES;
        let mut worn = DEFAULT_WORN;
        let mut markers: &[u8] = &[DEFAULT_MARKER];

        for like in likes {
            match like.presentation() {
                Presentation::Headstone(code) => headstone = code,
                Presentation::Body(options) => bodies = options,
                Presentation::Worn(pair) => worn = pair,
                Presentation::Marker(options) => markers = options,
            }
        }

        Self {
            headstone,
            body: bodies.choose(rng).copied().unwrap_or(DEFAULT_BODIES[0]),
            worn,
            marker: markers.choose(rng).copied().unwrap_or(DEFAULT_MARKER),
            mound: 8 + rng.gen_range(0..4u8) * 4,
        }
    }
}

/// One plot in the graveyard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grave {
    pub grid: GridRef,
    /// Top-left corner in map tiles.
    pub origin: Point,
    pub relation: String,
    pub likes: Likes,
    pub look: GraveLook,
    dig: DigProgress,
}

impl Grave {
    /// World-space click target covering headstone and plot.
    #[must_use]
    pub const fn hitbox(&self) -> Rect {
        Rect::from_size(
            Point::new(self.origin.x * TILE_PX, self.origin.y * TILE_PX),
            GRAVE_WIDTH_TILES * TILE_PX,
            GRAVE_HEIGHT_TILES * TILE_PX,
        )
    }

    /// The hinted trait for `category`, if that category was drawn.
    #[must_use]
    pub fn trait_in(&self, category: TraitCategory) -> Option<Trait> {
        self.likes
            .iter()
            .copied()
            .find(|like| like.category() == category)
    }

    /// The category this grave never hints at.
    #[must_use]
    pub fn omitted_category(&self) -> Option<TraitCategory> {
        TraitCategory::ALL
            .into_iter()
            .find(|category| self.trait_in(*category).is_none())
    }

    #[must_use]
    pub const fn dig_progress(&self) -> &DigProgress {
        &self.dig
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.dig.is_open()
    }

    /// Apply one dig action.
    pub fn dig<R: Rng + ?Sized>(&mut self, rng: &mut R) -> DigOutcome {
        let outcome = self.dig.dig(rng);
        if matches!(outcome, DigOutcome::Uncovered) {
            log::debug!(
                "{} | grave {} uncovered after {} digs",
                crate::constants::LOG_GRAVE_OPENED,
                self.grid,
                self.dig.count()
            );
        }
        outcome
    }

    /// What the player says after a dig.
    #[must_use]
    pub fn dig_line(&self, outcome: &DigOutcome) -> String {
        match outcome {
            DigOutcome::Progress { line, .. } => (*line).to_string(),
            DigOutcome::Uncovered => format!("That's got you, {}", self.grid),
            DigOutcome::AlreadyOpen => format!("Lookin' good there, {}", self.grid),
        }
    }

    /// What a visitor looking for this grave says.
    #[must_use]
    pub fn describe(&self) -> String {
        let hints: Vec<&str> = self.likes.iter().map(|like| like.hint()).collect();
        format!(
            "Where is my...\n ...{}?\n\n{}",
            self.relation,
            hints.join("\n")
        )
    }
}

/// Produces graves against a trait catalog.
#[derive(Debug, Clone, Copy)]
pub struct GraveGenerator<'a> {
    catalog: &'a TraitCatalog,
}

impl<'a> GraveGenerator<'a> {
    #[must_use]
    pub const fn new(catalog: &'a TraitCatalog) -> Self {
        Self { catalog }
    }

    /// Roll a fresh grave at `grid`, painted at map-tile `origin`.
    pub fn generate<R: Rng + ?Sized>(&self, grid: GridRef, origin: Point, rng: &mut R) -> Grave {
        let relation = RELATIONS[rng.gen_range(0..RELATIONS.len())].to_string();
        let likes = self.roll_likes(rng);
        let look = GraveLook::from_likes(&likes, rng);
        Grave {
            grid,
            origin,
            relation,
            likes,
            look,
            dig: DigProgress::new(DIG_DEPTH),
        }
    }

    fn roll_likes<R: Rng + ?Sized>(&self, rng: &mut R) -> Likes {
        let mut categories = TraitCategory::ALL;
        let (drawn, _omitted) = categories.partial_shuffle(rng, HINTED_CATEGORIES);
        drawn
            .iter()
            .filter_map(|category| {
                self.catalog
                    .candidates(*category)
                    .choose(&mut *rng)
                    .copied()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn sample(seed: u64) -> Grave {
        let mut rng = SmallRng::seed_from_u64(seed);
        let grid = GridRef::new(2, 2).unwrap();
        GraveGenerator::new(TraitCatalog::standard()).generate(grid, Point::new(30, 16), &mut rng)
    }

    #[test]
    fn grid_labels_follow_alphabets() {
        let grid = GridRef::new(2, 2).unwrap();
        assert_eq!(grid.column_label(), "3");
        assert_eq!(grid.row_label(), "C");
        assert_eq!(grid.label(), "C3");
        assert_eq!(GridRef::from_labels("3", "C"), Some(grid));
        assert!(GridRef::new(5, 0).is_none());
        assert!(GridRef::new(0, 9).is_none());
        assert!(GridRef::from_labels("c", "3").is_none());
    }

    #[test]
    fn generated_grave_hints_three_distinct_categories() {
        for seed in 0..200 {
            let grave = sample(seed);
            assert_eq!(grave.likes.len(), HINTED_CATEGORIES);
            let mut categories: Vec<_> = grave.likes.iter().map(|l| l.category()).collect();
            categories.sort();
            categories.dedup();
            assert_eq!(categories.len(), HINTED_CATEGORIES, "seed {seed}");
            assert!(grave.omitted_category().is_some());
            assert!(RELATIONS.contains(&grave.relation.as_str()));
        }
    }

    #[test]
    fn omitted_categories_fall_back_to_defaults() {
        for seed in 0..200 {
            let grave = sample(seed);
            match grave.omitted_category() {
                Some(TraitCategory::Headstone) => {
                    assert_eq!(grave.look.headstone, DEFAULT_HEADSTONE);
                }
                Some(TraitCategory::Body) => assert!(DEFAULT_BODIES.contains(&grave.look.body)),
                Some(TraitCategory::Worn) => assert_eq!(grave.look.worn, DEFAULT_WORN),
                Some(TraitCategory::Marker) => assert_eq!(grave.look.marker, DEFAULT_MARKER),
                None => panic!("every grave omits one category"),
            }
            assert!([8, 12, 16, 20].contains(&grave.look.mound));
        }
    }

    #[test]
    fn hinted_traits_drive_the_look() {
        for seed in 0..200 {
            let grave = sample(seed);
            if let Some(Trait::Beard) = grave.trait_in(TraitCategory::Worn) {
                assert_eq!(grave.look.worn, [24, 12]);
            }
            if let Some(Trait::Short) = grave.trait_in(TraitCategory::Body) {
                assert!([12, 20].contains(&grave.look.body));
            }
            if let Some(Trait::NoFlowers) = grave.trait_in(TraitCategory::Marker) {
                assert_eq!(grave.look.marker, 33);
            }
            if let Some(Trait::Words) = grave.trait_in(TraitCategory::Headstone) {
                assert_eq!(grave.look.headstone, 28);
            }
        }
    }

    #[test]
    fn describe_lists_relation_and_hints() {
        let grave = sample(7);
        let text = grave.describe();
        assert!(text.starts_with("Where is my...\n ..."));
        assert!(text.contains(&grave.relation));
        for like in &grave.likes {
            assert!(text.contains(like.hint()));
        }
    }

    #[test]
    fn hitbox_spans_grave_in_pixels() {
        let grave = sample(1);
        let hitbox = grave.hitbox();
        assert_eq!(hitbox.min, Point::new(240, 128));
        assert_eq!(hitbox.max, Point::new(272, 208));
    }
}
