//! The walled graveyard of one level and its grid of graves.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::constants::{
    COLUMN_LABELS, GRAVE_FIRST_X, GRAVE_FIRST_Y, GRAVE_STEP_X, GRAVE_STEP_Y, ROW_LABELS,
};
use crate::geometry::Point;
use crate::grave::{Grave, GraveGenerator, GridRef};
use crate::traits::TraitCatalog;

/// Tiles per map block; walls and grass are laid out in blocks.
pub const BLOCK_TILES: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graveyard {
    level: u32,
    /// Map width in blocks.
    width: u32,
    /// Map height in blocks.
    height: u32,
    graves: Vec<Grave>,
}

impl Graveyard {
    /// Lay out and roll every grave for `level`.
    pub fn generate<R: Rng + ?Sized>(
        level: u32,
        config: &GameConfig,
        catalog: &TraitCatalog,
        rng: &mut R,
    ) -> Self {
        let width = config.plot_width;
        let height = config.rows_for_level(level);
        let generator = GraveGenerator::new(catalog);

        let mut graves = Vec::new();
        for (row, y) in Self::grave_rows(height).enumerate() {
            for (column, x) in Self::grave_columns(width).enumerate() {
                let Some(grid) = GridRef::new(column, row) else {
                    continue;
                };
                let origin = Point::new(tile_coord(x), tile_coord(y));
                graves.push(generator.generate(grid, origin, rng));
            }
        }

        Self {
            level,
            width,
            height,
            graves,
        }
    }

    /// Graves a map of `width` by `height` blocks holds.
    #[must_use]
    pub fn capacity(width: u32, height: u32) -> usize {
        Self::grave_rows(height).count() * Self::grave_columns(width).count()
    }

    /// Tile y of each grave row that fits inside the walls, capped at the
    /// row alphabet.
    fn grave_rows(height: u32) -> impl Iterator<Item = u32> {
        let limit = height.saturating_sub(3) * BLOCK_TILES;
        (GRAVE_FIRST_Y..limit)
            .step_by(GRAVE_STEP_Y as usize)
            .take(ROW_LABELS.len())
    }

    fn grave_columns(width: u32) -> impl Iterator<Item = u32> {
        let limit = width.saturating_sub(1) * BLOCK_TILES;
        (GRAVE_FIRST_X..limit)
            .step_by(GRAVE_STEP_X as usize)
            .take(COLUMN_LABELS.len())
    }

    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Map width in blocks.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Map height in blocks.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.height
    }

    /// Distinct grave rows, i.e. row letters in play.
    #[must_use]
    pub fn plot_rows(&self) -> usize {
        self.graves
            .iter()
            .map(|grave| grave.grid.row() + 1)
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn plot_columns(&self) -> usize {
        self.graves
            .iter()
            .map(|grave| grave.grid.column() + 1)
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn graves(&self) -> &[Grave] {
        &self.graves
    }

    #[must_use]
    pub fn grave(&self, idx: usize) -> Option<&Grave> {
        self.graves.get(idx)
    }

    pub fn grave_mut(&mut self, idx: usize) -> Option<&mut Grave> {
        self.graves.get_mut(idx)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.graves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graves.is_empty()
    }

    #[must_use]
    pub fn find(&self, grid: GridRef) -> Option<usize> {
        self.graves.iter().position(|grave| grave.grid == grid)
    }

    /// First grave whose world hitbox holds `screen + camera`.
    #[must_use]
    pub fn hit_test(&self, screen: Point, camera: Point) -> Option<usize> {
        let world = screen + camera;
        self.graves
            .iter()
            .position(|grave| grave.hitbox().contains(world))
    }

    /// Map size in pixels.
    #[must_use]
    pub fn pixel_size(&self) -> Point {
        let px = |blocks: u32| tile_coord(blocks * BLOCK_TILES) * crate::constants::TILE_PX;
        Point::new(px(self.width), px(self.height))
    }
}

fn tile_coord(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
