//! Lost the Plot Game Engine
//!
//! Platform-agnostic core of the Lost the Plot graveyard puzzle: grave
//! generation, digging, visitor matching and level progression. Drawing,
//! input and timing are supplied by the host through the traits below.

pub mod camera;
pub mod cartridge;
pub mod config;
pub mod constants;
pub mod dialogue;
pub mod dig;
pub mod geometry;
pub mod grave;
pub mod graveyard;
pub mod level;
pub mod player;
pub mod render;
pub mod rng;
pub mod scheduler;
pub mod state;
pub mod traits;
pub mod visitor;

// Re-export commonly used types
pub use camera::Camera;
pub use cartridge::{Cartridge, CartridgeMode};
pub use config::{ConfigError, GameConfig};
pub use dialogue::{Dialogue, PlotPick, PlotSelection, Speech};
pub use dig::{DigOutcome, DigProgress, GraveVisual};
pub use geometry::{Point, Rect};
pub use grave::{Grave, GraveGenerator, GraveLook, GridRef, Likes};
pub use graveyard::Graveyard;
pub use level::{LevelPhase, LevelProgression};
pub use player::Player;
pub use render::{SpriteId, TileMap};
pub use rng::{CountingRng, RngBundle};
pub use scheduler::{Deferred, TickScheduler};
pub use state::{FrameInput, FrameOutcome, GameEvent, GameSnapshot, GameState};
pub use traits::{CatalogError, Presentation, Trait, TraitCatalog, TraitCategory};
pub use visitor::{MatchEngine, Outcome, Roster, Visitor, VisitorStatus};

/// Writes tiles into one of the host's map areas.
pub trait TileWriter {
    /// Set the tile at `pos` to sheet cell (`primary`, `secondary`) with
    /// the given palette colours.
    fn set(&mut self, pos: Point, primary: u8, secondary: u8, fg: u8, bg: u8);

    /// Paint `text` one glyph per tile, starting a new line below `origin`
    /// at every `\n`.
    fn print(&mut self, origin: Point, fg: u8, bg: u8, text: &str) {
        let mut pos = origin;
        for ch in text.chars() {
            if ch == '\n' {
                pos = Point::new(origin.x, pos.y + 1);
                continue;
            }
            let (primary, secondary) = render::glyph(ch);
            self.set(pos, primary, secondary, fg, bg);
            pos.x += 1;
        }
    }

    /// Fill a tile rectangle with one cell.
    fn fill(&mut self, area: Rect, primary: u8, secondary: u8, fg: u8, bg: u8) {
        for y in area.min.y..area.max.y {
            for x in area.min.x..area.max.x {
                self.set(Point::new(x, y), primary, secondary, fg, bg);
            }
        }
    }
}

/// Hardware sprites the host composites over the maps.
pub trait SpriteSink {
    fn set_visible(&mut self, sprite: SpriteId, visible: bool);

    /// Screen rectangle the sprite is drawn into.
    fn set_rect(&mut self, sprite: SpriteId, rect: Rect);

    /// Offset into the sprite's source area, in pixels.
    fn set_viewport(&mut self, sprite: SpriteId, offset: Point);

    /// Higher keys draw on top.
    fn set_sort_key(&mut self, sprite: SpriteId, key: i32);
}

/// Pointer state sampled once per frame.
pub trait PointerInput {
    /// Position in screen pixels.
    fn position(&self) -> Point;

    /// True only on the frame the button went down.
    fn pressed(&self) -> bool;
}

impl FrameInput {
    /// Sample the host pointer for this frame.
    pub fn poll<P: PointerInput + ?Sized>(pointer: &P, now: std::time::Duration) -> Self {
        Self {
            now,
            pointer: pointer.position(),
            pressed: pointer.pressed(),
        }
    }
}
