//! Painting game state through the host's tile and sprite interfaces.
//!
//! Sheet offsets are opaque tile coordinates into the cartridge's
//! graphics banks; nothing here knows about pixel formats.
use crate::constants::{
    PERSON_HEIGHT_PX, PERSON_WIDTH_PX, SCREEN_HEIGHT_PX, SCREEN_WIDTH_PX, SORT_MOUSE_POINTER,
    SORT_TEXT_OVERLAY,
};
use crate::dialogue::{Dialogue, label_rect};
use crate::dig::GraveVisual;
use crate::geometry::{Point, Rect};
use crate::grave::Grave;
use crate::graveyard::{BLOCK_TILES, Graveyard};
use crate::state::GameState;
use crate::{SpriteSink, TileWriter};

/// Graveyard map areas, in tiles.
pub const MAP_AREA_TILES: Point = Point::new(64, 249);
/// Full-screen text area in 6x8 glyph cells.
pub const TEXT_AREA_TILES: Point = Point::new(54, 25);
/// Title artwork area, in tiles.
pub const TITLE_AREA_TILES: Point = Point::new(32, 32);

const EMPTY_MAP_CELL: (u8, u8) = (31, 0);
const EMPTY_TEXT_CELL: (u8, u8) = (17, 0);
const GRASS_CELL: (u8, u8) = (24, 24);
const GRASS_ROWS: i32 = 256;
const POINTER_PX: i32 = 32;

// Text palette
const INK: u8 = 10;
const PAPER: u8 = 7;
const FRAME: u8 = 12;
const HIGHLIGHT_INK: u8 = 3;
const HIGHLIGHT_PAPER: u8 = 14;
const CLEAR: u8 = 16;

/// Sprites the cartridge uses, in host slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpriteId {
    GraveyardUnderlay,
    Graveyard,
    GraveyardOverlay,
    /// Zero-based roster slot.
    Visitor(usize),
    Player,
    Text,
    MousePointer,
}

/// Sheet cell for a character in the font bank; the font is laid out 32
/// glyphs per row in ASCII order.
#[must_use]
pub fn glyph(ch: char) -> (u8, u8) {
    let code = if ch.is_ascii() && !ch.is_ascii_control() {
        ch as u8
    } else {
        b'?'
    };
    (code % 32, code / 32)
}

/// Inverse of [`glyph`] for ASCII cells.
#[must_use]
pub fn char_for(primary: u8, secondary: u8) -> Option<char> {
    let code = u32::from(secondary) * 32 + u32::from(primary);
    char::from_u32(code).filter(|ch| ch.is_ascii() && !ch.is_ascii_control())
}

/// One cell of a [`TileMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub primary: u8,
    pub secondary: u8,
    pub fg: u8,
    pub bg: u8,
}

/// In-memory tile area for headless hosts; writes outside the area are
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    size: Point,
    cells: Vec<Cell>,
}

impl TileMap {
    #[must_use]
    pub fn new(size: Point) -> Self {
        let len = usize::try_from(size.x.max(0) * size.y.max(0)).unwrap_or(0);
        Self {
            size,
            cells: vec![Cell::default(); len],
        }
    }

    #[must_use]
    pub const fn size(&self) -> Point {
        self.size
    }

    fn index(&self, pos: Point) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.size.x || pos.y >= self.size.y {
            return None;
        }
        usize::try_from(pos.y * self.size.x + pos.x).ok()
    }

    #[must_use]
    pub fn get(&self, pos: Point) -> Option<Cell> {
        self.index(pos).and_then(|idx| self.cells.get(idx).copied())
    }

    /// Glyphs of one row read back as text; non-glyph cells become spaces.
    #[must_use]
    pub fn text_row(&self, y: i32) -> String {
        (0..self.size.x)
            .map(|x| {
                self.get(Point::new(x, y))
                    .filter(|cell| cell.bg != CLEAR)
                    .and_then(|cell| char_for(cell.primary, cell.secondary))
                    .unwrap_or(' ')
            })
            .collect()
    }
}

impl TileWriter for TileMap {
    fn set(&mut self, pos: Point, primary: u8, secondary: u8, fg: u8, bg: u8) {
        if let Some(idx) = self.index(pos)
            && let Some(cell) = self.cells.get_mut(idx)
        {
            *cell = Cell {
                primary,
                secondary,
                fg,
                bg,
            };
        }
    }
}

/// Copy a `size` block of sheet cells starting at `src` to `dst`.
fn blit<W: TileWriter + ?Sized>(out: &mut W, dst: Point, src: (u8, u8), size: (u8, u8)) {
    for dy in 0..size.1 {
        for dx in 0..size.0 {
            out.set(
                dst + Point::new(i32::from(dx), i32::from(dy)),
                src.0.saturating_add(dx),
                src.1.saturating_add(dy),
                0,
                0,
            );
        }
    }
}

fn block(blocks_x: u32, blocks_y: u32) -> Point {
    let tiles = |blocks: u32| i32::try_from(blocks * BLOCK_TILES).unwrap_or(i32::MAX);
    Point::new(tiles(blocks_x), tiles(blocks_y))
}

/// Title artwork, laid out 1:1 from the title sheet.
pub fn paint_title<W: TileWriter + ?Sized>(titles: &mut W) {
    for y in 0..TITLE_AREA_TILES.y {
        for x in 0..TITLE_AREA_TILES.x {
            let (col, row) = (u8::try_from(x).unwrap_or(0), u8::try_from(y).unwrap_or(0));
            titles.set(Point::new(x, y), col, row, 0, 0);
        }
    }
}

/// Place the title artwork sprite.
pub fn place_title<S: SpriteSink + ?Sized>(sink: &mut S) {
    sink.set_rect(
        SpriteId::Graveyard,
        Rect::from_size(Point::new(40, -40), 256, 256),
    );
    sink.set_visible(SpriteId::Graveyard, true);
}

/// Repaint the whole graveyard for a new level.
pub fn paint_graveyard<W: TileWriter + ?Sized>(
    yard: &Graveyard,
    underlay: &mut W,
    ground: &mut W,
    overlay: &mut W,
) {
    let area = Rect::new(Point::ZERO, MAP_AREA_TILES);
    ground.fill(area, EMPTY_MAP_CELL.0, EMPTY_MAP_CELL.1, 0, 0);
    overlay.fill(area, EMPTY_MAP_CELL.0, EMPTY_MAP_CELL.1, 0, 0);
    paint_walls(yard, ground);
    for grave in yard.graves() {
        paint_grave(grave, ground, overlay);
    }
    for y in (0..GRASS_ROWS).step_by(4) {
        for x in (0..MAP_AREA_TILES.x).step_by(4) {
            blit(underlay, Point::new(x, y), GRASS_CELL, (4, 4));
        }
    }
}

fn paint_walls<W: TileWriter + ?Sized>(yard: &Graveyard, ground: &mut W) {
    let (w, h) = (yard.width(), yard.rows());
    for by in 0..h {
        for bx in 0..w {
            let (top, bottom) = (by == 0, by + 1 == h);
            let (left, right) = (bx == 0, bx + 1 == w);
            let src = match (top, bottom, left, right) {
                (true, _, true, _) => (20, 20),
                (true, _, _, true) => (28, 20),
                (true, _, _, _) => (24, 20),
                (_, true, true, _) => (20, 28),
                (_, _, true, _) => (20, 24),
                (_, true, _, true) => (28, 28),
                (_, _, _, true) => (28, 24),
                (_, true, _, _) => (24, 28),
                _ => continue,
            };
            blit(ground, block(bx, by), src, (4, 4));
        }
    }
}

/// Paint one grave in its current state. Closed graves show the headstone,
/// a mound and the marker; open graves show the body and what they wore.
pub fn paint_grave<W: TileWriter + ?Sized>(grave: &Grave, ground: &mut W, overlay: &mut W) {
    let origin = grave.origin;
    let look = grave.look;
    blit(ground, origin, (look.headstone, 0), (4, 4));
    match grave.dig_progress().visual() {
        GraveVisual::Closed => {
            blit(ground, origin + Point::new(0, 4), (look.mound, 4), (4, 6));
            blit(overlay, origin + Point::new(0, 3), (look.marker, 4), (4, 4));
        }
        GraveVisual::Open => {
            blit(ground, origin + Point::new(0, 4), (look.body, 10), (4, 6));
            blit(overlay, origin + Point::new(0, 2), (look.worn[0], look.worn[1]), (4, 6));
        }
    }
}

fn speech_box<W: TileWriter + ?Sized>(text: &mut W, area: Rect, col: u8) {
    let (x0, y0) = (area.min.x, area.min.y);
    let (x1, y1) = (area.max.x - 1, area.max.y - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let (primary, secondary, bg) = match (y, x) {
                (y, x) if y == y0 && x == x0 => (17, 0, CLEAR),
                (y, x) if y == y0 && x == x1 => (20, 0, CLEAR),
                (y, _) if y == y0 => (18, 0, CLEAR),
                (y, x) if y == y1 && x == x0 => (17, 2, CLEAR),
                (y, x) if y == y1 && x == x1 => (20, 2, CLEAR),
                (y, _) if y == y1 => (19, 2, CLEAR),
                (_, x) if x == x0 => (17, 1, CLEAR),
                (_, x) if x == x1 => (20, 1, CLEAR),
                _ => (16, 0, PAPER),
            };
            text.set(Point::new(x, y), primary, secondary, col, bg);
        }
    }
}

fn clear_text<W: TileWriter + ?Sized>(text: &mut W, area: Rect) {
    text.fill(area, EMPTY_TEXT_CELL.0, EMPTY_TEXT_CELL.1, CLEAR, CLEAR);
}

/// Repaint both speech boxes and, when open, the plot panel. `pointer`
/// highlights the label under it.
pub fn paint_dialogue<W: TileWriter + ?Sized>(
    dialogue: &Dialogue,
    text: &mut W,
    pointer: Option<Point>,
) {
    let player_area = Rect::from_size(Point::new(13, 20), 40, 5);
    if dialogue.player_line().is_empty() {
        clear_text(text, Rect::from_size(Point::new(0, 20), TEXT_AREA_TILES.x, 5));
    } else {
        speech_box(text, player_area, FRAME);
        text.print(Point::new(14, 21), INK, PAPER, dialogue.player_line());
        text.print(Point::new(45, 20), PAPER, FRAME, " You ");
    }

    let speech = dialogue.visitor_speech();
    if speech.is_empty() {
        clear_text(text, Rect::from_size(Point::ZERO, 40, 8));
    } else {
        speech_box(text, Rect::from_size(Point::ZERO, 40, 8), FRAME);
        text.print(Point::new(1, 1), INK, PAPER, &speech.text);
        let name_len = i32::try_from(speech.speaker.len()).unwrap_or(0);
        text.print(
            Point::new(36 - name_len, 0),
            PAPER,
            FRAME,
            &format!(" {} ", speech.speaker),
        );
        if speech.speaker.starts_with("Visitor") {
            text.set(Point::new(23, 7), 18, 2, FRAME, CLEAR);
        }
    }

    let Some(plot) = dialogue.plot() else {
        return;
    };
    let lines = [
        (plot.row_labels(), plot.row(), false, 22),
        (plot.column_labels(), plot.column(), true, 23),
    ];
    for (labels, selected, column_line, y) in lines {
        for (idx, label) in labels.iter().enumerate() {
            let hovered = pointer.is_some_and(|p| label_rect(idx, column_line).contains(p));
            let (fg, bg) = if hovered || selected == Some(*label) {
                (HIGHLIGHT_INK, HIGHLIGHT_PAPER)
            } else {
                (PAPER, INK)
            };
            let x = 16 + 3 * i32::try_from(idx).unwrap_or(0);
            text.print(Point::new(x, y), fg, bg, label);
        }
    }
}

/// Position every sprite for the current frame.
pub fn place_sprites<S: SpriteSink + ?Sized>(game: &GameState, sink: &mut S, pointer: Point) {
    let camera = game.camera().offset();
    let screen = Rect::new(Point::ZERO, Point::new(SCREEN_WIDTH_PX, SCREEN_HEIGHT_PX));

    for layer in [
        SpriteId::GraveyardUnderlay,
        SpriteId::Graveyard,
        SpriteId::GraveyardOverlay,
    ] {
        sink.set_visible(layer, true);
        sink.set_rect(layer, screen);
        sink.set_viewport(layer, camera);
    }

    for (slot, visitor) in game.roster().visitors().iter().enumerate() {
        let id = SpriteId::Visitor(slot);
        sink.set_visible(id, true);
        sink.set_rect(
            id,
            Rect::from_size(visitor.position - camera, PERSON_WIDTH_PX, PERSON_HEIGHT_PX),
        );
        sink.set_viewport(id, Point::new(i32::from(visitor.variant) * PERSON_WIDTH_PX, 0));
        sink.set_sort_key(id, visitor.position.y);
    }

    let player = game.player();
    let column = i32::try_from(player.sprite_column()).unwrap_or(0);
    sink.set_visible(SpriteId::Player, true);
    sink.set_rect(
        SpriteId::Player,
        Rect::from_size(player.sprite_origin() - camera, PERSON_WIDTH_PX, PERSON_HEIGHT_PX),
    );
    sink.set_viewport(SpriteId::Player, Point::new(column * PERSON_WIDTH_PX, 0));
    sink.set_sort_key(SpriteId::Player, player.sort_key());

    sink.set_visible(SpriteId::Text, true);
    sink.set_rect(SpriteId::Text, screen);
    sink.set_sort_key(SpriteId::Text, SORT_TEXT_OVERLAY);

    sink.set_visible(SpriteId::MousePointer, true);
    sink.set_rect(
        SpriteId::MousePointer,
        Rect::from_size(pointer, POINTER_PX, POINTER_PX),
    );
    sink.set_sort_key(SpriteId::MousePointer, SORT_MOUSE_POINTER);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::dialogue::Speech;
    use crate::traits::TraitCatalog;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct RecordingSink {
        rects: BTreeMap<SpriteId, Rect>,
        sort_keys: BTreeMap<SpriteId, i32>,
    }

    impl SpriteSink for RecordingSink {
        fn set_visible(&mut self, _sprite: SpriteId, _visible: bool) {}

        fn set_rect(&mut self, sprite: SpriteId, rect: Rect) {
            self.rects.insert(sprite, rect);
        }

        fn set_viewport(&mut self, _sprite: SpriteId, _offset: Point) {}

        fn set_sort_key(&mut self, sprite: SpriteId, key: i32) {
            self.sort_keys.insert(sprite, key);
        }
    }

    fn yard() -> Graveyard {
        let mut rng = SmallRng::seed_from_u64(12);
        Graveyard::generate(1, &GameConfig::default(), TraitCatalog::standard(), &mut rng)
    }

    #[test]
    fn glyphs_round_trip_printable_ascii() {
        assert_eq!(glyph('A'), (1, 2));
        assert_eq!(char_for(1, 2), Some('A'));
        assert_eq!(glyph('\u{e9}'), glyph('?'));
    }

    #[test]
    fn closed_grave_paints_headstone_mound_and_marker() {
        let yard = yard();
        let grave = &yard.graves()[0];
        let mut ground = TileMap::new(MAP_AREA_TILES);
        let mut overlay = TileMap::new(MAP_AREA_TILES);
        paint_grave(grave, &mut ground, &mut overlay);

        let head = ground.get(grave.origin).unwrap();
        assert_eq!((head.primary, head.secondary), (grave.look.headstone, 0));
        let mound = ground.get(grave.origin + Point::new(0, 4)).unwrap();
        assert_eq!((mound.primary, mound.secondary), (grave.look.mound, 4));
        let marker = overlay.get(grave.origin + Point::new(0, 3)).unwrap();
        assert_eq!((marker.primary, marker.secondary), (grave.look.marker, 4));
    }

    #[test]
    fn walls_frame_the_map() {
        let yard = yard();
        let mut underlay = TileMap::new(MAP_AREA_TILES);
        let mut ground = TileMap::new(MAP_AREA_TILES);
        let mut overlay = TileMap::new(MAP_AREA_TILES);
        paint_graveyard(&yard, &mut underlay, &mut ground, &mut overlay);

        let corner = ground.get(Point::ZERO).unwrap();
        assert_eq!((corner.primary, corner.secondary), (20, 20));
        let bottom_right = ground.get(Point::new(60, 28)).unwrap();
        assert_eq!((bottom_right.primary, bottom_right.secondary), (28, 28));
        let inside = ground.get(Point::new(4, 4)).unwrap();
        assert_eq!((inside.primary, inside.secondary), EMPTY_MAP_CELL);
        let grass = underlay.get(Point::new(5, 100)).unwrap();
        assert_eq!((grass.primary, grass.secondary), (25, 24));
    }

    #[test]
    fn dialogue_prints_speaker_and_lines() {
        let mut dialogue = Dialogue::default();
        dialogue.player_say("Hello there");
        dialogue.visitor_say(Speech::new("Visitor 2", "Where is my...\n ...evil twin?"));
        let mut text = TileMap::new(TEXT_AREA_TILES);
        paint_dialogue(&dialogue, &mut text, None);

        assert!(text.text_row(21).contains("Hello there"));
        assert!(text.text_row(20).contains(" You "));
        assert!(text.text_row(1).contains("Where is my..."));
        assert!(text.text_row(2).contains("...evil twin?"));
        assert!(text.text_row(0).contains(" Visitor 2 "));
    }

    #[test]
    fn plot_panel_lists_available_rows() {
        let mut dialogue = Dialogue::default();
        dialogue.enable_plot_input(2);
        let mut text = TileMap::new(TEXT_AREA_TILES);
        paint_dialogue(&dialogue, &mut text, None);
        let rows = text.text_row(22);
        assert!(rows.contains("A  B"));
        assert!(!rows.contains('C'));
        assert!(text.text_row(23).contains("1  2  3  4  5"));
    }

    #[test]
    fn title_is_copied_cell_for_cell() {
        let mut titles = TileMap::new(TITLE_AREA_TILES);
        paint_title(&mut titles);
        let cell = titles.get(Point::new(3, 5)).unwrap();
        assert_eq!((cell.primary, cell.secondary), (3, 5));

        let mut sink = RecordingSink::default();
        place_title(&mut sink);
        assert_eq!(sink.rects[&SpriteId::Graveyard].min, Point::new(40, -40));
    }

    #[test]
    fn sprites_sort_text_and_pointer_on_top() {
        let game = GameState::new(GameConfig::default(), 3).unwrap();
        let mut sink = RecordingSink::default();
        place_sprites(&game, &mut sink, Point::new(10, 20));

        assert_eq!(sink.sort_keys[&SpriteId::Text], SORT_TEXT_OVERLAY);
        assert_eq!(sink.sort_keys[&SpriteId::MousePointer], SORT_MOUSE_POINTER);
        assert_eq!(sink.sort_keys[&SpriteId::Visitor(0)], 54);
        assert_eq!(sink.sort_keys[&SpriteId::Player], 96);
        assert_eq!(
            sink.rects[&SpriteId::Visitor(1)],
            Rect::from_size(Point::new(200, 54), 32, 64)
        );
        assert_eq!(sink.rects[&SpriteId::MousePointer].min, Point::new(10, 20));
    }
}
