//! Centralized tuning constants for Lost the Plot game logic.
//!
//! Values that a host may want to override at start-up live in
//! [`crate::config::GameConfig`]; everything here is part of the puzzle's
//! fixed rules.

// Grid alphabets -----------------------------------------------------------
pub const COLUMN_LABELS: [&str; 5] = ["1", "2", "3", "4", "5"];
pub const ROW_LABELS: [&str; 9] = ["A", "B", "C", "D", "E", "F", "G", "H", "I"];

// Digging ------------------------------------------------------------------
pub const DIG_DEPTH: u32 = 10;

// Level sizing -------------------------------------------------------------
pub(crate) const DEFAULT_ROSTER_SIZE: usize = 5;
pub(crate) const DEFAULT_BASE_ROWS: u32 = 4;
pub(crate) const DEFAULT_ROWS_PER_LEVEL: u32 = 4;
pub(crate) const DEFAULT_PLOT_WIDTH: u32 = 16;
pub(crate) const DEFAULT_TRANSITION_DELAY_MS: u64 = 6_000;

// Camera shake -------------------------------------------------------------
pub(crate) const DEFAULT_SHAKE_STEPS: u32 = 10;
pub(crate) const DEFAULT_SHAKE_INTERVAL_MS: u64 = 16;
pub(crate) const DEFAULT_SHAKE_AMPLITUDE: f64 = 5.0;

// Map geometry (tile units; one tile is 8 px) -------------------------------
pub const TILE_PX: i32 = 8;
pub(crate) const GRAVE_FIRST_X: u32 = 8;
pub(crate) const GRAVE_STEP_X: u32 = 11;
pub(crate) const GRAVE_FIRST_Y: u32 = 16;
pub(crate) const GRAVE_STEP_Y: u32 = 16;
pub(crate) const GRAVE_WIDTH_TILES: i32 = 4;
pub(crate) const GRAVE_HEIGHT_TILES: i32 = 10;

// People -------------------------------------------------------------------
pub(crate) const VISITOR_FIRST_X: i32 = 160;
pub(crate) const VISITOR_SPACING_X: i32 = 40;
pub(crate) const VISITOR_Y: i32 = 54;
pub const PERSON_WIDTH_PX: i32 = 32;
pub const PERSON_HEIGHT_PX: i32 = 64;
pub(crate) const VISITOR_OFFSTAGE_Y: i32 = -128;
pub(crate) const VISITOR_VARIANT_FIRST: u8 = 3;
pub(crate) const VISITOR_VARIANT_COUNT: u8 = 4;
pub(crate) const PLAYER_START: (f64, f64) = (128.0, 128.0);
pub(crate) const PLAYER_SPEED: f64 = 2.0;
pub(crate) const PLAYER_ANIM_FRAMES: u32 = 20;
pub(crate) const WALK_MIN_X: f64 = 40.0;
pub(crate) const WALK_MAX_X: f64 = 470.0;
pub(crate) const WALK_MIN_Y: f64 = 20.0;
pub(crate) const WALK_Y_OFFSET: f64 = -20.0;

// Screen -------------------------------------------------------------------
pub const SCREEN_WIDTH_PX: i32 = 320;
pub const SCREEN_HEIGHT_PX: i32 = 200;
/// Speech panel at the bottom of the screen; clicks here never reach the world.
pub(crate) const PLOT_PANEL_TOP_PX: i32 = 152;

// Draw order ---------------------------------------------------------------
pub const SORT_TEXT_OVERLAY: i32 = 88_888;
pub const SORT_MOUSE_POINTER: i32 = 99_999;

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_GRAVE_OPENED: &str = "log.grave.opened";
pub(crate) const LOG_VISITOR_RESOLVED: &str = "log.visitor.resolved";
pub(crate) const LOG_LEVEL_SCHEDULED: &str = "log.level.scheduled";
pub(crate) const LOG_LEVEL_STARTED: &str = "log.level.started";
