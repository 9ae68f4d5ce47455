//! Speech boxes and the plot selection panel.
use serde::{Deserialize, Serialize};

use crate::constants::{
    COLUMN_LABELS, PLOT_PANEL_TOP_PX, ROW_LABELS, SCREEN_HEIGHT_PX, SCREEN_WIDTH_PX,
};
use crate::geometry::{Point, Rect};

pub const OPENING_LINE: &str =
    "I must talk to the visitors.\nAfter all, I'm here to help\nfind who they're looking for.";
pub const TALK_FIRST_LINE: &str = "I should talk to the visitors\nbefore I get digging!";
pub const PLOT_PROMPT: &str = "They're in plot...";
pub const NEXT_DAY_LINE: &str = "<The next day...>";
pub const NEW_DAY_LINE: &str =
    "Another new day dawns!\nHas the graveyard got bigger!?\nMust be my eyes...";

/// The guess line the player says before a visitor reacts.
#[must_use]
pub fn submission_line(row: &str, column: &str) -> String {
    format!("They're 100% in {row}{column}.\nNo doubt. I'm almost certain\nthat I'm probably right.")
}

/// One filled speech box. An empty text means the box is hidden.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Speech {
    pub speaker: String,
    pub text: String,
}

impl Speech {
    #[must_use]
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Which label a panel click picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotPick {
    Row(&'static str),
    Column(&'static str),
}

// Panel glyph layout in screen pixels; labels sit three glyph cells apart.
const PANEL_GLYPH_PX: i32 = 6;
const PANEL_FIRST_X: i32 = 97;
const PANEL_LABEL_STEP_X: i32 = 18;
const PANEL_ROW_Y: i32 = 176;
const PANEL_COLUMN_Y: i32 = 184;
const PANEL_LINE_PX: i32 = 8;

/// Screen rectangle of the `idx`-th label on the row line or column line.
#[must_use]
pub fn label_rect(idx: usize, column_line: bool) -> Rect {
    let step = i32::try_from(idx).unwrap_or(0) * PANEL_LABEL_STEP_X;
    let y = if column_line { PANEL_COLUMN_Y } else { PANEL_ROW_Y };
    Rect::from_size(
        Point::new(PANEL_FIRST_X + step, y),
        PANEL_GLYPH_PX,
        PANEL_LINE_PX,
    )
}

/// Open plot input: which row letters are on offer and what is picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotSelection {
    rows_available: usize,
    row: Option<usize>,
    column: Option<usize>,
}

impl PlotSelection {
    #[must_use]
    pub fn new(rows_available: usize) -> Self {
        Self {
            rows_available: rows_available.min(ROW_LABELS.len()),
            row: None,
            column: None,
        }
    }

    #[must_use]
    pub fn row_labels(&self) -> &'static [&'static str] {
        let labels: &'static [&'static str] = &ROW_LABELS;
        &labels[..self.rows_available]
    }

    #[must_use]
    pub fn column_labels(&self) -> &'static [&'static str] {
        &COLUMN_LABELS
    }

    #[must_use]
    pub fn row(&self) -> Option<&'static str> {
        self.row.map(|idx| ROW_LABELS[idx])
    }

    #[must_use]
    pub fn column(&self) -> Option<&'static str> {
        self.column.map(|idx| COLUMN_LABELS[idx])
    }

    /// Pick a row letter; letters beyond the current rows are ignored.
    pub fn select_row(&mut self, label: &str) -> bool {
        let found = self.row_labels().iter().position(|row| *row == label);
        if found.is_some() {
            self.row = found;
        }
        found.is_some()
    }

    pub fn select_column(&mut self, label: &str) -> bool {
        let found = COLUMN_LABELS.iter().position(|column| *column == label);
        if found.is_some() {
            self.column = found;
        }
        found.is_some()
    }

    /// Row and column once both are picked.
    #[must_use]
    pub fn complete(&self) -> Option<(&'static str, &'static str)> {
        Some((self.row()?, self.column()?))
    }

    /// The label under a screen point, if any.
    #[must_use]
    pub fn pick_at(&self, screen: Point) -> Option<PlotPick> {
        let row = self
            .row_labels()
            .iter()
            .enumerate()
            .find(|(idx, _)| label_rect(*idx, false).contains(screen))
            .map(|(_, label)| PlotPick::Row(*label));
        row.or_else(|| {
            self.column_labels()
                .iter()
                .enumerate()
                .find(|(idx, _)| label_rect(*idx, true).contains(screen))
                .map(|(_, label)| PlotPick::Column(*label))
        })
    }

    pub fn apply(&mut self, pick: PlotPick) {
        match pick {
            PlotPick::Row(label) => self.select_row(label),
            PlotPick::Column(label) => self.select_column(label),
        };
    }
}

/// Both speech boxes and the plot panel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dialogue {
    player: String,
    visitor: Speech,
    plot: Option<PlotSelection>,
}

impl Dialogue {
    #[must_use]
    pub fn player_line(&self) -> &str {
        &self.player
    }

    #[must_use]
    pub const fn visitor_speech(&self) -> &Speech {
        &self.visitor
    }

    /// Replace the player's line. An empty line hides the box and closes
    /// plot input.
    pub fn player_say(&mut self, text: impl Into<String>) {
        self.player = text.into();
        if self.player.is_empty() {
            self.plot = None;
        }
    }

    pub fn visitor_say(&mut self, speech: Speech) {
        self.visitor = speech;
    }

    pub fn clear_visitor(&mut self) {
        self.visitor = Speech::default();
    }

    /// Open a fresh plot selection offering `rows_available` row letters.
    pub fn enable_plot_input(&mut self, rows_available: usize) {
        self.player = PLOT_PROMPT.to_string();
        self.plot = Some(PlotSelection::new(rows_available));
    }

    #[must_use]
    pub const fn plot(&self) -> Option<&PlotSelection> {
        self.plot.as_ref()
    }

    pub const fn plot_mut(&mut self) -> Option<&mut PlotSelection> {
        self.plot.as_mut()
    }

    #[must_use]
    pub const fn plot_input_open(&self) -> bool {
        self.plot.is_some()
    }

    /// Clicks inside this screen area never reach the world while plot
    /// input is open.
    #[must_use]
    pub const fn panel_rect() -> Rect {
        Rect::new(
            Point::new(0, PLOT_PANEL_TOP_PX),
            Point::new(SCREEN_WIDTH_PX, SCREEN_HEIGHT_PX),
        )
    }
}
