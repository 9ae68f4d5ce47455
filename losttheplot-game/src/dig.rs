//! Dig progression for a single grave.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Flavor lines per dig stage; index is the dig count after the dig.
/// Stage 0 is never reached because a dig always increments first.
pub const DIGGING_PHRASES: [&[&str]; 10] = [
    &[""],
    &[
        "<digs> Let's dig this!",
        "<digs> Open says me!",
        "<digs> I'm a tomb spader!",
        "<digs> I'm a whom raider!",
        "<digs> Plot twist!",
    ],
    &["<digs more>"],
    &["<digs more>", "<digs more> Phew!"],
    &["<digs yet more>"],
    &["<digs more>", "<digs more> Hit a stone!"],
    &["<digs even more>"],
    &["<digs more> Oof!", "<digs more> Feels like clay!"],
    &["<digs more> Almost there!", "<digs more> Regulation depth!"],
    &["*thunk* *thunk*", "*thud* *thud*", "*tink* *tink*"],
];

/// What a grave looks like from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GraveVisual {
    #[default]
    Closed,
    Open,
}

/// Result of a single dig action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigOutcome {
    /// Still digging; the camera shakes.
    Progress { stage: u32, line: &'static str },
    /// This dig reached the configured depth.
    Uncovered,
    /// The grave was already open.
    AlreadyOpen,
}

impl DigOutcome {
    #[must_use]
    pub const fn shakes_camera(&self) -> bool {
        matches!(self, Self::Progress { .. })
    }
}

/// Dig counter with its open threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigProgress {
    count: u32,
    depth: u32,
    visual: GraveVisual,
}

impl DigProgress {
    #[must_use]
    pub const fn new(depth: u32) -> Self {
        Self {
            count: 0,
            depth,
            visual: GraveVisual::Closed,
        }
    }

    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    #[must_use]
    pub const fn visual(&self) -> GraveVisual {
        self.visual
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.visual, GraveVisual::Open)
    }

    /// Increment the counter and report which stage was reached. Digging an
    /// open grave is harmless and can be repeated indefinitely.
    pub fn dig<R: Rng + ?Sized>(&mut self, rng: &mut R) -> DigOutcome {
        self.count = self.count.saturating_add(1);
        if self.count < self.depth {
            DigOutcome::Progress {
                stage: self.count,
                line: stage_line(self.count, rng),
            }
        } else if self.count == self.depth {
            self.visual = GraveVisual::Open;
            DigOutcome::Uncovered
        } else {
            DigOutcome::AlreadyOpen
        }
    }
}

fn stage_line<R: Rng + ?Sized>(stage: u32, rng: &mut R) -> &'static str {
    let pool = usize::try_from(stage)
        .ok()
        .and_then(|idx| DIGGING_PHRASES.get(idx))
        .copied()
        .unwrap_or(DIGGING_PHRASES[DIGGING_PHRASES.len() - 1]);
    pool.choose(rng).copied().unwrap_or_default()
}
