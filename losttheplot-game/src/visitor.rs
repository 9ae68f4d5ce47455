//! Visitors, the roster for one level, and guess evaluation.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    LOG_VISITOR_RESOLVED, PERSON_HEIGHT_PX, PERSON_WIDTH_PX, TILE_PX, VISITOR_FIRST_X,
    VISITOR_OFFSTAGE_Y, VISITOR_SPACING_X, VISITOR_VARIANT_COUNT, VISITOR_VARIANT_FIRST,
    VISITOR_Y,
};
use crate::dialogue::Speech;
use crate::geometry::{Point, Rect};
use crate::grave::Grave;

pub const HAPPY_LINE: &str = "It's so nice to see them\nagain! Although with perhaps\na touch more clarity than\nexpected...\n\nThank you!";
pub const ANGRY_LINE: &str = "You couldn't be more wrong!\nI'm off in a huff!\nTwo, if I can manage it!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
}

impl Outcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisitorStatus {
    #[default]
    Waiting,
    Resolved(Outcome),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visitor {
    /// 1-based display number.
    pub ordinal: usize,
    /// Index of the target grave in the level's graveyard.
    pub grave: usize,
    pub status: VisitorStatus,
    /// Top-left corner in world pixels.
    pub position: Point,
    /// `None` once the visitor can no longer be clicked.
    pub hitbox: Option<Rect>,
    /// Sprite column on the people sheet.
    pub variant: u8,
}

impl Visitor {
    /// Place the visitor at its slot in the queue by the gate.
    #[must_use]
    pub fn new(ordinal: usize, grave: usize, variant: u8) -> Self {
        let slot = i32::try_from(ordinal.saturating_sub(1)).unwrap_or(0);
        let position = Point::new(VISITOR_FIRST_X + slot * VISITOR_SPACING_X, VISITOR_Y);
        Self {
            ordinal,
            grave,
            status: VisitorStatus::Waiting,
            position,
            hitbox: Some(Rect::from_size(position, PERSON_WIDTH_PX, PERSON_HEIGHT_PX)),
            variant,
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self.status, VisitorStatus::Resolved(_))
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        match self.status {
            VisitorStatus::Waiting => None,
            VisitorStatus::Resolved(outcome) => Some(outcome),
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        format!("Visitor {}", self.ordinal)
    }

    /// The visitor asking after their relative.
    #[must_use]
    pub fn ask(&self, grave: &Grave) -> Speech {
        Speech::new(self.name(), grave.describe())
    }

    /// What the visitor says once their guess is judged.
    #[must_use]
    pub fn react(&self, outcome: Outcome) -> Speech {
        match outcome {
            Outcome::Correct => Speech::new(format!("Happy {}", self.name()), HAPPY_LINE),
            Outcome::Incorrect => Speech::new(format!("Angry {}", self.name()), ANGRY_LINE),
        }
    }
}

/// Judges a submitted plot against a visitor's target grave.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchEngine;

impl MatchEngine {
    /// Compare the submitted row and column with the grave's true
    /// coordinate and resolve the visitor with the result. Exact string
    /// equality; no normalisation is applied.
    pub fn evaluate(visitor: &mut Visitor, grave: &Grave, column: &str, row: &str) -> Outcome {
        let submitted = format!("{row}{column}");
        let actual = format!("{}{}", grave.grid.row_label(), grave.grid.column_label());

        let outcome = if submitted == actual {
            visitor.position = Point::new(
                (grave.origin.x + 3) * TILE_PX,
                (grave.origin.y + 2) * TILE_PX,
            );
            Outcome::Correct
        } else {
            visitor.position.y = VISITOR_OFFSTAGE_Y;
            Outcome::Incorrect
        };
        visitor.hitbox = None;
        visitor.status = VisitorStatus::Resolved(outcome);

        log::debug!(
            "{} | visitor {} guessed {submitted} for {actual}: {}",
            LOG_VISITOR_RESOLVED,
            visitor.ordinal,
            outcome.as_str()
        );
        outcome
    }
}

/// The visitors of one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Roster {
    visitors: Vec<Visitor>,
    current: Option<usize>,
}

impl Roster {
    /// Draw `size` visitors, each bound to a uniformly random grave index
    /// below `grave_count`. Targets may repeat.
    ///
    /// Returns `None` when there is no grave to bind a visitor to.
    pub fn generate<R: Rng + ?Sized>(
        size: usize,
        grave_count: usize,
        rng: &mut R,
    ) -> Option<Self> {
        if grave_count == 0 {
            return None;
        }
        let visitors = (1..=size)
            .map(|ordinal| {
                let grave = rng.gen_range(0..grave_count);
                let variant = VISITOR_VARIANT_FIRST + rng.gen_range(0..VISITOR_VARIANT_COUNT);
                Visitor::new(ordinal, grave, variant)
            })
            .collect();
        Some(Self {
            visitors,
            current: None,
        })
    }

    #[must_use]
    pub fn visitors(&self) -> &[Visitor] {
        &self.visitors
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&Visitor> {
        self.visitors.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Visitor> {
        self.visitors.get_mut(idx)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }

    /// Index of the visitor last talked to.
    #[must_use]
    pub const fn current(&self) -> Option<usize> {
        self.current
    }

    pub const fn set_current(&mut self, idx: Option<usize>) {
        self.current = idx;
    }

    /// First visitor whose hitbox holds the world point.
    #[must_use]
    pub fn hit_test(&self, world: Point) -> Option<usize> {
        self.visitors
            .iter()
            .position(|visitor| visitor.hitbox.is_some_and(|hitbox| hitbox.contains(world)))
    }

    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.visitors.iter().filter(|v| v.is_resolved()).count()
    }

    #[must_use]
    pub fn all_resolved(&self) -> bool {
        !self.visitors.is_empty() && self.resolved_count() == self.visitors.len()
    }

    #[must_use]
    pub fn count_outcome(&self, outcome: Outcome) -> usize {
        self.visitors
            .iter()
            .filter(|v| v.outcome() == Some(outcome))
            .count()
    }
}
