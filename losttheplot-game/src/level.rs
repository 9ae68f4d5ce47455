//! Level counter and the deferred move to the next day.
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{LOG_LEVEL_SCHEDULED, LOG_LEVEL_STARTED};
use crate::dialogue::{NEW_DAY_LINE, NEXT_DAY_LINE, Speech};
use crate::scheduler::{Deferred, TickScheduler};
use crate::visitor::Roster;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LevelPhase {
    #[default]
    Active,
    /// Every visitor is resolved; the advance fires at `fires_at`.
    Transitioning { fires_at: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgression {
    level: u32,
    phase: LevelPhase,
}

impl Default for LevelProgression {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelProgression {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            level: 1,
            phase: LevelPhase::Active,
        }
    }

    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub const fn phase(&self) -> LevelPhase {
        self.phase
    }

    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        matches!(self.phase, LevelPhase::Transitioning { .. })
    }

    /// Schedule the advance once every visitor is resolved. Returns the
    /// fire time when this call started the transition.
    pub fn check_all_resolved(
        &mut self,
        roster: &Roster,
        now: Duration,
        delay: Duration,
        scheduler: &mut TickScheduler,
    ) -> Option<Duration> {
        if self.is_transitioning() || !roster.all_resolved() {
            return None;
        }
        let fires_at = now.saturating_add(delay);
        scheduler.schedule(fires_at, Deferred::AdvanceLevel);
        self.phase = LevelPhase::Transitioning { fires_at };
        log::debug!(
            "{} | level {} complete, next day at {:?}",
            LOG_LEVEL_SCHEDULED,
            self.level,
            fires_at
        );
        Some(fires_at)
    }

    /// Move to the next level and return the new level number. The caller
    /// rebuilds the graveyard and roster for it.
    pub fn advance(&mut self) -> u32 {
        self.level = self.level.saturating_add(1);
        self.phase = LevelPhase::Active;
        log::debug!("{} | level {}", LOG_LEVEL_STARTED, self.level);
        self.level
    }

    /// The narration pair that opens a new day.
    #[must_use]
    pub fn new_day_narration(&self) -> (Speech, &'static str) {
        (
            Speech::new(format!("Level {}", self.level), NEXT_DAY_LINE),
            NEW_DAY_LINE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grave::{GraveGenerator, GridRef};
    use crate::geometry::Point;
    use crate::traits::TraitCatalog;
    use crate::visitor::MatchEngine;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn resolve_all(roster: &mut Roster) {
        let mut rng = SmallRng::seed_from_u64(8);
        let grave = GraveGenerator::new(TraitCatalog::standard()).generate(
            GridRef::new(0, 0).unwrap(),
            Point::new(8, 16),
            &mut rng,
        );
        for idx in 0..roster.len() {
            MatchEngine::evaluate(roster.get_mut(idx).unwrap(), &grave, "1", "B");
        }
    }

    #[test]
    fn transition_waits_for_every_visitor() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut roster = Roster::generate(5, 5, &mut rng).unwrap();
        let mut progression = LevelProgression::new();
        let mut scheduler = TickScheduler::new();
        let delay = Duration::from_secs(6);

        assert!(
            progression
                .check_all_resolved(&roster, Duration::ZERO, delay, &mut scheduler)
                .is_none()
        );

        resolve_all(&mut roster);
        let fires_at =
            progression.check_all_resolved(&roster, Duration::from_secs(1), delay, &mut scheduler);
        assert_eq!(fires_at, Some(Duration::from_secs(7)));
        assert!(progression.is_transitioning());

        // A second check while transitioning schedules nothing more.
        assert!(
            progression
                .check_all_resolved(&roster, Duration::from_secs(2), delay, &mut scheduler)
                .is_none()
        );
        assert_eq!(scheduler.len(), 1);
        assert_eq!(progression.level(), 1);
    }

    #[test]
    fn advance_increments_and_narrates() {
        let mut progression = LevelProgression::new();
        assert_eq!(progression.advance(), 2);
        assert_eq!(progression.phase(), LevelPhase::Active);
        let (visitor, player) = progression.new_day_narration();
        assert_eq!(visitor.speaker, "Level 2");
        assert_eq!(visitor.text, "<The next day...>");
        assert!(player.starts_with("Another new day dawns!"));
    }
}
