//! The gravedigger: walk target, animation and the talk/dig flags.
use serde::{Deserialize, Serialize};

use crate::constants::{
    PERSON_HEIGHT_PX, PERSON_WIDTH_PX, PLAYER_ANIM_FRAMES, PLAYER_SPEED, PLAYER_START, WALK_MAX_X,
    WALK_MIN_X, WALK_MIN_Y, WALK_Y_OFFSET,
};
use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    x: f64,
    y: f64,
    target: Option<(f64, f64)>,
    anim_frame: u32,
    /// Set by talking to any visitor; digging is refused until then.
    pub talked_to_visitors: bool,
    /// Set by the first dig; plot input only opens afterwards.
    pub done_some_digging: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            x: PLAYER_START.0,
            y: PLAYER_START.1,
            target: None,
            anim_frame: 0,
            talked_to_visitors: false,
            done_some_digging: false,
        }
    }
}

impl Player {
    /// Feet position in world pixels.
    #[must_use]
    pub const fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    #[must_use]
    pub const fn target(&self) -> Option<(f64, f64)> {
        self.target
    }

    #[must_use]
    pub const fn anim_frame(&self) -> u32 {
        self.anim_frame
    }

    /// Walk towards a world point, kept inside the walkable area.
    pub fn walk_to(&mut self, world: Point) -> (f64, f64) {
        let tx = f64::from(world.x).clamp(WALK_MIN_X, WALK_MAX_X);
        let ty = (f64::from(world.y) + WALK_Y_OFFSET).max(WALK_MIN_Y);
        self.target = Some((tx, ty));
        (tx, ty)
    }

    /// Move one frame towards the target; stops within one step of it.
    pub fn step(&mut self) {
        let Some((tx, ty)) = self.target else {
            return;
        };
        if (self.x - tx).abs() > PLAYER_SPEED {
            self.x += PLAYER_SPEED.copysign(tx - self.x);
            self.anim_frame += 1;
        }
        if (self.y - ty).abs() > PLAYER_SPEED {
            self.y += PLAYER_SPEED.copysign(ty - self.y);
            self.anim_frame += 1;
        }
        self.anim_frame %= PLAYER_ANIM_FRAMES;
    }

    #[must_use]
    pub fn is_walking(&self) -> bool {
        self.target.is_some_and(|(tx, ty)| {
            (self.x - tx).abs() > PLAYER_SPEED || (self.y - ty).abs() > PLAYER_SPEED
        })
    }

    pub const fn reset_flags(&mut self) {
        self.talked_to_visitors = false;
        self.done_some_digging = false;
    }

    /// Sprite top-left in world pixels; the feet sit at the sprite centre.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn sprite_origin(&self) -> Point {
        Point::new(
            self.x as i32 - PERSON_WIDTH_PX / 2,
            self.y as i32 - PERSON_HEIGHT_PX / 2,
        )
    }

    /// Depth sort key; never below 1 so the player stays above the ground.
    #[must_use]
    pub fn sort_key(&self) -> i32 {
        self.sprite_origin().y.max(1)
    }

    /// Walk-cycle column on the people sheet.
    #[must_use]
    pub const fn sprite_column(&self) -> u32 {
        self.anim_frame / (PLAYER_ANIM_FRAMES / 2)
    }
}
