//! Presentation-side session context
//!
//! Holds what the world does not need to replay a game: the ball being
//! dragged, help and music toggles, and the turn highlight. Drag-and-drop
//! goes through here so an invalid drop can be rolled back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{CUE_BALL, GameWorld, RuleState};

/// Seconds the current-player highlight stays lit after a turn change
pub const TURN_HIGHLIGHT_SECS: f32 = 1.5;

/// A ball held by the pointer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragState {
    pub ball: u8,
    /// Ball center minus pointer at grab time
    pub grab_offset: Vec2,
    /// Where the ball was picked up; restored on an invalid drop
    pub origin: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub drag: Option<DragState>,
    pub show_help: bool,
    pub music_on: bool,
    /// Counts down after each turn change
    pub highlight_timer: f32,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            drag: None,
            show_help: false,
            music_on: true,
            highlight_timer: TURN_HIGHLIGHT_SECS,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_music(&mut self) {
        self.music_on = !self.music_on;
        log::debug!("Music {}", if self.music_on { "on" } else { "off" });
    }

    pub fn advance(&mut self, dt: f32) {
        self.highlight_timer = (self.highlight_timer - dt).max(0.0);
    }

    pub fn flash_turn(&mut self) {
        self.highlight_timer = TURN_HIGHLIGHT_SECS;
    }

    pub fn highlight_active(&self) -> bool {
        self.highlight_timer > 0.0
    }

    /// Whether the player may pick up ball `number` right now
    pub fn can_drag(world: &GameWorld, number: u8) -> bool {
        if !world.balls_stopped() || world.state.is_game_over() {
            return false;
        }
        world.config.rules.free_ball_placement
            || (number == CUE_BALL && world.state == RuleState::BallInHand)
    }

    /// Pick up the ball under the pointer. Returns true if one was grabbed.
    pub fn grab(&mut self, world: &GameWorld, pointer: Vec2) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let Some(ball) = world
            .balls
            .iter()
            .filter(|b| !b.pocketed && Self::can_drag(world, b.number))
            .find(|b| b.center.distance(pointer) <= b.radius)
        else {
            return false;
        };

        self.drag = Some(DragState {
            ball: ball.number,
            grab_offset: ball.center - pointer,
            origin: ball.center,
        });
        log::debug!("Picked up ball {}", ball.number);
        true
    }

    /// Follow the pointer with the held ball
    pub fn drag_to(&self, world: &mut GameWorld, pointer: Vec2) {
        if let Some(drag) = self.drag
            && let Some(ball) = world.balls.get_mut(drag.ball as usize)
        {
            ball.place(pointer + drag.grab_offset);
        }
    }

    /// Drop the held ball. A drop off the cloth or onto another ball puts
    /// it back where it was picked up. Returns true if the drop was kept.
    pub fn release(&mut self, world: &mut GameWorld) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        let Some(center) = world.ball_by_number(drag.ball).map(|b| b.center) else {
            return false;
        };

        if world.is_spot_free(center, drag.ball) {
            log::debug!("Placed ball {} at ({:.1}, {:.1})", drag.ball, center.x, center.y);
            true
        } else {
            world.balls[drag.ball as usize].place(drag.origin);
            log::warn!("Invalid drop for ball {}, reverted", drag.ball);
            false
        }
    }

    /// Forget any held ball without touching the world (used on re-rack)
    pub fn clear(&mut self) {
        self.drag = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn in_hand_world() -> GameWorld {
        let mut config = Config::default();
        config.rules.shuffle_rack = false;
        let mut world = GameWorld::new(3, config);
        world.state = RuleState::BallInHand;
        world
    }

    #[test]
    fn test_drag_cue_ball_in_hand() {
        let mut world = in_hand_world();
        let mut session = Session::new();
        let start = world.cue_ball().center;

        assert!(session.grab(&world, start + Vec2::new(3.0, 0.0)));
        session.drag_to(&mut world, Vec2::new(203.0, 350.0));
        assert_eq!(world.cue_ball().center, Vec2::new(200.0, 350.0));
        assert!(session.release(&mut world));
        assert_eq!(world.cue_ball().center, Vec2::new(200.0, 350.0));
        assert!(!session.is_dragging());
    }

    #[test]
    fn test_invalid_drop_reverts() {
        let mut world = in_hand_world();
        let mut session = Session::new();
        let start = world.cue_ball().center;
        let onto = world.balls[5].center;

        assert!(session.grab(&world, start));
        session.drag_to(&mut world, onto + Vec2::new(4.0, 0.0));
        assert!(!session.release(&mut world));
        assert_eq!(world.cue_ball().center, start);

        // Off the cloth
        assert!(session.grab(&world, start));
        session.drag_to(&mut world, Vec2::new(95.0, 275.0));
        assert!(!session.release(&mut world));
        assert_eq!(world.cue_ball().center, start);
    }

    #[test]
    fn test_drag_restrictions() {
        let mut world = in_hand_world();
        let mut session = Session::new();
        // Object balls stay put without free placement
        assert!(!session.grab(&world, world.balls[4].center));

        world.state = RuleState::Playing;
        assert!(!session.grab(&world, world.cue_ball().center));

        world.config.rules.free_ball_placement = true;
        assert!(session.grab(&world, world.balls[4].center));
        assert_eq!(session.drag.map(|d| d.ball), Some(4));
    }

    #[test]
    fn test_toggles_and_highlight() {
        let mut session = Session::new();
        assert!(session.music_on);
        session.toggle_music();
        session.toggle_help();
        assert!(!session.music_on);
        assert!(session.show_help);

        session.advance(2.0);
        assert!(!session.highlight_active());
        session.flash_turn();
        assert!(session.highlight_active());
    }
}
