//! Cue sticks: aim, power, hit point and the strike state machine

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ball::{BallGroup, EIGHT_BALL};
use crate::angle_between_points;
use crate::config::CueConfig;

/// Balls in one group
pub const GROUP_SIZE: usize = 7;

/// Identifies one of the two cue-stick slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn other(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Player::One => "Player 1",
            Player::Two => "Player 2",
        }
    }
}

/// Strike state machine: Ready -> Striking -> Struck -> Ready
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CueState {
    /// Aiming, waiting for the shot trigger
    Ready,
    /// Strike animation running; the shot has not reached the ball yet
    Striking { elapsed: f32 },
    /// The tip reached the ball; the world applies the shot and resets to Ready
    Struck,
}

/// Velocity and spin handed to the cue ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub velocity: Vec2,
    pub spin: Vec2,
    pub power: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueStick {
    pub player: Player,
    /// Tracks the cue ball center
    pub target: Vec2,
    /// Radians, derived from the pointer each update
    pub angle: f32,
    pub power: f32,
    pub min_power: f32,
    pub max_power: f32,
    pub power_tick: f32,
    /// Contact offset on the cue ball, each axis in [-1, 1]
    pub hit_point: Vec2,
    pub group: BallGroup,
    /// Balls of this player's group pocketed so far, in order
    pub pocketed_balls: Vec<u8>,
    pub state: CueState,
}

impl CueStick {
    pub fn new(player: Player, target: Vec2, config: &CueConfig) -> Self {
        Self {
            player,
            target,
            angle: 0.0,
            power: config.initial_power.clamp(config.min_power, config.max_power),
            min_power: config.min_power,
            max_power: config.max_power,
            power_tick: config.power_tick,
            hit_point: Vec2::ZERO,
            group: BallGroup::Undefined,
            pocketed_balls: Vec::with_capacity(GROUP_SIZE),
            state: CueState::Ready,
        }
    }

    /// Re-aim at the pointer
    pub fn aim_at(&mut self, pointer: Vec2) {
        if pointer != self.target {
            self.angle = angle_between_points(self.target, pointer);
        }
    }

    /// Wheel input: scrolling down (negative) adds power, up removes it
    pub fn adjust_power(&mut self, wheel: f32) {
        if wheel < 0.0 {
            self.power += self.power_tick;
        } else if wheel > 0.0 {
            self.power -= self.power_tick;
        }
        self.power = self.power.clamp(self.min_power, self.max_power);
    }

    /// Set the contact point, each component clamped to [-1, 1]
    pub fn set_hit_point(&mut self, hit_point: Vec2) {
        self.hit_point = hit_point.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// 0..1 position of the power between its bounds
    pub fn power_fraction(&self) -> f32 {
        let range = self.max_power - self.min_power;
        if range <= f32::EPSILON {
            return 0.0;
        }
        ((self.power - self.min_power) / range).clamp(0.0, 1.0)
    }

    /// Begin the strike animation (ignored unless Ready)
    pub fn trigger(&mut self) {
        if self.state == CueState::Ready {
            self.state = CueState::Striking { elapsed: 0.0 };
        }
    }

    /// Advance the strike animation
    pub fn update(&mut self, dt: f32, strike_duration: f32) {
        if let CueState::Striking { elapsed } = self.state {
            let elapsed = elapsed + dt;
            self.state = if elapsed >= strike_duration {
                CueState::Struck
            } else {
                CueState::Striking { elapsed }
            };
        }
    }

    /// Consume a landed strike: returns the shot and goes back to Ready
    pub fn take_shot(&mut self, spin_scale: f32) -> Option<Shot> {
        if self.state != CueState::Struck {
            return None;
        }
        self.state = CueState::Ready;
        Some(Shot {
            velocity: crate::direction_from_angle(self.angle) * self.power,
            spin: self.hit_point * spin_scale,
            power: self.power,
        })
    }

    pub fn record_pocketed(&mut self, number: u8) {
        if self.pocketed_balls.len() < GROUP_SIZE && !self.pocketed_balls.contains(&number) {
            self.pocketed_balls.push(number);
        }
    }

    /// Own-group balls pocketed so far
    pub fn group_pocketed_count(&self) -> usize {
        if self.group == BallGroup::Undefined {
            return 0;
        }
        self.pocketed_balls
            .iter()
            .filter(|&&n| self.group.contains(n))
            .count()
    }

    /// Group cleared: the 8 is now a legal target
    pub fn can_touch_eight(&self) -> bool {
        self.group != BallGroup::Undefined && self.group_pocketed_count() == GROUP_SIZE
    }

    /// Whether `number` is a legal first contact for this player
    pub fn is_legal_target(&self, number: u8) -> bool {
        if self.group == BallGroup::Undefined {
            return true;
        }
        if number == EIGHT_BALL {
            return self.can_touch_eight();
        }
        self.group.contains(number)
    }
}
