//! Ball entity and motion integrator

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Number of the cue ball
pub const CUE_BALL: u8 = 0;
/// Number of the black ball
pub const EIGHT_BALL: u8 = 8;
/// Cue ball + 15 object balls
pub const TOTAL_BALLS: usize = 16;

/// The two object-ball groups a player can own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BallGroup {
    /// Not yet assigned (open table)
    #[default]
    Undefined,
    /// Solids, balls 1-7
    Plain,
    /// Stripes, balls 9-15
    Striped,
}

impl BallGroup {
    /// Group a ball number belongs to (cue ball and 8 belong to none)
    pub fn of(number: u8) -> Self {
        match number {
            1..=7 => BallGroup::Plain,
            9..=15 => BallGroup::Striped,
            _ => BallGroup::Undefined,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            BallGroup::Plain => BallGroup::Striped,
            BallGroup::Striped => BallGroup::Plain,
            BallGroup::Undefined => BallGroup::Undefined,
        }
    }

    /// Whether `number` counts for this group. An undefined group accepts
    /// every ball except the 8 and the cue ball.
    pub fn contains(self, number: u8) -> bool {
        match self {
            BallGroup::Undefined => number != EIGHT_BALL && number != CUE_BALL,
            group => BallGroup::of(number) == group,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BallGroup::Undefined => "Undefined",
            BallGroup::Plain => "Plain",
            BallGroup::Striped => "Striped",
        }
    }
}

/// A pool ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub number: u8,
    pub center: Vec2,
    /// Center at the start of the current step (swept collision origin)
    pub prev_pos: Vec2,
    pub velocity: Vec2,
    /// Side spin (x) and top/back spin (y); only the cue ball carries it
    pub spin: Vec2,
    pub radius: f32,
    /// Per-step multiplicative damping
    pub friction: f32,
    /// Speed fraction kept on cushion bounce
    pub restitution: f32,
    pub moving: bool,
    pub striped: bool,
    pub pocketed: bool,
}

impl Ball {
    pub fn new(number: u8, center: Vec2, radius: f32, friction: f32, restitution: f32) -> Self {
        Self {
            number,
            center,
            prev_pos: center,
            velocity: Vec2::ZERO,
            spin: Vec2::ZERO,
            radius,
            friction,
            restitution,
            moving: false,
            striped: number > EIGHT_BALL,
            pocketed: false,
        }
    }

    pub fn is_cue_ball(&self) -> bool {
        self.number == CUE_BALL
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// True while the ball still has somewhere to go this turn.
    /// A ball that was just struck has velocity before its next integration.
    pub fn is_in_motion(&self) -> bool {
        !self.pocketed && (self.moving || self.velocity != Vec2::ZERO)
    }

    /// Semi-implicit Euler step with a single per-step damping factor.
    ///
    /// Damping is applied once per step and is not scaled by `dt`, so
    /// deceleration depends on the fixed step rate.
    pub fn update(&mut self, dt: f32, stop_threshold: f32) {
        self.center += self.velocity * dt;
        self.velocity *= self.friction;

        if self.velocity.length() < stop_threshold {
            self.velocity = Vec2::ZERO;
            self.moving = false;
        } else {
            self.moving = true;
        }
    }

    /// Put the ball at rest at `center` (respot, drag-and-drop)
    pub fn place(&mut self, center: Vec2) {
        self.center = center;
        self.prev_pos = center;
        self.velocity = Vec2::ZERO;
        self.spin = Vec2::ZERO;
        self.moving = false;
    }

    /// Remove the ball from play
    pub fn capture(&mut self) {
        self.pocketed = true;
        self.velocity = Vec2::ZERO;
        self.spin = Vec2::ZERO;
        self.moving = false;
    }
}
