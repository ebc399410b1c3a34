//! Eight Ball - A two-player 8-ball pool simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (integration, collisions, rules)
//! - `config`: Data-driven physics/cue/rule tuning
//! - `session`: UI session context (drag-and-drop, toggles, timers)
//! - `scene`: Read-only snapshot for an external renderer
//! - `audio`: Maps simulation events to sound cues
//! - `game`: Fixed-timestep frame driver for frontends

pub mod audio;
pub mod config;
pub mod error;
pub mod game;
pub mod scene;
pub mod session;
pub mod sim;

pub use config::Config;
pub use error::ConfigError;
pub use session::Session;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (friction is applied once per step)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Playable cloth area (inside the cushions)
    pub const TABLE_X: f32 = 100.0;
    pub const TABLE_Y: f32 = 100.0;
    pub const TABLE_WIDTH: f32 = 700.0;
    pub const TABLE_HEIGHT: f32 = 350.0;
    /// Width of the wooden rail around the cloth
    pub const TABLE_MARGIN: f32 = 40.0;

    /// Number of object balls (cue ball excluded)
    pub const BALL_COUNT: usize = 15;
    pub const BALL_RADIUS: f32 = 10.0;
    /// Per-step multiplicative velocity damping
    pub const BALL_FRICTION: f32 = 0.99;
    /// Fraction of speed kept after a cushion bounce
    pub const BALL_RESTITUTION: f32 = 0.9;
    /// Below this speed (units/s) a ball snaps to rest
    pub const STOP_THRESHOLD: f32 = 0.5;
    /// Gap between racked balls so the rack starts without overlap
    pub const RACK_GAP: f32 = 0.5;

    /// Cue ball speed above which a ball-ball hit counts as hard
    pub const HARD_HIT_SPEED: f32 = 400.0;

    /// Cue stick defaults
    pub const CUE_INITIAL_POWER: f32 = 400.0;
    pub const CUE_MIN_POWER: f32 = 0.0;
    pub const CUE_MAX_POWER: f32 = 1400.0;
    pub const CUE_POWER_TICK: f32 = 10.0;
    pub const CUE_LENGTH: f32 = 300.0;
    /// Seconds the stick spends in its strike animation before the shot lands
    pub const CUE_STRIKE_DURATION: f32 = 0.1;

    /// Spin coupling on cushion contact
    pub const SPIN_FROM_HIT_POINT: f32 = 2.0;
    pub const SPIN_TRANSFER: f32 = 0.3;
    pub const SPIN_DECAY: f32 = 0.7;

    /// Positional push along the cushion normal after a bounce
    pub const CUSHION_NUDGE: f32 = 0.1;
    /// Slack on segment endpoints before falling back to vertex sweeps
    pub const SEGMENT_END_TOLERANCE: f32 = 0.1;

    /// Distinct balls that must reach a cushion for a legal break
    pub const BREAK_MIN_CUSHION_BALLS: usize = 4;
}

/// Unit direction for an angle in radians
#[inline]
pub fn direction_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle (radians) of the vector pointing from `from` to `to`
#[inline]
pub fn angle_between_points(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Grow the rectangle by `amount` on every side
    pub fn expanded(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}
