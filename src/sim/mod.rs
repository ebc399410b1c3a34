//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by ball number)
//! - No rendering or platform dependencies

pub mod ball;
pub mod collision;
pub mod cue;
pub mod rules;
pub mod state;
pub mod table;
pub mod tick;
pub mod trajectory;

pub use ball::{Ball, BallGroup, CUE_BALL, EIGHT_BALL, TOTAL_BALLS};
pub use collision::{
    CollisionResult, ball_convex_collision, ball_cushion_collision, ball_in_pocket,
    ball_point_sweep, ball_segment_collision, resolve_ball_ball,
};
pub use cue::{CueState, CueStick, Player, Shot};
pub use rules::{FaultReason, RuleState, TurnStatistics, Verdict, WinReason, apply_rules};
pub use state::{BallsState, GameEvent, GameWorld, HitTier};
pub use table::{Cushion, Pocket, Table};
pub use tick::{TickInput, tick};
pub use trajectory::{AimPrediction, TargetPrediction, predict};
