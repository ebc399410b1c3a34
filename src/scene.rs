//! Read-only scene snapshot for an external renderer
//!
//! Nothing here feeds back into the simulation. A frontend captures a
//! [`Scene`] after each tick and draws it however it likes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;
use crate::session::Session;
use crate::sim::{
    AimPrediction, BallGroup, CUE_BALL, EIGHT_BALL, GameWorld, Player, predict,
};

/// Stick pull-back at full power, on top of the resting gap
pub const MAX_PULL_BACK: f32 = 80.0;

/// Colors for table elements and balls
pub mod colors {
    pub const CLOTH: [f32; 4] = [0.05, 0.45, 0.2, 1.0];
    pub const RAIL: [f32; 4] = [0.35, 0.2, 0.1, 1.0];
    pub const CUSHION: [f32; 4] = [0.04, 0.36, 0.16, 1.0];
    pub const POCKET: [f32; 4] = [0.02, 0.02, 0.02, 1.0];
    pub const CUE_STICK: [f32; 4] = [0.5, 0.33, 0.17, 1.0];

    pub const WHITE: [f32; 4] = [0.96, 0.96, 0.94, 1.0];
    pub const BLACK: [f32; 4] = [0.06, 0.06, 0.06, 1.0];
    pub const YELLOW: [f32; 4] = [0.99, 0.85, 0.1, 1.0];
    pub const BLUE: [f32; 4] = [0.1, 0.3, 0.85, 1.0];
    pub const RED: [f32; 4] = [0.9, 0.15, 0.15, 1.0];
    pub const PURPLE: [f32; 4] = [0.45, 0.15, 0.6, 1.0];
    pub const ORANGE: [f32; 4] = [1.0, 0.5, 0.05, 1.0];
    pub const GREEN: [f32; 4] = [0.0, 0.55, 0.25, 1.0];
    pub const BROWN: [f32; 4] = [0.5, 0.2, 0.1, 1.0];

    /// Solid colors in ball order (1-7); stripes 9-15 reuse them
    pub const BALL_PALETTE: [[f32; 4]; 7] = [YELLOW, BLUE, RED, PURPLE, ORANGE, GREEN, BROWN];
}

/// Color of a ball by number
pub fn ball_color(number: u8) -> [f32; 4] {
    match number {
        CUE_BALL => colors::WHITE,
        EIGHT_BALL => colors::BLACK,
        1..=7 => colors::BALL_PALETTE[(number - 1) as usize],
        9..=15 => colors::BALL_PALETTE[(number - 9) as usize],
        _ => colors::WHITE,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallView {
    pub number: u8,
    pub center: Vec2,
    pub radius: f32,
    pub color: [f32; 4],
    pub striped: bool,
    pub moving: bool,
    pub pocketed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PocketView {
    pub center: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueView {
    pub player: Player,
    /// Cue ball center
    pub target: Vec2,
    pub angle: f32,
    pub power_fraction: f32,
    /// Gap between the tip and the cue ball
    pub pull_back: f32,
    pub length: f32,
    pub hit_point: Vec2,
}

/// Fill colors for the static table and the stick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableColors {
    pub cloth: [f32; 4],
    pub rail: [f32; 4],
    pub cushion: [f32; 4],
    pub pocket: [f32; 4],
    pub cue_stick: [f32; 4],
}

impl Default for TableColors {
    fn default() -> Self {
        Self {
            cloth: colors::CLOTH,
            rail: colors::RAIL,
            cushion: colors::CUSHION,
            pocket: colors::POCKET,
            cue_stick: colors::CUE_STICK,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub player: Player,
    pub group: BallGroup,
    pub pocketed_balls: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hud {
    pub state: String,
    pub current: Player,
    pub players: [PlayerView; 2],
    pub pocketed_history: Vec<u8>,
    pub winner: Option<Player>,
    /// 0..1 fade of the current-player highlight
    pub highlight: f32,
    pub show_help: bool,
    pub music_on: bool,
}

/// Everything a frontend needs to draw one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub bounds: Rect,
    pub colors: TableColors,
    pub cushions: Vec<[Vec2; 4]>,
    pub pockets: Vec<PocketView>,
    pub balls: Vec<BallView>,
    /// Only while the table is at rest and no ball is held
    pub cue: Option<CueView>,
    pub aim: Option<AimPrediction>,
    pub hud: Hud,
}

impl Scene {
    pub fn capture(world: &GameWorld, session: &Session) -> Self {
        let balls = world
            .balls
            .iter()
            .map(|b| BallView {
                number: b.number,
                center: b.center,
                radius: b.radius,
                color: ball_color(b.number),
                striped: b.striped,
                moving: b.is_in_motion(),
                pocketed: b.pocketed,
            })
            .collect();

        let aiming = world.balls_stopped()
            && !session.is_dragging()
            && !world.state.is_game_over()
            && !world.cue_ball().pocketed;

        let cue = aiming.then(|| {
            let stick = world.current_stick();
            let power_fraction = stick.power_fraction();
            CueView {
                player: stick.player,
                target: stick.target,
                angle: stick.angle,
                power_fraction,
                pull_back: world.config.cue.distance_from_target + power_fraction * MAX_PULL_BACK,
                length: world.config.cue.length,
                hit_point: stick.hit_point,
            }
        });
        let aim = aiming.then(|| predict(world));

        let player_view = |player: Player| {
            let stick = world.stick(player);
            PlayerView {
                player,
                group: stick.group,
                pocketed_balls: stick.pocketed_balls.clone(),
            }
        };

        let hud = Hud {
            state: world.state.name().to_string(),
            current: world.current,
            players: [player_view(Player::One), player_view(Player::Two)],
            pocketed_history: world.pocketed_history.clone(),
            winner: world.winner(),
            highlight: (session.highlight_timer / crate::session::TURN_HIGHLIGHT_SECS).clamp(0.0, 1.0),
            show_help: session.show_help,
            music_on: session.music_on,
        };

        Self {
            bounds: world.table.bounds,
            colors: TableColors::default(),
            cushions: world.table.cushions.iter().map(|c| c.vertices).collect(),
            pockets: world
                .table
                .pockets
                .iter()
                .map(|p| PocketView {
                    center: p.center,
                    radius: p.radius,
                })
                .collect(),
            balls,
            cue,
            aim,
            hud,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
