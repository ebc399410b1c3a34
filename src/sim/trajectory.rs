//! Aim prediction: where the cue ball meets the first ball on its line

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::GameWorld;
use crate::direction_from_angle;

/// Ray length when nothing is in the way
pub const MAX_PREDICTION_DISTANCE: f32 = 2000.0;
/// Target speed estimate at full power
pub const PREDICTED_SPEED_SCALE: f32 = 300.0;

/// First ball on the aim line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPrediction {
    pub ball: u8,
    /// Point on the target's surface the cue ball touches
    pub contact: Vec2,
    /// Departure direction of the target (unit)
    pub direction: Vec2,
    /// Rough speed estimate from the stick power
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimPrediction {
    pub origin: Vec2,
    pub direction: Vec2,
    /// Cue ball center at contact (ghost ball), or the end of the ray
    pub stop_point: Vec2,
    pub target: Option<TargetPrediction>,
}

/// Cast the current stick's aim line from the cue ball
pub fn predict(world: &GameWorld) -> AimPrediction {
    let cue = world.cue_ball();
    let stick = world.current_stick();
    let origin = cue.center;
    let direction = direction_from_angle(stick.angle);

    let mut closest: Option<(f32, u8)> = None;
    for ball in world.balls.iter().filter(|b| !b.pocketed && !b.is_cue_ball()) {
        let projection = (ball.center - origin).dot(direction);
        if projection < 0.0 {
            continue;
        }
        let offset = ball.center.distance(origin + direction * projection);
        let sum_radii = cue.radius + ball.radius;
        if offset >= sum_radii {
            continue;
        }

        let distance = projection - (sum_radii * sum_radii - offset * offset).sqrt();
        if distance > 0.0 && closest.is_none_or(|(d, _)| distance < d) {
            closest = Some((distance, ball.number));
        }
    }

    let Some((distance, number)) = closest else {
        return AimPrediction {
            origin,
            direction,
            stop_point: origin + direction * MAX_PREDICTION_DISTANCE,
            target: None,
        };
    };

    let stop_point = origin + direction * distance;
    let target_center = world.balls[number as usize].center;
    let target_radius = world.balls[number as usize].radius;
    let impact = (target_center - stop_point).normalize_or_zero();

    AimPrediction {
        origin,
        direction,
        stop_point,
        target: Some(TargetPrediction {
            ball: number,
            contact: target_center - impact * target_radius,
            direction: impact,
            speed: stick.power_fraction() * PREDICTED_SPEED_SCALE,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sim::CUE_BALL;

    fn world_with_one_ball(at: Vec2) -> GameWorld {
        let mut config = Config::default();
        config.rules.shuffle_rack = false;
        let mut world = GameWorld::new(1, config);
        for ball in world.balls.iter_mut().filter(|b| b.number != CUE_BALL && b.number != 5) {
            ball.capture();
        }
        world.balls[5].place(at);
        world
    }

    #[test]
    fn test_straight_line_prediction() {
        let world = world_with_one_ball(Vec2::new(475.0, 275.0));
        let prediction = predict(&world);
        let target = prediction.target.expect("ball 5 is on the line");

        assert_eq!(target.ball, 5);
        assert!((prediction.stop_point - Vec2::new(455.0, 275.0)).length() < 1e-3);
        assert!((target.contact - Vec2::new(465.0, 275.0)).length() < 1e-3);
        assert!((target.direction - Vec2::X).length() < 1e-5);
        // 400 of 1400
        assert!((target.speed - 400.0 / 1400.0 * 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_cut_shot_direction() {
        let world = world_with_one_ball(Vec2::new(475.0, 290.0));
        let target = predict(&world).target.expect("ball 5 is clipped");
        // Target leaves along the line of centers, away from the aim line
        assert!(target.direction.x > 0.0);
        assert!(target.direction.y > 0.0);
        assert!((target.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_miss_extends_ray() {
        let world = world_with_one_ball(Vec2::new(475.0, 320.0));
        let prediction = predict(&world);
        assert!(prediction.target.is_none());
        assert!(
            (prediction.stop_point - (prediction.origin + Vec2::X * MAX_PREDICTION_DISTANCE))
                .length()
                < 1e-2
        );
    }

    #[test]
    fn test_balls_behind_are_ignored() {
        let world = world_with_one_ball(Vec2::new(200.0, 275.0));
        assert!(predict(&world).target.is_none());
    }
}
