//! Collision detection and response
//!
//! Cushions are tested with swept primitives over the ball's path for the
//! current step (`prev_pos -> center`), so a fast ball cannot tunnel through
//! a rail. Ball-ball contacts are discrete: overlap is resolved positionally
//! and the normal velocity component is exchanged.

use glam::Vec2;

use super::ball::Ball;
use super::table::{Cushion, Pocket};

/// Below this squared length a swept movement is treated as no movement
const MIN_MOVEMENT_SQ: f32 = 1e-8;

/// Result of a swept collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Fraction of the step's movement at first contact, in [0, 1]
    pub t: f32,
    /// Contact point on the ball surface (segment) or the touched vertex
    pub point: Vec2,
    /// Surface normal at contact, pointing toward the ball
    pub normal: Vec2,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            t: 1.0,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
        }
    }
}

/// Swept circle vs line segment.
///
/// The segment's normal is taken as `(dy, -dx)` normalized, which points out
/// of a polygon wound like [`Cushion`] vertices. Only approaches from the
/// normal side are detected.
pub fn ball_segment_collision(
    ball: &Ball,
    seg_start: Vec2,
    seg_end: Vec2,
    end_tolerance: f32,
) -> CollisionResult {
    let seg = seg_end - seg_start;
    let seg_len = seg.length();
    if seg_len <= f32::EPSILON {
        return CollisionResult::miss();
    }
    let dir = seg / seg_len;
    let normal = Vec2::new(dir.y, -dir.x);

    let dist_prev = (ball.prev_pos - seg_start).dot(normal);
    let dist_curr = (ball.center - seg_start).dot(normal);

    // Moving away from (or parallel to) the line
    if dist_curr >= dist_prev {
        return CollisionResult::miss();
    }
    // Still short of the line, or already fully behind it at the start
    if dist_curr > ball.radius || dist_prev < -ball.radius {
        return CollisionResult::miss();
    }

    let t = ((dist_prev - ball.radius) / (dist_prev - dist_curr)).clamp(0.0, 1.0);
    let movement = ball.center - ball.prev_pos;
    let center_at_t = ball.prev_pos + movement * t;

    let along = (center_at_t - seg_start).dot(dir);
    if along < -end_tolerance || along > seg_len + end_tolerance {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        t,
        point: center_at_t - normal * ball.radius,
        normal,
    }
}

/// Swept circle vs point (cushion corners).
///
/// Solves `|prev + t * movement - point|^2 = r^2` for the entry root.
pub fn ball_point_sweep(ball: &Ball, point: Vec2) -> CollisionResult {
    let movement = ball.center - ball.prev_pos;
    let a = movement.dot(movement);
    if a < MIN_MOVEMENT_SQ {
        return CollisionResult::miss();
    }

    let f = ball.prev_pos - point;
    let b = 2.0 * f.dot(movement);
    let c = f.dot(f) - ball.radius * ball.radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return CollisionResult::miss();
    }

    let t = (-b - discriminant.sqrt()) / (2.0 * a);
    if !(0.0..=1.0).contains(&t) {
        return CollisionResult::miss();
    }

    let center_at_t = ball.prev_pos + movement * t;
    let normal = (center_at_t - point).normalize_or_zero();
    if normal == Vec2::ZERO {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        t,
        point,
        normal,
    }
}

/// Swept circle vs convex polygon: earliest edge hit, else earliest vertex hit
pub fn ball_convex_collision(ball: &Ball, vertices: &[Vec2], end_tolerance: f32) -> CollisionResult {
    let n = vertices.len();
    let mut best = CollisionResult::miss();

    for i in 0..n {
        let result = ball_segment_collision(ball, vertices[i], vertices[(i + 1) % n], end_tolerance);
        if result.hit && (!best.hit || result.t < best.t) {
            best = result;
        }
    }

    if best.hit {
        return best;
    }

    // Edges missed: the ball may still clip a corner
    for &vertex in vertices {
        let result = ball_point_sweep(ball, vertex);
        if result.hit && (!best.hit || result.t < best.t) {
            best = result;
        }
    }

    best
}

pub fn ball_cushion_collision(ball: &Ball, cushion: &Cushion, end_tolerance: f32) -> CollisionResult {
    ball_convex_collision(ball, &cushion.vertices, end_tolerance)
}

/// Reflect velocity off a surface: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Turn part of the cue ball's spin into velocity after a cushion bounce.
///
/// Against a mostly vertical rail side spin bends the y velocity; against a
/// horizontal rail top/back spin bends the x velocity. Spin then decays.
pub fn apply_cushion_spin(ball: &mut Ball, normal: Vec2, transfer: f32, decay: f32) {
    let vertical_rail = normal.x.abs() > normal.y.abs();
    if vertical_rail {
        ball.velocity.y += ball.spin.x * transfer * ball.velocity.x.abs();
    } else {
        ball.velocity.x += ball.spin.y * transfer * ball.velocity.y.abs();
    }
    ball.spin *= decay;
}

/// Resolve an overlap between two balls.
///
/// Returns `true` when the balls were touching. Overlap is split evenly
/// along the center line; if the balls are closing, the normal component of
/// their relative velocity is exchanged (equal masses, fully elastic).
pub fn resolve_ball_ball(a: &mut Ball, b: &mut Ball) -> bool {
    let delta = b.center - a.center;
    let dist = delta.length();
    let min_dist = a.radius + b.radius;
    if dist >= min_dist {
        return false;
    }

    // Coincident centers: pick an arbitrary but stable axis
    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        Vec2::X
    };

    let half_overlap = (min_dist - dist) * 0.5;
    a.center -= normal * half_overlap;
    b.center += normal * half_overlap;

    let closing = (a.velocity - b.velocity).dot(normal);
    if closing > 0.0 {
        let impulse = normal * closing;
        a.velocity -= impulse;
        b.velocity += impulse;
    }

    true
}

/// Whether more than half of the ball sits inside the pocket
#[inline]
pub fn ball_in_pocket(center: Vec2, ball_radius: f32, pocket: &Pocket) -> bool {
    center.distance(pocket.center) < pocket.radius - ball_radius * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn swept_ball(from: Vec2, to: Vec2) -> Ball {
        let mut ball = Ball::new(1, to, 10.0, 0.99, 0.9);
        ball.prev_pos = from;
        ball
    }

    /// Horizontal wall along y = 100 with the normal pointing to +y
    /// (matches the inner face of the top rail).
    fn top_rail_face() -> (Vec2, Vec2) {
        (Vec2::new(430.0, 100.0), Vec2::new(120.0, 100.0))
    }

    #[test]
    fn test_segment_hit_head_on() {
        let (s, e) = top_rail_face();
        let ball = swept_ball(Vec2::new(300.0, 120.0), Vec2::new(300.0, 104.0));
        let result = ball_segment_collision(&ball, s, e, 0.1);
        assert!(result.hit);
        assert!((result.normal - Vec2::Y).length() < 1e-5);
        // edge touches the line once the center is 10 away: (20 - 10) / 16
        assert!((result.t - 0.625).abs() < 1e-5);
        assert!((result.point - Vec2::new(300.0, 100.0)).length() < 1e-4);
    }

    #[test]
    fn test_segment_miss_moving_away() {
        let (s, e) = top_rail_face();
        let ball = swept_ball(Vec2::new(300.0, 104.0), Vec2::new(300.0, 120.0));
        assert!(!ball_segment_collision(&ball, s, e, 0.1).hit);
    }

    #[test]
    fn test_segment_miss_grazing_parallel() {
        let (s, e) = top_rail_face();
        // Travelling parallel to the rail while touching it
        let ball = swept_ball(Vec2::new(200.0, 108.0), Vec2::new(260.0, 108.0));
        assert!(!ball_segment_collision(&ball, s, e, 0.1).hit);
    }

    #[test]
    fn test_segment_miss_short_of_line() {
        let (s, e) = top_rail_face();
        let ball = swept_ball(Vec2::new(300.0, 140.0), Vec2::new(300.0, 125.0));
        assert!(!ball_segment_collision(&ball, s, e, 0.1).hit);
    }

    #[test]
    fn test_segment_miss_past_endpoint() {
        let (s, e) = top_rail_face();
        let ball = swept_ball(Vec2::new(460.0, 120.0), Vec2::new(460.0, 104.0));
        assert!(!ball_segment_collision(&ball, s, e, 0.1).hit);
    }

    #[test]
    fn test_segment_fast_ball_does_not_tunnel() {
        let (s, e) = top_rail_face();
        // Whole rail thickness crossed in one step
        let ball = swept_ball(Vec2::new(300.0, 150.0), Vec2::new(300.0, 60.0));
        let result = ball_segment_collision(&ball, s, e, 0.1);
        assert!(result.hit);
        let center_at_t = ball.prev_pos + (ball.center - ball.prev_pos) * result.t;
        assert!((center_at_t.y - 110.0).abs() < 1e-3);
    }

    #[test]
    fn test_point_sweep_hits_corner() {
        let corner = Vec2::new(100.0, 100.0);
        let ball = swept_ball(Vec2::new(130.0, 130.0), Vec2::new(100.0, 100.0));
        let result = ball_point_sweep(&ball, corner);
        assert!(result.hit);
        let center_at_t = ball.prev_pos + (ball.center - ball.prev_pos) * result.t;
        assert!((center_at_t.distance(corner) - 10.0).abs() < 1e-3);
        let expected = Vec2::new(1.0, 1.0).normalize();
        assert!((result.normal - expected).length() < 1e-4);
    }

    #[test]
    fn test_point_sweep_degenerate_cases() {
        let corner = Vec2::new(100.0, 100.0);
        // Not moving
        let still = swept_ball(Vec2::new(105.0, 100.0), Vec2::new(105.0, 100.0));
        assert!(!ball_point_sweep(&still, corner).hit);
        // Passing well clear (negative discriminant)
        let clear = swept_ball(Vec2::new(0.0, 200.0), Vec2::new(200.0, 200.0));
        assert!(!ball_point_sweep(&clear, corner).hit);
        // Corner still ahead after this step
        let ahead = swept_ball(Vec2::new(200.0, 100.0), Vec2::new(150.0, 100.0));
        assert!(!ball_point_sweep(&ahead, corner).hit);
    }

    #[test]
    fn test_convex_prefers_edge_then_vertex() {
        let cushion = Cushion::new([
            Vec2::new(105.0, 86.0),
            Vec2::new(435.0, 86.0),
            Vec2::new(430.0, 100.0),
            Vec2::new(120.0, 100.0),
        ]);

        // Straight into the long inner face
        let ball = swept_ball(Vec2::new(250.0, 125.0), Vec2::new(250.0, 105.0));
        let result = ball_cushion_collision(&ball, &cushion, 0.1);
        assert!(result.hit);
        assert!(result.normal.y > 0.99);

        // Diagonally into the bevelled end, past the inner face
        let ball = swept_ball(Vec2::new(455.0, 112.0), Vec2::new(438.0, 95.0));
        let result = ball_cushion_collision(&ball, &cushion, 0.1);
        assert!(result.hit);
        assert!(result.normal.x > 0.0);

        // Nowhere near
        let ball = swept_ball(Vec2::new(250.0, 300.0), Vec2::new(260.0, 310.0));
        assert!(!ball_cushion_collision(&ball, &cushion, 0.1).hit);
    }

    #[test]
    fn test_reflect_velocity() {
        let reflected = reflect_velocity(Vec2::new(100.0, -50.0), Vec2::Y);
        assert!((reflected - Vec2::new(100.0, 50.0)).length() < 1e-4);
    }

    #[test]
    fn test_cushion_spin_bends_and_decays() {
        let mut ball = Ball::new(0, Vec2::ZERO, 10.0, 0.99, 0.9);
        ball.velocity = Vec2::new(-200.0, 0.0);
        ball.spin = Vec2::new(1.0, 0.0);
        apply_cushion_spin(&mut ball, Vec2::X, 0.3, 0.7);
        assert!((ball.velocity.y - 60.0).abs() < 1e-3);
        assert!((ball.spin.x - 0.7).abs() < 1e-6);

        let mut ball = Ball::new(0, Vec2::ZERO, 10.0, 0.99, 0.9);
        ball.velocity = Vec2::new(0.0, 100.0);
        ball.spin = Vec2::new(0.0, -2.0);
        apply_cushion_spin(&mut ball, Vec2::NEG_Y, 0.3, 0.7);
        assert!((ball.velocity.x + 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_ball_ball_head_on_exchange() {
        let mut a = Ball::new(0, Vec2::new(100.0, 100.0), 10.0, 0.99, 0.9);
        let mut b = Ball::new(1, Vec2::new(119.0, 100.0), 10.0, 0.99, 0.9);
        a.velocity = Vec2::new(300.0, 0.0);
        assert!(resolve_ball_ball(&mut a, &mut b));
        assert!(a.velocity.length() < 1e-3);
        assert!((b.velocity.x - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_ball_ball_separating_keeps_velocity() {
        let mut a = Ball::new(0, Vec2::new(100.0, 100.0), 10.0, 0.99, 0.9);
        let mut b = Ball::new(1, Vec2::new(118.0, 100.0), 10.0, 0.99, 0.9);
        a.velocity = Vec2::new(-50.0, 0.0);
        b.velocity = Vec2::new(50.0, 0.0);
        assert!(resolve_ball_ball(&mut a, &mut b));
        assert_eq!(a.velocity, Vec2::new(-50.0, 0.0));
        assert_eq!(b.velocity, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn test_ball_ball_apart_untouched() {
        let mut a = Ball::new(0, Vec2::new(100.0, 100.0), 10.0, 0.99, 0.9);
        let mut b = Ball::new(1, Vec2::new(121.0, 100.0), 10.0, 0.99, 0.9);
        a.velocity = Vec2::new(50.0, 0.0);
        assert!(!resolve_ball_ball(&mut a, &mut b));
        assert_eq!(b.center, Vec2::new(121.0, 100.0));
    }

    #[test]
    fn test_pocket_capture_threshold() {
        let pocket = Pocket::new(Vec2::new(86.0, 86.0), 20.0);
        let threshold = 20.0 - 0.5 * 10.0;
        let eps = 0.01;
        let dir = Vec2::new(1.0, 1.0).normalize();
        assert!(ball_in_pocket(pocket.center + dir * (threshold - eps), 10.0, &pocket));
        assert!(!ball_in_pocket(pocket.center + dir * (threshold + eps), 10.0, &pocket));
    }

    proptest! {
        #[test]
        fn prop_ball_ball_resolves_overlap_and_conserves_momentum(
            ax in 200.0f32..300.0, ay in 200.0f32..300.0,
            angle in 0.0f32..std::f32::consts::TAU,
            dist in 0.5f32..19.9,
            avx in -800.0f32..800.0, avy in -800.0f32..800.0,
            bvx in -800.0f32..800.0, bvy in -800.0f32..800.0,
        ) {
            let a_pos = Vec2::new(ax, ay);
            let b_pos = a_pos + crate::direction_from_angle(angle) * dist;
            let mut a = Ball::new(0, a_pos, 10.0, 0.99, 0.9);
            let mut b = Ball::new(5, b_pos, 10.0, 0.99, 0.9);
            a.velocity = Vec2::new(avx, avy);
            b.velocity = Vec2::new(bvx, bvy);
            let momentum_before = a.velocity + b.velocity;

            prop_assert!(resolve_ball_ball(&mut a, &mut b));

            prop_assert!(a.center.distance(b.center) >= 20.0 - 1e-3);
            let momentum_after = a.velocity + b.velocity;
            prop_assert!((momentum_after - momentum_before).length() < 1e-2);
        }
    }
}
