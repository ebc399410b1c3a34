//! Static table geometry: cushions, pockets and the rack layout
//!
//! Coordinates are screen-style (+y down). The playable cloth is
//! `(100, 100, 700, 350)`; rails and pockets sit in the 40-unit margin.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;
use crate::consts::*;

/// A rail segment: a convex quadrilateral.
///
/// Vertices are stored with positive shoelace area so that `(dy, -dx)` of
/// every edge points out of the polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cushion {
    pub vertices: [Vec2; 4],
}

impl Cushion {
    pub fn new(mut vertices: [Vec2; 4]) -> Self {
        if signed_area(&vertices) < 0.0 {
            vertices.reverse();
        }
        Self { vertices }
    }

    /// Edges as (start, end) pairs in winding order
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        (0..4).map(|i| (self.vertices[i], self.vertices[(i + 1) % 4]))
    }
}

fn signed_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    (0..n)
        .map(|i| {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        * 0.5
}

/// A capture zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pocket {
    pub center: Vec2,
    pub radius: f32,
}

impl Pocket {
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// The fixed table: cloth bounds, six rails and six pockets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Playable cloth inside the cushions
    pub bounds: Rect,
    pub cushions: Vec<Cushion>,
    pub pockets: Vec<Pocket>,
}

impl Default for Table {
    fn default() -> Self {
        Self::standard()
    }
}

impl Table {
    pub fn standard() -> Self {
        let bounds = Rect::new(TABLE_X, TABLE_Y, TABLE_WIDTH, TABLE_HEIGHT);
        let m = TABLE_MARGIN;
        let left = bounds.x;
        let right = bounds.x + bounds.width;
        let top = bounds.y;
        let bottom = bounds.y + bounds.height;
        let mid_x = bounds.x + bounds.width / 2.0;

        let corner = m / 2.0;
        let side = m / 2.5;
        let pockets = vec![
            // top: left, center, right
            Pocket::new(Vec2::new(left - m / 2.0 + 6.0, top - m / 2.0 + 6.0), corner),
            Pocket::new(Vec2::new(mid_x, top - m / 2.0 + 3.0), side),
            Pocket::new(Vec2::new(right + m / 2.0 - 6.0, top - m / 2.0 + 6.0), corner),
            // bottom: left, center, right
            Pocket::new(Vec2::new(left - m / 2.0 + 6.0, bottom + m / 2.0 - 6.0), corner),
            Pocket::new(Vec2::new(mid_x, bottom + m / 2.0 - 3.0), side),
            Pocket::new(Vec2::new(right + m / 2.0 - 6.0, bottom + m / 2.0 - 6.0), corner),
        ];

        let v = Vec2::new;
        let cushions = vec![
            // top left
            Cushion::new([v(105.0, 86.0), v(435.0, 86.0), v(430.0, 100.0), v(120.0, 100.0)]),
            // top right
            Cushion::new([v(465.0, 86.0), v(795.0, 86.0), v(780.0, 100.0), v(470.0, 100.0)]),
            // bottom left
            Cushion::new([v(120.0, 450.0), v(430.0, 450.0), v(435.0, 464.0), v(105.0, 464.0)]),
            // bottom right
            Cushion::new([v(470.0, 450.0), v(780.0, 450.0), v(795.0, 464.0), v(465.0, 464.0)]),
            // head
            Cushion::new([v(86.0, 105.0), v(100.0, 120.0), v(100.0, 430.0), v(86.0, 445.0)]),
            // foot
            Cushion::new([v(800.0, 120.0), v(814.0, 105.0), v(814.0, 445.0), v(800.0, 430.0)]),
        ];

        Self {
            bounds,
            cushions,
            pockets,
        }
    }

    /// Where the cue ball starts and is respotted
    pub fn head_spot(&self) -> Vec2 {
        Vec2::new(
            self.bounds.x + self.bounds.width / 4.0,
            self.bounds.y + self.bounds.height / 2.0,
        )
    }

    /// Apex of the rack
    pub fn foot_spot(&self) -> Vec2 {
        Vec2::new(
            self.bounds.x + self.bounds.width * 3.0 / 4.0,
            self.bounds.y + self.bounds.height / 2.0,
        )
    }

    /// Outer edge of the rails; a ball center beyond it has left the table
    pub fn outer_bounds(&self) -> Rect {
        self.bounds.expanded(TABLE_MARGIN)
    }

    /// Whether a ball of `radius` centered at `p` lies fully on the cloth
    pub fn on_cloth(&self, p: Vec2, radius: f32) -> bool {
        self.bounds.expanded(-radius).contains(p)
    }

    pub fn nearest_pocket(&self, p: Vec2) -> usize {
        self.pockets
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.center
                    .distance_squared(p)
                    .total_cmp(&b.center.distance_squared(p))
            })
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

/// Rack slot that always holds the 8 (center of the third row)
pub const RACK_EIGHT_SLOT: usize = 4;
/// Back corner slots: one solid, one stripe
pub const RACK_SOLID_CORNER_SLOT: usize = 10;
pub const RACK_STRIPE_CORNER_SLOT: usize = 14;

/// Centers of the 15 rack slots, row by row from the apex toward the foot rail
pub fn rack_positions(apex: Vec2, radius: f32) -> [Vec2; BALL_COUNT] {
    let spacing = radius * 2.0 + RACK_GAP;
    let row_step = spacing * (3.0_f32).sqrt() / 2.0;

    let mut positions = [Vec2::ZERO; BALL_COUNT];
    let mut slot = 0;
    for row in 0..5 {
        for i in 0..=row {
            let offset = i as f32 - row as f32 / 2.0;
            positions[slot] = Vec2::new(apex.x + row as f32 * row_step, apex.y + offset * spacing);
            slot += 1;
        }
    }
    positions
}
