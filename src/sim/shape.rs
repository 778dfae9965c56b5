//! Collision shapes and overlap tests
//!
//! Shapes are snapshots: entities derive them from their current position and
//! visual scale every time the stage asks. Only circles and axis-aligned
//! rectangles exist, so every pairing is one of three tests.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Geometric descriptor used only for collision math
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
    /// Axis-aligned box given by its center and full extents
    Rectangle { center: Vec2, size: Vec2 },
}

impl Shape {
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Shape::Circle { center, radius }
    }

    pub fn rect(center: Vec2, width: f32, height: f32) -> Self {
        Shape::Rectangle {
            center,
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        match *self {
            Shape::Circle { center, .. } | Shape::Rectangle { center, .. } => center,
        }
    }

    /// Half width and half height (a circle is treated as its bounding square)
    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Shape::Circle { radius, .. } => Vec2::splat(radius),
            Shape::Rectangle { size, .. } => size * 0.5,
        }
    }

    /// Check whether two shapes overlap (touching edges do not count)
    pub fn intersects(&self, other: &Shape) -> bool {
        match (*self, *other) {
            (
                Shape::Rectangle { center: a, size: sa },
                Shape::Rectangle { center: b, size: sb },
            ) => rect_rect(a, sa * 0.5, b, sb * 0.5),
            (
                Shape::Circle { center: a, radius: ra },
                Shape::Circle { center: b, radius: rb },
            ) => a.distance(b) < ra + rb,
            (Shape::Rectangle { center, size }, Shape::Circle { center: c, radius })
            | (Shape::Circle { center: c, radius }, Shape::Rectangle { center, size }) => {
                rect_circle(center, size * 0.5, c, radius)
            }
        }
    }
}

/// Independent per-axis overlap of center distance against half-extent sums
#[inline]
fn rect_rect(a: Vec2, half_a: Vec2, b: Vec2, half_b: Vec2) -> bool {
    let d = (a - b).abs();
    let reach = half_a + half_b;
    d.x < reach.x && d.y < reach.y
}

/// Closest point on the box to the circle center, compared with the radius
#[inline]
fn rect_circle(rect_center: Vec2, half: Vec2, circle_center: Vec2, radius: f32) -> bool {
    let local = circle_center - rect_center;
    let closest = Vec2::new(
        local.x.clamp(-half.x, half.x),
        local.y.clamp(-half.y, half.y),
    );
    local.distance(closest) < radius
}

/// Displacement that moves `this` out of `other` along a single axis
///
/// `separation` is `this.center - other.center`; the stage substitutes a random
/// unit vector when the centers coincide. The axis is picked by comparing
/// `|Δy| * totalWidth` against `|Δx| * totalHeight`, so the result is either
/// purely horizontal or purely vertical.
pub fn push_out(this: &Shape, other: &Shape, separation: Vec2) -> Vec2 {
    let total = this.half_extents() + other.half_extents();
    let (dx, dy) = (separation.x, separation.y);

    if dy.abs() * total.x > dx.abs() * total.y {
        let overlap = total.y - dy.abs();
        if overlap <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(0.0, overlap.copysign(dy))
    } else {
        let overlap = total.x - dx.abs();
        if overlap <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(overlap.copysign(dx), 0.0)
    }
}
