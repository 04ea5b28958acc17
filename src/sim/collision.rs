//! Collision helpers shared by the simulations
//!
//! Paddle-ball works in continuous screen space (y grows downward), while
//! grid-snake and falling-piece work on integer cells.

use glam::{IVec2, Vec2};

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Closed-interval overlap of `[a_start, a_end]` and `[b_start, b_end]`.
/// Touching edges count as overlap.
#[inline]
pub fn spans_overlap(a_start: f32, a_end: f32, b_start: f32, b_end: f32) -> bool {
    a_end >= b_start && a_start <= b_end
}

/// Which side of the field a paddle guards
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Check whether a square ball (top-left `pos`) touches a vertical paddle face.
///
/// `plane_x` is the paddle's face: the ball's left edge must reach it for a
/// left paddle, the ball's right edge for a right paddle. The ball's vertical
/// span must overlap the paddle's.
pub fn ball_paddle_contact(
    pos: Vec2,
    ball_size: f32,
    side: Side,
    plane_x: f32,
    paddle_top: f32,
    paddle_height: f32,
) -> bool {
    let reaches_plane = match side {
        Side::Left => pos.x <= plane_x,
        Side::Right => pos.x + ball_size >= plane_x,
    };
    reaches_plane && spans_overlap(pos.y, pos.y + ball_size, paddle_top, paddle_top + paddle_height)
}

/// True if `cell` lies inside a `width` x `height` grid anchored at the origin
#[inline]
pub fn cell_in_bounds(cell: IVec2, width: i32, height: i32) -> bool {
    cell.x >= 0 && cell.x < width && cell.y >= 0 && cell.y < height
}
