//! Collision predicates used by the server tick.

use crate::config::Obstacle;
use crate::vec2::Vec2;

/// Point inside circle test.
///
/// `radius` belongs to the defending circle only. Collision holds when the
/// squared distance is less than or equal to `radius^2`.
pub fn point_in_circle(center: Vec2, radius: f64, point: Vec2) -> bool {
    let dx = center.x - point.x;
    let dy = center.y - point.y;
    dx * dx + dy * dy <= radius * radius
}

/// Circle vs axis-aligned rectangle. Strictly less than `radius^2`, so a
/// circle touching an edge does not collide.
pub fn circle_hits_rect(center: Vec2, radius: f64, rect: &Obstacle) -> bool {
    let closest_x = center.x.clamp(rect.x, rect.right);
    let closest_y = center.y.clamp(rect.y, rect.bottom);

    let dx = center.x - closest_x;
    let dy = center.y - closest_y;
    dx * dx + dy * dy < radius * radius
}
