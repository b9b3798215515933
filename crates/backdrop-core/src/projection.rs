//! Conversions between world space, orthographic view space and region space.
//!
//! # View Space
//!
//! View space is the 2D frame spanned by the two world axes lying in the
//! viewing plane of an axis-aligned camera:
//!
//! | View          | Axes | Sign flip        |
//! |---------------|------|------------------|
//! | Top           | x y  | none             |
//! | Bottom        | x y  | second component |
//! | Front         | x z  | none             |
//! | Back          | x z  | first component  |
//! | Left          | y z  | first component  |
//! | Right         | y z  | none             |
//!
//! The sign flips make "right" and "up" in view space match what the user
//! sees on screen from each direction.
//!
//! # Region Space
//!
//! Region coordinates are pixels inside the viewport, origin at the
//! bottom-left corner, y up. The host performs the actual 3D to 2D
//! projection through [`ViewQuery`].

use glam::{Vec2, Vec3};

use crate::host::ViewQuery;
use crate::orientation::ViewOrientation;

/// World axis indices spanning the viewing plane, or `None` when undefined.
fn axis_pair(orientation: ViewOrientation) -> Option<(usize, usize)> {
    match orientation {
        ViewOrientation::Top | ViewOrientation::Bottom => Some((0, 1)),
        ViewOrientation::Front | ViewOrientation::Back => Some((0, 2)),
        ViewOrientation::Left | ViewOrientation::Right => Some((1, 2)),
        ViewOrientation::Undefined => None,
    }
}

/// Per-component sign applied when entering or leaving view space.
fn view_signs(orientation: ViewOrientation) -> Vec2 {
    match orientation {
        ViewOrientation::Back | ViewOrientation::Left => Vec2::new(-1.0, 1.0),
        ViewOrientation::Bottom => Vec2::new(1.0, -1.0),
        _ => Vec2::ONE,
    }
}

/// Project a world-space vector into orthographic view space.
///
/// An undefined orientation has no view plane and yields `Vec2::ZERO`;
/// sessions never start in that case.
pub fn space_to_view_vector(orientation: ViewOrientation, vector: Vec3) -> Vec2 {
    let Some((a, b)) = axis_pair(orientation) else {
        return Vec2::ZERO;
    };
    Vec2::new(vector[a], vector[b]) * view_signs(orientation)
}

/// Lift a view-space vector back into world space.
///
/// The component along the viewing axis is zero.
pub fn view_to_space_vector(orientation: ViewOrientation, vector: Vec2) -> Vec3 {
    let mut world = Vec3::ZERO;
    if let Some((a, b)) = axis_pair(orientation) {
        let signed = vector * view_signs(orientation);
        world[a] = signed.x;
        world[b] = signed.y;
    }
    world
}

/// Place a view-space point in region space.
///
/// Returns `None` when the host cannot project the point.
pub fn view_to_region_vector<V: ViewQuery + ?Sized>(
    view: &V,
    orientation: ViewOrientation,
    vector: Vec2,
) -> Option<Vec2> {
    view.world_to_region(view_to_space_vector(orientation, vector))
}

/// Signed angle from `from` to `to`, clockwise positive, in `(-π, π]`.
#[inline]
pub fn angle_signed(from: Vec2, to: Vec2) -> f32 {
    let perp = from.y * to.x - from.x * to.y;
    perp.atan2(from.dot(to))
}

/// 2D cross product `from × to` (counter-clockwise positive).
#[inline]
pub fn cross(from: Vec2, to: Vec2) -> f32 {
    from.perp_dot(to)
}
