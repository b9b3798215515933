//! Classification of viewing cameras into the six axis-aligned views.
//!
//! Background images only have a well-defined 2D placement when the camera
//! looks straight down one of the world axes. Any other orientation is
//! reported as [`ViewOrientation::Undefined`] and the transform tool refuses
//! to start.
//!
//! # Euler Convention
//!
//! Euler angles use the XYZ order where the rotation matrix is
//! `Rz * Ry * Rx`. Each canonical view corresponds to one triple:
//!
//! | View   | X    | Y | Z     |
//! |--------|------|---|-------|
//! | Top    | 0    | 0 | 0     |
//! | Bottom | π    | 0 | 0     |
//! | Front  | π/2  | 0 | 0     |
//! | Back   | π/2  | 0 | π     |
//! | Left   | π/2  | 0 | -π/2  |
//! | Right  | π/2  | 0 | π/2   |

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Camera orientation, fixed for the lifetime of a transform session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewOrientation {
    Top,
    Bottom,
    Front,
    Back,
    Left,
    Right,
    /// Not aligned with any world axis.
    #[default]
    Undefined,
}

/// Rounded Euler triples in milliradians, paired with their view.
const CANONICAL_VIEWS: [((i32, i32, i32), ViewOrientation); 6] = [
    ((0, 0, 0), ViewOrientation::Top),
    ((3142, 0, 0), ViewOrientation::Bottom),
    ((1571, 0, 0), ViewOrientation::Front),
    ((1571, 0, 3142), ViewOrientation::Back),
    ((1571, 0, -1571), ViewOrientation::Left),
    ((1571, 0, 1571), ViewOrientation::Right),
];

impl ViewOrientation {
    /// All labelled orientations, in table order.
    pub const ALL: [ViewOrientation; 6] = [
        ViewOrientation::Top,
        ViewOrientation::Bottom,
        ViewOrientation::Front,
        ViewOrientation::Back,
        ViewOrientation::Left,
        ViewOrientation::Right,
    ];

    /// Classify a camera rotation.
    ///
    /// The rotation is converted to XYZ Euler angles, each rounded to three
    /// decimal places, and looked up in the table of canonical views.
    /// Zero-length and non-finite rotations are never a view.
    pub fn from_rotation(rotation: Quat) -> Self {
        if !rotation.is_finite() || rotation.length_squared() == 0.0 {
            return ViewOrientation::Undefined;
        }

        let euler = euler_xyz(rotation);
        if !euler.is_finite() {
            return ViewOrientation::Undefined;
        }
        let key = (
            round_milli(euler.x),
            round_milli(euler.y),
            round_milli(euler.z),
        );

        CANONICAL_VIEWS
            .iter()
            .find(|(triple, _)| *triple == key)
            .map(|(_, view)| *view)
            .unwrap_or(ViewOrientation::Undefined)
    }

    /// Canonical camera rotation for this view.
    ///
    /// Returns `None` for [`ViewOrientation::Undefined`].
    pub fn rotation(self) -> Option<Quat> {
        let (x, z) = match self {
            ViewOrientation::Top => (0.0, 0.0),
            ViewOrientation::Bottom => (PI, 0.0),
            ViewOrientation::Front => (FRAC_PI_2, 0.0),
            ViewOrientation::Back => (FRAC_PI_2, PI),
            ViewOrientation::Left => (FRAC_PI_2, -FRAC_PI_2),
            ViewOrientation::Right => (FRAC_PI_2, FRAC_PI_2),
            ViewOrientation::Undefined => return None,
        };
        Some(Quat::from_rotation_z(z) * Quat::from_rotation_x(x))
    }

    /// Returns true for any of the six labelled views.
    #[inline]
    pub fn is_defined(self) -> bool {
        self != ViewOrientation::Undefined
    }
}

/// The view axis a background image is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageViewAxis {
    Top,
    Bottom,
    Front,
    Back,
    Left,
    Right,
    /// Shown in every axis-aligned view.
    #[default]
    All,
}

impl ImageViewAxis {
    /// Returns true if an image on this axis is shown by the given camera.
    pub fn shows_in(self, orientation: ViewOrientation) -> bool {
        match self {
            ImageViewAxis::All => orientation.is_defined(),
            ImageViewAxis::Top => orientation == ViewOrientation::Top,
            ImageViewAxis::Bottom => orientation == ViewOrientation::Bottom,
            ImageViewAxis::Front => orientation == ViewOrientation::Front,
            ImageViewAxis::Back => orientation == ViewOrientation::Back,
            ImageViewAxis::Left => orientation == ViewOrientation::Left,
            ImageViewAxis::Right => orientation == ViewOrientation::Right,
        }
    }
}

const EULER_TIE_TOLERANCE: f32 = 1e-4;

/// Round radians to the nearest milliradian.
///
/// -π and π describe the same angle; both land on +π so that a half turn
/// classifies identically whichever branch `atan2` returned.
fn round_milli(angle: f32) -> i32 {
    let milli = (angle * 1000.0).round() as i32;
    if milli == -3142 {
        3142
    } else {
        milli
    }
}

/// Decompose a rotation into XYZ Euler angles (matrix `Rz * Ry * Rx`).
///
/// Two decompositions exist away from gimbal lock; the one with the smaller
/// total magnitude is returned. Near-ties keep the first solution so that
/// float noise cannot switch branches.
fn euler_xyz(rotation: Quat) -> Vec3 {
    let m = Mat3::from_quat(rotation.normalize());
    // m.col(c)[r] is row r of column c.
    let (c0, c1, c2) = (m.x_axis, m.y_axis, m.z_axis);
    let cy = c0.x.hypot(c0.y);

    if cy > 16.0 * f32::EPSILON {
        let first = Vec3::new(c1.z.atan2(c2.z), (-c0.z).atan2(cy), c0.y.atan2(c0.x));
        let second = Vec3::new(
            (-c1.z).atan2(-c2.z),
            (-c0.z).atan2(-cy),
            (-c0.y).atan2(-c0.x),
        );

        if first.abs().element_sum() <= second.abs().element_sum() + EULER_TIE_TOLERANCE {
            first
        } else {
            second
        }
    } else {
        Vec3::new((-c2.y).atan2(c1.y), (-c0.z).atan2(cy), 0.0)
    }
}
