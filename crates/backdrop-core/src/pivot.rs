//! Pivot point resolution for rotate and scale.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::image::ImageSet;
use crate::orientation::ViewOrientation;
use crate::projection::space_to_view_vector;

/// Pivot setting of the host view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PivotMode {
    /// The active image's own offset.
    #[default]
    ImageOrigin,
    /// The 3D cursor.
    Cursor,
    BoundingBoxCenter,
    MedianPoint,
    IndividualOrigins,
    ActiveElement,
}

impl PivotMode {
    /// Whether an image orbits (rotate) or slides toward (scale) the pivot.
    ///
    /// For the origin-based modes the active image stays referenced against
    /// itself while every other participant moves around the pivot.
    pub fn moves_image(self, is_active: bool) -> bool {
        match self {
            PivotMode::Cursor | PivotMode::BoundingBoxCenter | PivotMode::MedianPoint => true,
            PivotMode::ImageOrigin | PivotMode::IndividualOrigins | PivotMode::ActiveElement => {
                !is_active
            }
        }
    }
}

/// Compute the view-space pivot for the current participants.
///
/// Returns `None` only when `active` does not index into `images`.
pub fn resolve_pivot(
    mode: PivotMode,
    orientation: ViewOrientation,
    cursor: Vec3,
    images: &ImageSet,
    active: usize,
    transform_all: bool,
) -> Option<Vec2> {
    let active_record = images.get(active)?;

    let pivot = match mode {
        PivotMode::Cursor => space_to_view_vector(orientation, cursor),
        PivotMode::ImageOrigin => active_record.initial_offset,
        PivotMode::BoundingBoxCenter | PivotMode::MedianPoint | PivotMode::IndividualOrigins => {
            images.mean_location_view(active, transform_all)?
        }
        PivotMode::ActiveElement => active_record.initial_location_view,
    };

    Some(pivot)
}
