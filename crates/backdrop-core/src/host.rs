//! Capabilities the transform core borrows from its host application.
//!
//! The core never owns the viewport, the images or the drawing surface. A
//! host implements these traits and lends itself to each call of the
//! session. Anything implementing all three traits is a [`Host`].

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::image::BackgroundImage;
use crate::pivot::PivotMode;

/// Camera and view queries.
pub trait ViewQuery {
    /// Orientation of the viewing camera.
    fn view_rotation(&self) -> Quat;

    /// Unproject a region coordinate onto the plane through the depth
    /// reference point.
    fn region_to_world(&self, region: Vec2) -> Vec3;

    /// Project a world point to region coordinates.
    fn world_to_region(&self, world: Vec3) -> Option<Vec2>;

    /// Location of the 3D cursor.
    fn cursor_location(&self) -> Vec3;

    /// Pivot setting of the view.
    fn pivot_mode(&self) -> PivotMode;
}

/// Ordered background images attached to the current view.
///
/// Indices are stable for the duration of a session.
pub trait ImageRepository {
    fn image_count(&self) -> usize;

    /// Current attributes of the image at `index`.
    fn image(&self, index: usize) -> Option<BackgroundImage>;

    fn set_offset(&mut self, index: usize, offset: Vec2);

    fn set_rotation(&mut self, index: usize, rotation: f32);

    fn set_size(&mut self, index: usize, size: f32);

    fn set_flip(&mut self, index: usize, flip_x: bool, flip_y: bool);
}

/// Status text, overlay and warning output.
pub trait FeedbackSink {
    /// Replace the header text, or clear it with `None`.
    fn set_status(&mut self, text: Option<&str>);

    /// Replace the overlay line, or hide it with `None`.
    fn set_overlay(&mut self, line: Option<OverlayLine>);

    /// Report a transient user-visible warning.
    fn warn(&mut self, message: &str);
}

/// Everything a session needs from its host.
pub trait Host: ViewQuery + ImageRepository + FeedbackSink {}

impl<T: ViewQuery + ImageRepository + FeedbackSink> Host for T {}

/// Feedback line from the pivot to the mouse, in region coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayLine {
    pub start: Vec2,
    pub end: Vec2,
}

/// Plain list of images, indexed by position.
pub type ImageList = Vec<BackgroundImage>;

impl ImageRepository for ImageList {
    fn image_count(&self) -> usize {
        self.len()
    }

    fn image(&self, index: usize) -> Option<BackgroundImage> {
        self.get(index).cloned()
    }

    fn set_offset(&mut self, index: usize, offset: Vec2) {
        if let Some(image) = self.get_mut(index) {
            image.offset = offset;
        }
    }

    fn set_rotation(&mut self, index: usize, rotation: f32) {
        if let Some(image) = self.get_mut(index) {
            image.rotation = rotation;
        }
    }

    fn set_size(&mut self, index: usize, size: f32) {
        if let Some(image) = self.get_mut(index) {
            image.size = size;
        }
    }

    fn set_flip(&mut self, index: usize, flip_x: bool, flip_y: bool) {
        if let Some(image) = self.get_mut(index) {
            image.flip_x = flip_x;
            image.flip_y = flip_y;
        }
    }
}
