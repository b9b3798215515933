//! A self-contained orthographic viewport implementing the host contract.
//!
//! Useful for embedding the transform in applications without a 3D editor
//! of their own, and for driving sessions in tests.
//!
//! Region coordinates have their origin at the bottom-left corner with y
//! pointing up. World points are unprojected onto the plane through the
//! world origin perpendicular to the viewing axis.

use glam::{Quat, Vec2, Vec3};

use crate::host::{FeedbackSink, ImageList, ImageRepository, OverlayLine, ViewQuery};
use crate::image::BackgroundImage;
use crate::orientation::ViewOrientation;
use crate::pivot::PivotMode;

/// Orthographic camera over a pixel region.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthoViewport {
    /// Camera rotation; the camera looks down its local -Z.
    pub rotation: Quat,
    /// Region size in pixels.
    pub region_size: Vec2,
    /// World point at the centre of the region.
    pub view_center: Vec3,
    /// World units covered by one pixel.
    pub units_per_pixel: f32,
}

impl OrthoViewport {
    /// A viewport looking from `orientation`, centred on the origin.
    ///
    /// An undefined orientation falls back to an identity rotation.
    pub fn new(orientation: ViewOrientation, width: f32, height: f32) -> Self {
        Self {
            rotation: orientation.rotation().unwrap_or(Quat::IDENTITY),
            region_size: Vec2::new(width, height),
            view_center: Vec3::ZERO,
            units_per_pixel: 0.01,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.view_center = center;
        self
    }

    pub fn with_units_per_pixel(mut self, units_per_pixel: f32) -> Self {
        self.units_per_pixel = units_per_pixel;
        self
    }

    fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    fn axis(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn region_to_world(&self, region: Vec2) -> Vec3 {
        let pixels = region - self.region_size * 0.5;
        let units = pixels * self.units_per_pixel;
        let point = self.view_center + self.right() * units.x + self.up() * units.y;

        // Drop onto the depth plane through the origin.
        let axis = self.axis();
        point - axis * axis.dot(point)
    }

    pub fn world_to_region(&self, world: Vec3) -> Option<Vec2> {
        if self.units_per_pixel <= 0.0 {
            return None;
        }
        let relative = world - self.view_center;
        let units = Vec2::new(relative.dot(self.right()), relative.dot(self.up()));
        Some(units / self.units_per_pixel + self.region_size * 0.5)
    }
}

/// Recording feedback sink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackLog {
    pub status: Option<String>,
    pub overlay: Option<OverlayLine>,
    pub warnings: Vec<String>,
}

impl FeedbackSink for FeedbackLog {
    fn set_status(&mut self, text: Option<&str>) {
        self.status = text.map(str::to_owned);
    }

    fn set_overlay(&mut self, line: Option<OverlayLine>) {
        self.overlay = line;
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_owned());
    }
}

/// In-memory host: a viewport, its images, a 3D cursor and a feedback log.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    pub viewport: OrthoViewport,
    pub images: ImageList,
    pub cursor: Vec3,
    pub pivot_mode: PivotMode,
    pub feedback: FeedbackLog,
}

impl MemoryHost {
    pub fn new(viewport: OrthoViewport, images: ImageList) -> Self {
        Self {
            viewport,
            images,
            cursor: Vec3::ZERO,
            pivot_mode: PivotMode::default(),
            feedback: FeedbackLog::default(),
        }
    }

    pub fn with_pivot(mut self, pivot_mode: PivotMode) -> Self {
        self.pivot_mode = pivot_mode;
        self
    }

    pub fn with_cursor(mut self, cursor: Vec3) -> Self {
        self.cursor = cursor;
        self
    }

    /// Region coordinate of a world point, for placing the pointer.
    pub fn region_of(&self, world: Vec3) -> Vec2 {
        self.viewport
            .world_to_region(world)
            .unwrap_or(self.viewport.region_size * 0.5)
    }
}

impl ViewQuery for MemoryHost {
    fn view_rotation(&self) -> Quat {
        self.viewport.rotation
    }

    fn region_to_world(&self, region: Vec2) -> Vec3 {
        self.viewport.region_to_world(region)
    }

    fn world_to_region(&self, world: Vec3) -> Option<Vec2> {
        self.viewport.world_to_region(world)
    }

    fn cursor_location(&self) -> Vec3 {
        self.cursor
    }

    fn pivot_mode(&self) -> PivotMode {
        self.pivot_mode
    }
}

impl ImageRepository for MemoryHost {
    fn image_count(&self) -> usize {
        self.images.image_count()
    }

    fn image(&self, index: usize) -> Option<BackgroundImage> {
        self.images.image(index)
    }

    fn set_offset(&mut self, index: usize, offset: Vec2) {
        self.images.set_offset(index, offset);
    }

    fn set_rotation(&mut self, index: usize, rotation: f32) {
        self.images.set_rotation(index, rotation);
    }

    fn set_size(&mut self, index: usize, size: f32) {
        self.images.set_size(index, size);
    }

    fn set_flip(&mut self, index: usize, flip_x: bool, flip_y: bool) {
        self.images.set_flip(index, flip_x, flip_y);
    }
}

impl FeedbackSink for MemoryHost {
    fn set_status(&mut self, text: Option<&str>) {
        self.feedback.set_status(text);
    }

    fn set_overlay(&mut self, line: Option<OverlayLine>) {
        self.feedback.set_overlay(line);
    }

    fn warn(&mut self, message: &str) {
        self.feedback.warn(message);
    }
}
