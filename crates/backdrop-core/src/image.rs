//! Background images and the snapshots a session replays from.
//!
//! Every per-frame output of a session is computed from the
//! [`ImageRecord`] captured at invoke time, never from the previous frame,
//! so repeated updates cannot drift and a cancel restores exact values.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::host::ImageRepository;
use crate::orientation::{ImageViewAxis, ViewOrientation};

/// A background reference image as exposed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    /// Placement in the view plane.
    pub offset: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// Uniform scale factor.
    pub size: f32,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Source image width in pixels.
    pub pixel_width: u32,
    /// Source image height in pixels.
    pub pixel_height: u32,
    /// Which camera orientation shows this image.
    pub view_axis: ImageViewAxis,
    pub visible: bool,
}

impl BackgroundImage {
    /// A visible, untransformed image shown in every view.
    pub fn new(pixel_width: u32, pixel_height: u32) -> Self {
        Self {
            offset: Vec2::ZERO,
            rotation: 0.0,
            size: 1.0,
            flip_x: false,
            flip_y: false,
            pixel_width,
            pixel_height,
            view_axis: ImageViewAxis::All,
            visible: true,
        }
    }

    pub fn with_offset(mut self, x: f32, y: f32) -> Self {
        self.offset = Vec2::new(x, y);
        self
    }

    pub fn with_view_axis(mut self, view_axis: ImageViewAxis) -> Self {
        self.view_axis = view_axis;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Width over height, or 1.0 for degenerate dimensions.
    pub fn aspect(&self) -> f32 {
        aspect_ratio(self.pixel_width, self.pixel_height)
    }

    /// Returns true if a session in this orientation may transform the image.
    pub fn is_valid_for(&self, orientation: ViewOrientation) -> bool {
        self.visible && self.view_axis.shows_in(orientation)
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

/// Immutable pre-transform state of one participating image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    /// Index of the image in the host repository.
    pub index: usize,
    pub initial_offset: Vec2,
    pub initial_rotation: f32,
    pub initial_size: f32,
    pub initial_flip_x: bool,
    pub initial_flip_y: bool,
    /// Width over height of the source pixels.
    pub aspect: f32,
    /// Initial offset in aspect-corrected view space.
    pub initial_location_view: Vec2,
}

impl ImageRecord {
    pub fn capture(index: usize, image: &BackgroundImage) -> Self {
        let aspect = image.aspect();
        Self {
            index,
            initial_offset: image.offset,
            initial_rotation: image.rotation,
            initial_size: image.size,
            initial_flip_x: image.flip_x,
            initial_flip_y: image.flip_y,
            aspect,
            initial_location_view: Vec2::new(image.offset.x, image.offset.y / aspect),
        }
    }

    /// Convert an aspect-corrected view location back to an image offset.
    #[inline]
    pub fn view_to_offset(&self, location: Vec2) -> Vec2 {
        Vec2::new(location.x, location.y * self.aspect)
    }

    /// Write the snapshot back to the host verbatim.
    pub fn restore<R: ImageRepository + ?Sized>(&self, repository: &mut R) {
        repository.set_offset(self.index, self.initial_offset);
        repository.set_rotation(self.index, self.initial_rotation);
        repository.set_size(self.index, self.initial_size);
        repository.set_flip(self.index, self.initial_flip_x, self.initial_flip_y);
    }
}

/// Snapshots of every valid image, in repository order.
#[derive(Debug, Clone, Default)]
pub struct ImageSet {
    records: Vec<ImageRecord>,
}

impl ImageSet {
    /// Snapshot every image a session in `orientation` may transform.
    pub fn collect<R: ImageRepository + ?Sized>(
        repository: &R,
        orientation: ViewOrientation,
    ) -> Self {
        if !orientation.is_defined() {
            return Self::default();
        }

        let records = (0..repository.image_count())
            .filter_map(|index| {
                let image = repository.image(index)?;
                image
                    .is_valid_for(orientation)
                    .then(|| ImageRecord::capture(index, &image))
            })
            .collect();

        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&ImageRecord> {
        self.records.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter()
    }

    /// Records taking part in the transform.
    ///
    /// Yields `(position, record)` for every image when `all` is set, or
    /// only the active one otherwise.
    pub fn participants(
        &self,
        active: usize,
        all: bool,
    ) -> impl Iterator<Item = (usize, &ImageRecord)> {
        self.records
            .iter()
            .enumerate()
            .filter(move |(position, _)| all || *position == active)
    }

    /// Mean initial view location of the participating images.
    pub fn mean_location_view(&self, active: usize, all: bool) -> Option<Vec2> {
        let (sum, count) = self
            .participants(active, all)
            .fold((Vec2::ZERO, 0usize), |(sum, count), (_, record)| {
                (sum + record.initial_location_view, count + 1)
            });

        (count > 0).then(|| sum / count as f32)
    }

    /// Restore the participating images.
    pub fn restore<R: ImageRepository + ?Sized>(
        &self,
        repository: &mut R,
        active: usize,
        all: bool,
    ) {
        for (_, record) in self.participants(active, all) {
            record.restore(repository);
        }
    }

    /// Restore every image in the set.
    pub fn restore_all<R: ImageRepository + ?Sized>(&self, repository: &mut R) {
        for record in &self.records {
            record.restore(repository);
        }
    }
}
